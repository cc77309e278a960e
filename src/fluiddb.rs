//! Object-store operations on top of [`FluidClient`]
//!
//! Every operation takes tag and namespace paths in absolute unix form
//! (`/njr/rating`); relative paths are resolved against the authenticated
//! user. Callers holding command-line input should pass it through
//! [`TagPaths::from_input`] first.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::client::{status, FluidClient};
use crate::config::{Config, Credentials};
use crate::error::{CliError, Result};
use crate::paths::TagPaths;
use crate::value::TagValue;

/// An object as returned by `POST /objects`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Object {
    /// Object id (a UUID)
    pub id: String,
    /// URI of the object resource
    #[serde(rename = "URI")]
    pub uri: String,
}

/// Contents of a namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceInfo {
    /// Namespace object id
    #[serde(default)]
    pub id: Option<String>,
    /// Description, when requested
    #[serde(default)]
    pub description: Option<String>,
    /// Names of the namespaces directly inside
    #[serde(default)]
    pub namespace_names: Vec<String>,
    /// Names of the tags directly inside
    #[serde(default)]
    pub tag_names: Vec<String>,
}

/// Everything below a namespace, as absolute paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTree {
    /// Sub-namespaces at every depth
    pub namespaces: Vec<String>,
    /// Tags at every depth
    pub tags: Vec<String>,
}

/// One object's tag values from the values API
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRow {
    /// Object id
    pub id: String,
    /// Values keyed by tag path (no leading slash)
    pub values: BTreeMap<String, TagValue>,
}

/// Connection to Fluidinfo as one user, with path handling
#[derive(Debug, Clone)]
pub struct FluidDb {
    client: FluidClient,
    paths: TagPaths,
}

impl FluidDb {
    /// Wrap an existing client
    #[must_use]
    pub const fn new(client: FluidClient, paths: TagPaths) -> Self {
        Self { client, paths }
    }

    /// Connect with the host, timeout and path style from `config`
    pub fn connect(config: &Config, credentials: &Credentials) -> Result<Self> {
        let client = FluidClient::new(config, credentials)?;
        let paths = TagPaths::new(&credentials.username, config.path_style(credentials));
        Ok(Self::new(client, paths))
    }

    /// The underlying HTTP client
    #[must_use]
    pub const fn client(&self) -> &FluidClient {
        &self.client
    }

    /// Path normaliser for the authenticated user
    #[must_use]
    pub const fn paths(&self) -> &TagPaths {
        &self.paths
    }

    /// Authenticated username
    #[must_use]
    pub fn username(&self) -> &str {
        self.paths.username()
    }

    // ───────────────────────────────────────────────────────────────
    // Objects
    // ───────────────────────────────────────────────────────────────

    /// Create an object, or fetch the existing one with this about tag
    ///
    /// This doubles as the about-to-id lookup.
    pub fn create_object(&self, about: Option<&str>) -> Result<Object> {
        let body = about.map(|about| json!({ "about": about }));
        let response = self
            .client
            .call(Method::POST, "/objects", body.as_ref(), &[])?
            .expect_status(status::CREATED, format!("creating object {about:?}"))?;
        let object = Object {
            id: response.field("id")?,
            uri: response.field("URI")?,
        };
        debug!(id = %object.id, ?about, "object");
        Ok(object)
    }

    /// Ids of the objects matching a query
    pub fn query(&self, query: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .call(Method::GET, "/objects", None, &[("query".to_string(), query.to_string())])?;
        if response.status != status::OK {
            return Err(CliError::QueryFailed(format!(
                "{query} ({})",
                status::describe(response.status)
            )));
        }
        let ids = response
            .json()
            .and_then(|body| body.get("ids"))
            .and_then(Value::as_array)
            .ok_or_else(|| CliError::InvalidResponse(format!("no ids in {}", response.body)))?;
        Ok(ids.iter().filter_map(Value::as_str).map(str::to_string).collect())
    }

    /// Tag paths present on an object, in absolute form
    pub fn get_object_tags_by_id(&self, id: &str) -> Result<Vec<String>> {
        let path = format!("/objects/{id}");
        let response = self.client.call(Method::GET, &path, None, &[])?;
        if response.status != status::OK {
            return Err(CliError::ObjectNotFound(path));
        }
        let tags = response
            .json()
            .and_then(|body| body.get("tagPaths"))
            .and_then(Value::as_array)
            .ok_or_else(|| CliError::InvalidResponse(format!("no tagPaths in {}", response.body)))?;
        Ok(tags
            .iter()
            .filter_map(Value::as_str)
            .map(|tag| format!("/{tag}"))
            .collect())
    }

    /// Tag paths present on the object with this about tag
    pub fn get_object_tags_by_about(&self, about: &str) -> Result<Vec<String>> {
        let object = self.create_object(Some(about))?;
        self.get_object_tags_by_id(&object.id)
    }

    // ───────────────────────────────────────────────────────────────
    // Namespaces
    // ───────────────────────────────────────────────────────────────

    /// Create a namespace; returns its id
    ///
    /// When the parent is missing and `create_parents` is set, the parents
    /// are created (with empty descriptions) and the request retried once.
    pub fn create_namespace(
        &self,
        path: &str,
        description: &str,
        create_parents: bool,
    ) -> Result<String> {
        let absolute = self.paths.absolute(path);
        let absolute = absolute.trim_end_matches('/');
        let parts: Vec<&str> = absolute.trim_start_matches('/').split('/').collect();
        if parts.len() < 2 {
            return Err(CliError::EmptyNamespace(absolute.to_string()));
        }
        let (parents, name) = parts.split_at(parts.len() - 1);
        let parent = parents.join("/");
        let body = json!({ "name": name[0], "description": description });

        let response =
            self.client
                .call(Method::POST, &format!("/namespaces/{parent}"), Some(&body), &[])?;
        match response.status {
            status::CREATED => {
                let id = response.field("id")?;
                info!(namespace = %absolute, %id, "created namespace");
                Ok(id)
            }
            status::NOT_FOUND if create_parents => {
                if parents.len() < 2 {
                    return Err(CliError::CannotWriteUser {
                        user: parts[0].to_string(),
                    });
                }
                self.create_namespace(&format!("/{parent}"), "", true)?;
                self.create_namespace(absolute, description, false)
            }
            code => Err(CliError::api(code, format!("creating namespace {absolute}"))),
        }
    }

    /// Delete an empty namespace
    pub fn delete_namespace(&self, path: &str) -> Result<()> {
        let resource = self.paths.namespace_path(path);
        self.client
            .call(Method::DELETE, &resource, None, &[])?
            .expect_status(status::NO_CONTENT, format!("removing namespace {path}"))?;
        info!(namespace = %path, "removed namespace");
        Ok(())
    }

    /// Description, sub-namespaces and tags of a namespace
    pub fn describe_namespace(&self, path: &str) -> Result<NamespaceInfo> {
        self.get_namespace(path, true)
    }

    /// Sub-namespaces and tags of a namespace, without the description
    pub fn list_namespace(&self, path: &str) -> Result<NamespaceInfo> {
        self.get_namespace(path, false)
    }

    fn get_namespace(&self, path: &str, with_description: bool) -> Result<NamespaceInfo> {
        let query = [
            ("returnDescription".to_string(), with_description.to_string()),
            ("returnNamespaces".to_string(), "true".to_string()),
            ("returnTags".to_string(), "true".to_string()),
        ];
        let response = self
            .client
            .call(Method::GET, &self.paths.namespace_path(path), None, &query)?
            .expect_status(status::OK, format!("namespace {path}"))?;
        let body = response
            .json()
            .cloned()
            .ok_or_else(|| CliError::InvalidResponse(format!("namespace {path}: {}", response.body)))?;
        Ok(serde_json::from_value(body)?)
    }

    /// Whether a namespace exists
    pub fn namespace_exists(&self, path: &str) -> Result<bool> {
        self.exists(&self.paths.namespace_path(path))
    }

    /// Whether an abstract tag exists
    pub fn tag_exists(&self, tag: &str) -> Result<bool> {
        self.exists(&self.paths.full(tag))
    }

    fn exists(&self, resource: &str) -> Result<bool> {
        let response = self.client.call(Method::GET, resource, None, &[])?;
        match response.status {
            status::OK => Ok(true),
            status::NOT_FOUND => Ok(false),
            code => Err(CliError::api(code, resource.to_string())),
        }
    }

    /// Every namespace and tag below `path`, depth first
    pub fn list_namespace_recursive(&self, path: &str) -> Result<NamespaceTree> {
        let root = self.paths.absolute(path);
        let root = root.trim_end_matches('/').to_string();
        let mut tree = NamespaceTree::default();
        let mut pending = vec![root];
        while let Some(namespace) = pending.pop() {
            let info = self.list_namespace(&namespace)?;
            tree.tags
                .extend(info.tag_names.iter().map(|tag| format!("{namespace}/{tag}")));
            for child in &info.namespace_names {
                let child = format!("{namespace}/{child}");
                tree.namespaces.push(child.clone());
                pending.push(child);
            }
        }
        Ok(tree)
    }

    /// Delete a namespace with all its tags and sub-namespaces
    ///
    /// Tags go first, then sub-namespaces from the deepest up, then the
    /// namespace itself.
    pub fn remove_namespace_recursive(&self, path: &str) -> Result<()> {
        let mut tree = self.list_namespace_recursive(path)?;
        let depth = |path: &String| path.matches('/').count();
        tree.tags.sort_by_key(|tag| std::cmp::Reverse(depth(tag)));
        tree.namespaces.sort_by_key(|ns| std::cmp::Reverse(depth(ns)));
        for tag in &tree.tags {
            self.delete_abstract_tag(tag)?;
        }
        for namespace in &tree.namespaces {
            self.delete_namespace(namespace)?;
        }
        self.delete_namespace(path)
    }

    // ───────────────────────────────────────────────────────────────
    // Tags
    // ───────────────────────────────────────────────────────────────

    /// Create an abstract tag (not attached to any object); returns its id
    ///
    /// A missing namespace is created and the request retried.
    pub fn create_abstract_tag(
        &self,
        tag: &str,
        description: Option<&str>,
        indexed: bool,
    ) -> Result<String> {
        let parts = self.paths.split(tag)?;
        let parent = parts.parent();
        let resource = format!("/tags{parent}");
        let body = json!({
            "name": parts.name,
            "description": description.unwrap_or_default(),
            "indexed": indexed,
        });

        let mut response = self.client.call(Method::POST, &resource, Some(&body), &[])?;
        if response.status == status::NOT_FOUND {
            if parts.namespace.is_empty() {
                return Err(CliError::CannotWriteUser { user: parts.user });
            }
            match self.create_namespace(&parent, "", true) {
                Ok(_) => {}
                Err(CliError::ApiError { .. }) => return Err(CliError::NamespaceCreation(parent)),
                Err(err) => return Err(err),
            }
            response = self.client.call(Method::POST, &resource, Some(&body), &[])?;
        }
        let response = response.expect_status(status::CREATED, format!("creating tag {tag}"))?;
        let id = response.field("id")?;
        info!(%tag, %id, "created tag");
        Ok(id)
    }

    /// Delete an abstract tag, removing it from every object
    pub fn delete_abstract_tag(&self, tag: &str) -> Result<()> {
        self.client
            .call(Method::DELETE, &self.paths.full(tag), None, &[])?
            .expect_status(status::NO_CONTENT, format!("removing tag {tag}"))?;
        info!(%tag, "removed tag");
        Ok(())
    }

    /// Set a tag on an object; `None` stores a tag with no value
    ///
    /// When the tag does not exist and `create_if_needed` is set, the
    /// abstract tag is created and the write retried once.
    pub fn tag_object_by_id(
        &self,
        id: &str,
        tag: &str,
        value: Option<&TagValue>,
        create_if_needed: bool,
    ) -> Result<()> {
        let resource = self.object_tag_path(id, tag);
        let code = self
            .client
            .set_tag_value(&resource, value.unwrap_or(&TagValue::Null))?;
        match code {
            status::NO_CONTENT => Ok(()),
            status::NOT_FOUND if create_if_needed => {
                self.create_abstract_tag(tag, None, true)?;
                self.tag_object_by_id(id, tag, value, false)
            }
            code => Err(CliError::api(code, format!("tagging object {id} with {tag}"))),
        }
    }

    /// Set a tag on the object with this about tag
    pub fn tag_object_by_about(
        &self,
        about: &str,
        tag: &str,
        value: Option<&TagValue>,
        create_if_needed: bool,
    ) -> Result<()> {
        let object = self.create_object(Some(about))?;
        self.tag_object_by_id(&object.id, tag, value, create_if_needed)
    }

    /// Remove a tag from an object
    ///
    /// A missing tag or object counts as success when `missing_ok` is set.
    pub fn untag_object_by_id(&self, id: &str, tag: &str, missing_ok: bool) -> Result<()> {
        let resource = self.object_tag_path(id, tag);
        let response = self.client.call(Method::DELETE, &resource, None, &[])?;
        match response.status {
            status::NO_CONTENT => Ok(()),
            status::NOT_FOUND if missing_ok => Ok(()),
            code => Err(CliError::api(code, format!("removing {tag} from object {id}"))),
        }
    }

    /// Remove a tag from the object with this about tag
    pub fn untag_object_by_about(&self, about: &str, tag: &str, missing_ok: bool) -> Result<()> {
        let object = self.create_object(Some(about))?;
        self.untag_object_by_id(&object.id, tag, missing_ok)
    }

    /// Value of a tag on an object; `None` when the tag is not present
    pub fn get_tag_value_by_id(&self, id: &str, tag: &str) -> Result<Option<TagValue>> {
        let resource = self.object_tag_path(id, tag);
        match self.client.get_tag_value(&resource)? {
            (status::OK, value) => Ok(Some(value.unwrap_or(TagValue::Null))),
            (status::NOT_FOUND, _) => Ok(None),
            (code, _) => Err(CliError::api(code, format!("getting tag {tag}"))),
        }
    }

    /// Value of a tag on the object with this about tag
    pub fn get_tag_value_by_about(&self, about: &str, tag: &str) -> Result<Option<TagValue>> {
        let object = self.create_object(Some(about))?;
        self.get_tag_value_by_id(&object.id, tag)
    }

    fn object_tag_path(&self, id: &str, tag: &str) -> String {
        format!("/objects/{id}{}", self.paths.absolute(tag))
    }

    // ───────────────────────────────────────────────────────────────
    // Values API
    // ───────────────────────────────────────────────────────────────

    /// Set tags on every object matching `query`
    ///
    /// The tags must already exist.
    pub fn tag_by_query(&self, query: &str, tags: &[(String, Option<TagValue>)]) -> Result<()> {
        let mut body = Map::new();
        for (tag, value) in tags {
            let value = value.as_ref().map_or(Value::Null, TagValue::to_json);
            body.insert(self.values_tag(tag), json!({ "value": value }));
        }
        self.client
            .call(
                Method::PUT,
                "/values",
                Some(&Value::Object(body)),
                &[("query".to_string(), query.to_string())],
            )?
            .expect_status(status::NO_CONTENT, format!("tagging objects matching {query}"))?;
        Ok(())
    }

    /// Values of `tags` on every object matching `query`
    pub fn get_values(&self, query: &str, tags: &[&str]) -> Result<Vec<ValueRow>> {
        let mut params = vec![("query".to_string(), query.to_string())];
        params.extend(tags.iter().map(|tag| ("tag".to_string(), self.values_tag(tag))));
        let response = self
            .client
            .call(Method::GET, "/values", None, &params)?
            .expect_status(status::OK, format!("values for {query}"))?;
        let objects = response
            .json()
            .and_then(|body| body.pointer("/results/id"))
            .and_then(Value::as_object)
            .ok_or_else(|| CliError::InvalidResponse(format!("no results in {}", response.body)))?;

        Ok(objects
            .iter()
            .map(|(id, found)| ValueRow {
                id: id.clone(),
                values: found
                    .as_object()
                    .into_iter()
                    .flatten()
                    .map(|(tag, entry)| {
                        let value = entry.get("value").unwrap_or(&Value::Null);
                        (tag.clone(), TagValue::from_json(value))
                    })
                    .collect(),
            })
            .collect())
    }

    fn values_tag(&self, tag: &str) -> String {
        self.paths.absolute(tag).trim_start_matches('/').to_string()
    }

    // ───────────────────────────────────────────────────────────────
    // URIs
    // ───────────────────────────────────────────────────────────────

    /// Full URI of an object
    #[must_use]
    pub fn object_uri(&self, id: &str) -> String {
        format!("{}/objects/{id}", self.client.base_url())
    }

    /// Full URI of a tag in a namespace
    #[must_use]
    pub fn tag_uri(&self, namespace: &str, tag: &str) -> String {
        format!("{}/tags/{namespace}/{tag}", self.client.base_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::PathStyle;

    fn db() -> FluidDb {
        let config = Config {
            host: "fluiddb.example.com".to_string(),
            ..Default::default()
        };
        let credentials = Credentials::new("njr", "pw");
        let client = FluidClient::new(&config, &credentials).expect("client");
        FluidDb::new(client, TagPaths::new("njr", PathStyle::Unix))
    }

    #[test]
    fn uris_use_the_configured_host() {
        let db = db();
        assert_eq!(db.object_uri("abc"), "http://fluiddb.example.com/objects/abc");
        assert_eq!(
            db.tag_uri("njr", "rating"),
            "http://fluiddb.example.com/tags/njr/rating"
        );
    }

    #[test]
    fn object_tag_paths_are_absolute() {
        let db = db();
        assert_eq!(db.object_tag_path("abc", "rating"), "/objects/abc/njr/rating");
        assert_eq!(db.object_tag_path("abc", "/about"), "/objects/abc/fluiddb/about");
    }

    #[test]
    fn values_api_takes_paths_without_leading_slash() {
        let db = db();
        assert_eq!(db.values_tag("/njr/rating"), "njr/rating");
        assert_eq!(db.values_tag("rating"), "njr/rating");
    }

    #[test]
    fn user_namespace_cannot_be_created() {
        let db = db();
        assert!(matches!(
            db.create_namespace("/njr", "", true),
            Err(CliError::EmptyNamespace(_))
        ));
    }

    #[test]
    fn namespace_listing_decodes() {
        let info: NamespaceInfo = serde_json::from_value(json!({
            "namespaceNames": ["books"],
            "tagNames": ["rating", "seen"],
            "id": "5f3c",
        }))
        .expect("decode");
        assert_eq!(info.namespace_names, vec!["books"]);
        assert_eq!(info.tag_names.len(), 2);
        assert_eq!(info.description, None);
    }
}
