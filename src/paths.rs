//! Tag-path normalisation
//!
//! Tags and namespaces can be written in two conventions:
//!
//! - **Unix style**: a leading `/` marks an absolute path (`/njr/rating`);
//!   anything else is relative to the authenticated user (`rating`).
//! - **Fluidinfo style** (the default): paths are always full and written
//!   without a leading slash (`njr/rating`).
//!
//! Internally every path is held in absolute unix form (`/njr/rating`), which
//! maps directly onto the REST resources (`/tags/njr/rating`,
//! `/objects/<id>/njr/rating`, `/namespaces/njr`).

use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// Path of the about tag, which `/about` abbreviates
pub const ABOUT_TAG: &str = "/fluiddb/about";

/// Textual convention for tag and namespace paths on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// `/user/ns/tag` absolute, `tag` relative to the user
    Unix,
    /// `user/ns/tag`, always absolute
    #[default]
    Fluidinfo,
}

impl PathStyle {
    /// Pick a style from an explicit unix-style switch
    #[must_use]
    pub const fn from_unix_flag(unix: bool) -> Self {
        if unix {
            Self::Unix
        } else {
            Self::Fluidinfo
        }
    }
}

/// A tag path broken into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPath {
    /// Top-level (user) namespace
    pub user: String,
    /// Intermediate namespaces joined with `/`; empty when the tag sits
    /// directly in the user namespace
    pub namespace: String,
    /// Short tag name
    pub name: String,
}

impl TagPath {
    /// The namespace holding the tag, as an absolute path
    #[must_use]
    pub fn parent(&self) -> String {
        if self.namespace.is_empty() {
            format!("/{}", self.user)
        } else {
            format!("/{}/{}", self.user, self.namespace)
        }
    }
}

/// Path normaliser bound to a user and a convention
#[derive(Debug, Clone)]
pub struct TagPaths {
    username: String,
    style: PathStyle,
}

impl TagPaths {
    /// Create a normaliser for `username`
    pub fn new(username: impl Into<String>, style: PathStyle) -> Self {
        Self {
            username: username.into(),
            style,
        }
    }

    /// The user relative paths resolve against
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Convention used for input and output
    #[must_use]
    pub const fn style(&self) -> PathStyle {
        self.style
    }

    /// Absolute unix form of `tag`
    ///
    /// `/about` expands to the about tag and a leading `/tags/` is dropped;
    /// other paths starting with `/` are returned unchanged, and the rest are
    /// taken as relative to the user.
    #[must_use]
    pub fn absolute(&self, tag: &str) -> String {
        if tag == "/about" {
            return ABOUT_TAG.to_string();
        }
        if let Some(rest) = tag.strip_prefix("/tags/") {
            return format!("/{rest}");
        }
        if tag.starts_with('/') {
            return tag.to_string();
        }
        format!("/{}/{tag}", self.username)
    }

    /// Absolute unix form of a path typed by the user in the active style
    #[must_use]
    pub fn from_input(&self, tag: &str) -> String {
        match self.style {
            PathStyle::Fluidinfo if !tag.starts_with('/') => self.absolute(&format!("/{tag}")),
            _ => self.absolute(tag),
        }
    }

    /// Render an absolute path in the active style
    #[must_use]
    pub fn for_output(&self, absolute: &str) -> String {
        match self.style {
            PathStyle::Fluidinfo => absolute.strip_prefix('/').unwrap_or(absolute).to_string(),
            PathStyle::Unix => absolute.to_string(),
        }
    }

    /// The `/tags/...` resource path for `tag`
    #[must_use]
    pub fn full(&self, tag: &str) -> String {
        if tag.starts_with("/tags/") {
            tag.to_string()
        } else {
            format!("/tags{}", self.absolute(tag))
        }
    }

    /// The `/namespaces/...` resource path for a namespace
    #[must_use]
    pub fn namespace_path(&self, namespace: &str) -> String {
        let absolute = self.absolute(namespace);
        let trimmed = absolute.trim_end_matches('/');
        format!("/namespaces{trimmed}")
    }

    /// Split any form of tag path into user, namespace and short name
    pub fn split(&self, tag: &str) -> Result<TagPath> {
        if tag.is_empty() || tag == "/" {
            return Err(CliError::TagPath(tag.to_string()));
        }
        let absolute = self.absolute(tag);
        let parts: Vec<&str> = absolute.split('/').collect();
        // parts[0] is the empty string before the leading '/'
        if parts.len() < 3 {
            return Err(CliError::TagPath(tag.to_string()));
        }
        Ok(TagPath {
            user: parts[1].to_string(),
            namespace: parts[2..parts.len() - 1].join("/"),
            name: parts[parts.len() - 1].to_string(),
        })
    }

    /// Whether `tag` stands for the object's id in `show`
    #[must_use]
    pub fn is_special_id(&self, tag: &str) -> bool {
        match self.style {
            PathStyle::Unix => tag == "/id",
            PathStyle::Fluidinfo => tag == "id" || tag == "/id",
        }
    }

    /// The user's root namespace in the active style
    #[must_use]
    pub fn home(&self) -> String {
        self.for_output(&format!("/{}", self.username))
    }
}
