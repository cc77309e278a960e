//! Upload public bookmarks as tagged objects

use std::collections::BTreeSet;
use std::io::Write;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::feed::Post;
use crate::fluiddb::FluidDb;

/// What an import did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Objects created or found, one per URL
    pub urls: usize,
    /// Tags applied across all objects
    pub tags: usize,
    /// Each tag name applied
    pub distinct: BTreeSet<String>,
    /// Posts left out because they are private
    pub private: usize,
}

impl ImportSummary {
    /// Print the totals the way the importer reports them
    pub fn report(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(
            out,
            "{} URLs tagged in FluidDB, with a total of {} tags ({} distinct)",
            self.urls,
            self.tags,
            self.distinct.len()
        )?;
        let names: Vec<&str> = self.distinct.iter().map(String::as_str).collect();
        writeln!(out, "Tags were: {}", names.join(" "))
    }
}

/// Tag path for a bookmark tag, under `namespace` when given
fn tag_path(db: &FluidDb, namespace: Option<&str>, tag: &str) -> String {
    let tag = tag.trim_start_matches('/');
    let relative = match namespace {
        Some(ns) => format!("{}/{tag}", ns.trim_matches('/')),
        None => tag.to_string(),
    };
    db.paths().absolute(&relative)
}

/// Create an object per shared bookmark (about = URL) and tag it with each of its tags
///
/// Stops at the first store error.
pub fn import(db: &FluidDb, posts: &[Post], namespace: Option<&str>) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    for post in posts {
        if !post.shared {
            summary.private += 1;
            continue;
        }
        if post.href.is_empty() {
            warn!("Skipping bookmark {:?} with a blank URL", post.label());
            continue;
        }
        let object = db
            .create_object(Some(&post.href))
            .with_context(|| format!("Failed to create object for {}", post.href))?;
        summary.urls += 1;
        for tag in post.tags.iter().filter(|tag| !tag.is_empty()) {
            let path = tag_path(db, namespace, tag);
            db.tag_object_by_id(&object.id, &path, None, true)
                .with_context(|| format!("Failed to tag {} with {path}", post.href))?;
            debug!(url = %post.href, %path, "tagged");
            summary.tags += 1;
            summary.distinct.insert(tag.clone());
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FluidClient;
    use crate::config::{Config, Credentials};
    use crate::paths::{PathStyle, TagPaths};

    #[test]
    fn tags_land_under_the_user() {
        let client =
            FluidClient::new(&Config::default(), &Credentials::new("njr", "pw")).expect("client");
        let db = FluidDb::new(client, TagPaths::new("njr", PathStyle::Unix));
        assert_eq!(tag_path(&db, None, "news"), "/njr/news");
        assert_eq!(tag_path(&db, None, "/news"), "/njr/news");
        assert_eq!(tag_path(&db, Some("delicious/"), "news"), "/njr/delicious/news");
    }

    #[test]
    fn report_lists_distinct_tags() {
        let summary = ImportSummary {
            urls: 2,
            tags: 3,
            distinct: ["home", "news"].iter().map(|s| (*s).to_string()).collect(),
            private: 1,
        };
        let mut out = Vec::new();
        summary.report(&mut out).expect("report");
        assert_eq!(
            String::from_utf8_lossy(&out),
            "2 URLs tagged in FluidDB, with a total of 3 tags (2 distinct)\nTags were: home news\n"
        );
    }
}
