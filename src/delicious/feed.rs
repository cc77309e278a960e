//! Bookmark feed: fetching, parsing and selecting homepage entries

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::params::Params;
use crate::auth::basic_auth_header;

/// Every post in the account
pub const API_URL: &str = "https://api.del.icio.us/v1/posts/all";

#[allow(clippy::unwrap_used)]
static POST: Lazy<Selector> = Lazy::new(|| Selector::parse("post").unwrap());

/// One bookmark from the feed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Post {
    /// Bookmarked URL
    pub href: String,
    /// Short title
    pub description: String,
    /// Longer note; preferred as the homepage label when present
    pub extended: String,
    /// Tags in feed order
    pub tags: Vec<String>,
    /// False for posts marked `shared="no"`
    pub shared: bool,
}

impl Post {
    /// Label used on the homepage
    #[must_use]
    pub fn label(&self) -> &str {
        if self.extended.is_empty() {
            &self.description
        } else {
            &self.extended
        }
    }
}

/// Download the whole feed with basic auth
pub fn fetch(username: &str, password: &str, timeout: Duration) -> Result<String> {
    fetch_from(API_URL, username, password, timeout)
}

/// Download the feed from `url`
pub fn fetch_from(url: &str, username: &str, password: &str, timeout: Duration) -> Result<String> {
    debug!(%url, "fetching bookmarks");
    let http = Client::builder()
        .timeout(timeout)
        .user_agent(format!("fdb-delicious/{}", crate::VERSION))
        .build()
        .context("Failed to build HTTP client")?;
    let response = http
        .get(url)
        .header(AUTHORIZATION, basic_auth_header(username, password))
        .send()
        .with_context(|| format!("Failed to reach {url}"))?
        .error_for_status()
        .with_context(|| format!("Bookmark service refused {url}"))?;
    response.text().context("Failed to read bookmark feed")
}

/// Every `post` element in a feed document
#[must_use]
pub fn parse_posts(xml: &str) -> Vec<Post> {
    let document = Html::parse_document(xml);
    document
        .select(&POST)
        .map(|element| {
            let attr = |name: &str| element.value().attr(name).unwrap_or_default().to_string();
            Post {
                href: attr("href"),
                description: attr("description"),
                extended: attr("extended"),
                tags: attr("tag").split_whitespace().map(str::to_string).collect(),
                shared: element.value().attr("shared") != Some("no"),
            }
        })
        .collect()
}

/// Label to URL map of the posts carrying a configured tag
///
/// Duplicate labels are warned about and the later post wins. The refresh
/// link joins the entries unless it is placed under the table.
#[must_use]
pub fn home_entries(posts: &[Post], params: &Params) -> BTreeMap<String, String> {
    let fold = |tag: &str| {
        if params.case_sensitive {
            tag.to_string()
        } else {
            tag.to_lowercase()
        }
    };
    let wanted: Vec<String> = params.tags.iter().map(|t| fold(t)).collect();

    let mut home = BTreeMap::new();
    for post in posts {
        if !post.tags.iter().any(|tag| wanted.contains(&fold(tag))) {
            continue;
        }
        let key = post.label().to_string();
        if home.contains_key(&key) {
            warn!("Duplicate key: {key}");
        }
        home.insert(key, post.href.clone());
    }

    if let Some(url) = &params.refresh_url {
        if !params.refresh_at_bottom {
            home.insert(params.refresh_label.clone(), url.clone());
        }
    }
    home
}
