//! Bookmark homepage generator and importer
//!
//! Builds a static homepage (and a phone-sized variant) from the bookmarks
//! carrying a chosen tag, and uploads public bookmarks to Fluidinfo.
//!
//! ```text
//! feed (HTTP or cache) → posts → home entries → page → index.html (+ backup)
//!                           ↓
//!                        import → objects tagged in Fluidinfo
//! ```

pub mod feed;
pub mod files;
pub mod import;
pub mod page;
pub mod params;

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

pub use feed::Post;
pub use import::{import, ImportSummary};
pub use params::Params;

/// Timeout for the feed download
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Read the cached feed
pub fn read_cache(params: &Params) -> Result<String> {
    read_feed(&params.cache)
}

fn read_feed(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read cached bookmarks from {}", path.display()))
}

/// Download the feed and store it as the new cache
pub fn refresh_cache(params: &Params) -> Result<String> {
    let (username, password) = params.read_credentials()?;
    info!("Fetching bookmarks for {username}");
    let xml = feed::fetch(&username, &password, FETCH_TIMEOUT)?;
    files::write_with_datestamp(&xml, &params.cache, params.add_datestamp_copy)?;
    Ok(xml)
}

/// Feed text from the cache when `use_cache` is set, otherwise from the service
pub fn load_feed(params: &Params, use_cache: bool) -> Result<String> {
    if use_cache {
        read_cache(params)
    } else {
        refresh_cache(params)
    }
}

/// Page text for the posts in `xml`
#[must_use]
pub fn render(xml: &str, params: &Params, phone: bool) -> String {
    let posts = feed::parse_posts(xml);
    let home = feed::home_entries(&posts, params);
    info!("{} of {} bookmarks selected", home.len(), posts.len());
    page::build_page(home, params, phone)
}

/// Rebuild the homepage (or phone page) and write it with backups
pub fn build_homepage(params: &Params, use_cache: bool, phone: bool) -> Result<()> {
    let xml = load_feed(params, use_cache)?;
    let html = render(&xml, params, phone);
    let target = if phone {
        &params.phone_page
    } else {
        &params.homepage
    };
    files::write_with_datestamp(&html, target, params.add_datestamp_copy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<posts user="njr">
<post href="http://a.example/" description="Alpha" tag="home"/>
<post href="http://b.example/" description="Beta" tag="work"/>
</posts>"#;

    #[test]
    fn builds_homepage_from_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        let params = Params {
            cache: dir.path().join("delicious.xml"),
            homepage: dir.path().join("index.html"),
            phone_page: dir.path().join("phone.html"),
            add_datestamp_copy: false,
            ..Default::default()
        };
        fs::write(&params.cache, FEED).expect("write cache");

        build_homepage(&params, true, false).expect("homepage");
        let html = fs::read_to_string(&params.homepage).expect("read");
        assert!(html.contains("<a href=\"http://a.example/\">Alpha</a>"));
        assert!(!html.contains("Beta"));

        build_homepage(&params, true, true).expect("phone page");
        assert!(params.phone_page.exists());
    }

    #[test]
    fn missing_cache_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let params = Params {
            cache: dir.path().join("absent.xml"),
            ..Default::default()
        };
        let err = read_cache(&params).expect_err("no cache");
        assert!(err.to_string().contains("absent.xml"));
    }
}
