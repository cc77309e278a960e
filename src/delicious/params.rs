//! Settings for the bookmark homepage

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Where pages, cache and credentials live, and how the page looks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Params {
    /// Homepage to write
    pub homepage: PathBuf,
    /// Phone page to write
    pub phone_page: PathBuf,
    /// Cached copy of the bookmark feed
    pub cache: PathBuf,
    /// File with the bookmark service username and password on two lines
    pub credentials: PathBuf,

    /// URL that regenerates the page, if any
    pub refresh_url: Option<String>,
    /// Label of the refresh link
    pub refresh_label: String,
    /// Put the refresh link under the table instead of among the entries
    pub refresh_at_bottom: bool,

    /// Active link colour
    pub alink: String,
    /// Visited link colour
    pub vlink: String,
    /// Link colour
    pub link: String,
    /// Background colour
    pub bgcolor: String,
    /// Text colour
    pub text: String,
    /// Font face list; empty for the browser default
    pub font: String,

    /// Columns on the homepage
    pub cols: usize,
    /// Columns on the phone page
    pub phone_cols: usize,
    /// Bookmarks carrying any of these tags appear on the page
    pub tags: Vec<String>,
    /// Match tags and sort entries case-sensitively
    pub case_sensitive: bool,

    /// Page title
    pub title: String,
    /// Colour of the heading
    pub title_color: String,

    /// Keep a datestamped copy of every page and cache written
    pub add_datestamp_copy: bool,
    /// Report progress
    pub verbose: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            homepage: PathBuf::from("index.html"),
            phone_page: PathBuf::from("phone.html"),
            cache: PathBuf::from("delicious.xml"),
            credentials: PathBuf::from("credentials.txt"),
            refresh_url: None,
            refresh_label: "Refresh".to_string(),
            refresh_at_bottom: false,
            alink: "#800000".to_string(),
            vlink: "#800000".to_string(),
            link: "#C00000".to_string(),
            bgcolor: "#FFFFFF".to_string(),
            text: "#000000".to_string(),
            font: "Helvetica,Verdana,Arial".to_string(),
            cols: 4,
            phone_cols: 2,
            tags: vec!["home".to_string()],
            case_sensitive: false,
            title: "Home".to_string(),
            title_color: "white".to_string(),
            add_datestamp_copy: true,
            verbose: true,
        }
    }
}

impl Params {
    /// Load settings from a TOML file; missing keys take their defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let params: Self = toml::from_str(&contents)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        params.validate()?;
        Ok(params)
    }

    /// Load from `path`, or the default location when it exists, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Reject settings the page cannot be built from
    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 || self.phone_cols == 0 {
            bail!("cols and phone-cols must be at least 1");
        }
        Ok(())
    }

    /// Username and password from the credentials file
    pub fn read_credentials(&self) -> Result<(String, String)> {
        let path = &self.credentials;
        let contents = fs::read_to_string(path)
            .with_context(|| format!("No credentials file ({}) found", path.display()))?;
        let mut lines = contents.lines().map(str::trim);
        match (lines.next(), lines.next()) {
            (Some(username), Some(password)) if !username.is_empty() => {
                Ok((username.to_string(), password.to_string()))
            }
            _ => bail!(
                "Need file {} with the bookmark username on the first line and password on the second",
                path.display()
            ),
        }
    }

    /// Columns for the page being built
    #[must_use]
    pub const fn columns(&self, phone: bool) -> usize {
        if phone {
            self.phone_cols
        } else {
            self.cols
        }
    }
}

/// `$XDG_CONFIG_HOME/fdb/delicious.toml`, or under `~/.config`
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .map(|dir| dir.join("fdb").join("delicious.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("delicious.toml");
        fs::write(&path, "cols = 3\ntags = [\"home\", \"work\"]\nrefresh-url = \"http://x/cgi\"\n")
            .expect("write");
        let params = Params::load_from(&path).expect("load");
        assert_eq!(params.cols, 3);
        assert_eq!(params.tags, vec!["home", "work"]);
        assert_eq!(params.refresh_url.as_deref(), Some("http://x/cgi"));
        assert_eq!(params.phone_cols, 2);
        assert_eq!(params.refresh_label, "Refresh");
    }

    #[test]
    fn zero_columns_rejected() {
        let params = Params {
            cols: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn credentials_need_two_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials.txt");
        let params = Params {
            credentials: path.clone(),
            ..Default::default()
        };
        assert!(params.read_credentials().is_err());

        fs::write(&path, "njr\n").expect("write");
        assert!(params.read_credentials().is_err());

        fs::write(&path, " njr \n secret \n").expect("write");
        assert_eq!(
            params.read_credentials().expect("read"),
            ("njr".to_string(), "secret".to_string())
        );
    }
}
