//! Fluidinfo credentials
//!
//! Credentials live in a small text file in the home directory: the username
//! on the first line and the password on the second. Further lines may carry
//! settings of the form `key value`; the only one recognised is
//! `unix-style-paths true|false`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::auth::basic_auth_header;
use crate::config::defaults::{PASSWORD_ENV, USERNAME_ENV};
#[cfg(not(windows))]
use crate::config::defaults::UNIX_CREDENTIALS_FILE;
#[cfg(windows)]
use crate::config::defaults::WINDOWS_CREDENTIALS_FILE;
use crate::error::{CliError, Result};

/// Username and password for the Fluidinfo API
#[derive(Clone, Default)]
pub struct Credentials {
    /// Fluidinfo username
    pub username: String,

    /// Password
    pub password: String,

    /// Path convention requested by the credentials file, if any
    pub unix_style_paths: Option<bool>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("unix_style_paths", &self.unix_style_paths)
            .finish()
    }
}

impl Credentials {
    /// Credentials from explicit values
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            unix_style_paths: None,
        }
    }

    /// Load credentials for `user`, or the default credentials
    ///
    /// Tries in order:
    /// 1. `FDB_USERNAME` and `FDB_PASSWORD` (both must be set, default user only)
    /// 2. the per-user file (`~/.fluidDBcredentials.<user>`) when `user` is given
    /// 3. the default file (`~/.fluidDBcredentials`)
    pub fn load(user: Option<&str>) -> Result<Self> {
        if user.is_none() {
            if let (Ok(username), Ok(password)) =
                (std::env::var(USERNAME_ENV), std::env::var(PASSWORD_ENV))
            {
                if !username.is_empty() {
                    debug!(%username, "using credentials from environment");
                    return Ok(Self::new(username, password));
                }
            }
        }
        Self::load_from(&credentials_file(user)?)
    }

    /// Load credentials from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::CredentialsNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path).map_err(|e| CliError::CredentialsRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "read credentials file");
        Self::parse(&contents).ok_or_else(|| CliError::CredentialsRead {
            path: path.to_path_buf(),
            reason: "expected the username on the first line and the password on the second"
                .to_string(),
        })
    }

    /// Parse credentials file contents; `None` when fewer than two lines
    #[must_use]
    pub fn parse(contents: &str) -> Option<Self> {
        let mut lines = contents.lines();
        let username = lines.next()?.trim().to_string();
        let password = lines.next()?.trim().to_string();
        let mut credentials = Self::new(username, password);
        for line in lines {
            let mut words = line.split_whitespace();
            if let (Some("unix-style-paths"), Some(value)) = (words.next(), words.next()) {
                credentials.unix_style_paths = match value.to_lowercase().as_str() {
                    "true" | "t" | "yes" | "1" => Some(true),
                    "false" | "f" | "no" | "0" => Some(false),
                    _ => None,
                };
            }
        }
        Some(credentials)
    }

    /// Value of the `Authorization` header for these credentials
    #[must_use]
    pub fn auth_header(&self) -> String {
        basic_auth_header(&self.username, &self.password)
    }
}

/// Path of the credentials file for `user`, or the default file
pub fn credentials_file(user: Option<&str>) -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let dir = dirs::config_dir().ok_or_else(|| {
            CliError::Internal("Could not determine application data directory".to_string())
        })?;
        Ok(dir.join(user.map_or_else(
            || WINDOWS_CREDENTIALS_FILE.to_string(),
            |user| format!("fluidDBcredentials-{user}.ini"),
        )))
    }
    #[cfg(not(windows))]
    {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Internal("Could not determine home directory".to_string()))?;
        Ok(home.join(user.map_or_else(
            || UNIX_CREDENTIALS_FILE.to_string(),
            |user| format!("{UNIX_CREDENTIALS_FILE}.{user}"),
        )))
    }
}

/// Make `source` the default credentials by copying it over `dest`
///
/// Returns the credentials now in effect.
pub fn switch_credentials(source: &Path, dest: &Path) -> Result<Credentials> {
    let credentials = Credentials::load_from(source)?;
    fs::copy(source, dest).map_err(|e| CliError::FileError {
        path: dest.to_path_buf(),
        reason: e.to_string(),
    })?;
    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dest, Permissions::from_mode(0o600)).map_err(|e| {
            CliError::FileError {
                path: dest.to_path_buf(),
                reason: format!("Failed to set permissions: {e}"),
            }
        })?;
    }
    Ok(credentials)
}
