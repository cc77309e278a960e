//! Default configuration values

/// Main Fluidinfo instance
pub const FLUIDDB_HOST: &str = "https://fluiddb.fluidinfo.com";

/// Sandbox instance, reset periodically
pub const SANDBOX_HOST: &str = "https://sandbox.fluidinfo.com";

/// Default API server URL
pub fn default_host() -> String {
    FLUIDDB_HOST.to_string()
}

/// Default request timeout in seconds
pub const fn default_timeout() -> u64 {
    300 // 5 minutes
}

/// Unix-style credentials file in the home directory
pub const UNIX_CREDENTIALS_FILE: &str = ".fluidDBcredentials";

/// Windows credentials file in the application-data directory
pub const WINDOWS_CREDENTIALS_FILE: &str = "fluidDBcredentials.ini";

/// Environment variable overriding the username
pub const USERNAME_ENV: &str = "FDB_USERNAME";

/// Environment variable overriding the password
pub const PASSWORD_ENV: &str = "FDB_PASSWORD";
