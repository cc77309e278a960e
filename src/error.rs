//! Error types and handling for fdb
//!
//! Provides structured error types for all CLI and library operations. API
//! failures keep the raw HTTP status so callers can inspect it.

use std::path::PathBuf;
use thiserror::Error;

use crate::client::status;

/// Result type alias for fdb operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Comprehensive error types for fdb operations
#[derive(Error, Debug)]
pub enum CliError {
    // ═══════════════════════════════════════════════════════════════
    // Network & HTTP Errors
    // ═══════════════════════════════════════════════════════════════
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to connect to the Fluidinfo server
    #[error("Failed to connect to {host}: {reason}")]
    ConnectionError { host: String, reason: String },

    /// The server answered with a status the operation did not expect
    #[error("Fluidinfo API error: {} - {message}", status::describe(.status))]
    ApiError { status: u16, message: String },

    /// Invalid API response format
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// HTTP method not supported by the raw request commands
    #[error("Only supported HTTP methods are GET, PUT, POST, DELETE and HEAD, not {0}")]
    UnsupportedMethod(String),

    // ═══════════════════════════════════════════════════════════════
    // Credentials
    // ═══════════════════════════════════════════════════════════════
    /// Credentials file not found
    #[error("Couldn't find or read credentials from {path}")]
    CredentialsNotFound { path: PathBuf },

    /// Credentials file present but unreadable or malformed
    #[error("Failed to read credentials from {path}: {reason}")]
    CredentialsRead { path: PathBuf, reason: String },

    // ═══════════════════════════════════════════════════════════════
    // Tags & Namespaces
    // ═══════════════════════════════════════════════════════════════
    /// Tag path could not be interpreted
    #[error("{0} is not a valid tag path")]
    TagPath(String),

    /// Attempt to create a namespace with no user component
    #[error("Attempt to create user namespace {0}")]
    EmptyNamespace(String),

    /// Top-level user namespace missing or not writable
    #[error("User {user} not found or namespace /{user} not writable")]
    CannotWriteUser { user: String },

    /// Namespace creation failed while creating a tag
    #[error("Could not create the required namespace {0}")]
    NamespaceCreation(String),

    /// Object lookup failed
    #[error("Couldn't find object {0}")]
    ObjectNotFound(String),

    /// A query could not be executed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    // ═══════════════════════════════════════════════════════════════
    // Configuration & File Errors
    // ═══════════════════════════════════════════════════════════════
    /// Failed to read configuration file
    #[error("Failed to read config from {path}: {reason}")]
    ConfigRead { path: PathBuf, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to write configuration file
    #[error("Failed to write config to {path}: {reason}")]
    ConfigWrite { path: PathBuf, reason: String },

    // ═══════════════════════════════════════════════════════════════
    // Serialization & Encoding Errors
    // ═══════════════════════════════════════════════════════════════
    /// Failed to serialize data
    #[error("Serialization failed: {0}")]
    SerializationError(String),

    /// Failed to deserialize data
    #[error("Deserialization failed: {0}")]
    DeserializationError(String),

    // ═══════════════════════════════════════════════════════════════
    // I/O Errors
    // ═══════════════════════════════════════════════════════════════
    /// File operation failed
    #[error("File operation failed: {path}: {reason}")]
    FileError { path: PathBuf, reason: String },

    /// Permission denied
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Writing command output failed
    #[error("Output error: {0}")]
    Output(String),

    // ═══════════════════════════════════════════════════════════════
    // Validation & Input Errors
    // ═══════════════════════════════════════════════════════════════
    /// Invalid input argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing required argument
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    // ═══════════════════════════════════════════════════════════════
    // Other Errors
    // ═══════════════════════════════════════════════════════════════
    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl CliError {
    /// Build an API error for an unexpected status
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// The raw HTTP status, when the error came from the server
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::CredentialsNotFound { .. } | Self::CredentialsRead { .. } => 1,
            Self::InvalidArgument(_)
            | Self::MissingArgument(_)
            | Self::UnsupportedMethod(_)
            | Self::TagPath(_) => 2,
            Self::ConnectionError { .. } | Self::Http(_) => 4,
            Self::ApiError { .. } | Self::InvalidResponse(_) | Self::QueryFailed(_) => 5,
            Self::PermissionDenied { .. } => 13,
            Self::Timeout(_) => 124,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileError {
                path: PathBuf::from("<unknown>"),
                reason: "Not found".to_string(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: PathBuf::from("<unknown>"),
            },
            std::io::ErrorKind::BrokenPipe => Self::Output(err.to_string()),
            _ => Self::FileError {
                path: PathBuf::from("<unknown>"),
                reason: err.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() {
            Self::DeserializationError(format!("JSON syntax error: {err}"))
        } else {
            Self::DeserializationError(err.to_string())
        }
    }
}

impl From<reqwest::Error> for CliError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ConnectionError {
                host: err
                    .url()
                    .and_then(|url| url.host_str().map(str::to_string))
                    .unwrap_or_default(),
                reason: err.to_string(),
            }
        } else {
            Self::Http(err.to_string())
        }
    }
}
