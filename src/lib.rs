#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

//! # fdb
//!
//! Command-line client and helper library for Fluidinfo, a tag-based object
//! store reached over a REST API.
//!
//! ## Architecture
//!
//! - **[`error`]** - Error types and error handling
//! - **[`config`]** - Settings file and Fluidinfo credentials
//! - **[`auth`]** - Basic-auth header construction
//! - **[`client`]** - HTTP request wrapper and status codes
//! - **[`paths`]** - Tag-path conventions (unix and Fluidinfo style)
//! - **[`value`]** - Tag values and command-line value coercion
//! - **[`fluiddb`]** - Object, tag, namespace and values operations
//! - **[`perms`]** - Permissions, summaries and presets
//! - **[`cli`]** - Command-line arguments
//! - **[`commands`]** - Command implementations
//! - **[`output`]** - Listing and grid formatting
//! - **[`logging`]** - Tracing subscriber setup
//! - **[`delicious`]** - Bookmark homepage generator and importer
//!
//! ## Quick Start
//!
//! ```bash
//! fdb tag -a 'DADGAD' njr/tuning njr/rating=10
//! fdb show -a 'DADGAD' njr/tuning njr/rating
//! fdb ls -l njr
//! ```

pub mod auth;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod delicious;
pub mod error;
pub mod fluiddb;
pub mod logging;
pub mod output;
pub mod paths;
pub mod perms;
pub mod value;

/// Error type alias for convenience
pub use error::{CliError, Result};

/// Configuration type alias for convenience
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = "fdb";
