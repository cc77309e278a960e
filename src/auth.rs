//! Basic-auth header construction
//!
//! Shared by the Fluidinfo client and the bookmark feed fetcher; both services
//! authenticate with plain HTTP basic auth.

use base64::{engine::general_purpose::STANDARD as B64, Engine};

/// Build the value of an `Authorization` header for `username:password`
///
/// The payload is standard base64 with padding and no line breaks.
#[must_use]
pub fn basic_auth_header(username: &str, password: &str) -> String {
    format!("Basic {}", B64.encode(format!("{username}:{password}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_credentials() {
        assert_eq!(
            basic_auth_header("njr", "secret"),
            "Basic bmpyOnNlY3JldA=="
        );
    }

    #[test]
    fn long_credentials_stay_on_one_line() {
        let header = basic_auth_header(&"u".repeat(80), &"p".repeat(80));
        assert!(!header.contains('\n'));
    }

    #[test]
    fn unicode_is_utf8_encoded() {
        // "é" is two bytes in UTF-8
        assert_eq!(basic_auth_header("é", ""), "Basic w6k6");
    }
}
