//! HTTP status codes the Fluidinfo API uses, with human-readable names

use std::borrow::Borrow;

/// 200
pub const OK: u16 = 200;
/// 201
pub const CREATED: u16 = 201;
/// 204
pub const NO_CONTENT: u16 = 204;
/// 400
pub const BAD_REQUEST: u16 = 400;
/// 401
pub const UNAUTHORIZED: u16 = 401;
/// 404
pub const NOT_FOUND: u16 = 404;
/// 412
pub const PRECONDITION_FAILED: u16 = 412;
/// 500
pub const INTERNAL_SERVER_ERROR: u16 = 500;

const NAMES: &[(u16, &str)] = &[
    (OK, "OK"),
    (CREATED, "CREATED"),
    (NO_CONTENT, "NO CONTENT"),
    (BAD_REQUEST, "BAD REQUEST"),
    (UNAUTHORIZED, "UNAUTHORIZED"),
    (NOT_FOUND, "NOT FOUND"),
    (PRECONDITION_FAILED, "PRECONDITION FAILED"),
    (INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR"),
];

/// Describe a status code, e.g. `404 (NOT FOUND)`; unknown codes are bare numbers
pub fn describe(code: impl Borrow<u16>) -> String {
    let code = *code.borrow();
    NAMES
        .iter()
        .find(|(known, _)| *known == code)
        .map_or_else(|| code.to_string(), |(_, name)| format!("{code} ({name})"))
}

/// Whether the status is in the 2xx range
#[must_use]
pub const fn is_success(code: u16) -> bool {
    code >= 200 && code < 300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_known_codes() {
        assert_eq!(describe(NOT_FOUND), "404 (NOT FOUND)");
        assert_eq!(describe(&NO_CONTENT), "204 (NO CONTENT)");
    }

    #[test]
    fn unknown_codes_are_bare() {
        assert_eq!(describe(418u16), "418");
    }
}
