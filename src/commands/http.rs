//! Raw HTTP commands: get, put, post, delete and head

use std::io::Write;

use reqwest::Method;
use serde_json::{Map, Value};

use crate::error::{CliError, Result};
use crate::fluiddb::FluidDb;
use crate::value::{parse_assignment, TagAssignment, TagValue};

/// Methods the raw commands accept
pub const HTTP_METHODS: [&str; 5] = ["GET", "PUT", "POST", "DELETE", "HEAD"];

/// Parse a method name, case-insensitively
pub fn parse_method(name: &str) -> Result<Method> {
    let upper = name.to_uppercase();
    if HTTP_METHODS.contains(&upper.as_str()) {
        Method::from_bytes(upper.as_bytes()).map_err(|_| CliError::UnsupportedMethod(upper))
    } else {
        Err(CliError::UnsupportedMethod(upper))
    }
}

/// Send one request built from command-line arguments and print the result
///
/// `key=value` pairs become query parameters; for PUT the first pair is
/// sent as the JSON body `{"key": value}` instead.
pub fn request(
    db: &FluidDb,
    method: Method,
    uri: &str,
    params: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let path = if uri.starts_with('/') {
        uri.to_string()
    } else {
        format!("/{uri}")
    };
    let mut pairs: Vec<TagAssignment> = params.iter().map(|p| parse_assignment(p)).collect();
    let body = if method == Method::PUT && !pairs.is_empty() {
        let first = pairs.remove(0);
        let mut body = Map::new();
        body.insert(first.tag, first.value.as_ref().map_or(Value::Null, TagValue::to_json));
        Some(Value::Object(body))
    } else {
        None
    };
    let query: Vec<(String, String)> = pairs
        .into_iter()
        .map(|pair| {
            let value = query_value(pair.value.as_ref());
            (pair.tag, value)
        })
        .collect();

    let response = db.client().call(method, &path, body.as_ref(), &query)?;
    writeln!(out, "Status: {}", response.status)?;
    writeln!(out, "Result: {}", response.body)?;
    Ok(())
}

/// Query-string form of a coerced value: strings bare, others as JSON
fn query_value(value: Option<&TagValue>) -> String {
    match value {
        None => String::new(),
        Some(TagValue::Str(text)) => text.clone(),
        Some(other) => other.to_json().to_string(),
    }
}
