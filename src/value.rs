//! Tag values and the heuristic that turns command-line text into them
//!
//! Fluidinfo stores "primitive" values (null, booleans, integers, floats,
//! strings and sets of strings) as JSON under a dedicated content type, and
//! anything else as opaque bytes with its own MIME type.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Content type Fluidinfo uses for primitive (JSON) tag values
pub const PRIMITIVE_CONTENT_TYPE: &str = "application/vnd.fluiddb.value+json";

// Patterns are literals; compilation cannot fail.
#[allow(clippy::unwrap_used)]
static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+\-]?[0-9]+$").unwrap());

#[allow(clippy::unwrap_used)]
static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+\-]?[0-9]+[.,]?[0-9]*$").unwrap());

#[allow(clippy::unwrap_used)]
static LEADING_POINT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+\-]?[.,][0-9]+$").unwrap());

/// A value attached to a tag on an object
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    /// Tag present with no value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating-point number
    Float(f64),
    /// String
    Str(String),
    /// Set of strings
    Set(Vec<String>),
    /// Non-primitive value stored with its own MIME type
    Opaque {
        /// MIME type the value was stored with
        content_type: String,
        /// Raw bytes
        data: Vec<u8>,
    },
}

impl TagValue {
    /// Interpret a bare command-line string as a typed value
    ///
    /// - `true`/`t` and `false`/`f` (any case) are booleans
    /// - optionally signed digit strings are integers (`011` is 11)
    /// - optionally signed decimals are floats (`3.14`, `-.5`); text the
    ///   float parser rejects, such as `1,300`, stays a string
    /// - text wrapped in matching `"` or `'` has the quotes stripped
    /// - everything else is a string, unchanged
    #[must_use]
    pub fn coerce(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower == "true" || lower == "t" {
            return Self::Bool(true);
        }
        if lower == "false" || lower == "f" {
            return Self::Bool(false);
        }
        if INTEGER_RE.is_match(text) {
            if let Ok(n) = text.parse::<i64>() {
                return Self::Int(n);
            }
        }
        if DECIMAL_RE.is_match(text) || LEADING_POINT_RE.is_match(text) {
            return text
                .parse::<f64>()
                .map_or_else(|_| Self::Str(text.to_string()), Self::Float);
        }
        if let Some(inner) = strip_matching_quotes(text) {
            return Self::Str(inner.to_string());
        }
        Self::Str(text.to_string())
    }

    /// Decode a primitive value from its JSON wire form
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Value::String(s) => Self::Str(s.clone()),
            Value::Array(items) => Self::Set(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            Value::Object(_) => Self::Str(value.to_string()),
        }
    }

    /// Encode as JSON for the primitive content type
    ///
    /// Opaque values have no JSON form and encode as `null`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null | Self::Opaque { .. } => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(n) => Value::from(*n),
            Self::Float(x) => Value::from(*x),
            Self::Str(s) => Value::String(s.clone()),
            Self::Set(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
        }
    }

    /// Whether the value travels as JSON under [`PRIMITIVE_CONTENT_TYPE`]
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        !matches!(self, Self::Opaque { .. })
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Set(items) => {
                let quoted: Vec<String> = items.iter().map(|s| format!("\"{s}\"")).collect();
                write!(f, "[{}]", quoted.join(", "))
            }
            Self::Opaque { content_type, data } => {
                write!(f, "<{} bytes of {content_type}>", data.len())
            }
        }
    }
}

fn strip_matching_quotes(text: &str) -> Option<&str> {
    let mut chars = text.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    if first == last && (first == '"' || first == '\'') {
        Some(&text[first.len_utf8()..text.len() - last.len_utf8()])
    } else {
        None
    }
}

/// A tag name with an optional value, as written on the command line
#[derive(Debug, Clone, PartialEq)]
pub struct TagAssignment {
    /// Tag path as given
    pub tag: String,
    /// Value, if `=value` was given
    pub value: Option<TagValue>,
}

/// Split `tag=value` on the first `=`, coercing the value
///
/// A bare `tag` has no value.
#[must_use]
pub fn parse_assignment(arg: &str) -> TagAssignment {
    match arg.split_once('=') {
        Some((tag, value)) => TagAssignment {
            tag: tag.to_string(),
            value: Some(TagValue::coerce(value)),
        },
        None => TagAssignment {
            tag: arg.to_string(),
            value: None,
        },
    }
}

/// Render a tag and its value for display: `tag`, `tag = "text"` or `tag = 10`
#[must_use]
pub fn formatted_tag_value(tag: &str, value: Option<&TagValue>) -> String {
    match value {
        None | Some(TagValue::Null) => tag.to_string(),
        Some(value) => format!("{tag} = {value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> TagValue {
        TagValue::Str(text.to_string())
    }

    #[test]
    fn booleans_in_any_case() {
        for text in ["TRUE", "tRuE", "t", "T"] {
            assert_eq!(TagValue::coerce(text), TagValue::Bool(true), "{text}");
        }
        for text in ["f", "false", "FALSE"] {
            assert_eq!(TagValue::coerce(text), TagValue::Bool(false), "{text}");
        }
    }

    #[test]
    fn integers() {
        let cases = [
            ("1", 1),
            ("+1", 1),
            ("-1", -1),
            ("0", 0),
            ("+0", 0),
            ("-0", 0),
            ("123456789", 123_456_789),
            ("-987654321", -987_654_321),
            ("011", 11),
            ("-011", -11),
        ];
        for (text, expected) in cases {
            assert_eq!(TagValue::coerce(text), TagValue::Int(expected), "{text}");
        }
    }

    #[test]
    fn floats() {
        let cases = [
            ("3.14159", 3.14159),
            ("-3.14159", -3.14159),
            (".14159", 0.14159),
            ("-.14159", -0.14159),
            ("2.", 2.0),
        ];
        for (text, expected) in cases {
            assert_eq!(TagValue::coerce(text), TagValue::Float(expected), "{text}");
        }
    }

    #[test]
    fn huge_integers_become_floats() {
        assert_eq!(
            TagValue::coerce("99999999999999999999"),
            TagValue::Float(1e20)
        );
    }

    #[test]
    fn strings_and_ambiguous_input() {
        assert_eq!(TagValue::coerce("\"1\""), s("1"));
        assert_eq!(TagValue::coerce("'DADGAD'"), s("DADGAD"));
        assert_eq!(TagValue::coerce("DADGAD"), s("DADGAD"));
        assert_eq!(TagValue::coerce(""), s(""));
        assert_eq!(TagValue::coerce("1,300"), s("1,300"));
        for text in [".", "+.", "-.", "+", "-", "\"", "'x\""] {
            assert_eq!(TagValue::coerce(text), s(text), "{text}");
        }
    }

    #[test]
    fn assignments_split_on_first_equals() {
        let pair = parse_assignment("rating=10");
        assert_eq!(pair.tag, "rating");
        assert_eq!(pair.value, Some(TagValue::Int(10)));

        let pair = parse_assignment("query=a=b");
        assert_eq!(pair.tag, "query");
        assert_eq!(pair.value, Some(s("a=b")));

        assert_eq!(parse_assignment("tuning").value, None);
    }

    #[test]
    fn json_wire_form() {
        let value = serde_json::json!(["a", "b"]);
        assert_eq!(
            TagValue::from_json(&value),
            TagValue::Set(vec!["a".into(), "b".into()])
        );
        assert_eq!(TagValue::from_json(&serde_json::json!(5)), TagValue::Int(5));
        assert_eq!(TagValue::Float(2.5).to_json(), serde_json::json!(2.5));
        assert_eq!(TagValue::Null.to_json(), Value::Null);
    }

    #[test]
    fn display_forms() {
        assert_eq!(formatted_tag_value("njr/rating", Some(&TagValue::Int(10))), "njr/rating = 10");
        assert_eq!(formatted_tag_value("njr/title", Some(&s("Hello"))), "njr/title = \"Hello\"");
        assert_eq!(formatted_tag_value("njr/tuning", None), "njr/tuning");
        assert_eq!(formatted_tag_value("njr/pi", Some(&TagValue::Float(3.0))), "njr/pi = 3.0");
    }
}
