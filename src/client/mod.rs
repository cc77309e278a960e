//! HTTP client for the Fluidinfo REST API
//!
//! A thin wrapper over a blocking `reqwest` client: it joins the host and a
//! percent-encoded path, adds the basic-auth header, encodes JSON bodies and
//! decodes JSON responses. Every call is a single round trip and the raw
//! status is handed back to the caller, whatever it is.

use std::fmt;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::config::{Config, Credentials};
use crate::error::{CliError, Result};
use crate::value::{TagValue, PRIMITIVE_CONTENT_TYPE};

pub mod status;

/// Query-string parameters; keys may repeat
pub type Query = [(String, String)];

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No body
    Empty,
    /// `application/json` body
    Json(Value),
    /// Any other body, decoded as (lossy) UTF-8
    Text(String),
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Status and body of one API call
#[derive(Debug, Clone)]
pub struct Response {
    /// Raw HTTP status
    pub status: u16,
    /// `Content-Type` of the response, if any
    pub content_type: Option<String>,
    /// Decoded body
    pub body: Payload,
}

impl Response {
    /// JSON body, if the response carried one
    #[must_use]
    pub const fn json(&self) -> Option<&Value> {
        match &self.body {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Turn any status other than `expected` into an [`CliError::ApiError`]
    pub fn expect_status(self, expected: u16, context: impl fmt::Display) -> Result<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(CliError::api(self.status, context.to_string()))
        }
    }

    /// String field of a JSON object body
    pub fn field(&self, name: &str) -> Result<String> {
        self.json()
            .and_then(|body| body.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CliError::InvalidResponse(format!("missing \"{name}\" in {}", self.body)))
    }
}

/// Connection to a Fluidinfo server as one user
#[derive(Debug, Clone)]
pub struct FluidClient {
    http: Client,
    base_url: String,
    auth_header: String,
}

impl FluidClient {
    /// Create a client for the host and timeout in `config`
    pub fn new(config: &Config, credentials: &Credentials) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("fdb/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CliError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            auth_header: credentials.auth_header(),
        })
    }

    /// Server URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an API path (without query string)
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, encode_path(path))
    }

    /// Issue one request and return whatever the server said
    ///
    /// A JSON `body` is sent with `Content-Type: application/json`.
    pub fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &Query,
    ) -> Result<Response> {
        let url = self.url(path);
        debug!(%method, %url, ?query, body = %body.map(serde_json::Value::to_string).unwrap_or_default(), "request");

        let mut request = self
            .http
            .request(method, &url)
            .header(AUTHORIZATION, &self.auth_header)
            .query(query);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }

        Self::read_response(request.send()?)
    }

    /// Fetch a tag value resource, decoding primitive values
    ///
    /// Returns the status and, on 200, the value.
    pub fn get_tag_value(&self, path: &str) -> Result<(u16, Option<TagValue>)> {
        let url = self.url(path);
        debug!(%url, "get tag value");
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, &self.auth_header)
            .send()?;
        let code = response.status().as_u16();
        if code != status::OK {
            log_failure(&response);
            return Ok((code, None));
        }
        let content_type = content_type_of(&response).unwrap_or_default();
        let data = response.bytes()?.to_vec();
        let value = if is_primitive(&content_type) {
            TagValue::from_json(&serde_json::from_slice(&data)?)
        } else {
            TagValue::Opaque { content_type, data }
        };
        debug!(status = code, %value, "tag value");
        Ok((code, Some(value)))
    }

    /// Store a tag value resource; returns the raw status
    pub fn set_tag_value(&self, path: &str, value: &TagValue) -> Result<u16> {
        let url = self.url(path);
        let (content_type, data) = match value {
            TagValue::Opaque { content_type, data } => (content_type.clone(), data.clone()),
            primitive => (
                PRIMITIVE_CONTENT_TYPE.to_string(),
                serde_json::to_vec(&primitive.to_json())?,
            ),
        };
        debug!(%url, %content_type, %value, "set tag value");
        let response = self
            .http
            .put(&url)
            .header(AUTHORIZATION, &self.auth_header)
            .header(CONTENT_TYPE, content_type)
            .body(data)
            .send()?;
        let code = response.status().as_u16();
        if !status::is_success(code) {
            log_failure(&response);
        }
        debug!(status = code, "set tag value done");
        Ok(code)
    }

    fn read_response(response: reqwest::blocking::Response) -> Result<Response> {
        let code = response.status().as_u16();
        if code >= 400 {
            log_failure(&response);
        }
        let content_type = content_type_of(&response);
        let bytes = response.bytes()?;
        let body = if bytes.is_empty() {
            Payload::Empty
        } else if content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/json"))
        {
            Payload::Json(serde_json::from_slice(&bytes).map_err(|e| {
                CliError::InvalidResponse(format!("undecodable JSON body: {e}"))
            })?)
        } else {
            Payload::Text(String::from_utf8_lossy(&bytes).into_owned())
        };
        debug!(status = code, content = %body, "response");
        Ok(Response {
            status: code,
            content_type,
            body,
        })
    }
}

/// Percent-encode each segment of a path, keeping the `/` separators
#[must_use]
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn content_type_of(response: &reqwest::blocking::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Whether a content type names a JSON primitive, ignoring parameters such as charset
fn is_primitive(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(PRIMITIVE_CONTENT_TYPE))
}

fn log_failure(response: &reqwest::blocking::Response) {
    for (name, value) in response.headers() {
        if name.as_str().starts_with("x-fluiddb-") {
            debug!(header = %name, value = ?value, "error detail");
        }
    }
}
