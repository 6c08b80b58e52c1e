//! The transport between switchyard and an appliance's NITRO REST API.
//!
//! Everything above this module works in terms of [Nitro], so operations can run against a real
//! appliance ([http::HttpNitro]) or against a test double that records what it was asked to do.
//!
//! # Success and failure
//!
//! NITRO reports outcomes in two layers, HTTP status codes and an `errorcode` in the body. This
//! module collapses them into a binary outcome: a call either succeeds or fails with a [Fault]
//! that carries whatever the appliance (or the HTTP stack) reported, verbatim. Callers never
//! distinguish network, authentication, and validation failures.

#[cfg(feature = "http")]
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A failed NITRO call.
///
/// Typically the appliance's error body, e.g.
/// `{"errorcode": 258, "message": "No such resource", "severity": "ERROR"}`. When the appliance
/// could not be reached, this is a string describing the transport error.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Fault(pub Value);

impl Fault {
    /// A fault that carries only a message, for failures that happen before a response exists.
    pub fn message(message: impl Into<String>) -> Self {
        Fault(Value::String(message.into()))
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(message) => f.write_str(message),
            Value::Object(body) => match body.get("message").and_then(Value::as_str) {
                Some(message) => match body.get("errorcode") {
                    Some(code) => write!(f, "{message} (errorcode {code})"),
                    None => f.write_str(message),
                },
                None => write!(f, "{}", self.0),
            },
            other => write!(f, "{other}"),
        }
    }
}

impl std::error::Error for Fault {}

/// The HTTP method of a NITRO call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        })
    }
}

/// A fully compiled NITRO call.
///
/// `path` is relative to the NITRO root (`/nitro/v1/`), e.g. `config/csvserver?action=enable`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Request {
    pub method: Method,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub body: Option<Value>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Request {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Request {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Request {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
        }
    }

    /// Persists the running configuration: `POST config/nsconfig?action=save`.
    pub fn save_config() -> Self {
        Request::post(
            "config/nsconfig?action=save",
            serde_json::json!({ "nsconfig": {} }),
        )
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// A connection to one appliance's NITRO API.
#[async_trait]
pub trait Nitro: Send {
    /// Reads configuration. Returns the response body.
    async fn get(&mut self, path: &str) -> Result<Value, Fault>;

    /// Creates objects or performs an `?action=` on them.
    async fn post(&mut self, path: &str, payload: &Value) -> Result<(), Fault>;

    /// Modifies objects.
    async fn put(&mut self, path: &str, payload: &Value) -> Result<(), Fault>;

    /// Sends a [Request], dispatching on its method.
    ///
    /// For [Method::Get], returns the response body. For the other methods, returns
    /// [Value::Null] on success. A missing body is sent as an empty object.
    async fn send(&mut self, request: &Request) -> Result<Value, Fault> {
        let empty = Value::Object(Default::default());
        let body = request.body.as_ref().unwrap_or(&empty);
        match request.method {
            Method::Get => self.get(&request.path).await,
            Method::Post => self.post(&request.path, body).await.map(|()| Value::Null),
            Method::Put => self.put(&request.path, body).await.map(|()| Value::Null),
        }
    }
}

/// Renders search filters as a NITRO query string.
///
/// Returns an empty string when there are no filters, otherwise `?filter=k1:v1,k2:v2`. Values are
/// percent-encoded so that commas and colons inside a value cannot be mistaken for separators.
///
/// ```
/// use switchyard::nitro::build_filter;
///
/// assert_eq!("", build_filter::<&str, &str>(&[]));
/// assert_eq!(
///     "?filter=name:web%201,port:80",
///     build_filter(&[("name", "web 1"), ("port", "80")]),
/// );
/// ```
pub fn build_filter<K: AsRef<str>, V: AsRef<str>>(filters: &[(K, V)]) -> String {
    if filters.is_empty() {
        return String::new();
    }

    let rendered: Vec<String> = filters
        .iter()
        .map(|(key, value)| format!("{}:{}", key.as_ref(), urlencoding::encode(value.as_ref())))
        .collect();
    format!("?filter={}", rendered.join(","))
}

/// Extracts the objects stored under `key` in a NITRO response body.
///
/// When the appliance has no matching objects, it omits the key entirely; that case yields an
/// empty list.
pub fn parse_return(response: Value, key: &str) -> Value {
    match response {
        Value::Object(mut body) => body.remove(key).unwrap_or(Value::Array(vec![])),
        _ => Value::Array(vec![]),
    }
}
