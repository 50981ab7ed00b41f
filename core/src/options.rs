//! Per-call request options and their normalization.
//!
//! # Design
//! `RequestOptions` is what callers hand to the client; `NormalizedOptions`
//! is what reaches the transport. The two types differ in the body field:
//! a JSON value before normalization, its encoded text after. Because
//! `normalize` only accepts `RequestOptions`, a body can never be encoded
//! twice.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::http::HttpMethod;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// Options supplied by the caller for a single request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    /// Only honored by the GET entry points; the others force their verb.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Any other fields, handed to the transport untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a passthrough field for the transport, e.g. `timeout`.
    pub fn extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Serialize any `Serialize` value into the body.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, serde_json::Error> {
        Ok(self.body(serde_json::to_value(body)?))
    }
}

/// Options as issued to the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedOptions {
    pub method: Option<HttpMethod>,
    pub headers: BTreeMap<String, String>,
    /// JSON text of the caller's body, if one was given.
    pub body: Option<String>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Produce transport-ready options without touching the input.
///
/// With a body present the `Content-Type` header is forced to
/// `application/json`, replacing any caller value under any casing, and the
/// body is replaced by its JSON text. Other caller headers and passthrough
/// fields are copied as they are.
///
/// Any `Some` body is encoded, including `null` and `false`; presence is
/// what matters, not the value.
pub fn normalize(options: &RequestOptions) -> NormalizedOptions {
    let mut headers = options.headers.clone();
    let body = options.body.as_ref().map(|body| {
        headers.retain(|key, _| !key.eq_ignore_ascii_case(CONTENT_TYPE));
        headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
        body.to_string()
    });

    NormalizedOptions {
        method: options.method,
        headers,
        body,
        extra: options.extra.clone(),
    }
}
