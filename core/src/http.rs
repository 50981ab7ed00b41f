//! HTTP value types exchanged with a `Transport`.
//!
//! # Design
//! Requests and responses are plain data. The client builds an `HttpRequest`
//! and hands it to whatever transport it was constructed with; the transport
//! answers with an `HttpResponse` whose body is still raw bytes. Decoding is
//! the client's job so that a bad body surfaces as a decode failure rather
//! than a transport failure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::NormalizedOptions;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request ready to be issued by a transport.
///
/// `init` distinguishes "no options at all" (`None`) from "an empty options
/// object" (`Some(NormalizedOptions::default())`). Only the bare GET entry
/// points produce `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub init: Option<NormalizedOptions>,
}

impl HttpRequest {
    /// Method the transport should use. Absent options or an absent method
    /// field both mean GET.
    pub fn method(&self) -> HttpMethod {
        self.init
            .as_ref()
            .and_then(|init| init.method)
            .unwrap_or(HttpMethod::Get)
    }

    /// Case-insensitive header lookup on the outgoing options.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.init.as_ref().and_then(|init| {
            init.headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }

    pub fn body(&self) -> Option<&str> {
        self.init.as_ref().and_then(|init| init.body.as_deref())
    }
}

/// An HTTP response as returned by a transport. Any status code is a
/// successful transport outcome.
///
/// The body is kept as raw bytes; nothing about its encoding is assumed
/// until a caller asks for JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Transport-level success flag: true for 2xx statuses.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON. Invalid UTF-8 is a decode error like any
    /// other malformed input.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Body as text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}
