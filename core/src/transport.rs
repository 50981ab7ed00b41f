//! The request primitive the client delegates to.
//!
//! # Design
//! `ApiClient` never opens sockets itself; it is generic over a `Transport`
//! supplied at construction. `UreqTransport` is the network-backed
//! implementation, `MockTransport` a scripted one for tests. A transport
//! performs exactly one attempt per call: no retries, no timeout unless the
//! options carry one, no status interpretation.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::NormalizedOptions;

/// Issues one HTTP request and returns the raw response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).fetch(request).await
    }
}

// ---------------------------------------------------------------------------
// ureq
// ---------------------------------------------------------------------------

/// Network transport backed by a blocking `ureq::Agent`.
///
/// Status codes are returned as data (`http_status_as_error(false)`) and
/// bodies are read as raw bytes up to `body_limit`. Each call runs on
/// tokio's blocking pool; polled outside a tokio runtime, `fetch` fails with
/// `TransportError::Aborted`.
///
/// Of the passthrough option fields, `timeout` (milliseconds) is applied as
/// the request's overall timeout. Other fields are ignored.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    body_limit: u64,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            body_limit: u64::MAX,
        }
    }

    /// Cap the number of body bytes read per response. Unlimited by default.
    pub fn with_body_limit(mut self, limit: u64) -> Self {
        self.body_limit = limit;
        self
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::Aborted(e.to_string()))?;
        let agent = self.agent.clone();
        let body_limit = self.body_limit;
        runtime
            .spawn_blocking(move || execute(&agent, request, body_limit))
            .await
            .map_err(|e| TransportError::Aborted(e.to_string()))?
    }
}

fn prepare<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &BTreeMap<String, String>,
    timeout: Option<Duration>,
) -> ureq::RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    match timeout {
        Some(timeout) => builder.config().timeout_global(Some(timeout)).build(),
        None => builder,
    }
}

fn execute(
    agent: &ureq::Agent,
    request: HttpRequest,
    body_limit: u64,
) -> Result<HttpResponse, TransportError> {
    let method = request.method();
    let HttpRequest { url, init } = request;
    let NormalizedOptions {
        headers,
        body,
        extra,
        ..
    } = init.unwrap_or_default();
    let timeout = extra
        .get("timeout")
        .and_then(serde_json::Value::as_u64)
        .map(Duration::from_millis);

    let result = match (method, body) {
        (HttpMethod::Get, None) => prepare(agent.get(&url), &headers, timeout).call(),
        (HttpMethod::Get, Some(body)) => prepare(agent.get(&url), &headers, timeout)
            .force_send_body()
            .send(body.as_bytes()),
        (HttpMethod::Delete, None) => prepare(agent.delete(&url), &headers, timeout).call(),
        (HttpMethod::Delete, Some(body)) => prepare(agent.delete(&url), &headers, timeout)
            .force_send_body()
            .send(body.as_bytes()),
        (HttpMethod::Post, Some(body)) => {
            prepare(agent.post(&url), &headers, timeout).send(body.as_bytes())
        }
        (HttpMethod::Post, None) => prepare(agent.post(&url), &headers, timeout).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            prepare(agent.put(&url), &headers, timeout).send(body.as_bytes())
        }
        (HttpMethod::Put, None) => prepare(agent.put(&url), &headers, timeout).send_empty(),
    };
    let mut response = result.map_err(|e| TransportError::Request(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = response
        .body_mut()
        .with_config()
        .limit(body_limit)
        .read_to_vec()
        .map_err(|e| TransportError::Request(e.to_string()))?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

// ---------------------------------------------------------------------------
// Mock
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

/// Scripted transport for tests.
///
/// Replies are consumed in the order they were queued. Every request is
/// recorded, including ones that fail. Calling with an empty script yields
/// `TransportError::Unscripted`.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, response: HttpResponse) {
        self.push(Reply::Respond(response));
    }

    /// Queue a response whose body is the JSON text of `body`.
    pub fn respond_json(&self, status: u16, body: &serde_json::Value) {
        let mut response = HttpResponse::new(status, body.to_string());
        response
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        self.respond(response);
    }

    /// Queue a transport-level rejection.
    pub fn fail(&self, message: impl Into<String>) {
        self.push(Reply::Fail(message.into()));
    }

    /// Requests issued so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, reply: Reply) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.clone();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(TransportError::Request(message)),
            None => Err(TransportError::Unscripted(url)),
        }
    }
}
