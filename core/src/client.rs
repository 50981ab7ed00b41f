//! Asynchronous JSON API client over an injected transport.
//!
//! # Design
//! `ApiClient` holds a base URL, an error handler and a transport. The twelve
//! public methods are generated from the `Operation` table and all funnel
//! into `call`, which
//! 1. concatenates base URL and endpoint verbatim,
//! 2. normalizes the caller's options (or omits them for a bare GET),
//! 3. forces the verb for POST/PUT/DELETE,
//! 4. issues exactly one transport call and shapes the response.
//!
//! A call ends in exactly one outcome. `Ok` carries the shaped payload; on
//! `Err` the error handler has already been invoked once with the same
//! `ApiError`. Status codes never turn a call into a failure.

use std::fmt;
use std::sync::Arc;

use crate::error::{ApiError, FailureCause};
use crate::http::{HttpRequest, HttpResponse};
use crate::operation::{CallPlan, Operation, Quirks, ShapeKind};
use crate::options::{normalize, RequestOptions};
use crate::shape::{BodyOnly, Full, Shape, Shaped};
use crate::transport::Transport;

/// Receives every `ApiError` a client produces.
pub type ErrorHandler = Arc<dyn Fn(&ApiError) + Send + Sync>;

/// Construction parameters for an `ApiClient`.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub on_error: ErrorHandler,
    pub quirks: Quirks,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, on_error: ErrorHandler) -> Self {
        Self {
            base_url: base_url.into(),
            on_error,
            quirks: Quirks::default(),
        }
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("quirks", &self.quirks)
            .finish_non_exhaustive()
    }
}

pub struct ApiClient<T> {
    config: ClientConfig,
    transport: T,
}

impl<T> fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> ApiClient<T> {
    /// The base URL is stored as given; it is not validated or normalized.
    pub fn new(base_url: impl Into<String>, on_error: ErrorHandler, transport: T) -> Self {
        Self::with_config(ClientConfig::new(base_url, on_error), transport)
    }

    pub fn with_config(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn quirks(&self) -> Quirks {
        self.config.quirks
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run any operation chosen at runtime.
    pub async fn dispatch(
        &self,
        op: Operation,
        endpoint: &str,
        options: Option<RequestOptions>,
    ) -> Result<Shaped, ApiError> {
        match op.shape() {
            ShapeKind::Full => self.call(op, endpoint, options).await.map(Shaped::Full),
            ShapeKind::ResponseOnly => self
                .call(op, endpoint, options)
                .await
                .map(Shaped::ResponseOnly),
            ShapeKind::BodyOnly => self.call(op, endpoint, options).await.map(Shaped::BodyOnly),
        }
    }

    async fn call<S: Shape>(
        &self,
        op: Operation,
        endpoint: &str,
        options: Option<RequestOptions>,
    ) -> Result<S, ApiError> {
        debug_assert_eq!(S::KIND, op.shape());
        let plan = op.plan(self.config.quirks);
        let request = self.build_request(plan, endpoint, options);
        tracing::debug!(
            operation = op.name(),
            url = %request.url,
            method = %request.method(),
            "sending request"
        );

        match self.round_trip(request).await {
            Ok(shaped) => Ok(shaped),
            Err(cause) => {
                let error = ApiError {
                    endpoint: endpoint.to_string(),
                    method: plan.error_tag,
                    error: cause,
                };
                tracing::warn!(
                    operation = op.name(),
                    endpoint,
                    method = %error.method,
                    error = %error.error,
                    "request failed"
                );
                (self.config.on_error)(&error);
                Err(error)
            }
        }
    }

    fn build_request(
        &self,
        plan: CallPlan,
        endpoint: &str,
        options: Option<RequestOptions>,
    ) -> HttpRequest {
        let url = format!("{}{}", self.config.base_url, endpoint);
        let normalized = options.as_ref().map(normalize);
        let init = match plan.wire_method {
            None => normalized,
            Some(method) => {
                let mut init = normalized.unwrap_or_default();
                init.method = Some(method);
                Some(init)
            }
        };
        HttpRequest { url, init }
    }

    async fn round_trip<S: Shape>(&self, request: HttpRequest) -> Result<S, FailureCause> {
        let response = self.transport.fetch(request).await?;
        tracing::debug!(status = response.status, "response received");
        Ok(S::from_response(response)?)
    }
}

macro_rules! entry_points {
    ($($(#[$meta:meta])* $method:ident => $op:ident -> $shape:ty;)+) => {
        impl<T: Transport> ApiClient<T> {
            $(
                $(#[$meta])*
                pub async fn $method(
                    &self,
                    endpoint: &str,
                    options: Option<RequestOptions>,
                ) -> Result<$shape, ApiError> {
                    self.call(Operation::$op, endpoint, options).await
                }
            )+
        }
    };
}

entry_points! {
    /// GET and decode. Without options the transport receives no options
    /// object at all; with options, their method field is honored.
    get => Get -> Full;
    get_response => GetResponse -> HttpResponse;
    get_body => GetBody -> BodyOnly;
    /// POST and decode. Any method in `options` is overridden.
    post => Post -> Full;
    post_response => PostResponse -> HttpResponse;
    post_body => PostBody -> BodyOnly;
    put => Put -> Full;
    put_response => PutResponse -> HttpResponse;
    put_body => PutBody -> BodyOnly;
    delete => Delete -> Full;
    delete_response => DeleteResponse -> HttpResponse;
    delete_body => DeleteBody -> BodyOnly;
}
