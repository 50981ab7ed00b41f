//! Asynchronous JSON API client core.
//!
//! # Overview
//! `ApiClient` wraps a base URL, an error handler and a `Transport`. Each of
//! its twelve entry points (GET/POST/PUT/DELETE crossed with three result
//! shapes) issues one request and yields either the shaped result or an
//! `ApiError`, never both.
//!
//! # Design
//! - Outgoing options pass through `options::normalize` exactly once; JSON
//!   bodies are encoded there and `Content-Type` is forced.
//! - The entry points are rows of the `Operation` table, not hand-written
//!   copies of the same request logic.
//! - The transport is injected. `UreqTransport` talks to the network,
//!   `MockTransport` replays a script in tests.
//! - Non-2xx statuses are delivered as successes; `BodyOnly::ok` and
//!   `HttpResponse::ok` expose the status class.

pub mod client;
pub mod error;
pub mod factory;
pub mod http;
pub mod operation;
pub mod options;
pub mod shape;
pub mod transport;

pub use client::{ApiClient, ClientConfig, ErrorHandler};
pub use error::{ApiError, FailureCause, TransportError};
pub use factory::ClientFactory;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use operation::{CallPlan, Operation, Quirks, ShapeKind};
pub use options::{normalize, NormalizedOptions, RequestOptions};
pub use shape::{BodyOnly, Full, Shape, Shaped};
pub use transport::{MockTransport, Transport, UreqTransport};
