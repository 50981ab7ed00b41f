//! Memoized client construction over one shared transport.
//!
//! # Design
//! A `ClientFactory` hands out one `ApiClient` per (base URL, error handler)
//! pair for as long as the factory lives. Handler identity is the address of
//! its `Arc` allocation; the cached client holds a clone of that `Arc`, so an
//! address cannot be reused by a different handler while its entry exists.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::client::{ApiClient, ClientConfig, ErrorHandler};
use crate::operation::Quirks;
use crate::transport::Transport;

type ClientKey = (String, usize);

pub struct ClientFactory<T> {
    transport: Arc<T>,
    quirks: Quirks,
    clients: Mutex<HashMap<ClientKey, Arc<ApiClient<Arc<T>>>>>,
}

impl<T: Transport> ClientFactory<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            quirks: Quirks::default(),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Quirks mode applied to every client created afterwards.
    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Return the client for this pair, building it on first request.
    pub fn create(&self, base_url: &str, on_error: &ErrorHandler) -> Arc<ApiClient<Arc<T>>> {
        let key = (base_url.to_string(), handler_id(on_error));
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        clients
            .entry(key)
            .or_insert_with(|| {
                tracing::debug!(base_url, "creating api client");
                let config = ClientConfig::new(base_url, on_error.clone()).with_quirks(self.quirks);
                Arc::new(ApiClient::with_config(config, self.transport.clone()))
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn handler_id(handler: &ErrorHandler) -> usize {
    Arc::as_ptr(handler).cast::<()>() as usize
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ApiError;
    use crate::transport::MockTransport;

    fn handler() -> ErrorHandler {
        Arc::new(|_: &ApiError| {})
    }

    #[test]
    fn same_pair_returns_the_same_client() {
        let factory = ClientFactory::new(MockTransport::new());
        let on_error = handler();

        let a = factory.create("http://a", &on_error);
        let b = factory.create("http://a", &on_error);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(factory.len(), 1);
    }

    #[test]
    fn different_url_or_handler_builds_a_new_client() {
        let factory = ClientFactory::new(MockTransport::new()).with_quirks(Quirks::Legacy);
        let first = handler();
        let second = handler();

        let a = factory.create("http://a", &first);
        let b = factory.create("http://b", &first);
        let c = factory.create("http://a", &second);
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(factory.len(), 3);
        assert_eq!(c.quirks(), Quirks::Legacy);
        assert_eq!(b.base_url(), "http://b");
    }

    #[tokio::test]
    async fn clients_share_the_factory_transport() {
        let factory = ClientFactory::new(MockTransport::new());
        factory.transport().respond_json(200, &json!([]));
        factory.transport().respond_json(200, &json!([]));
        let on_error = handler();

        factory.create("http://a", &on_error).get("/x", None).await.unwrap();
        factory.create("http://b", &on_error).get("/y", None).await.unwrap();

        let urls: Vec<String> = factory.transport().requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, ["http://a/x", "http://b/y"]);
    }
}
