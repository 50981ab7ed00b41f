//! Live round trip against the mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every verb through
//! `ApiClient` over real HTTP with `UreqTransport`. The `/echo` route reports
//! what actually went over the wire, so the JSON encoding and the forced
//! content type are checked end to end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use api_core::{ApiClient, ApiError, ErrorHandler, RequestOptions, UreqTransport};
use mock_server::{Echo, User};
use serde_json::json;

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

fn client(base_url: &str) -> (ApiClient<UreqTransport>, Arc<AtomicUsize>) {
    let errors = Arc::new(AtomicUsize::new(0));
    let counter = errors.clone();
    let on_error: ErrorHandler = Arc::new(move |_: &ApiError| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (ApiClient::new(base_url, on_error, UreqTransport::new()), errors)
}

#[tokio::test(flavor = "multi_thread")]
async fn crud_lifecycle() {
    let base_url = start_server().await;
    let (client, errors) = client(&base_url);

    // Step 1: list, should be empty.
    let listed = client.get("/users", None).await.unwrap();
    assert_eq!(listed.response.status, 200);
    assert_eq!(listed.body, json!([]));

    // Step 2: create.
    let options = RequestOptions::new().body(json!({"name": "a"}));
    let created = client.post_body("/users", Some(options)).await.unwrap();
    assert!(created.ok);
    let user: User = created.body_as().unwrap();
    assert_eq!(user.name, "a");

    // Step 3: get.
    let fetched = client.get(&format!("/users/{}", user.id), None).await.unwrap();
    assert_eq!(fetched.body_as::<User>().unwrap(), user);

    // Step 4: update.
    let options = RequestOptions::new().body(json!({"name": "b"}));
    let updated = client
        .put(&format!("/users/{}", user.id), Some(options))
        .await
        .unwrap();
    assert_eq!(updated.body["name"], "b");

    // Step 5: delete.
    let response = client
        .delete_response(&format!("/users/{}", user.id), None)
        .await
        .unwrap();
    assert_eq!(response.status, 200);

    // Step 6: get after delete: a 404 is still delivered as a result.
    let missing = client
        .get_body(&format!("/users/{}", user.id), None)
        .await
        .unwrap();
    assert!(!missing.ok);
    assert_eq!(missing.body["error"], format!("user {} not found", user.id));

    assert_eq!(errors.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn wire_contract_is_observed_by_the_server() {
    let base_url = start_server().await;
    let (client, _) = client(&base_url);

    let options = RequestOptions::new()
        .header("content-type", "text/plain")
        .body(json!({"name": "a"}));
    let full = client.put("/echo", Some(options)).await.unwrap();
    let echo: Echo = full.body_as().unwrap();
    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.content_type.as_deref(), Some("application/json"));
    assert_eq!(echo.body, r#"{"name":"a"}"#);

    let full = client.delete("/echo", None).await.unwrap();
    let echo: Echo = full.body_as().unwrap();
    assert_eq!(echo.method, "DELETE");
    assert!(echo.body.is_empty());

    let full = client.get("/echo", None).await.unwrap();
    let echo: Echo = full.body_as().unwrap();
    assert_eq!(echo.method, "GET");
    assert!(echo.content_type.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn plain_text_body_is_a_decode_failure() {
    let base_url = start_server().await;
    let (client, errors) = client(&base_url);

    let err = client.get("/health", None).await.unwrap_err();
    assert!(err.error.is_decode());
    assert_eq!(err.endpoint, "/health");
    assert_eq!(errors.load(Ordering::SeqCst), 1);

    let response = client.get_response("/health", None).await.unwrap();
    assert_eq!(response.body, b"ok");
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_a_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (client, errors) = client(&format!("http://{addr}"));
    let err = client.post("/users", None).await.unwrap_err();
    assert!(err.error.is_transport());
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn binary_body_is_delivered_raw_and_fails_decoding() {
    let base_url = start_server().await;
    let (client, errors) = client(&base_url);

    let response = client.get_response("/bytes/16", None).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, vec![0xFFu8; 16]);
    assert_eq!(errors.load(Ordering::SeqCst), 0);

    let err = client.get("/bytes/16", None).await.unwrap_err();
    assert!(err.error.is_decode());
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn large_body_is_read_in_full() {
    let base_url = start_server().await;
    let (client, errors) = client(&base_url);

    let len = 11 * 1024 * 1024;
    let response = client
        .get_response(&format!("/bytes/{len}"), None)
        .await
        .unwrap();
    assert_eq!(response.body.len(), len);
    assert_eq!(errors.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn timeout_option_bounds_the_request() {
    let base_url = start_server().await;
    let (client, errors) = client(&base_url);

    let options = RequestOptions::new().extra("timeout", json!(100));
    let err = client.get("/delay/2000", Some(options)).await.unwrap_err();
    assert!(err.error.is_transport());
    assert_eq!(errors.load(Ordering::SeqCst), 1);

    let options = RequestOptions::new().extra("timeout", json!(5000));
    let full = client.get("/delay/10", Some(options)).await.unwrap();
    assert_eq!(full.body["waited_ms"], 10);
}
