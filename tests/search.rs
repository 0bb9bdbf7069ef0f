//! End-to-end executor tests against an injected mock client.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use stackexchange_search::{Error, HttpGet, HttpResponse, Search, TransportError};
use url::Url;

/// Returns a canned response and records every URL it was asked for.
#[derive(Clone)]
struct CannedClient {
    status: u16,
    body: &'static str,
    requests: Arc<Mutex<Vec<Url>>>,
}

impl CannedClient {
    fn shared(status: u16, body: &'static str) -> Self {
        Self { status, body, requests: Arc::new(Mutex::new(Vec::new())) }
    }
}

#[async_trait]
impl HttpGet for CannedClient {
    async fn send_get(&self, url: &Url) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(url.clone());
        Ok(HttpResponse { status: self.status, body: self.body.to_string() })
    }
}

struct FailingClient;

#[async_trait]
impl HttpGet for FailingClient {
    async fn send_get(&self, _url: &Url) -> Result<HttpResponse, TransportError> {
        Err(TransportError::new("connection failed: host unreachable"))
    }
}

#[tokio::test]
async fn run_returns_body_and_stores_response() {
    let client = CannedClient::shared(200, r#"{"items":[]}"#);

    let mut search = Search::new(json!({ "tagged": "php" })).unwrap();
    search.set_http_client(client.clone());

    let body = search.run().await.unwrap();
    assert_eq!(body, r#"{"items":[]}"#);

    let response = search.response().unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, body);
    assert!(response.is_success());
}

#[tokio::test]
async fn injected_client_sees_fixed_endpoint_and_query() {
    let client = CannedClient::shared(200, "{}");

    let mut search = Search::new(json!({ "tagged": "php", "pagesize": 10 })).unwrap();
    search.set_http_client(client.clone());
    search.run().await.unwrap();

    let requests = client.requests.lock().unwrap();
    assert_eq!(requests.len(), 1, "run() performs exactly one GET");

    let url = &requests[0];
    assert_eq!(url.host_str(), Some("api.stackexchange.com"));
    assert_eq!(url.path(), "/2.2/search");

    let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(pairs.get("tagged").map(String::as_str), Some("php"));
    assert_eq!(pairs.get("pagesize").map(String::as_str), Some("10"));
    assert_eq!(pairs.get("site").map(String::as_str), Some("stackoverflow"));
}

#[tokio::test]
async fn non_2xx_status_is_an_inspectable_result_not_an_error() {
    let client = CannedClient::shared(400, r#"{"error_id":400,"error_name":"bad_parameter"}"#);

    // no tagged/intitle: accepted locally, rejected by the server
    let mut search = Search::new(json!({})).unwrap();
    search.set_http_client(client);

    let body = search.run().await.expect("a 400 response is not an error");
    assert!(body.contains("bad_parameter"));
    assert_eq!(search.response().unwrap().status, 400);
}

#[tokio::test]
async fn transport_failure_surfaces_as_transport_error() {
    let mut search = Search::new(json!({ "tagged": "rust" })).unwrap();
    search.set_http_client(FailingClient);

    let err = search.run().await.unwrap_err();
    match err {
        Error::Transport(e) => assert!(e.to_string().contains("host unreachable")),
        other => panic!("expected Transport, got {other:?}"),
    }
    assert!(search.response().is_none());
}

#[test]
fn invalid_options_fail_construction_before_any_request() {
    let err = Search::new(json!({ "invalid": "option" })).err().unwrap();
    assert!(matches!(err, Error::UnknownOption(_)));
}
