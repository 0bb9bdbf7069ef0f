use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::TransportError;

const CONNECT_TIMEOUT: u64 = 10;
const REQUEST_TIMEOUT: u64 = 30;

/// Raw outcome of one GET: status code and body text, with no
/// interpretation applied. Non-2xx statuses are ordinary responses
/// here; the Stack Exchange API reports errors as structured bodies
/// with 4xx codes rather than by failing the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal GET capability the search executor needs from its HTTP
/// client. Mockable; implementations must return `Ok` for every HTTP
/// status and reserve `Err` for transport-level failures (DNS,
/// connect, timeout, body read).
#[async_trait]
pub trait HttpGet: Send + Sync {
    async fn send_get(&self, url: &Url) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl HttpGet for reqwest::Client {
    async fn send_get(&self, url: &Url) -> Result<HttpResponse, TransportError> {
        let response = self
            .get(url.clone())
            .send()
            .await
            .map_err(describe_transport_failure)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(describe_transport_failure)?;

        Ok(HttpResponse { status, body })
    }
}

fn describe_transport_failure(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::new(format!("request timed out: {e}"))
    } else if e.is_connect() {
        TransportError::new(format!("connection failed: {e}"))
    } else {
        TransportError::new(e.to_string())
    }
}

/// Default client used when none is injected. Timeouts live here, on
/// the collaborator, not in the executor; callers wanting different
/// limits supply their own client.
pub fn default_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("stackexchange-search/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT))
        .build()
        .expect("failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_2xx() {
        assert!(HttpResponse { status: 200, body: String::new() }.is_success());
        assert!(HttpResponse { status: 204, body: String::new() }.is_success());
        assert!(!HttpResponse { status: 400, body: String::new() }.is_success());
        assert!(!HttpResponse { status: 301, body: String::new() }.is_success());
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        // nothing listens on this port
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(200))
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap();

        let err = client.send_get(&url).await.unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
