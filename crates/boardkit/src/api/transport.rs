use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER};
use tokio::sync::Mutex;

use super::RequestSpec;
use crate::config::Config;

/// What the executor needs from an HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub retry_after: Option<String>,
    pub body: String,
}

/// The request never produced a response (refused, timed out, TLS, ...)
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Sends a single request, no retries, no rate limiting
pub trait Transport: Send + Sync {
    fn send(
        &self,
        spec: &RequestSpec,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;

    /// Release the underlying connection pool. Calling it twice is a no-op.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// `reqwest` transport authenticated with a bearer token.
///
/// The `reqwest::Client` is built on first use and shared by every later call until
/// [`Transport::close`] drops it.
pub struct HttpTransport {
    base_url: String,
    token: String,
    timeout: Duration,
    client: Mutex<Option<reqwest::Client>>,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.credentials.token().to_string(),
            timeout: config.timing.request_timeout,
            client: Mutex::new(None),
        }
    }

    async fn client(&self) -> Result<reqwest::Client, TransportError> {
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        log::debug!("Creating HTTP client for {}", self.base_url);
        let client = create_authenticated_client(&self.token, self.timeout)?;
        *slot = Some(client.clone());
        Ok(client)
    }

    #[cfg(test)]
    pub async fn is_open(&self) -> bool {
        self.client.lock().await.is_some()
    }
}

/// Create an HTTP client with bearer auth and JSON accept headers
fn create_authenticated_client(
    token: &str,
    timeout: Duration,
) -> Result<reqwest::Client, TransportError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| TransportError(format!("Invalid header value: {e}")))?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| TransportError(format!("Failed to build HTTP client: {e}")))
}

impl Transport for HttpTransport {
    async fn send(&self, spec: &RequestSpec) -> Result<RawResponse, TransportError> {
        let client = self.client().await?;
        let url = format!("{}{}", self.base_url, spec.path);

        let mut request = client
            .request(spec.method.clone(), &url)
            .query(&spec.query_pairs());
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(format!("Failed to read response body: {e}")))?;

        Ok(RawResponse {
            status,
            retry_after,
            body,
        })
    }

    async fn close(&self) {
        if self.client.lock().await.take().is_some() {
            log::debug!("Closed HTTP client for {}", self.base_url);
        }
    }
}
