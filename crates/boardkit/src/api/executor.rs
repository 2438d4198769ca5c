use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;

use super::{RateGate, RawResponse, RequestSpec, Transport};
use crate::config::Timing;
use crate::error::ApiError;

/// Characters of a non-JSON error body kept in the error message
const ERROR_BODY_PREVIEW: usize = 500;

/// Issues requests through a [`RateGate`], classifies responses and retries.
///
/// Retry policy, per attempt (at most `timing.max_retries`):
///
/// - transport failure: retry after `retry_delay`; the last failure surfaces as
///   `ApiError { status_code: 0 }`
/// - 429: wait `Retry-After` seconds, or `retry_delay * attempt_number`, then retry
/// - any other status >= 400: fail immediately
///
/// Every attempt goes through the gate, so retries slow the caller down instead of
/// adding load.
pub struct RequestExecutor<T> {
    transport: T,
    gate: RateGate,
    timing: Timing,
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(transport: T, timing: Timing) -> Self {
        Self {
            transport,
            gate: RateGate::new(timing.min_interval),
            timing,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute a request. `Ok(None)` means the API answered 204 or an empty body.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<Option<Value>, ApiError> {
        let attempts = self.timing.max_retries.max(1);

        for attempt in 0..attempts {
            let is_last = attempt + 1 == attempts;

            self.gate.acquire().await;
            debug!(
                "{} {} (attempt {}/{})",
                spec.method,
                spec.path,
                attempt + 1,
                attempts
            );

            let response = match self.transport.send(spec).await {
                Ok(response) => response,
                Err(e) if is_last => return Err(ApiError::transport(e)),
                Err(e) => {
                    warn!(
                        "{} {} failed ({}), retrying in {:?}",
                        spec.method, spec.path, e, self.timing.retry_delay
                    );
                    tokio::time::sleep(self.timing.retry_delay).await;
                    continue;
                }
            };

            if response.status == 429 {
                let wait = parse_retry_after(response.retry_after.as_deref())
                    .unwrap_or(self.timing.retry_delay * (attempt + 1));
                warn!(
                    "{} {} rate limited (attempt {}/{}), waiting {:?}",
                    spec.method,
                    spec.path,
                    attempt + 1,
                    attempts,
                    wait
                );
                if !is_last {
                    tokio::time::sleep(wait).await;
                }
                continue;
            }

            return interpret_response(response);
        }

        Err(ApiError::new(429, "Rate limit retries exhausted"))
    }

    pub async fn close(&self) {
        self.transport.close().await;
    }
}

/// `Retry-After` as a delay in seconds. HTTP dates and negative values are ignored.
pub fn parse_retry_after(header: Option<&str>) -> Option<Duration> {
    let seconds = header?.trim().parse::<f64>().ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some(Duration::from_secs_f64(seconds))
    } else {
        None
    }
}

/// Turn a non-429 response into a value or an error
pub fn interpret_response(response: RawResponse) -> Result<Option<Value>, ApiError> {
    let RawResponse { status, body, .. } = response;

    if status >= 400 {
        let raw_body = serde_json::from_str::<Value>(&body).ok();
        let message = raw_body
            .as_ref()
            .and_then(extract_error_message)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("HTTP {status}")
                } else {
                    body.chars().take(ERROR_BODY_PREVIEW).collect()
                }
            });
        return Err(ApiError::new(status, message).with_raw_body(raw_body));
    }

    if status == 204 || body.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&body)
        .map(Some)
        .map_err(|e| ApiError::new(status, format!("Failed to parse response body: {e}")))
}

fn extract_error_message(body: &Value) -> Option<String> {
    ["message", "error"].iter().find_map(|key| match body.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Null | Value::String(_) => None,
        other => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::*;
    use serde_json::json;

    fn executor(transport: ScriptedTransport) -> RequestExecutor<ScriptedTransport> {
        RequestExecutor::new(transport, fast_timing())
    }

    #[tokio::test]
    async fn test_execute_success() {
        let executor = executor(ScriptedTransport::sequence(vec![json_response(
            200,
            json!([{"id": 1}]),
        )]));

        let value = executor.execute(&RequestSpec::get("/cards")).await.unwrap();
        assert_eq!(value, Some(json!([{"id": 1}])));
        assert_eq!(executor.transport().sends(), 1);
    }

    #[tokio::test]
    async fn test_execute_no_content() {
        let executor = executor(ScriptedTransport::sequence(vec![text_response(204, "")]));
        assert_eq!(executor.execute(&RequestSpec::get("/x")).await.unwrap(), None);

        let executor = executor_with_body(200, "  ");
        assert_eq!(executor.execute(&RequestSpec::get("/x")).await.unwrap(), None);
    }

    fn executor_with_body(status: u16, body: &str) -> RequestExecutor<ScriptedTransport> {
        executor(ScriptedTransport::sequence(vec![text_response(status, body)]))
    }

    #[tokio::test]
    async fn test_throttled_once_then_ok() {
        let executor = executor(ScriptedTransport::sequence(vec![
            throttled(Some("0")),
            json_response(200, json!({"ok": true})),
        ]));

        let value = executor.execute(&RequestSpec::get("/cards")).await.unwrap();
        assert_eq!(value, Some(json!({"ok": true})));
        assert_eq!(executor.transport().sends(), 2);
    }

    #[tokio::test]
    async fn test_throttled_every_attempt() {
        let executor = executor(ScriptedTransport::sequence(vec![throttled(None)]));

        let err = executor
            .execute(&RequestSpec::get("/cards"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code, 429);
        assert_eq!(err.message, "Rate limit retries exhausted");
        assert_eq!(executor.transport().sends(), 3);
    }

    #[tokio::test]
    async fn test_transport_error_every_attempt() {
        let executor = executor(ScriptedTransport::sequence(vec![refused()]));

        let err = executor
            .execute(&RequestSpec::get("/cards"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code, 0);
        assert!(err.message.starts_with("Connection error: "));
        assert!(err.message.contains("connection refused"));
        assert_eq!(executor.transport().sends(), 3);
    }

    #[tokio::test]
    async fn test_transport_error_then_success() {
        let executor = executor(ScriptedTransport::sequence(vec![
            refused(),
            json_response(200, json!({"id": 1})),
        ]));

        let value = executor.execute(&RequestSpec::get("/cards/1")).await.unwrap();
        assert_eq!(value, Some(json!({"id": 1})));
        assert_eq!(executor.transport().sends(), 2);
    }

    fn slow_executor(transport: ScriptedTransport) -> RequestExecutor<ScriptedTransport> {
        RequestExecutor::new(
            transport,
            Timing {
                retry_delay: Duration::from_millis(100),
                ..fast_timing()
            },
        )
    }

    #[tokio::test]
    async fn test_throttle_backoff_grows_linearly() {
        let executor = slow_executor(ScriptedTransport::sequence(vec![
            throttled(None),
            throttled(Some("soon")),
            json_response(200, json!({"ok": true})),
        ]));

        let started = std::time::Instant::now();
        let value = executor.execute(&RequestSpec::get("/cards")).await.unwrap();

        // 100ms after the first 429, 200ms after the second
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert_eq!(value, Some(json!({"ok": true})));
        assert_eq!(executor.transport().sends(), 3);
    }

    #[tokio::test]
    async fn test_throttle_honors_retry_after() {
        let executor = slow_executor(ScriptedTransport::sequence(vec![
            throttled(Some("0.7")),
            json_response(200, json!({"ok": true})),
        ]));

        let started = std::time::Instant::now();
        executor.execute(&RequestSpec::get("/cards")).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(700));
        assert_eq!(executor.transport().sends(), 2);
    }

    #[tokio::test]
    async fn test_transport_retry_uses_fixed_delay() {
        let executor = slow_executor(ScriptedTransport::sequence(vec![refused()]));

        let started = std::time::Instant::now();
        let err = executor
            .execute(&RequestSpec::get("/cards"))
            .await
            .unwrap_err();

        // two waits between three attempts, none after the last
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(err, ApiError::new(0, "Connection error: connection refused"));
        assert_eq!(executor.transport().sends(), 3);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let executor = executor(ScriptedTransport::sequence(vec![json_response(
            404,
            json!({"message": "Card not found", "code": 17}),
        )]));

        let err = executor
            .execute(&RequestSpec::get("/cards/9"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code, 404);
        assert_eq!(err.message, "Card not found");
        assert_eq!(err.raw_body, Some(json!({"message": "Card not found", "code": 17})));
        assert_eq!(executor.transport().sends(), 1);
    }

    #[tokio::test]
    async fn test_server_error_uses_error_field() {
        let executor = executor(ScriptedTransport::sequence(vec![json_response(
            500,
            json!({"error": "boom"}),
        )]));

        let err = executor.execute(&RequestSpec::get("/x")).await.unwrap_err();
        assert_eq!(err.status_code, 500);
        assert_eq!(err.message, "boom");
        assert_eq!(executor.transport().sends(), 1);
    }

    #[tokio::test]
    async fn test_error_body_not_json_is_truncated() {
        let body = "x".repeat(800);
        let executor = executor_with_body(502, &body);

        let err = executor.execute(&RequestSpec::get("/x")).await.unwrap_err();
        assert_eq!(err.status_code, 502);
        assert_eq!(err.message.len(), 500);
        assert_eq!(err.raw_body, None);
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let executor = executor_with_body(200, "{not json");

        let err = executor.execute(&RequestSpec::get("/x")).await.unwrap_err();
        assert_eq!(err.status_code, 200);
        assert!(err.message.starts_with("Failed to parse response body"));
        assert_eq!(executor.transport().sends(), 1);
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after(Some("3")), Some(Duration::from_secs(3)));
        assert_eq!(
            parse_retry_after(Some(" 1.5 ")),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(parse_retry_after(Some("-1")), None);
        assert_eq!(parse_retry_after(Some("Wed, 21 Oct 2015 07:28:00 GMT")), None);
        assert_eq!(parse_retry_after(None), None);
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(&json!({"message": "m", "error": "e"})),
            Some("m".to_string())
        );
        assert_eq!(
            extract_error_message(&json!({"message": "", "error": "e"})),
            Some("e".to_string())
        );
        assert_eq!(
            extract_error_message(&json!({"error": {"code": 1}})),
            Some("{\"code\":1}".to_string())
        );
        assert_eq!(extract_error_message(&json!({"detail": "d"})), None);
    }
}
