//! In-memory transport replaying scripted responses

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;

use super::{RawResponse, RequestSpec, Transport, TransportError};
use crate::config::Timing;

type Handler = dyn Fn(&RequestSpec, usize) -> Result<RawResponse, TransportError> + Send + Sync;

/// Answers every request through a closure receiving the request and the zero-based
/// send count; records what was sent.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    sends: AtomicUsize,
    requests: Mutex<Vec<RequestSpec>>,
    closes: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(
        handler: impl Fn(&RequestSpec, usize) -> Result<RawResponse, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            sends: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
        }
    }

    /// Replay `responses` in order; the last one repeats forever
    pub fn sequence(responses: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self::new(move |_, n| responses[n.min(responses.len() - 1)].clone())
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RequestSpec> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, spec: &RequestSpec) -> Result<RawResponse, TransportError> {
        let n = self.sends.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(spec.clone());
        (self.handler)(spec, n)
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn json_response(status: u16, body: Value) -> Result<RawResponse, TransportError> {
    Ok(RawResponse {
        status,
        retry_after: None,
        body: body.to_string(),
    })
}

pub fn text_response(status: u16, body: &str) -> Result<RawResponse, TransportError> {
    Ok(RawResponse {
        status,
        retry_after: None,
        body: body.to_string(),
    })
}

pub fn throttled(retry_after: Option<&str>) -> Result<RawResponse, TransportError> {
    Ok(RawResponse {
        status: 429,
        retry_after: retry_after.map(str::to_string),
        body: String::new(),
    })
}

pub fn refused() -> Result<RawResponse, TransportError> {
    Err(TransportError("connection refused".to_string()))
}

/// Timings short enough for tests
pub fn fast_timing() -> Timing {
    Timing {
        min_interval: Duration::from_millis(1),
        retry_delay: Duration::from_millis(5),
        max_retries: 3,
        request_timeout: Duration::from_secs(5),
    }
}
