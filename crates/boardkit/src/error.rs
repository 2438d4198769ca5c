use serde::Serialize;
use serde_json::Value;

/// Failure reported by the remote API, or by the transport underneath it.
///
/// `status_code` is `0` when no HTTP response was received at all.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
#[error("API error [{status_code}]: {message}")]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<Value>,
}

impl ApiError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            raw_body: None,
        }
    }

    pub fn transport(detail: impl std::fmt::Display) -> Self {
        Self::new(0, format!("Connection error: {detail}"))
    }

    pub fn with_raw_body(mut self, raw_body: Option<Value>) -> Self {
        self.raw_body = raw_body;
        self
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
