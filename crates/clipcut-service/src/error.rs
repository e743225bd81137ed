//! Service client error types.

use clipcut_core::ClipCutError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Service returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    /// Message suitable for the user-facing error state.
    ///
    /// Transport problems are prefixed with `Network error:`; a failure the
    /// service reported itself is passed through verbatim, preferring the
    /// `detail` field of a JSON error body.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Status { code, body } => upstream_detail(body)
                .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
                .unwrap_or_else(|| format!("Request failed with status {code}")),
            other => other.to_string(),
        }
    }

    /// Whether the failure happened below HTTP (connection, DNS, TLS).
    pub fn is_network(&self) -> bool {
        matches!(self, ServiceError::Network(_))
    }
}

fn upstream_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

impl From<ServiceError> for ClipCutError {
    fn from(err: ServiceError) -> Self {
        ClipCutError::Service(err.user_message())
    }
}
