//! Test error types.

use thiserror::Error;

/// Errors that can occur while inspecting test responses.
#[derive(Debug, Error)]
pub enum TestError {
    /// Response body is not valid UTF-8.
    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response has no body.
    #[error("response has no body")]
    EmptyBody,

    /// The envelope has no `results` member.
    #[error("response envelope has no results")]
    MissingResults,
}
