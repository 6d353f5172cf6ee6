//! Error types for the CRUD core.
//!
//! Every bind or execute step returns [`CrudError`] on failure. Each variant
//! belongs to one [`ErrorCategory`] and maps to a fixed HTTP status:
//!
//! | Variant | Category | Status |
//! |---|---|---|
//! | `Unauthorized` | `Auth` | 401 |
//! | `BadRequest` | `Bind` | 400 |
//! | `NotFound` | `NotFound` | 404 |
//! | `Conflict` | `Conflict` | 409 |
//! | `Unprocessable` | `Conflict` | 422 |
//! | `Internal` | `Internal` | 500 |
//!
//! None of these are retried by the core. Internal error text is only placed in
//! response bodies when the caller asks for it (non-production deployments).

use bytes::Bytes;
use http::{header, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`CrudError`].
pub type CrudResult<T> = Result<T, CrudError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Identity missing or malformed.
    Auth,
    /// Malformed request payload.
    Bind,
    /// The addressed row does not exist.
    NotFound,
    /// Uniqueness or referential constraint violated.
    Conflict,
    /// Anything unclassified.
    Internal,
}

impl ErrorCategory {
    /// Returns the lowercase category name used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Bind => "bind",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

/// Standard error type for the CRUD core.
///
/// # Example
///
/// ```
/// use solon_core::{CrudError, ErrorCategory};
/// use http::StatusCode;
///
/// let error = CrudError::conflict("email already registered");
/// assert_eq!(error.category(), ErrorCategory::Conflict);
/// assert_eq!(error.status_code(), StatusCode::CONFLICT);
/// ```
#[derive(Error, Debug)]
pub enum CrudError {
    /// Identity missing or malformed.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Human-readable error message.
        message: String,
    },

    /// Request payload did not match its schema.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable error message.
        message: String,
    },

    /// The addressed row does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Uniqueness or foreign-key violation.
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable error message.
        message: String,
    },

    /// Foreign-key violation reported as unprocessable.
    #[error("Unprocessable: {message}")]
    Unprocessable {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients in production).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl CrudError {
    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an unprocessable error.
    #[must_use]
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::Unprocessable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized { .. } => ErrorCategory::Auth,
            Self::BadRequest { .. } => ErrorCategory::Bind,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } | Self::Unprocessable { .. } => ErrorCategory::Conflict,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the detail message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized { message }
            | Self::BadRequest { message }
            | Self::NotFound { message }
            | Self::Conflict { message }
            | Self::Unprocessable { message }
            | Self::Internal { message, .. } => message,
        }
    }

    /// Converts this error to a serializable error envelope.
    ///
    /// Client-facing messages are the canonical status text. Internal errors
    /// carry their detail (and source chain) only when `expose_internal` is set.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>, expose_internal: bool) -> ErrorEnvelope {
        let message = match self {
            Self::Internal { message, source } if expose_internal => match source {
                Some(source) => format!("{message}: {source:#}"),
                None => message.clone(),
            },
            _ => canonical_reason(self.status_code()).to_string(),
        };

        ErrorEnvelope {
            message,
            request_id: request_id.map(ToString::to_string),
        }
    }

    /// Renders this error as a JSON HTTP response.
    #[must_use]
    pub fn into_response(self, request_id: Option<&str>, expose_internal: bool) -> Response<Bytes> {
        let status = self.status_code();
        let envelope = self.to_envelope(request_id, expose_internal);
        let body = serde_json::to_vec(&envelope).unwrap_or_default();

        let mut response = Response::new(Bytes::from(body));
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        response
    }
}

/// Serializable error body for HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Human-readable error message.
    pub message: String,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Returns the canonical reason phrase for `status`.
#[must_use]
pub fn canonical_reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown Status")
}
