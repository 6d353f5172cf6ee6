//! Extraction error types.
//!
//! Extractors report what went wrong ([`ExtractionErrorKind`]) and which part
//! of the request it came from ([`ExtractionSource`]). They do not pick an HTTP
//! status; the CRUD dispatcher maps the source to an outcome (path failures are
//! a missing row, body failures a bad request, query failures an internal
//! error).

use std::fmt;

/// The part of the request a value was bound from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionSource {
    /// Router captures such as `{reward_id}`.
    Path,
    /// The URL query string.
    Query,
    /// The request body.
    Body,
    /// A request header.
    Header,
}

impl ExtractionSource {
    /// Returns the lowercase source name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
            Self::Header => "header",
        }
    }
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of binding failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionErrorKind {
    /// A required capture or field was absent.
    Missing,
    /// A value was present but did not convert to the target type.
    InvalidValue,
    /// The source as a whole did not deserialize.
    Malformed,
    /// The body exceeded the configured limit.
    TooLarge,
}

/// A failure to bind a typed value out of a request.
///
/// # Example
///
/// ```rust
/// use solon_extract::{ExtractionError, ExtractionErrorKind, ExtractionSource};
///
/// let err = ExtractionError::missing(ExtractionSource::Path, "reward_id");
/// assert_eq!(err.kind(), ExtractionErrorKind::Missing);
/// assert_eq!(err.source_of_failure(), ExtractionSource::Path);
/// assert!(err.to_string().contains("reward_id"));
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionError {
    source: ExtractionSource,
    kind: ExtractionErrorKind,
    field: Option<String>,
    detail: String,
}

impl ExtractionError {
    /// A required capture or field was absent.
    #[must_use]
    pub fn missing(source: ExtractionSource, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            source,
            kind: ExtractionErrorKind::Missing,
            detail: format!("{source} is missing `{field}`"),
            field: Some(field),
        }
    }

    /// A value was present but did not convert.
    #[must_use]
    pub fn invalid_value(
        source: ExtractionSource,
        field: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        let field = field.into();
        Self {
            source,
            kind: ExtractionErrorKind::InvalidValue,
            detail: format!("{source} value `{field}` is invalid: {reason}"),
            field: Some(field),
        }
    }

    /// The source as a whole did not deserialize.
    #[must_use]
    pub fn malformed(source: ExtractionSource, reason: impl fmt::Display) -> Self {
        Self {
            source,
            kind: ExtractionErrorKind::Malformed,
            detail: format!("malformed {source}: {reason}"),
            field: None,
        }
    }

    /// The body is larger than `limit` bytes.
    #[must_use]
    pub fn too_large(limit: usize, actual: usize) -> Self {
        Self {
            source: ExtractionSource::Body,
            kind: ExtractionErrorKind::TooLarge,
            detail: format!("body is {actual} bytes, limit is {limit}"),
            field: None,
        }
    }

    /// Returns where in the request the failure happened.
    #[must_use]
    pub const fn source_of_failure(&self) -> ExtractionSource {
        self.source
    }

    /// Returns the failure kind.
    #[must_use]
    pub const fn kind(&self) -> ExtractionErrorKind {
        self.kind
    }

    /// Returns the offending field, when one is known.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail)
    }
}

impl std::error::Error for ExtractionError {}
