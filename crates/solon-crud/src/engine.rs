//! Storage engine contract.
//!
//! The dispatcher never talks SQL. It drives any type implementing
//! [`StorageEngine`], whose associated types fix the shape of keys, rows,
//! payloads, and list queries for one resource kind. Engines are shared across
//! requests behind an `Arc`, so every method takes `&self`.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::query::QueryParameters;
use crate::translate::VendorCode;

/// Boxed error type carried as the cause of an [`EngineError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A storage backend for one resource kind.
///
/// # Example
///
/// ```rust,ignore
/// impl StorageEngine for RewardStore {
///     type Key = RewardKey;
///     type Scope = UserKey;
///     type Row = Reward;
///     type Payload = NewReward;
///     type Query = ListQuery;
///
///     async fn has(&self, key: &RewardKey) -> Result<bool, EngineError> {
///         self.pool
///             .exists(key)
///             .await
///             .map_err(|e| EngineError::other("reward lookup failed").with_source(e))
///     }
///     // ...
/// }
/// ```
pub trait StorageEngine: Send + Sync + 'static {
    /// Selector addressing one row, bound from path parameters.
    type Key: DeserializeOwned + Send + Sync + 'static;

    /// Parent key used to scope list queries (nested resources).
    type Scope: Send + Sync + 'static;

    /// Row returned by fetches.
    type Row: Serialize + Send + 'static;

    /// Write payload, bound from the JSON body. Inserts may fill generated
    /// fields in place.
    type Payload: DeserializeOwned + Serialize + Send + Sync + 'static;

    /// List parameters, bound from the query string.
    type Query: DeserializeOwned + QueryParameters + Send + Sync + 'static;

    /// Returns whether a row matching `key` exists.
    fn has(&self, key: &Self::Key) -> impl Future<Output = Result<bool, EngineError>> + Send;

    /// Fetches the row matching `key`.
    ///
    /// A missing row is reported as an error of kind [`EngineErrorKind::NoRows`].
    fn fetch_row(
        &self,
        key: &Self::Key,
    ) -> impl Future<Output = Result<Self::Row, EngineError>> + Send;

    /// Fetches one page of rows, optionally restricted to `scope`.
    fn fetch_rows(
        &self,
        scope: Option<&Self::Scope>,
        query: &Self::Query,
    ) -> impl Future<Output = Result<Vec<Self::Row>, EngineError>> + Send;

    /// Inserts `payload`, filling any engine-generated fields.
    fn insert(
        &self,
        payload: &mut Self::Payload,
    ) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Applies `payload` to the row matching `key`; returns affected rows.
    fn update(
        &self,
        key: &Self::Key,
        payload: &Self::Payload,
    ) -> impl Future<Output = Result<u64, EngineError>> + Send;

    /// Deletes the row matching `key`; returns affected rows.
    fn delete(&self, key: &Self::Key) -> impl Future<Output = Result<u64, EngineError>> + Send;
}

/// Classified engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineErrorKind {
    /// A unique key already exists.
    DuplicateKey,
    /// A referenced row is missing, or a referencing row blocks a delete.
    ForeignKeyViolation,
    /// The addressed row does not exist.
    NoRows,
    /// Anything else (connectivity, syntax, timeouts).
    Other,
}

impl EngineErrorKind {
    /// Returns the snake_case kind name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateKey => "duplicate_key",
            Self::ForeignKeyViolation => "foreign_key_violation",
            Self::NoRows => "no_rows",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported by a [`StorageEngine`].
///
/// # Example
///
/// ```
/// use solon_crud::{EngineError, EngineErrorKind, VendorCode};
///
/// let err = EngineError::from_vendor(VendorCode::MySql(1062), "Duplicate entry 'a@b.c'");
/// assert_eq!(err.kind(), EngineErrorKind::DuplicateKey);
/// ```
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct EngineError {
    kind: EngineErrorKind,
    message: String,
    vendor_code: Option<VendorCode>,
    #[source]
    source: Option<BoxError>,
}

impl EngineError {
    /// Creates an error of the given kind.
    #[must_use]
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            vendor_code: None,
            source: None,
        }
    }

    /// A unique-key violation.
    #[must_use]
    pub fn duplicate_key(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::DuplicateKey, message)
    }

    /// A foreign-key violation.
    #[must_use]
    pub fn foreign_key(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::ForeignKeyViolation, message)
    }

    /// No row matched.
    #[must_use]
    pub fn no_rows() -> Self {
        Self::new(EngineErrorKind::NoRows, "no rows in result set")
    }

    /// An unclassified failure.
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::Other, message)
    }

    /// Classifies a vendor error code.
    #[must_use]
    pub fn from_vendor(code: VendorCode, message: impl Into<String>) -> Self {
        Self {
            kind: code.classify(),
            message: message.into(),
            vendor_code: Some(code),
            source: None,
        }
    }

    /// Attaches the underlying driver error.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the failure kind.
    #[must_use]
    pub const fn kind(&self) -> EngineErrorKind {
        self.kind
    }

    /// Returns the engine's message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the vendor code, if the engine supplied one.
    #[must_use]
    pub const fn vendor_code(&self) -> Option<&VendorCode> {
        self.vendor_code.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(EngineError::duplicate_key("x").kind(), EngineErrorKind::DuplicateKey);
        assert_eq!(EngineError::foreign_key("x").kind(), EngineErrorKind::ForeignKeyViolation);
        assert_eq!(EngineError::no_rows().kind(), EngineErrorKind::NoRows);
        assert_eq!(EngineError::other("x").kind(), EngineErrorKind::Other);
    }

    #[test]
    fn test_display_includes_kind() {
        let err = EngineError::duplicate_key("Duplicate entry 'a@b.c' for key 'email'");
        assert_eq!(
            err.to_string(),
            "duplicate_key: Duplicate entry 'a@b.c' for key 'email'"
        );
    }

    #[test]
    fn test_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = EngineError::other("query failed").with_source(io);
        let source = StdError::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("reset by peer"));
    }

    #[test]
    fn test_vendor_code_retained() {
        let err = EngineError::from_vendor(VendorCode::SqlState("23503".into()), "fk");
        assert_eq!(err.kind(), EngineErrorKind::ForeignKeyViolation);
        assert_eq!(err.vendor_code(), Some(&VendorCode::SqlState("23503".into())));
    }
}
