//! Engine error translation.
//!
//! The one place where engine failures turn into client outcomes, and the one
//! place that knows vendor error codes.
//!
//! | Engine condition | Write shapes | Read shapes |
//! |---|---|---|
//! | `DuplicateKey` | 409 | 500 |
//! | `ForeignKeyViolation` on insert/update | 409 or 422 (policy) | 500 |
//! | `ForeignKeyViolation` on delete | 409 | - |
//! | `NoRows` | 404 | 404 |
//! | `Other` | 500 | 500 |

use solon_core::{CrudError, ForeignKeyPolicy};

use crate::engine::{EngineError, EngineErrorKind};
use crate::operation::Operation;

/// MySQL: duplicate entry for a unique key.
pub const MYSQL_DUPLICATE_ENTRY: u16 = 1062;
/// MySQL: cannot delete or update a parent row.
pub const MYSQL_FK_ROW_IS_REFERENCED: u16 = 1451;
/// MySQL: cannot add or update a child row.
pub const MYSQL_FK_NO_REFERENCED_ROW: u16 = 1452;
/// SQLSTATE: unique violation.
pub const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE: foreign key violation.
pub const SQLSTATE_FOREIGN_KEY_VIOLATION: &str = "23503";

/// A driver-specific error code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VendorCode {
    /// MySQL server error number.
    MySql(u16),
    /// Five-character SQLSTATE (PostgreSQL and others).
    SqlState(String),
}

impl VendorCode {
    /// Classifies the code into an engine failure kind.
    #[must_use]
    pub fn classify(&self) -> EngineErrorKind {
        match self {
            Self::MySql(MYSQL_DUPLICATE_ENTRY) => EngineErrorKind::DuplicateKey,
            Self::MySql(MYSQL_FK_ROW_IS_REFERENCED | MYSQL_FK_NO_REFERENCED_ROW) => {
                EngineErrorKind::ForeignKeyViolation
            }
            Self::SqlState(state) if state == SQLSTATE_UNIQUE_VIOLATION => {
                EngineErrorKind::DuplicateKey
            }
            Self::SqlState(state) if state == SQLSTATE_FOREIGN_KEY_VIOLATION => {
                EngineErrorKind::ForeignKeyViolation
            }
            _ => EngineErrorKind::Other,
        }
    }
}

/// Maps engine failures to [`CrudError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorTranslator {
    foreign_key_policy: ForeignKeyPolicy,
}

impl ErrorTranslator {
    /// Creates a translator with the given foreign-key policy.
    #[must_use]
    pub const fn new(foreign_key_policy: ForeignKeyPolicy) -> Self {
        Self { foreign_key_policy }
    }

    /// Returns the configured foreign-key policy.
    #[must_use]
    pub const fn foreign_key_policy(&self) -> ForeignKeyPolicy {
        self.foreign_key_policy
    }

    /// Translates an engine failure raised while executing `operation`.
    ///
    /// Internal errors keep the engine error as their source; whether its text
    /// reaches the client is decided when the response is rendered.
    #[must_use]
    pub fn translate(&self, operation: Operation, error: &EngineError) -> CrudError {
        match error.kind() {
            EngineErrorKind::NoRows => CrudError::not_found("no matching row"),
            EngineErrorKind::DuplicateKey if !operation.is_read() => {
                CrudError::conflict(error.message())
            }
            EngineErrorKind::ForeignKeyViolation if operation == Operation::Delete => {
                CrudError::conflict(error.message())
            }
            EngineErrorKind::ForeignKeyViolation if !operation.is_read() => {
                match self.foreign_key_policy {
                    ForeignKeyPolicy::Conflict => CrudError::conflict(error.message()),
                    ForeignKeyPolicy::Unprocessable => CrudError::unprocessable(error.message()),
                }
            }
            _ => CrudError::internal_with_source(
                format!("{operation} failed"),
                anyhow::anyhow!("{error}"),
            ),
        }
    }
}
