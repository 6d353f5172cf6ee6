//! The five CRUD shapes.

use std::fmt;

/// A CRUD shape handled by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create a row from the write payload.
    Insert,
    /// List rows, optionally scoped to an anchor.
    List,
    /// Fetch the anchored row.
    Get,
    /// Apply the write payload to the anchored row.
    Update,
    /// Remove the anchored row.
    Delete,
}

impl Operation {
    /// Returns the lowercase name used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::List => "list",
            Self::Get => "get",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Returns true for shapes that only read.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        matches!(self, Self::List | Self::Get)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
