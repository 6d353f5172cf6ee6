//! Outcome policies shared by configuration and dispatch.
//!
//! Some storage outcomes have more than one defensible HTTP meaning. Each
//! deployment picks one policy per question; a dispatcher never mixes them.

use serde::{Deserialize, Serialize};

/// How a foreign-key violation on insert or update is reported.
///
/// Violations on delete (the row is still referenced) are always `409`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyPolicy {
    /// `409 Conflict`.
    #[default]
    Conflict,
    /// `422 Unprocessable Entity`.
    Unprocessable,
}

/// How an update that touched zero rows is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Check that the anchor row exists first (`404` if not). A later zero
    /// affected-rows count means the values were unchanged and is a success.
    #[default]
    VerifyAnchor,
    /// Skip the existence check; zero affected rows is `404`.
    RequireMatch,
}
