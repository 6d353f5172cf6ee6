//! # Solon Core
//!
//! Core types shared by every Solon crate:
//!
//! - [`Identity`] / [`RoleKind`] - who is calling, resolved from trusted headers
//! - [`CrudError`] - the error taxonomy returned by bind and execute steps
//! - [`ForeignKeyPolicy`] / [`UpdatePolicy`] - outcome policies picked per deployment
//! - [`RequestId`] - UUID v7 request identifier for log correlation

#![doc(html_root_url = "https://docs.rs/solon-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod identity;
mod policy;

pub use context::RequestId;
pub use error::{canonical_reason, CrudError, CrudResult, ErrorCategory, ErrorEnvelope};
pub use identity::{
    AdminIdentity, Identity, IdentityConfig, RoleKind, ServiceIdentity, UserId, UserIdFormat,
    UserIdentity, ADMIN_HEADER, DEFAULT_HEADER_AFFIX, DEFAULT_SERVICE_HEADER,
};
pub use policy::{ForeignKeyPolicy, UpdatePolicy};
