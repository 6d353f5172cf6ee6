//! # Solon CRUD
//!
//! Generic create/read/update/delete handling over pluggable storage engines.
//!
//! An endpoint is described by a [`Binding`]: the [`RoleKind`](solon_core::RoleKind)
//! it admits plus up to three resource slots.
//!
//! | Shape | Anchor | Write | Output | Success |
//! |-------|--------|-------|--------|---------|
//! | Insert | optional | required | - | 201 + echoed payload |
//! | List | optional (scope) | - | required | 200 + rows |
//! | Get | required | - | required | 200 + row |
//! | Update | required | required | - | 204 |
//! | Delete | required | - | - | 204 |
//!
//! The [`Dispatcher`] binds a request into the slots, then executes the shape
//! against each slot's [`StorageEngine`]. Engine failures are classified by
//! [`EngineErrorKind`] and mapped to HTTP outcomes by the [`ErrorTranslator`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use solon_crud::{Binding, Dispatcher};
//! use solon_core::RoleKind;
//!
//! let dispatcher = Dispatcher::new(&config);
//! let binding = Binding::new(RoleKind::Admin)
//!     .set_anchor(campaigns.clone())
//!     .set_output(rewards.clone());
//!
//! let response = dispatcher.handle_list(binding, &ctx).await;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binding;
mod dispatch;
mod engine;
mod operation;
mod query;
mod resource;
mod response;
mod translate;

pub use binding::{Binding, Phase};
pub use dispatch::{Dispatcher, REQUEST_ID_HEADER};
pub use engine::{BoxError, EngineError, EngineErrorKind, StorageEngine};
pub use operation::Operation;
pub use query::{ListLimits, ListQuery, QueryParameters};
pub use resource::{Anchor, AnchorKey, AnchorSlot, Output, OutputSlot, Unset, Write, WriteSlot};
pub use response::CrudResponse;
pub use translate::{
    ErrorTranslator, VendorCode, MYSQL_DUPLICATE_ENTRY, MYSQL_FK_NO_REFERENCED_ROW,
    MYSQL_FK_ROW_IS_REFERENCED, SQLSTATE_FOREIGN_KEY_VIOLATION, SQLSTATE_UNIQUE_VIOLATION,
};
