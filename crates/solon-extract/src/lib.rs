//! # Solon Extract
//!
//! Typed request binding for the Solon CRUD core.
//!
//! The dispatcher never touches raw requests. It works from an
//! [`ExtractionContext`] (an already-routed request plus the router's
//! [`PathParams`]) and pulls typed values out of it:
//!
//! | Extractor | Source | Used for |
//! |-----------|--------|----------|
//! | [`Path<T>`] | Path captures | Anchor keys |
//! | [`Query<T>`] | Query string | Output query parameters |
//! | [`Json<T>`] | Request body | Write payloads |
//!
//! ## Error Handling
//!
//! All extractors return [`ExtractionError`], which records the
//! [`ExtractionSource`] the failure came from.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod extractor;
mod json;
mod params;
mod path;
mod query;

pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use error::{ExtractionError, ExtractionErrorKind, ExtractionSource};
pub use extractor::FromRequest;
pub use json::{Json, DEFAULT_MAX_BODY_SIZE};
pub use params::PathParams;
pub use path::{path_param, Path};
pub use query::Query;
