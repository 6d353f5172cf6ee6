//! Observability for Solon services.
//!
//! - **Logging**: `tracing-subscriber` setup with JSON or pretty output
//! - **Metrics**: CRUD counters and histograms via the `metrics` facade
//!
//! # Example
//!
//! ```rust,ignore
//! use solon_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! solon_telemetry::metrics::describe_metrics();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
