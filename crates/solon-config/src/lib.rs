//! Typed configuration for Solon services.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`PREFIX__SECTION__KEY`)
//! - Strict parsing (fails on unknown fields)
//! - Layered configuration (defaults, then files, then env)
//!
//! # Configuration File Format
//!
//! ```toml
//! [service]
//! name = "rewards"
//! environment = "production"
//!
//! [identity]
//! header_affix = "Rewards"
//! service_header = "X-Scheduler-Identity"
//! user_id_format = "uuid"
//!
//! [dispatch]
//! foreign_key_policy = "conflict"
//! update_policy = "verify_anchor"
//! default_list_len = 20
//! max_list_len = 400
//! max_body_bytes = 1048576
//!
//! [logging]
//! level = "info"
//! json_format = true
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{DispatchConfig, ServiceConfig, SolonConfig, PRODUCTION_ENVIRONMENT};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use solon_telemetry::LogConfig;
