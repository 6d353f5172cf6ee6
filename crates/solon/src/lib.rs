//! # Solon
//!
//! **Role-aware CRUD binding and dispatch for HTTP services**
//!
//! Solon turns a routed HTTP request into one of five storage operations
//! (insert, list, get, update, delete) without per-endpoint glue:
//!
//! - **Identity from trusted headers** – service, admin, and user callers are
//!   resolved from headers set by the upstream proxy
//! - **Typed bindings** – path captures, JSON bodies, and query strings land in
//!   typed slots; a shape missing a required slot does not compile
//! - **Pluggable storage** – any type implementing [`StorageEngine`](crud::StorageEngine)
//! - **Uniform outcomes** – engine failures map to 404/409/422/500 in one place
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solon::prelude::*;
//!
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("solon.toml")?
//!     .with_env_prefix("SOLON")
//!     .load()?;
//! let dispatcher = solon::init(&config)?;
//!
//! // inside a route handler for GET /campaigns/:campaign_id/rewards
//! let binding = Binding::new(RoleKind::User)
//!     .set_anchor(campaigns.clone())
//!     .set_output(rewards.clone());
//! let response = dispatcher.handle_list(binding, &ctx).await;
//! ```
//!
//! ## Request Flow
//!
//! ```text
//! Identity -> Path (anchor key) -> Body (payload) -> Query (list) -> Execute
//!    401           404                  400               500        404/409/422/500
//! ```

#![doc(html_root_url = "https://docs.rs/solon/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use solon_core as core;

// Re-export extraction types
pub use solon_extract as extract;

// Re-export configuration types
pub use solon_config as config;

// Re-export telemetry
pub use solon_telemetry as telemetry;

// Re-export CRUD binding and dispatch
pub use solon_crud as crud;

use solon_config::SolonConfig;
use solon_crud::Dispatcher;
use solon_telemetry::TelemetryResult;

/// Installs logging, describes the CRUD metrics, and builds a [`Dispatcher`].
///
/// Logging can only be installed once per process; a second call fails with
/// [`TelemetryError::LoggingInit`](solon_telemetry::TelemetryError::LoggingInit).
/// Services that manage their own subscriber should use [`Dispatcher::new`].
pub fn init(config: &SolonConfig) -> TelemetryResult<Dispatcher> {
    solon_telemetry::init_logging(&config.logging)?;
    solon_telemetry::metrics::describe_metrics();

    let dispatcher = Dispatcher::new(config);
    tracing::info!(
        service = %config.service.name,
        environment = %config.service.environment,
        foreign_key_policy = ?config.dispatch.foreign_key_policy,
        update_policy = ?config.dispatch.update_policy,
        "solon dispatcher ready"
    );
    Ok(dispatcher)
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use solon::prelude::*;
/// ```
pub mod prelude {
    pub use solon_core::{
        CrudError, CrudResult, ForeignKeyPolicy, Identity, IdentityConfig, RequestId, RoleKind,
        UpdatePolicy,
    };

    pub use solon_extract::{ExtractionContext, ExtractionContextBuilder, PathParams};

    pub use solon_config::{ConfigLoader, SolonConfig};

    pub use solon_crud::{
        Anchor, Binding, CrudResponse, Dispatcher, EngineError, EngineErrorKind, ListQuery,
        Output, StorageEngine, Unset, Write,
    };
}
