//! Main configuration types.

use http::HeaderName;
use serde::{Deserialize, Serialize};
use solon_core::{ForeignKeyPolicy, IdentityConfig, UpdatePolicy};
use solon_telemetry::LogConfig;

use crate::ConfigError;

/// Environment name under which internal error text is hidden from clients.
pub const PRODUCTION_ENVIRONMENT: &str = "production";

/// Complete Solon configuration.
///
/// # Example
///
/// ```
/// use solon_config::SolonConfig;
///
/// let config = SolonConfig::default();
/// assert_eq!(config.dispatch.max_list_len, 400);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct SolonConfig {
    /// Service identification.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Identity header naming.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// CRUD dispatcher behavior.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Logging setup.
    #[serde(default)]
    pub logging: LogConfig,
}

/// Service identification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Service name attached to logs.
    pub name: String,
    /// Deployment environment (`production`, `staging`, `development`, ...).
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "solon".to_string(),
            environment: PRODUCTION_ENVIRONMENT.to_string(),
        }
    }
}

/// CRUD dispatcher settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Outcome for foreign-key violations on insert and update.
    pub foreign_key_policy: ForeignKeyPolicy,
    /// Handling of updates that affect no rows.
    pub update_policy: UpdatePolicy,
    /// Page size used when a list request omits `len`.
    pub default_list_len: u32,
    /// Largest page size a list request may ask for; larger values are clamped.
    pub max_list_len: u32,
    /// Largest accepted JSON body in bytes.
    pub max_body_bytes: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            foreign_key_policy: ForeignKeyPolicy::default(),
            update_policy: UpdatePolicy::default(),
            default_list_len: 20,
            max_list_len: 400,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl SolonConfig {
    /// Returns true when internal error text may be sent to clients.
    #[must_use]
    pub fn expose_internal_errors(&self) -> bool {
        !self
            .service
            .environment
            .eq_ignore_ascii_case(PRODUCTION_ENVIRONMENT)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The header affix is empty or not a header token
    /// - A configured or derived header name is invalid
    /// - `default_list_len` is outside `1..=max_list_len`
    /// - `max_body_bytes` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let affix = &self.identity.header_affix;
        if affix.is_empty() {
            return Err(ConfigError::invalid_value(
                "identity.header_affix",
                "must not be empty",
            ));
        }
        if !affix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ConfigError::invalid_value(
                "identity.header_affix",
                format!("invalid header token: {affix}"),
            ));
        }

        for (field, name) in [
            ("identity.service_header", self.identity.service_header.as_str()),
            ("identity.admin_header", self.identity.admin_header.as_str()),
        ] {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(ConfigError::invalid_value(
                    field,
                    format!("invalid header name: {name:?}"),
                ));
            }
        }

        if self.dispatch.max_list_len == 0 {
            return Err(ConfigError::invalid_value(
                "dispatch.max_list_len",
                "must be at least 1",
            ));
        }

        if self.dispatch.default_list_len == 0
            || self.dispatch.default_list_len > self.dispatch.max_list_len
        {
            return Err(ConfigError::invalid_value(
                "dispatch.default_list_len",
                format!("must be between 1 and {}", self.dispatch.max_list_len),
            ));
        }

        if self.dispatch.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "dispatch.max_body_bytes",
                "must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logging, internal error text exposed to clients.
    #[must_use]
    pub fn development() -> Self {
        Self {
            service: ServiceConfig {
                environment: "development".to_string(),
                ..ServiceConfig::default()
            },
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// Create a production configuration preset.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solon_core::UserIdFormat;

    #[test]
    fn test_defaults_are_valid() {
        let config = SolonConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dispatch.default_list_len, 20);
        assert_eq!(config.dispatch.foreign_key_policy, ForeignKeyPolicy::Conflict);
        assert_eq!(config.dispatch.update_policy, UpdatePolicy::VerifyAnchor);
        assert_eq!(config.identity.user_id_format, UserIdFormat::Opaque);
    }

    #[test]
    fn test_expose_internal_errors() {
        assert!(!SolonConfig::production().expose_internal_errors());
        assert!(SolonConfig::development().expose_internal_errors());

        let mut config = SolonConfig::default();
        config.service.environment = "Production".to_string();
        assert!(!config.expose_internal_errors());
        config.service.environment = "staging".to_string();
        assert!(config.expose_internal_errors());
    }

    #[test]
    fn test_rejects_bad_affix() {
        let mut config = SolonConfig::default();
        config.identity.header_affix = String::new();
        assert!(config.validate().is_err());

        config.identity.header_affix = "Re wards".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("identity.header_affix"));
    }

    #[test]
    fn test_rejects_bad_header_name() {
        let mut config = SolonConfig::default();
        config.identity.service_header = "X-Bad Header".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("identity.service_header"));
    }

    #[test]
    fn test_list_len_bounds() {
        let mut config = SolonConfig::default();
        config.dispatch.default_list_len = 0;
        assert!(config.validate().is_err());

        config.dispatch.default_list_len = 401;
        assert!(config.validate().is_err());

        config.dispatch.default_list_len = 400;
        assert!(config.validate().is_ok());

        config.dispatch.max_list_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_body_limit_rejected() {
        let mut config = SolonConfig::default();
        config.dispatch.max_body_bytes = 0;
        assert!(config.validate().is_err());
    }
}
