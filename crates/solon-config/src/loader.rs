//! Configuration loader with layered approach.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;
use solon_core::{ForeignKeyPolicy, UpdatePolicy, UserIdFormat};

use crate::{ConfigError, SolonConfig};

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones, field by field:
/// 1. Default values (or a preset)
/// 2. Configuration files and strings (TOML or JSON)
/// 3. Environment variables (`PREFIX__SECTION__KEY`)
///
/// # Example
///
/// ```no_run
/// use solon_config::ConfigLoader;
///
/// # fn main() -> Result<(), solon_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("solon.toml")?
///     .with_env_prefix("SOLON")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: SolonConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader seeded with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SolonConfig::default(),
            env_prefix: None,
        }
    }

    /// Reset to default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = SolonConfig::default();
        self
    }

    /// Reset to the development preset.
    ///
    /// ```
    /// use solon_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert!(config.expose_internal_errors());
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = SolonConfig::development();
        self
    }

    /// Reset to the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = SolonConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is picked from the extension (`.toml` or `.json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed, or
    /// contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::unreadable(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        self.with_string(&content, &format)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format (`toml` or `json`).
    ///
    /// ```
    /// use solon_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[dispatch]\nmax_list_len = 100", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.dispatch.max_list_len, 100);
    /// assert_eq!(config.dispatch.default_list_len, 20);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the content has unknown fields.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let layer: Value = match format.to_lowercase().as_str() {
            "toml" => {
                let table: toml::Table = toml::from_str(content)?;
                serde_json::to_value(table)?
            }
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::UnsupportedFormat(format.to_string())),
        };

        let mut merged = serde_json::to_value(&self.config)?;
        merge_values(&mut merged, layer);
        self.config = serde_json::from_value(merged)?;
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, for example
    /// `SOLON__DISPATCH__MAX_LIST_LEN=200`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a `.env` file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::env_var(".env", e.to_string())),
        }
    }

    /// Finalize: apply environment overrides, then validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment value does not parse or the
    /// final configuration is invalid.
    pub fn load(mut self) -> Result<SolonConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> SolonConfig {
        self.config
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let env_vars: HashMap<String, String> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_var(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["SERVICE", "NAME"] => {
                self.config.service.name = value.to_string();
            }
            ["SERVICE", "ENVIRONMENT"] => {
                self.config.service.environment = value.to_string();
            }

            ["IDENTITY", "HEADER_AFFIX"] => {
                self.config.identity.header_affix = value.to_string();
            }
            ["IDENTITY", "SERVICE_HEADER"] => {
                self.config.identity.service_header = value.to_string();
            }
            ["IDENTITY", "ADMIN_HEADER"] => {
                self.config.identity.admin_header = value.to_string();
            }
            ["IDENTITY", "USER_ID_FORMAT"] => {
                self.config.identity.user_id_format = match value.to_lowercase().as_str() {
                    "opaque" => UserIdFormat::Opaque,
                    "uuid" => UserIdFormat::Uuid,
                    _ => return Err(ConfigError::env_var(key, "expected 'opaque' or 'uuid'")),
                };
            }

            ["DISPATCH", "FOREIGN_KEY_POLICY"] => {
                self.config.dispatch.foreign_key_policy = match value.to_lowercase().as_str() {
                    "conflict" => ForeignKeyPolicy::Conflict,
                    "unprocessable" => ForeignKeyPolicy::Unprocessable,
                    _ => {
                        return Err(ConfigError::env_var(
                            key,
                            "expected 'conflict' or 'unprocessable'",
                        ))
                    }
                };
            }
            ["DISPATCH", "UPDATE_POLICY"] => {
                self.config.dispatch.update_policy = match value.to_lowercase().as_str() {
                    "verify_anchor" => UpdatePolicy::VerifyAnchor,
                    "require_match" => UpdatePolicy::RequireMatch,
                    _ => {
                        return Err(ConfigError::env_var(
                            key,
                            "expected 'verify_anchor' or 'require_match'",
                        ))
                    }
                };
            }
            ["DISPATCH", "DEFAULT_LIST_LEN"] => {
                self.config.dispatch.default_list_len = value
                    .parse()
                    .map_err(|_| ConfigError::env_var(key, "expected integer"))?;
            }
            ["DISPATCH", "MAX_LIST_LEN"] => {
                self.config.dispatch.max_list_len = value
                    .parse()
                    .map_err(|_| ConfigError::env_var(key, "expected integer"))?;
            }
            ["DISPATCH", "MAX_BODY_BYTES"] => {
                self.config.dispatch.max_body_bytes = value
                    .parse()
                    .map_err(|_| ConfigError::env_var(key, "expected integer"))?;
            }

            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_var(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "JSON_FORMAT"] => {
                self.config.logging.json_format = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_var(key, "expected boolean"))?;
            }
            ["LOGGING", "SPAN_EVENTS"] => {
                self.config.logging.span_events = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_var(key, "expected boolean"))?;
            }

            // Unknown keys are left for other components sharing the prefix
            _ => {}
        }

        Ok(())
    }
}

/// Recursively overlays `layer` onto `base`; objects merge, everything else replaces.
fn merge_values(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, SolonConfig::default());
    }

    #[test]
    fn test_loader_with_development() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.service.environment, "development");
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert!(config.logging.json_format);
        assert!(!config.expose_internal_errors());
    }

    #[test]
    fn test_string_layers_over_preset() {
        let config = ConfigLoader::new()
            .with_development()
            .with_string("[logging]\njson_format = true", "toml")
            .unwrap()
            .load()
            .unwrap();

        assert!(config.logging.json_format);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.service.environment, "development");
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"identity": {"header_affix": "Rewards", "user_id_format": "uuid"}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.identity.header_affix, "Rewards");
        assert_eq!(config.identity.user_id_format, UserIdFormat::Uuid);
        assert_eq!(
            config.identity.user_id_header(),
            "X-Rewards-Authenticated-User-Id"
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ConfigLoader::new().with_string("[dispatch]\npaginate = false", "toml");
        assert!(matches!(result, Err(ConfigError::Json(_))));

        let result = ConfigLoader::new().with_string("[server]\nport = 1", "toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_unsupported_format() {
        let result = ConfigLoader::new().with_string("a: b", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let result = ConfigLoader::new().with_string("[dispatch", "toml");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_loader_with_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[service]\nname = \"rewards\"\n\n[dispatch]\nupdate_policy = \"require_match\"").unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.service.name, "rewards");
        assert_eq!(config.dispatch.update_policy, UpdatePolicy::RequireMatch);
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/solon.toml");
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/solon.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, SolonConfig::default());
    }

    #[test]
    fn test_validation_runs_on_load() {
        let result = ConfigLoader::new()
            .with_string("[dispatch]\ndefault_list_len = 500", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_unvalidated() {
        let config = ConfigLoader::new()
            .with_string("[dispatch]\nmax_body_bytes = 0", "toml")
            .unwrap()
            .load_unvalidated();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    // Environment mutation needs unsafe on newer toolchains, so overrides are
    // exercised through apply_env_var directly.
    #[test]
    fn test_apply_env_var_dispatch() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__DISPATCH__MAX_LIST_LEN", "100", "TEST").unwrap();
        loader.apply_env_var("TEST__DISPATCH__FOREIGN_KEY_POLICY", "unprocessable", "TEST").unwrap();
        loader.apply_env_var("TEST__DISPATCH__UPDATE_POLICY", "require_match", "TEST").unwrap();

        assert_eq!(loader.config.dispatch.max_list_len, 100);
        assert_eq!(loader.config.dispatch.foreign_key_policy, ForeignKeyPolicy::Unprocessable);
        assert_eq!(loader.config.dispatch.update_policy, UpdatePolicy::RequireMatch);
    }

    #[test]
    fn test_apply_env_var_identity_and_logging() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__IDENTITY__HEADER_AFFIX", "Rewards", "TEST").unwrap();
        loader.apply_env_var("TEST__IDENTITY__USER_ID_FORMAT", "UUID", "TEST").unwrap();
        loader.apply_env_var("TEST__LOGGING__JSON_FORMAT", "no", "TEST").unwrap();
        loader.apply_env_var("TEST__SERVICE__ENVIRONMENT", "staging", "TEST").unwrap();

        assert_eq!(loader.config.identity.header_affix, "Rewards");
        assert_eq!(loader.config.identity.user_id_format, UserIdFormat::Uuid);
        assert!(!loader.config.logging.json_format);
        assert!(loader.config.expose_internal_errors());
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(loader.apply_env_var("TEST__DISPATCH__MAX_LIST_LEN", "lots", "TEST").is_err());
        assert!(loader.apply_env_var("TEST__DISPATCH__UPDATE_POLICY", "ignore", "TEST").is_err());
        assert!(loader.apply_env_var("TEST__LOGGING__ENABLED", "maybe", "TEST").is_err());
    }

    #[test]
    fn test_apply_env_var_ignores_unknown_keys() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SERVER__PORT", "8080", "TEST").unwrap();
        assert_eq!(loader.config, SolonConfig::default());
    }

    #[test]
    fn test_complete_toml_config() {
        let toml = r#"
            [service]
            name = "rewards"
            environment = "production"

            [identity]
            header_affix = "Rewards"
            service_header = "X-Scheduler-Id"
            admin_header = "X-Goog-Authenticated-User-Email"
            user_id_format = "uuid"

            [dispatch]
            foreign_key_policy = "unprocessable"
            update_policy = "verify_anchor"
            default_list_len = 25
            max_list_len = 400
            max_body_bytes = 65536

            [logging]
            enabled = true
            level = "info"
            json_format = true
        "#;

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.service.name, "rewards");
        assert_eq!(config.identity.service_header, "X-Scheduler-Id");
        assert_eq!(config.dispatch.foreign_key_policy, ForeignKeyPolicy::Unprocessable);
        assert_eq!(config.dispatch.default_list_len, 25);
        assert_eq!(config.dispatch.max_body_bytes, 65536);
    }
}
