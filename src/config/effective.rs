//! Effective configuration with provenance
//!
//! Captures the merged configuration together with the sources that
//! contributed to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::client::ClientSettings;
use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;

/// Schema identifier
pub const SCHEMA_ID: &str = "lro-waiter/effective_config@1";

/// Origin of a configuration source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    Host,
    File,
    Cli,
}

/// A contributing config source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Effective configuration with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub schema_id: String,

    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The merged configuration object
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,

    /// Redacted key paths
    pub redactions: Vec<String>,
}

/// Keys that look like secrets and are never echoed back
const SECRET_KEYS: &[&str] = &["password", "token", "secret", "private_key", "api_key", "credential"];

impl EffectiveConfig {
    /// Build the effective config from layers.
    ///
    /// A missing host file is skipped; a missing explicit file is an error.
    pub fn build(
        host_config_path: Option<&Path>,
        config_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = host_config_path.filter(|p| p.exists()) {
            let (value, digest) = load_toml_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Host,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(path) = config_path {
            let (value, digest) = load_toml_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let mut merged = merge_layers(layers);
        let mut redactions = Vec::new();
        redact_recursive(&mut merged, String::new(), &mut redactions);

        validate_config(&merged)?;

        Ok(Self {
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: merged,
            sources,
            redactions,
        })
    }

    /// Default host config location: `$HOME/.config/lro-waiter/config.toml`
    pub fn default_host_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".config/lro-waiter/config.toml"))
    }

    /// Typed view of the merged values
    pub fn settings(&self) -> Result<ClientSettings, ConfigError> {
        serde_json::from_value(self.config.clone())
            .map_err(|e| ConfigError::ParseError(format!("Invalid settings: {}", e)))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a config value by dot-separated path
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.config, |current, part| current.get(part))
    }

    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(Value::as_u64)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }
}

/// Load a TOML file, returning its JSON form and the digest of its bytes
fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
    let bytes = fs::read(path)
        .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

    let digest = hex::encode(Sha256::digest(&bytes));

    let contents = String::from_utf8(bytes)
        .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

    let toml_value: toml::Value = toml::from_str(&contents)
        .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

    Ok((toml_to_json(toml_value), digest))
}

fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

fn redact_recursive(value: &mut Value, path: String, redactions: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                let current_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };

                let key_lower = key.to_lowercase();
                let is_secret = SECRET_KEYS.iter().any(|s| key_lower.contains(s));

                if is_secret && !val.is_object() && !val.is_array() {
                    *val = Value::String("[REDACTED]".to_string());
                    redactions.push(current_path);
                } else {
                    redact_recursive(val, current_path, redactions);
                }
            }
        }
        Value::Array(arr) => {
            for (i, val) in arr.iter_mut().enumerate() {
                redact_recursive(val, format!("{}[{}]", path, i), redactions);
            }
        }
        _ => {}
    }
}

fn validate_config(config: &Value) -> Result<(), ConfigError> {
    let u64_field = |key: &str| config.get(key).and_then(Value::as_u64);

    if let Some(poll) = u64_field("poll_interval_ms") {
        if poll > 3_600_000 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be at most 3600000".to_string(),
            ));
        }
    }

    if let Some(checks) = u64_field("not_found_checks") {
        if checks == 0 || checks > u64::from(u32::MAX) {
            return Err(ConfigError::ValidationError(
                "not_found_checks must be greater than 0".to_string(),
            ));
        }
    }

    if let Some(request) = u64_field("request_timeout_seconds") {
        if request == 0 || request > 600 {
            return Err(ConfigError::ValidationError(
                "request_timeout_seconds must be in (0, 600]".to_string(),
            ));
        }
    }

    if let Some(timeout) = u64_field("timeout_seconds") {
        if timeout == 0 || timeout > 86_400 {
            return Err(ConfigError::ValidationError(
                "timeout_seconds must be in (0, 86400]".to_string(),
            ));
        }
    }

    if config
        .get("user_agent")
        .and_then(Value::as_str)
        .is_some_and(|ua| ua.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "user_agent must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
