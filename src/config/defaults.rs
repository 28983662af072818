//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Fixed delay between status queries in milliseconds (default: 10000)
    pub poll_interval_ms: u64,

    /// Floor for the backoff used when no poll interval is set (default: 2000)
    pub min_timeout_ms: u64,

    /// Consecutive 404 answers tolerated while polling (default: 20)
    pub not_found_checks: u32,

    /// Per-request HTTP timeout in seconds (default: 60)
    pub request_timeout_seconds: u64,

    /// Overall wait timeout in seconds (default: 1200 = 20 minutes)
    pub timeout_seconds: u64,

    /// User agent sent with every status query
    pub user_agent: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10_000,
            min_timeout_ms: 2_000,
            not_found_checks: 20,
            request_timeout_seconds: 60,
            timeout_seconds: 1200,
            user_agent: concat!("lro-waiter/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::default();
        assert_eq!(defaults.poll_interval_ms, 10_000);
        assert_eq!(defaults.min_timeout_ms, 2_000);
        assert_eq!(defaults.not_found_checks, 20);
        assert_eq!(defaults.timeout_seconds, 1200);
        assert!(defaults.user_agent.starts_with("lro-waiter/"));
    }

    #[test]
    fn test_to_value() {
        let value = BuiltinDefaults::default().to_value();

        assert_eq!(value["poll_interval_ms"], 10_000);
        assert_eq!(value["request_timeout_seconds"], 60);
        assert!(value["user_agent"].is_string());
    }
}
