//! Transport configuration handed to every waiter.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::BuiltinDefaults;
use crate::transport::{HttpTransport, Transport, TransportError};

/// Typed view of the merged configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub poll_interval_ms: u64,
    pub min_timeout_ms: u64,
    pub not_found_checks: u32,
    pub request_timeout_seconds: u64,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        let defaults = BuiltinDefaults::default();
        Self {
            poll_interval_ms: defaults.poll_interval_ms,
            min_timeout_ms: defaults.min_timeout_ms,
            not_found_checks: defaults.not_found_checks,
            request_timeout_seconds: defaults.request_timeout_seconds,
            timeout_seconds: defaults.timeout_seconds,
            user_agent: defaults.user_agent,
        }
    }
}

/// Transport configuration shared by all waiters of one client.
///
/// Carries the HTTP transport, the optional bearer token and the polling
/// cadence used by [`crate::operation::operation_wait`].
#[derive(Clone)]
pub struct Config {
    pub poll_interval: Duration,
    pub min_timeout: Duration,
    pub not_found_checks: u32,
    access_token: Option<String>,
    transport: Arc<dyn Transport>,
}

impl Config {
    /// Create a config with default cadence over the given transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_settings(&ClientSettings::default(), transport)
    }

    /// Create a config from settings over the given transport
    pub fn with_settings(settings: &ClientSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            min_timeout: Duration::from_millis(settings.min_timeout_ms),
            not_found_checks: settings.not_found_checks,
            access_token: None,
            transport,
        }
    }

    /// Create a config backed by a real HTTPS transport
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, TransportError> {
        let transport =
            HttpTransport::new(Duration::from_secs(settings.request_timeout_seconds))?;
        Ok(Self::with_settings(settings, Arc::new(transport)))
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("poll_interval", &self.poll_interval)
            .field("min_timeout", &self.min_timeout)
            .field("not_found_checks", &self.not_found_checks)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}
