//! Operation status snapshot.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::OperationError;
use crate::{STATE_DONE, STATE_PENDING};

/// Status of one long-running operation as reported by the service.
///
/// Unknown fields (`kind`, `selfLink`, `metadata`, ...) are ignored. The
/// `response` payload is kept as raw JSON so callers decide its type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommonOperation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Box<RawValue>>,
}

impl CommonOperation {
    /// Decode a snapshot from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Polling state label for this snapshot.
    pub fn state(&self) -> &'static str {
        if self.done {
            STATE_DONE
        } else {
            STATE_PENDING
        }
    }

    /// Raw bytes of the `response` payload; empty when absent.
    pub fn response_bytes(&self) -> &[u8] {
        self.response
            .as_deref()
            .map(|raw| raw.get().as_bytes())
            .unwrap_or_default()
    }
}
