//! Wait errors and their exit-code taxonomy.

use std::time::Duration;

use lro_protocol::{DescriptorError, OperationError};

use crate::config::ConfigError;
use crate::transport::TransportError;

/// Errors returned by waiter construction, status queries and waits.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    #[error("Invalid operation descriptor: {0}")]
    InvalidDescriptor(#[from] DescriptorError),

    #[error("Unable to parse selfLink from LRO metadata")]
    SelfLinkUnparseable,

    #[error("Cannot query operation, it's unset or nil")]
    WaiterUnset,

    #[error("Cannot continue, unable to use operation: {0}")]
    InvalidOperation(#[source] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Error waiting for {activity}: error while retrieving operation: {source}")]
    Query {
        activity: String,
        #[source]
        source: Box<WaitError>,
    },

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error("Error waiting for {activity}: timeout while waiting for state to become '{target}' (last state: '{last_state}', timeout: {timeout:?})")]
    Timeout {
        activity: String,
        last_state: String,
        target: String,
        timeout: Duration,
    },

    #[error("Error waiting for {activity}: couldn't find resource ({retries} retries)")]
    NotFound { activity: String, retries: u32 },

    #[error("unexpected state '{state}', wanted target '{target}'")]
    UnexpectedState { state: String, target: String },

    #[error("`resource` not set in operation response")]
    MissingResponse,

    #[error("Failed to decode operation response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Failure kind for exit code mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Bad configuration (exit code 2)
    Config = 2,
    /// Malformed descriptor or misuse of a waiter (exit code 10)
    Descriptor = 10,
    /// Status endpoint unreachable or rejecting requests (exit code 20)
    Transport = 20,
    /// Operation finished with an error (exit code 40)
    Operation = 40,
    /// Operation finished without a usable payload (exit code 70)
    Response = 70,
    /// Deadline elapsed before the operation finished (exit code 80)
    Timeout = 80,
}

impl WaitError {
    /// Map error to failure kind for exit code
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            WaitError::Config(_) => FailureKind::Config,
            WaitError::InvalidDescriptor(_)
            | WaitError::SelfLinkUnparseable
            | WaitError::WaiterUnset => FailureKind::Descriptor,
            WaitError::Transport(_) | WaitError::NotFound { .. } => FailureKind::Transport,
            WaitError::Query { source, .. } => source.failure_kind(),
            WaitError::Operation(_)
            | WaitError::InvalidOperation(_)
            | WaitError::UnexpectedState { .. } => FailureKind::Operation,
            WaitError::MissingResponse | WaitError::Decode(_) => FailureKind::Response,
            WaitError::Timeout { .. } => FailureKind::Timeout,
        }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.failure_kind() as i32
    }
}

/// Result type for wait operations
pub type WaitResult<T> = Result<T, WaitError>;

#[cfg(test)]
mod tests {
    use super::*;
    use lro_protocol::ApiError;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            WaitError::SelfLinkUnparseable.to_string(),
            "Unable to parse selfLink from LRO metadata"
        );
        assert_eq!(
            WaitError::WaiterUnset.to_string(),
            "Cannot query operation, it's unset or nil"
        );
        assert_eq!(
            WaitError::MissingResponse.to_string(),
            "`resource` not set in operation response"
        );
    }

    #[test]
    fn test_operation_error_is_transparent() {
        let err = WaitError::from(OperationError::new(409, "conflict"));
        assert_eq!(err.to_string(), "Error code 409, message: conflict");
    }

    #[test]
    fn test_error_mapping() {
        let err = WaitError::Timeout {
            activity: "creating bucket".to_string(),
            last_state: "done: false".to_string(),
            target: "done: true".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(err.failure_kind(), FailureKind::Timeout);
        assert_eq!(err.exit_code(), 80);

        let err = WaitError::MissingResponse;
        assert_eq!(err.exit_code(), 70);

        let err = WaitError::Operation(OperationError::new(8, "quota"));
        assert_eq!(err.exit_code(), 40);
    }

    #[test]
    fn test_query_error_takes_source_kind() {
        let err = WaitError::Query {
            activity: "deleting bucket".to_string(),
            source: Box::new(WaitError::Transport(TransportError::Api(
                ApiError::from_response(500, b"boom"),
            ))),
        };
        assert_eq!(err.failure_kind(), FailureKind::Transport);
        assert!(err.to_string().starts_with("Error waiting for deleting bucket: error while retrieving operation:"));
    }
}
