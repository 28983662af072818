//! Error payloads carried by the remote service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation-level error embedded in a terminal operation snapshot.
///
/// Mirrors the `google.rpc.Status` shape: a numeric code, a single-line
/// message and optional machine-readable details.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperationError {
    /// Canonical error code.
    #[serde(default)]
    pub code: i64,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Structured details, passed through untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<serde_json::Value>,
}

impl OperationError {
    /// Create a new operation error.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Vec::new(),
        }
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error code {}, message: {}", self.code, self.message)
    }
}

impl std::error::Error for OperationError {}

/// One entry of the `errors` list in an API error envelope.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiErrorItem {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
}

/// Error returned by the API for a non-2xx HTTP response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status code.
    pub code: u16,
    /// Message from the envelope, or the raw body when it had none.
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiErrorItem>,
}

#[derive(Deserialize)]
struct Envelope {
    error: EnvelopeBody,
}

#[derive(Deserialize)]
struct EnvelopeBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

impl ApiError {
    /// Build an error from an HTTP status and response body.
    ///
    /// Decodes the `{"error": {...}}` envelope when present; otherwise the
    /// body text becomes the message.
    pub fn from_response(code: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<Envelope>(body) {
            Ok(envelope) => Self {
                code,
                message: envelope.error.message,
                errors: envelope.error.errors,
            },
            Err(_) => Self {
                code,
                message: String::from_utf8_lossy(body).trim().to_string(),
                errors: Vec::new(),
            },
        }
    }

    /// True for a 404 response.
    pub fn is_not_found(&self) -> bool {
        self.code == 404
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "googleapi: Error {}: {}", self.code, self.message)?;
        for item in &self.errors {
            if !item.reason.is_empty() {
                write!(f, ", {}", item.reason)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_error_display() {
        let err = OperationError::new(409, "bucket already exists");
        assert_eq!(err.to_string(), "Error code 409, message: bucket already exists");
    }

    #[test]
    fn test_api_error_from_envelope() {
        let body = br#"{"error": {"code": 403, "message": "denied", "errors": [{"reason": "forbidden", "message": "denied"}]}}"#;
        let err = ApiError::from_response(403, body);
        assert_eq!(err.code, 403);
        assert_eq!(err.message, "denied");
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.to_string(), "googleapi: Error 403: denied, forbidden");
    }

    #[test]
    fn test_api_error_from_plain_body() {
        let err = ApiError::from_response(502, b"Bad Gateway\n");
        assert_eq!(err.message, "Bad Gateway");
        assert!(err.errors.is_empty());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found() {
        assert!(ApiError::from_response(404, b"").is_not_found());
    }
}
