//! Operation descriptors returned by mutating API calls.

use serde_json::{Map, Value};

/// Errors raised while validating a descriptor.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("operation descriptor must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("operation descriptor is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Descriptor of an operation, validated once at the boundary.
///
/// A present `name` means the call is asynchronous; an absent or empty one
/// means the API already completed it. `selfLink` is only kept when it is a
/// string. The original object is retained to seed the status snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    name: Option<String>,
    self_link: Option<String>,
    raw: Value,
}

impl OperationDescriptor {
    /// Validate a JSON value as a descriptor.
    pub fn from_value(value: Value) -> Result<Self, DescriptorError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(DescriptorError::NotAnObject(json_type_name(&other))),
        }
    }

    /// Parse and validate a descriptor from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DescriptorError> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// Build a descriptor from an already-decoded object.
    pub fn from_map(map: Map<String, Value>) -> Self {
        // Any present value other than "" names an operation.
        let name = map.get("name").map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        let self_link = map
            .get("selfLink")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            name,
            self_link,
            raw: Value::Object(map),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn self_link(&self) -> Option<&str> {
        self.self_link.as_deref()
    }

    /// True when the call finished synchronously and there is nothing to poll.
    pub fn is_synchronous(&self) -> bool {
        self.name.as_deref().map_or(true, str::is_empty)
    }

    /// The descriptor exactly as received.
    pub fn as_value(&self) -> &Value {
        &self.raw
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_async_descriptor() {
        let desc = OperationDescriptor::from_value(json!({
            "name": "op-123",
            "selfLink": "https://storage.example.com/b/bucket/operations/op-123"
        }))
        .unwrap();

        assert_eq!(desc.name(), Some("op-123"));
        assert_eq!(
            desc.self_link(),
            Some("https://storage.example.com/b/bucket/operations/op-123")
        );
        assert!(!desc.is_synchronous());
    }

    #[test]
    fn test_missing_or_empty_name_is_synchronous() {
        let missing = OperationDescriptor::from_value(json!({"selfLink": "https://x"})).unwrap();
        assert!(missing.is_synchronous());

        let empty = OperationDescriptor::from_value(json!({"name": ""})).unwrap();
        assert!(empty.is_synchronous());
    }

    #[test]
    fn test_non_string_name_is_asynchronous() {
        let desc = OperationDescriptor::from_value(json!({"name": 42})).unwrap();
        assert_eq!(desc.name(), Some("42"));
        assert!(!desc.is_synchronous());
    }

    #[test]
    fn test_non_string_self_link_is_dropped() {
        let desc = OperationDescriptor::from_value(json!({"name": "op", "selfLink": 7})).unwrap();
        assert_eq!(desc.self_link(), None);
        assert_eq!(desc.as_value()["selfLink"], 7);
    }

    #[test]
    fn test_rejects_non_object() {
        let err = OperationDescriptor::from_value(json!(["op"])).unwrap_err();
        assert!(matches!(err, DescriptorError::NotAnObject("array")));

        assert!(matches!(
            OperationDescriptor::from_slice(b"{not json"),
            Err(DescriptorError::Json(_))
        ));
    }
}
