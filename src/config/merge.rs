//! Layer merging
//!
//! - Objects: deep-merge by key
//! - Arrays: replaced by the later layer
//! - Scalars and null: later layer wins

use serde_json::Value;

/// Deep merge `overlay` on top of `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let next = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, next);
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay,
    }
}

/// Merge layers in order; the last layer has the highest precedence
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(json!({"poll_interval_ms": 10000}), json!({"poll_interval_ms": 500}));
        assert_eq!(result["poll_interval_ms"], 500);
    }

    #[test]
    fn test_nested_objects_merge() {
        let base = json!({"headers": {"x-goog-user-project": "a", "x-trace": "1"}});
        let overlay = json!({"headers": {"x-goog-user-project": "b"}});
        let result = deep_merge(base, overlay);

        assert_eq!(result["headers"]["x-goog-user-project"], "b");
        assert_eq!(result["headers"]["x-trace"], "1");
    }

    #[test]
    fn test_array_replaced() {
        let result = deep_merge(json!({"scopes": ["a", "b"]}), json!({"scopes": ["c"]}));
        assert_eq!(result["scopes"], json!(["c"]));
    }

    #[test]
    fn test_null_override() {
        let result = deep_merge(json!({"user_agent": "x"}), json!({"user_agent": null}));
        assert!(result["user_agent"].is_null());
    }

    #[test]
    fn test_merge_layers_precedence() {
        let builtin = json!({"poll_interval_ms": 10000, "timeout_seconds": 1200});
        let host = json!({"poll_interval_ms": 5000});
        let file = json!({"timeout_seconds": 600});
        let cli = json!({"poll_interval_ms": 250});

        let result = merge_layers(vec![builtin, host, file, cli]);

        assert_eq!(result["poll_interval_ms"], 250);
        assert_eq!(result["timeout_seconds"], 600);
    }
}
