//! Shared fixtures for operation wait tests

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use lro_waiter::{Config, MockTransport, OperationDescriptor};
use serde_json::Value;

/// Directory holding recorded operation payloads
pub fn operations_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/operations")
}

/// Load a recorded operation payload by file stem
pub fn load_operation(name: &str) -> Value {
    let path = operations_dir().join(format!("{}.json", name));
    let bytes = std::fs::read(&path).unwrap_or_else(|e| panic!("read {}: {}", path.display(), e));
    serde_json::from_slice(&bytes).unwrap()
}

pub fn descriptor(value: Value) -> OperationDescriptor {
    OperationDescriptor::from_value(value).unwrap()
}

/// A config over a fresh mock transport that polls every millisecond
pub fn mock_client() -> (Arc<MockTransport>, Config) {
    let transport = Arc::new(MockTransport::new());
    let config = Config::new(transport.clone()).with_poll_interval(Duration::from_millis(1));
    (transport, config)
}
