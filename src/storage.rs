//! Storage operation waiter
//!
//! Waits on long-running operations returned by storage API calls. Each
//! operation is polled through its `selfLink`.

use std::time::Duration;

use log::debug;
use lro_protocol::OperationDescriptor;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::error::{WaitError, WaitResult};
use crate::operation::{operation_wait, CommonOperationWaiter, Pollable, WaitOptions};
use crate::transport::{send_request, SendRequestOptions};

/// Waiter bound to one in-flight storage operation
#[derive(Debug)]
pub struct StorageOperationWaiter<'a> {
    config: &'a Config,
    user_agent: String,
    self_link: String,
    common: CommonOperationWaiter,
}

impl StorageOperationWaiter<'_> {
    pub fn self_link(&self) -> &str {
        &self.self_link
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Latest status snapshot
    pub fn operation(&self) -> &CommonOperationWaiter {
        &self.common
    }
}

impl Pollable for StorageOperationWaiter<'_> {
    fn query_op(&self) -> WaitResult<Value> {
        let value = send_request(SendRequestOptions {
            config: self.config,
            method: "GET",
            raw_url: &self.self_link,
            user_agent: &self.user_agent,
        })?;
        Ok(value)
    }

    fn common(&self) -> &CommonOperationWaiter {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonOperationWaiter {
        &mut self.common
    }
}

/// Query an optional waiter handle.
///
/// An unset handle fails with [`WaitError::WaiterUnset`] instead of
/// panicking.
pub fn query_storage_op(waiter: Option<&StorageOperationWaiter<'_>>) -> WaitResult<Value> {
    waiter.ok_or(WaitError::WaiterUnset)?.query_op()
}

/// Build a waiter for the operation described by `op`.
///
/// Fails without touching the network when `selfLink` is missing or not a
/// string. The status snapshot is seeded from the descriptor itself.
pub fn create_storage_waiter<'a>(
    config: &'a Config,
    op: &OperationDescriptor,
    activity: &str,
    user_agent: &str,
) -> WaitResult<StorageOperationWaiter<'a>> {
    let self_link = op.self_link().ok_or(WaitError::SelfLinkUnparseable)?;

    let mut waiter = StorageOperationWaiter {
        config,
        user_agent: user_agent.to_string(),
        self_link: self_link.to_string(),
        common: CommonOperationWaiter::new(),
    };
    waiter.common.set_op(op.as_value())?;

    debug!("Waiting on {} via {}", activity, waiter.self_link);
    Ok(waiter)
}

/// Wait for the operation and decode its `response` payload into `T`.
///
/// Wait failures are returned as-is. A successful operation without a
/// payload fails with [`WaitError::MissingResponse`].
pub fn storage_operation_wait_time_with_response<T: DeserializeOwned>(
    config: &Config,
    op: &OperationDescriptor,
    activity: &str,
    user_agent: &str,
    timeout: Duration,
) -> WaitResult<T> {
    let mut waiter = create_storage_waiter(config, op, activity, user_agent)?;
    operation_wait(&mut waiter, activity, &WaitOptions::from_config(config, timeout))?;

    let raw_response = waiter.common.response_bytes();
    if raw_response.is_empty() {
        return Err(WaitError::MissingResponse);
    }
    serde_json::from_slice(raw_response).map_err(WaitError::Decode)
}

/// Wait for the operation to finish, ignoring any payload.
///
/// A descriptor without a `name` (or with an empty one) belongs to a call
/// the API already completed, so this returns at once.
pub fn storage_operation_wait_time(
    config: &Config,
    op: &OperationDescriptor,
    activity: &str,
    user_agent: &str,
    timeout: Duration,
) -> WaitResult<()> {
    if op.is_synchronous() {
        return Ok(());
    }

    let mut waiter = create_storage_waiter(config, op, activity, user_agent)?;
    operation_wait(&mut waiter, activity, &WaitOptions::from_config(config, timeout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde_json::json;
    use std::sync::Arc;

    const LINK: &str = "https://storage.googleapis.com/storage/v1/b/demo/operations/op-1";

    fn descriptor(value: Value) -> OperationDescriptor {
        OperationDescriptor::from_value(value).unwrap()
    }

    fn mock_config() -> (Arc<MockTransport>, Config) {
        let transport = Arc::new(MockTransport::new());
        let config = Config::new(transport.clone()).with_poll_interval(Duration::from_millis(1));
        (transport, config)
    }

    #[test]
    fn test_create_waiter_seeds_snapshot() {
        let (transport, config) = mock_config();
        let op = descriptor(json!({"name": "op-1", "selfLink": LINK, "done": false}));

        let waiter = create_storage_waiter(&config, &op, "creating bucket", "ua/1").unwrap();

        assert_eq!(waiter.self_link(), LINK);
        assert_eq!(waiter.user_agent(), "ua/1");
        assert_eq!(waiter.operation().op_name(), "op-1");
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_create_waiter_requires_string_self_link() {
        let (transport, config) = mock_config();

        for op in [json!({"name": "op-1"}), json!({"name": "op-1", "selfLink": 12})] {
            let err = create_storage_waiter(&config, &descriptor(op), "creating", "ua").unwrap_err();
            assert!(matches!(err, WaitError::SelfLinkUnparseable));
        }
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_create_waiter_propagates_seed_failure() {
        let (_, config) = mock_config();
        let op = descriptor(json!({"name": "op-1", "selfLink": LINK, "done": "no"}));

        let err = create_storage_waiter(&config, &op, "creating", "ua").unwrap_err();
        assert!(matches!(err, WaitError::InvalidOperation(_)));
    }

    #[test]
    fn test_query_issues_one_get() {
        let (transport, config) = mock_config();
        transport.push_operation(&json!({"name": "op-1", "done": false}));
        let op = descriptor(json!({"name": "op-1", "selfLink": LINK}));
        let waiter = create_storage_waiter(&config, &op, "creating", "ua/2").unwrap();

        let status = waiter.query_op().unwrap();

        assert_eq!(status["name"], "op-1");
        let seen = transport.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "GET");
        assert_eq!(seen[0].url, LINK);
        assert_eq!(seen[0].header("User-Agent"), Some("ua/2"));
        assert_eq!(waiter.operation().state(), "done: false");
    }

    #[test]
    fn test_query_unset_waiter() {
        let err = query_storage_op(None).unwrap_err();
        assert!(matches!(err, WaitError::WaiterUnset));
        assert_eq!(err.to_string(), "Cannot query operation, it's unset or nil");
    }

    #[test]
    fn test_query_set_waiter() {
        let (transport, config) = mock_config();
        transport.push_operation(&json!({"done": true}));
        let op = descriptor(json!({"name": "op-1", "selfLink": LINK}));
        let waiter = create_storage_waiter(&config, &op, "creating", "ua").unwrap();

        let status = query_storage_op(Some(&waiter)).unwrap();
        assert_eq!(status["done"], true);
    }

    #[test]
    fn test_wait_with_response_decodes_payload() {
        let (transport, config) = mock_config();
        transport.push_operation(&json!({"name": "op-1", "done": false}));
        transport.push_operation(&json!({"name": "op-1", "done": true, "response": {"a": 1}}));
        let op = descriptor(json!({"name": "op-1", "selfLink": LINK}));

        let out: serde_json::Map<String, Value> = storage_operation_wait_time_with_response(
            &config,
            &op,
            "creating",
            "ua",
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(out.get("a"), Some(&json!(1)));
        assert_eq!(transport.request_count(), 2);
    }

    #[test]
    fn test_wait_with_response_requires_payload() {
        let (transport, config) = mock_config();
        transport.push_operation(&json!({"name": "op-1", "done": true}));
        let op = descriptor(json!({"name": "op-1", "selfLink": LINK}));

        let result: WaitResult<Value> = storage_operation_wait_time_with_response(
            &config,
            &op,
            "creating",
            "ua",
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(WaitError::MissingResponse)));
    }

    #[test]
    fn test_wait_with_response_decode_error() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Bucket {
            name: String,
        }

        let (transport, config) = mock_config();
        transport.push_operation(&json!({"done": true, "response": {"name": 5}}));
        let op = descriptor(json!({"name": "op-1", "selfLink": LINK}));

        let result: WaitResult<Bucket> = storage_operation_wait_time_with_response(
            &config,
            &op,
            "creating",
            "ua",
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(WaitError::Decode(_))));
    }

    #[test]
    fn test_wait_without_name_is_synchronous() {
        let (transport, config) = mock_config();

        for op in [json!({}), json!({"name": ""}), json!({"name": "", "selfLink": LINK})] {
            storage_operation_wait_time(&config, &descriptor(op), "deleting", "ua", Duration::from_secs(1))
                .unwrap();
        }
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_wait_without_response_ignores_missing_payload() {
        let (transport, config) = mock_config();
        transport.push_operation(&json!({"name": "op-1", "done": true}));
        let op = descriptor(json!({"name": "op-1", "selfLink": LINK}));

        storage_operation_wait_time(&config, &op, "deleting", "ua", Duration::from_secs(5)).unwrap();
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn test_wait_without_response_requires_self_link() {
        let (transport, config) = mock_config();
        let op = descriptor(json!({"name": "op-1"}));

        let err = storage_operation_wait_time(&config, &op, "deleting", "ua", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, WaitError::SelfLinkUnparseable));
        assert_eq!(transport.request_count(), 0);
    }
}
