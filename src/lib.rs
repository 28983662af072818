//! LRO Waiter - long-running operation poller
//!
//! Given the operation descriptor returned by a create/update/delete call,
//! polls the operation's status endpoint until it reaches a terminal state
//! and optionally decodes the result payload embedded in it.

pub mod config;
pub mod error;
pub mod operation;
pub mod storage;
pub mod timeout;
pub mod transport;

pub use config::{ClientSettings, Config, EffectiveConfig};
pub use error::{FailureKind, WaitError, WaitResult};
pub use lro_protocol::{CommonOperation, OperationDescriptor, OperationError};
pub use operation::{operation_wait, CommonOperationWaiter, Pollable, WaitOptions};
pub use storage::{
    create_storage_waiter, query_storage_op, storage_operation_wait_time,
    storage_operation_wait_time_with_response, StorageOperationWaiter,
};
pub use transport::{HttpTransport, MockTransport, Transport, TransportError};
