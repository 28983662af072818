//! LRO Protocol Types
//!
//! Defines the JSON shapes exchanged with an operation-status endpoint:
//! the descriptor returned by a mutating call, the operation snapshot
//! returned by each status query, and the API error envelope.

pub mod descriptor;
pub mod error;
pub mod operation;

pub use descriptor::{DescriptorError, OperationDescriptor};
pub use error::{ApiError, ApiErrorItem, OperationError};
pub use operation::CommonOperation;

/// State reported while an operation is still running.
pub const STATE_PENDING: &str = "done: false";

/// State reported once an operation reached a terminal state.
pub const STATE_DONE: &str = "done: true";
