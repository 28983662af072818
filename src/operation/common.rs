//! Status bookkeeping shared by every operation waiter.

use lro_protocol::{CommonOperation, OperationError, STATE_DONE, STATE_PENDING};
use serde_json::Value;

use crate::error::{WaitError, WaitResult};

/// Latest known status of one operation.
#[derive(Debug, Clone, Default)]
pub struct CommonOperationWaiter {
    op: CommonOperation,
}

impl CommonOperationWaiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with a status payload.
    ///
    /// The payload is re-encoded and decoded so the raw `response` bytes are
    /// captured exactly. On failure the previous snapshot is kept.
    pub fn set_op(&mut self, op: &Value) -> WaitResult<()> {
        let bytes = serde_json::to_vec(op).map_err(WaitError::InvalidOperation)?;
        self.op = CommonOperation::from_slice(&bytes).map_err(WaitError::InvalidOperation)?;
        Ok(())
    }

    pub fn op(&self) -> &CommonOperation {
        &self.op
    }

    pub fn op_name(&self) -> &str {
        &self.op.name
    }

    pub fn state(&self) -> &'static str {
        self.op.state()
    }

    pub fn error(&self) -> Option<&OperationError> {
        self.op.error.as_ref()
    }

    pub fn pending_states(&self) -> &'static [&'static str] {
        &[STATE_PENDING]
    }

    pub fn target_states(&self) -> &'static [&'static str] {
        &[STATE_DONE]
    }

    /// Raw bytes of the final payload; empty when the operation carried none
    pub fn response_bytes(&self) -> &[u8] {
        self.op.response_bytes()
    }
}
