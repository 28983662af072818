//! Generic long-running operation handling
//!
//! [`CommonOperationWaiter`] holds the latest status snapshot of one
//! operation. Resource families wrap it and implement [`Pollable`] with their
//! own status query; [`operation_wait`] drives any `Pollable` to completion.

mod common;
mod wait;

pub use common::CommonOperationWaiter;
pub use wait::{operation_done, operation_wait, Pollable, WaitOptions};
