//! Retry wrapper for remote calls.
//!
//! A failure budget is charged per failed attempt (more for invalid
//! requests). `tokio-retry2` drives the loop with a jittered exponential
//! schedule.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod policy;
mod retry;

pub use policy::{FailureBudget, RetryPolicy, RetryPolicyBuilder, RetryPolicyBuilderError};
pub use retry::{Attempt, RetryExhausted, retry_with_backoff};
