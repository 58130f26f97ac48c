//! Retry and backoff policy.
//!
//! This module holds error-code classification, the immutable retry policy
//! (backoff parameters, code sets, jitter source) and the blocking retry loop
//! so that the proxy and direct callers share one set of semantics.

mod classify;
mod error;
mod jitter;
mod policy;
mod run;

pub use classify::{is_default_retryable, ErrorCode, DEFAULT_RETRY_ERROR_CODES};
pub use error::{PolicyError, ServiceError};
pub use jitter::{FixedJitter, JitterSource, StdRngJitter};
pub use policy::{PolicyOverrides, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, run_with_retry_using, Sleeper, ThreadSleeper};
