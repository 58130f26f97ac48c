//! Retry loop: run a closure until success, an ignored failure, or the policy says stop.

use super::classify::ErrorCode;
use super::policy::{RetryDecision, RetryPolicy};
use std::time::Duration;

/// Blocks the calling thread between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, d: Duration);
}

/// `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Runs `f` under `policy`, sleeping on the current thread between attempts.
///
/// Returns `Ok(Some(v))` on success, `Ok(None)` when the failure's code is in
/// the policy's ignore set, and the last failure itself (never wrapped) when
/// it is not retryable or the retry budget is spent.
pub fn run_with_retry<T, E, F>(policy: &RetryPolicy, f: F) -> Result<Option<T>, E>
where
    E: ErrorCode,
    F: FnMut() -> Result<T, E>,
{
    run_with_retry_using(policy, &ThreadSleeper, f)
}

/// Same as [`run_with_retry`] with an explicit sleeper.
pub fn run_with_retry_using<T, E, F>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut f: F,
) -> Result<Option<T>, E>
where
    E: ErrorCode,
    F: FnMut() -> Result<T, E>,
{
    let mut attempt = 0u32;
    loop {
        match f() {
            Ok(v) => return Ok(Some(v)),
            Err(e) => match policy.classify_error(&e) {
                RetryDecision::Ignore => return Ok(None),
                RetryDecision::Retry if policy.allows_retry(attempt) => {
                    let delay = if policy.waits_before_retry(attempt) {
                        policy.delay_for(attempt)
                    } else {
                        Duration::ZERO
                    };
                    tracing::debug!(
                        attempt,
                        code = e.error_code().unwrap_or_default(),
                        delay_ms = delay.as_millis() as u64,
                        "retryable failure, retrying"
                    );
                    if !delay.is_zero() {
                        sleeper.sleep(delay);
                    }
                    attempt += 1;
                }
                _ => return Err(e),
            },
        }
    }
}
