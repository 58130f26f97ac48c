//! `callguard delays` – sample the wait before each retry.

use anyhow::Result;
use callguard_core::retry::{PolicyOverrides, RetryPolicy, StdRngJitter};
use std::io::Write;
use std::sync::Arc;

/// One row per attempt: whether the retry after it waits, and for how long.
/// Retries up to the backoff threshold go out immediately.
pub fn run_delays(
    out: &mut impl Write,
    policy: &RetryPolicy,
    attempts: Option<u32>,
    seed: Option<u64>,
) -> Result<()> {
    let policy = match seed {
        Some(seed) => policy.derive_with(
            &PolicyOverrides::new().jitter_source(Arc::new(StdRngJitter::seeded(seed))),
        )?,
        None => policy.clone(),
    };
    let attempts = attempts.unwrap_or(policy.max_retries());

    writeln!(out, "{:<8} {:>10}", "ATTEMPT", "WAIT (s)")?;
    for attempt in 0..attempts {
        let wait = if policy.waits_before_retry(attempt) {
            format!("{:.3}", policy.delay_for(attempt).as_secs_f64())
        } else {
            "0 (immediate)".to_string()
        };
        writeln!(out, "{:<8} {:>10}", attempt, wait)?;
    }
    Ok(())
}
