//! `callguard codes` – list retried and ignored error codes.

use anyhow::Result;
use callguard_core::retry::{RetryPolicy, DEFAULT_RETRY_ERROR_CODES};
use std::io::Write;

pub fn run_codes(out: &mut impl Write, policy: &RetryPolicy) -> Result<()> {
    writeln!(out, "built-in retryable:")?;
    for code in DEFAULT_RETRY_ERROR_CODES {
        writeln!(out, "  {code}")?;
    }
    let added: Vec<&str> = policy.added_error_codes().collect();
    if !added.is_empty() {
        writeln!(out, "added retryable:")?;
        for code in added {
            writeln!(out, "  {code}")?;
        }
    }
    let ignored: Vec<&str> = policy.ignore_error_codes().collect();
    if !ignored.is_empty() {
        writeln!(out, "ignored (takes precedence):")?;
        for code in ignored {
            writeln!(out, "  {code}")?;
        }
    }
    Ok(())
}
