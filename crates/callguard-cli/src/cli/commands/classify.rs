//! `callguard classify <CODE>...` – show what the policy does with each code.

use anyhow::Result;
use callguard_core::retry::RetryPolicy;
use std::io::Write;

pub fn run_classify(out: &mut impl Write, policy: &RetryPolicy, codes: &[String]) -> Result<()> {
    let width = codes.iter().map(String::len).max().unwrap_or(0).max(4);
    writeln!(out, "{:<width$}  DECISION", "CODE")?;
    for code in codes {
        writeln!(out, "{:<width$}  {}", code, policy.classify(code))?;
    }
    Ok(())
}
