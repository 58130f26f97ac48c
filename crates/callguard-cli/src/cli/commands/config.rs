//! `callguard config` – where the config lives and what it resolves to.

use anyhow::Result;
use callguard_core::config::{CallguardConfig, RetryConfig};
use std::io::Write;
use std::path::Path;

pub fn run_config(out: &mut impl Write, path: &Path, cfg: &CallguardConfig) -> Result<()> {
    let policy = cfg.policy()?;
    let resolved = CallguardConfig {
        retry: Some(RetryConfig::from_policy(&policy)),
        client: cfg.client.clone(),
    };
    writeln!(out, "# {}", path.display())?;
    write!(out, "{}", toml::to_string_pretty(&resolved)?)?;
    Ok(())
}
