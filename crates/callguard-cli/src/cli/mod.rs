//! CLI for inspecting callguard retry policies.

mod commands;

use anyhow::Result;
use callguard_core::config::{self, CallguardConfig};
use callguard_core::retry::{PolicyOverrides, RetryPolicy};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;

use commands::{run_classify, run_codes, run_config, run_delays};

/// Top-level CLI for callguard.
#[derive(Debug, Parser)]
#[command(name = "callguard")]
#[command(about = "callguard: inspect retry/backoff policies for remote-service clients", long_about = None)]
pub struct Cli {
    /// Read this config file instead of the XDG default.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List the error codes that are retried or ignored.
    Codes {
        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Print the decision (retry / ignore / propagate) for each error code.
    Classify {
        /// Error codes to classify.
        #[arg(required = true)]
        codes: Vec<String>,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Print a sample delay schedule.
    Delays {
        /// Number of attempts to show (default: max_retries).
        #[arg(long, value_name = "N")]
        attempts: Option<u32>,

        /// Seed the jitter source for a reproducible schedule.
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Show the config file location and the resolved policy.
    Config,
}

/// Per-invocation overrides layered on top of the configured policy.
#[derive(Debug, Default, Clone, Args)]
pub struct PolicyArgs {
    #[arg(long, value_name = "SECS")]
    pub interval_seconds: Option<f64>,
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,
    #[arg(long, value_name = "RATE")]
    pub backoff_rate: Option<f64>,
    #[arg(long, value_name = "FRACTION")]
    pub jitter: Option<f64>,
    #[arg(long, value_name = "N")]
    pub max_retries_before_backoff: Option<u32>,
    /// Extra retryable code (repeatable). Replaces the configured list.
    #[arg(long = "add", value_name = "CODE")]
    pub added_error_codes: Vec<String>,
    /// Code to ignore (repeatable). Replaces the configured list.
    #[arg(long = "ignore", value_name = "CODE")]
    pub ignore_error_codes: Vec<String>,
}

impl PolicyArgs {
    pub fn to_overrides(&self) -> PolicyOverrides {
        let list = |codes: &Vec<String>| (!codes.is_empty()).then(|| codes.clone());
        PolicyOverrides {
            interval_seconds: self.interval_seconds,
            max_retries: self.max_retries,
            backoff_rate: self.backoff_rate,
            jitter: self.jitter,
            max_retries_before_backoff: self.max_retries_before_backoff,
            added_error_codes: list(&self.added_error_codes),
            ignore_error_codes: list(&self.ignore_error_codes),
            jitter_source: None,
        }
    }

    /// Configured policy with these flags applied.
    pub fn resolve(&self, cfg: &CallguardConfig) -> Result<RetryPolicy> {
        Ok(cfg.policy()?.derive_with(&self.to_overrides())?)
    }
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        Cli::parse().run()
    }

    pub fn run(self) -> Result<()> {
        let path = match &self.config {
            Some(p) => p.clone(),
            None => config::config_path()?,
        };
        let cfg = config::load_or_init_at(&path)?;
        tracing::debug!("loaded config: {:?}", cfg);

        let mut out = io::stdout().lock();
        match self.command {
            CliCommand::Codes { policy } => run_codes(&mut out, &policy.resolve(&cfg)?)?,
            CliCommand::Classify { codes, policy } => {
                run_classify(&mut out, &policy.resolve(&cfg)?, &codes)?
            }
            CliCommand::Delays {
                attempts,
                seed,
                policy,
            } => run_delays(&mut out, &policy.resolve(&cfg)?, attempts, seed)?,
            CliCommand::Config => run_config(&mut out, &path, &cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
