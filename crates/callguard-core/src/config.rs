use crate::proxy::{ClientDescriptor, ClientFactory, RetryProxy};
use crate::retry::{PolicyOverrides, RetryPolicy};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Retry policy parameters (`[retry]` in config.toml).
///
/// Every key is optional; a missing key keeps the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Initial delay in seconds (e.g. 0.2 = 200ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<f64>,
    /// Retries after the first failed call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Multiplier applied per attempt once backoff is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_rate: Option<f64>,
    /// Fractional jitter in [0, 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<f64>,
    /// Retries that go out immediately before exponential backoff starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries_before_backoff: Option<u32>,
    /// Codes retried in addition to the built-in table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_error_codes: Option<Vec<String>>,
    /// Codes swallowed into an empty success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_error_codes: Option<Vec<String>>,
}

impl RetryConfig {
    /// Fully-populated section mirroring `policy`.
    pub fn from_policy(policy: &RetryPolicy) -> Self {
        Self {
            interval_seconds: Some(policy.interval_seconds()),
            max_retries: Some(policy.max_retries()),
            backoff_rate: Some(policy.backoff_rate()),
            jitter: Some(policy.jitter()),
            max_retries_before_backoff: Some(policy.max_retries_before_backoff()),
            added_error_codes: Some(policy.added_error_codes().map(String::from).collect()),
            ignore_error_codes: Some(policy.ignore_error_codes().map(String::from).collect()),
        }
    }

    pub fn to_overrides(&self) -> PolicyOverrides {
        PolicyOverrides {
            interval_seconds: self.interval_seconds,
            max_retries: self.max_retries,
            backoff_rate: self.backoff_rate,
            jitter: self.jitter,
            max_retries_before_backoff: self.max_retries_before_backoff,
            added_error_codes: self.added_error_codes.clone(),
            ignore_error_codes: self.ignore_error_codes.clone(),
            jitter_source: None,
        }
    }

    pub fn to_policy(&self) -> Result<RetryPolicy> {
        RetryPolicy::new(&self.to_overrides()).context("invalid [retry] section")
    }
}

/// Global configuration loaded from `~/.config/callguard/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallguardConfig {
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional client to build when no client instance is supplied.
    #[serde(default)]
    pub client: Option<ClientDescriptor>,
}

impl CallguardConfig {
    pub fn policy(&self) -> Result<RetryPolicy> {
        match &self.retry {
            Some(retry) => retry.to_policy(),
            None => Ok(RetryPolicy::default()),
        }
    }

    /// Build the `[client]` through `factory` and wrap it with the configured policy.
    pub fn connect<F>(&self, factory: &F) -> Result<RetryProxy<F::Client>>
    where
        F: ClientFactory,
        F::Error: fmt::Display,
    {
        let descriptor = self
            .client
            .as_ref()
            .context("no [client] section in config")?;
        let policy = self.policy()?;
        RetryProxy::connect(factory, descriptor, policy)
            .map_err(|e| anyhow!("building {} client: {e}", descriptor.service))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("callguard")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CallguardConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

pub fn load_or_init_at(path: &Path) -> Result<CallguardConfig> {
    if !path.exists() {
        let default_cfg = CallguardConfig {
            retry: Some(RetryConfig::from_policy(&RetryPolicy::default())),
            client: None,
        };
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(path)
}

pub fn load_from(path: &Path) -> Result<CallguardConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg: CallguardConfig =
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}
