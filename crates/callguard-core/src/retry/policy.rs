use super::classify::{is_default_retryable, ErrorCode, DEFAULT_RETRY_ERROR_CODES};
use super::error::PolicyError;
use super::jitter::{JitterSource, StdRngJitter};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// What to do with a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try the call again (subject to the retry budget).
    Retry,
    /// Swallow the failure and return an empty success.
    Ignore,
    /// Hand the failure back to the caller unchanged.
    Propagate,
}

impl fmt::Display for RetryDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RetryDecision::Retry => "retry",
            RetryDecision::Ignore => "ignore",
            RetryDecision::Propagate => "propagate",
        };
        f.write_str(s)
    }
}

/// Partial set of policy fields used to derive a new policy.
///
/// `None` means "inherit from the parent"; `Some(0)`, `Some(0.0)` and
/// `Some(vec![])` are explicit values.
#[derive(Debug, Clone, Default)]
pub struct PolicyOverrides {
    pub interval_seconds: Option<f64>,
    pub max_retries: Option<u32>,
    pub backoff_rate: Option<f64>,
    pub jitter: Option<f64>,
    pub max_retries_before_backoff: Option<u32>,
    pub added_error_codes: Option<Vec<String>>,
    pub ignore_error_codes: Option<Vec<String>>,
    pub jitter_source: Option<Arc<dyn JitterSource>>,
}

impl PolicyOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interval_seconds(mut self, secs: f64) -> Self {
        self.interval_seconds = Some(secs);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    pub fn backoff_rate(mut self, rate: f64) -> Self {
        self.backoff_rate = Some(rate);
        self
    }

    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter);
        self
    }

    pub fn max_retries_before_backoff(mut self, n: u32) -> Self {
        self.max_retries_before_backoff = Some(n);
        self
    }

    pub fn added_error_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.added_error_codes = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn ignore_error_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_error_codes = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn jitter_source(mut self, source: Arc<dyn JitterSource>) -> Self {
        self.jitter_source = Some(source);
        self
    }
}

/// Immutable retry/backoff policy.
///
/// Holds the backoff parameters, the caller-supplied code sets and the
/// random source used for jitter. Built-in retryable codes are not copied in;
/// they are consulted at classification time.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    interval_seconds: f64,
    max_retries: u32,
    backoff_rate: f64,
    jitter: f64,
    max_retries_before_backoff: u32,
    added_error_codes: BTreeSet<String>,
    ignore_error_codes: BTreeSet<String>,
    jitter_source: Arc<dyn JitterSource>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval_seconds: 0.2,
            max_retries: 3,
            backoff_rate: 2.0,
            jitter: 0.5,
            max_retries_before_backoff: 0,
            added_error_codes: BTreeSet::new(),
            ignore_error_codes: BTreeSet::new(),
            jitter_source: Arc::new(StdRngJitter::from_entropy()),
        }
    }
}

/// Compares configuration only; the jitter source has no identity.
impl PartialEq for RetryPolicy {
    fn eq(&self, other: &Self) -> bool {
        self.interval_seconds == other.interval_seconds
            && self.max_retries == other.max_retries
            && self.backoff_rate == other.backoff_rate
            && self.jitter == other.jitter
            && self.max_retries_before_backoff == other.max_retries_before_backoff
            && self.added_error_codes == other.added_error_codes
            && self.ignore_error_codes == other.ignore_error_codes
    }
}

impl RetryPolicy {
    /// Defaults overlaid with `overrides`.
    pub fn new(overrides: &PolicyOverrides) -> Result<Self, PolicyError> {
        Self::default().derive_with(overrides)
    }

    /// New policy with `overrides` applied on top of `self`. `self` is untouched.
    pub fn derive_with(&self, overrides: &PolicyOverrides) -> Result<Self, PolicyError> {
        let codes = |o: &Option<Vec<String>>, parent: &BTreeSet<String>| match o {
            Some(list) => list.iter().cloned().collect(),
            None => parent.clone(),
        };
        let policy = Self {
            interval_seconds: overrides.interval_seconds.unwrap_or(self.interval_seconds),
            max_retries: overrides.max_retries.unwrap_or(self.max_retries),
            backoff_rate: overrides.backoff_rate.unwrap_or(self.backoff_rate),
            jitter: overrides.jitter.unwrap_or(self.jitter),
            max_retries_before_backoff: overrides
                .max_retries_before_backoff
                .unwrap_or(self.max_retries_before_backoff),
            added_error_codes: codes(&overrides.added_error_codes, &self.added_error_codes),
            ignore_error_codes: codes(&overrides.ignore_error_codes, &self.ignore_error_codes),
            jitter_source: overrides
                .jitter_source
                .clone()
                .unwrap_or_else(|| Arc::clone(&self.jitter_source)),
        };
        policy.validate()?;
        Ok(policy)
    }

    fn validate(&self) -> Result<(), PolicyError> {
        if !self.interval_seconds.is_finite() || self.interval_seconds < 0.0 {
            return Err(PolicyError::Interval(self.interval_seconds));
        }
        if !self.backoff_rate.is_finite() || self.backoff_rate <= 0.0 {
            return Err(PolicyError::BackoffRate(self.backoff_rate));
        }
        if !(0.0..1.0).contains(&self.jitter) {
            return Err(PolicyError::Jitter(self.jitter));
        }
        Ok(())
    }

    pub fn interval_seconds(&self) -> f64 {
        self.interval_seconds
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff_rate(&self) -> f64 {
        self.backoff_rate
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    pub fn max_retries_before_backoff(&self) -> u32 {
        self.max_retries_before_backoff
    }

    pub fn added_error_codes(&self) -> impl Iterator<Item = &str> {
        self.added_error_codes.iter().map(String::as_str)
    }

    pub fn ignore_error_codes(&self) -> impl Iterator<Item = &str> {
        self.ignore_error_codes.iter().map(String::as_str)
    }

    /// Built-in and added retryable codes, without de-duplication.
    pub fn retryable_codes(&self) -> impl Iterator<Item = &str> {
        DEFAULT_RETRY_ERROR_CODES
            .iter()
            .copied()
            .chain(self.added_error_codes())
    }

    /// Ignore wins over retry: a code in both sets is ignored.
    pub fn classify(&self, code: &str) -> RetryDecision {
        if self.ignore_error_codes.contains(code) {
            RetryDecision::Ignore
        } else if self.added_error_codes.contains(code) || is_default_retryable(code) {
            RetryDecision::Retry
        } else {
            RetryDecision::Propagate
        }
    }

    /// Classify a failure by its code; code-less failures propagate.
    pub fn classify_error<E: ErrorCode + ?Sized>(&self, err: &E) -> RetryDecision {
        err.error_code()
            .map_or(RetryDecision::Propagate, |code| self.classify(code))
    }

    /// Whether a retryable failure on 0-based `attempt` may be retried.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Whether the retry after `attempt` waits. Retries up to the backoff
    /// threshold go out immediately.
    pub fn waits_before_retry(&self, attempt: u32) -> bool {
        attempt > self.max_retries_before_backoff
    }

    /// Jittered delay for `attempt`. Each call draws a fresh jitter factor
    /// from `[1 - jitter, 1 + jitter]`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let growth = if attempt <= self.max_retries_before_backoff {
            1.0
        } else {
            self.backoff_rate
                .powf(f64::from(attempt - self.max_retries_before_backoff))
        };
        let factor = self
            .jitter_source
            .sample(1.0 - self.jitter, 1.0 + self.jitter);
        secs_to_duration(self.interval_seconds * growth * factor)
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    if !(secs > 0.0) {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
