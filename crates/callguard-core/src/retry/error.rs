//! Error types for remote calls and policy construction.

use super::classify::ErrorCode;

/// Structured failure returned by a remote service.
///
/// Carries the operation that failed, the service's error code and its
/// message. The retry loop inspects only `code`; the rest rides along to the
/// caller untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("an error occurred ({code}) when calling the {operation} operation: {message}")]
pub struct ServiceError {
    pub operation: String,
    pub code: String,
    pub message: String,
}

impl ServiceError {
    pub fn new(
        operation: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

impl ErrorCode for ServiceError {
    fn error_code(&self) -> Option<&str> {
        Some(&self.code)
    }
}

/// Rejected policy parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("interval_seconds must be finite and >= 0 (got {0})")]
    Interval(f64),
    #[error("backoff_rate must be finite and > 0 (got {0})")]
    BackoffRate(f64),
    #[error("jitter must be in [0, 1) (got {0})")]
    Jitter(f64),
}
