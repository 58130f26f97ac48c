//! Error-code extraction and the built-in table of retryable codes.

/// Codes signalling transient overload or connectivity failure.
///
/// Always retried unless the policy lists the code in its ignore set.
pub const DEFAULT_RETRY_ERROR_CODES: &[&str] = &[
    "ThrottlingException",
    "TooManyRequestsException",
    "ServiceUnavailableException",
    "RequestLimitExceeded",
    "RequestThrottled",
    "RequestThrottledException",
    "ProvisionedThroughputExceededException",
    "LimitExceededException",
    "EndpointConnectionError",
    "ConnectTimeoutError",
    "Unavailable",
    "InternalFailure",
    "InternalError",
];

/// A failure that may carry a machine-readable error code.
///
/// Only the code takes part in retry decisions. Failures without a code
/// (local I/O, serialization, etc.) are never retried or ignored.
pub trait ErrorCode {
    fn error_code(&self) -> Option<&str>;
}

impl<E: ErrorCode + ?Sized> ErrorCode for Box<E> {
    fn error_code(&self) -> Option<&str> {
        (**self).error_code()
    }
}

/// Whether `code` is in [`DEFAULT_RETRY_ERROR_CODES`].
pub fn is_default_retryable(code: &str) -> bool {
    DEFAULT_RETRY_ERROR_CODES.contains(&code)
}
