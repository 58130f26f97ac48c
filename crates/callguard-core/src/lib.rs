pub mod config;
pub mod logging;

pub mod proxy;
pub mod retry;

pub use proxy::{ClientDescriptor, ClientFactory, Member, Reply, RetryProxy, ServiceClient};
pub use retry::{
    run_with_retry, ErrorCode, PolicyError, PolicyOverrides, RetryDecision, RetryPolicy,
    ServiceError,
};
