//! Collaborator interfaces: the wrapped client and the factory that builds it.

use crate::retry::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a name resolves to on a client.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    /// Invocable; calls go through [`ServiceClient::invoke`].
    Operation,
    /// Plain value (region name, endpoint, metadata...). Returned as-is.
    Value(Value),
}

/// A remote-service client addressed by operation name.
///
/// Implementations report unknown names through their own error type so the
/// proxy never has to invent one.
pub trait ServiceClient {
    type Error: ErrorCode;

    fn resolve(&self, name: &str) -> Result<Member, Self::Error>;

    fn invoke(&self, operation: &str, args: &Value) -> Result<Value, Self::Error>;
}

/// Which service to build a client for, and under which session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientDescriptor {
    pub service: String,
    /// Named credentials profile; `None` = the factory's default session.
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl ClientDescriptor {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// Builds clients from descriptors. Opaque to the proxy.
pub trait ClientFactory {
    type Client: ServiceClient;
    type Error;

    fn build(&self, descriptor: &ClientDescriptor) -> Result<Self::Client, Self::Error>;
}
