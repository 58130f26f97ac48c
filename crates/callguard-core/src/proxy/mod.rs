//! Call-intercepting proxy.
//!
//! `RetryProxy` wraps a shared client and routes every operation through the
//! retry loop in [`crate::retry`]. Plain members pass straight through.
//! Derived proxies (`with_options`) share the same client `Arc`; the proxy
//! adds no locking of its own.

mod client;

pub use client::{ClientDescriptor, ClientFactory, Member, ServiceClient};

use crate::retry::{
    run_with_retry_using, ErrorCode, PolicyError, PolicyOverrides, RetryPolicy, Sleeper,
    ThreadSleeper,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Result of a proxied call.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Operation response, or the value of a non-invocable member.
    Value(Value),
    /// The failure's code was in the ignore set.
    Empty,
}

impl Reply {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Reply::Value(v) => Some(v),
            Reply::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Reply::Empty)
    }
}

pub struct RetryProxy<C> {
    client: Arc<C>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl<C> Clone for RetryProxy<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            policy: self.policy.clone(),
            sleeper: Arc::clone(&self.sleeper),
        }
    }
}

impl<C> fmt::Debug for RetryProxy<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryProxy")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<C> RetryProxy<C> {
    pub fn new(client: C, policy: RetryPolicy) -> Self {
        Self::from_shared(Arc::new(client), policy)
    }

    /// Wrap a client that is already shared elsewhere.
    pub fn from_shared(client: Arc<C>, policy: RetryPolicy) -> Self {
        Self {
            client,
            policy,
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Build the client through `factory`, then wrap it.
    pub fn connect<F>(
        factory: &F,
        descriptor: &ClientDescriptor,
        policy: RetryPolicy,
    ) -> Result<Self, F::Error>
    where
        F: ClientFactory<Client = C>,
    {
        let client = factory.build(descriptor)?;
        tracing::debug!(service = %descriptor.service, "built client for retry proxy");
        Ok(Self::new(client, policy))
    }

    /// Replace the blocking sleeper (e.g. to record waits in tests).
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sibling proxy over the same client with a derived policy.
    pub fn with_options(&self, overrides: &PolicyOverrides) -> Result<Self, PolicyError> {
        Ok(Self {
            client: Arc::clone(&self.client),
            policy: self.policy.derive_with(overrides)?,
            sleeper: Arc::clone(&self.sleeper),
        })
    }

    /// Scoped use of the proxy. Nothing is acquired or released.
    pub fn scope<R>(&self, f: impl FnOnce(&Self) -> R) -> R {
        f(self)
    }

    /// Typed forwarding: run `f` against the client inside the retry loop.
    /// `Ok(None)` means the failure was ignored.
    pub fn run<T, E, F>(&self, mut f: F) -> Result<Option<T>, E>
    where
        E: ErrorCode,
        F: FnMut(&C) -> Result<T, E>,
    {
        let client = &*self.client;
        run_with_retry_using(&self.policy, self.sleeper.as_ref(), || f(client))
    }
}

impl<C: ServiceClient> RetryProxy<C> {
    /// Resolve `name` on the client. Operations run inside the retry loop;
    /// plain values are returned without touching it.
    pub fn call(&self, name: &str, args: &Value) -> Result<Reply, C::Error> {
        match self.client.resolve(name)? {
            Member::Value(v) => {
                tracing::trace!(member = name, "non-invocable member, passing through");
                Ok(Reply::Value(v))
            }
            Member::Operation => {
                let out = self.run(|client| client.invoke(name, args))?;
                Ok(out.map_or(Reply::Empty, Reply::Value))
            }
        }
    }
}
