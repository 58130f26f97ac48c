//! Scripted service client for integration tests.
//!
//! Each operation has a queue of canned outcomes. A call pops the next one;
//! once the queue has a single entry left it is repeated forever, so
//! "always fails with X" needs only one entry. Calls are counted per operation.

use callguard_core::proxy::{ClientDescriptor, ClientFactory, Member, ServiceClient};
use callguard_core::retry::{ServiceError, Sleeper};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct StubClient {
    operations: Mutex<HashMap<String, VecDeque<Result<Value, ServiceError>>>>,
    attributes: HashMap<String, Value>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: &str, value: Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    pub fn add_response(self, operation: &str, response: Value) -> Self {
        self.push(operation, Ok(response));
        self
    }

    pub fn add_client_error(self, operation: &str, code: &str) -> Self {
        self.push(
            operation,
            Err(ServiceError::new(operation, code, format!("stubbed {code}"))),
        );
        self
    }

    fn push(&self, operation: &str, outcome: Result<Value, ServiceError>) {
        self.operations
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .push_back(outcome);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }
}

impl ServiceClient for StubClient {
    type Error = ServiceError;

    fn resolve(&self, name: &str) -> Result<Member, ServiceError> {
        if let Some(v) = self.attributes.get(name) {
            return Ok(Member::Value(v.clone()));
        }
        if self.operations.lock().unwrap().contains_key(name) {
            return Ok(Member::Operation);
        }
        Err(ServiceError::new(name, "UnknownOperation", "no stub registered"))
    }

    fn invoke(&self, operation: &str, _args: &Value) -> Result<Value, ServiceError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default() += 1;
        let mut ops = self.operations.lock().unwrap();
        let queue = ops.get_mut(operation).expect("operation resolved before invoke");
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        }
    }
}

/// Factory that hands out an empty stub and remembers what it was asked for.
#[derive(Default)]
pub struct StubFactory {
    pub requested: Mutex<Vec<ClientDescriptor>>,
}

impl ClientFactory for StubFactory {
    type Client = StubClient;
    type Error = String;

    fn build(&self, descriptor: &ClientDescriptor) -> Result<StubClient, String> {
        if descriptor.service.is_empty() {
            return Err("service name required".to_string());
        }
        self.requested.lock().unwrap().push(descriptor.clone());
        Ok(StubClient::new().with_attribute(
            "region",
            Value::from(descriptor.region.clone().unwrap_or_else(|| "us-east-1".into())),
        ))
    }
}

/// Records requested waits instead of blocking.
#[derive(Default)]
pub struct RecordingSleeper(Mutex<Vec<Duration>>);

impl RecordingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.0.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, d: Duration) {
        self.0.lock().unwrap().push(d);
    }
}
