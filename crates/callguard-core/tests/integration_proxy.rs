//! Integration test: retry proxy over a scripted client.
//!
//! Drives the proxy the way an application would (named operations with JSON
//! args) and checks call counts, waits and the exact error handed back.

mod common;

use callguard_core::proxy::{ClientDescriptor, Reply, RetryProxy};
use callguard_core::retry::{FixedJitter, PolicyOverrides, RetryPolicy, ServiceError};
use common::stub_client::{RecordingSleeper, StubClient, StubFactory};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn policy(overrides: PolicyOverrides) -> RetryPolicy {
    RetryPolicy::new(&overrides.jitter_source(Arc::new(FixedJitter::midpoint()))).unwrap()
}

fn proxy(client: StubClient, overrides: PolicyOverrides) -> (RetryProxy<StubClient>, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let proxy = RetryProxy::new(client, policy(overrides)).with_sleeper(sleeper.clone());
    (proxy, sleeper)
}

#[test]
fn success_passes_response_through() {
    let client = StubClient::new().add_response("list_buckets", json!({"Buckets": []}));
    let (proxy, sleeper) = proxy(client, PolicyOverrides::new());

    let reply = proxy.call("list_buckets", &Value::Null).unwrap();
    assert_eq!(reply, Reply::Value(json!({"Buckets": []})));
    assert_eq!(proxy.client().calls("list_buckets"), 1);
    assert!(sleeper.slept().is_empty());
}

#[test]
fn retryable_failure_then_success() {
    let client = StubClient::new()
        .add_client_error("list_buckets", "RequestLimitExceeded")
        .add_response("list_buckets", json!({"Buckets": ["a"]}));
    let (proxy, _) = proxy(client, PolicyOverrides::new().max_retries(1));

    let reply = proxy.call("list_buckets", &json!({})).unwrap();
    assert_eq!(reply.into_value(), Some(json!({"Buckets": ["a"]})));
    assert_eq!(proxy.client().calls("list_buckets"), 2);
}

#[test]
fn ignored_code_yields_empty_reply_without_waiting() {
    let client = StubClient::new().add_client_error("list_buckets", "RequestLimitExceeded");
    let (proxy, sleeper) = proxy(
        client,
        PolicyOverrides::new().ignore_error_codes(["RequestLimitExceeded"]),
    );

    let reply = proxy.call("list_buckets", &Value::Null).unwrap();
    assert!(reply.is_empty());
    assert_eq!(proxy.client().calls("list_buckets"), 1);
    assert!(sleeper.slept().is_empty());
}

#[test]
fn unhandled_code_propagates_original_error() {
    let client = StubClient::new()
        .add_client_error("list_buckets", "AccessDenied")
        .add_response("list_buckets", json!({"Buckets": []}));
    let (proxy, _) = proxy(
        client,
        PolicyOverrides::new()
            .max_retries(1)
            .ignore_error_codes(["RequestLimitExceeded"]),
    );

    let err = proxy.call("list_buckets", &Value::Null).unwrap_err();
    assert_eq!(
        err,
        ServiceError::new("list_buckets", "AccessDenied", "stubbed AccessDenied")
    );
    assert_eq!(proxy.client().calls("list_buckets"), 1);
}

#[test]
fn exhausted_retries_return_last_failure() {
    let client = StubClient::new().add_client_error("put_item", "ProvisionedThroughputExceededException");
    let (proxy, sleeper) = proxy(
        client,
        PolicyOverrides::new().max_retries(3).interval_seconds(0.1),
    );

    let err = proxy.call("put_item", &json!({"Item": {}})).unwrap_err();
    assert_eq!(err.code, "ProvisionedThroughputExceededException");
    assert_eq!(proxy.client().calls("put_item"), 4);
    // first retry is immediate, then 0.1 * 2^1 and 0.1 * 2^2
    let slept: Vec<f64> = sleeper.slept().iter().map(Duration::as_secs_f64).collect();
    assert_eq!(slept.len(), 2);
    assert!((slept[0] - 0.2).abs() < 1e-9);
    assert!((slept[1] - 0.4).abs() < 1e-9);
}

#[test]
fn added_code_is_retried() {
    let client = StubClient::new()
        .add_client_error("get_object", "SlowDown")
        .add_response("get_object", json!("body"));
    let (proxy, _) = proxy(client, PolicyOverrides::new().added_error_codes(["SlowDown"]));

    let reply = proxy.call("get_object", &Value::Null).unwrap();
    assert_eq!(reply, Reply::Value(json!("body")));
    assert_eq!(proxy.client().calls("get_object"), 2);
}

#[test]
fn non_invocable_member_skips_retry_machinery() {
    let client = StubClient::new().with_attribute("region", json!("eu-central-1"));
    let (proxy, sleeper) = proxy(client, PolicyOverrides::new());

    let reply = proxy.call("region", &Value::Null).unwrap();
    assert_eq!(reply, Reply::Value(json!("eu-central-1")));
    assert_eq!(proxy.client().calls("region"), 0);
    assert!(sleeper.slept().is_empty());
}

#[test]
fn with_options_derives_sibling_over_same_client() {
    let client = StubClient::new().add_client_error("describe_table", "ResourceNotFoundException");
    let (base, _) = proxy(client, PolicyOverrides::new());

    let strict = base.call("describe_table", &Value::Null);
    assert!(strict.is_err());

    let lenient = base
        .with_options(&PolicyOverrides::new().ignore_error_codes(["ResourceNotFoundException"]))
        .unwrap();
    let reply = lenient.scope(|p| p.call("describe_table", &Value::Null)).unwrap();
    assert!(reply.is_empty());

    assert!(Arc::ptr_eq(base.client(), lenient.client()));
    assert_eq!(base.client().calls("describe_table"), 2);
    // parent still propagates
    assert!(base.call("describe_table", &Value::Null).is_err());
}

#[test]
fn typed_forwarding_runs_inside_retry_loop() {
    let client = StubClient::new()
        .add_client_error("list_tables", "ThrottlingException")
        .add_response("list_tables", json!(["t1"]));
    let (proxy, _) = proxy(client, PolicyOverrides::new());

    let tables = proxy
        .run(|c| {
            use callguard_core::proxy::ServiceClient;
            c.invoke("list_tables", &Value::Null)
        })
        .unwrap();
    assert_eq!(tables, Some(json!(["t1"])));
    assert_eq!(proxy.client().calls("list_tables"), 2);
}

#[test]
fn connect_builds_client_through_factory() {
    let factory = StubFactory::default();
    let descriptor = ClientDescriptor::new("s3").with_profile("ops").with_region("ap-south-1");
    let proxy = RetryProxy::connect(&factory, &descriptor, RetryPolicy::default()).unwrap();

    assert_eq!(factory.requested.lock().unwrap().as_slice(), &[descriptor]);
    let reply = proxy.call("region", &Value::Null).unwrap();
    assert_eq!(reply, Reply::Value(json!("ap-south-1")));
}

#[test]
fn connect_surfaces_factory_error() {
    let factory = StubFactory::default();
    let err = RetryProxy::connect(&factory, &ClientDescriptor::default(), RetryPolicy::default())
        .unwrap_err();
    assert_eq!(err, "service name required");
}

#[test]
fn config_connect_applies_retry_section() {
    use callguard_core::config::CallguardConfig;

    let cfg: CallguardConfig = toml::from_str(
        r#"
            [retry]
            max_retries = 0

            [client]
            service = "dynamodb"
            region = "eu-west-1"
        "#,
    )
    .unwrap();
    let factory = StubFactory::default();
    let proxy = cfg.connect(&factory).unwrap();
    assert_eq!(proxy.policy().max_retries(), 0);
    assert_eq!(
        proxy.call("region", &Value::Null).unwrap(),
        Reply::Value(json!("eu-west-1"))
    );
}

#[test]
fn config_connect_without_client_section_fails() {
    use callguard_core::config::CallguardConfig;

    let err = CallguardConfig::default()
        .connect(&StubFactory::default())
        .unwrap_err();
    assert!(err.to_string().contains("[client]"));
}
