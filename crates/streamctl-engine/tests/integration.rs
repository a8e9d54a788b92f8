use std::sync::Arc;
use std::time::Duration;

use streamctl_core::{AdminErrorKind, AdminOptions, ApiKind, ConfigResource, ConfigResourceType, NewTopic};
use streamctl_engine::{create_topics, describe_configs, alter_configs, start_client, ClientConfig, MockCluster};

fn topics_response(entries: &[(&str, i16)]) -> Vec<u8> {
    let resources: Vec<serde_json::Value> = entries
        .iter()
        .map(|(name, code)| serde_json::json!({"name": name, "error_code": code}))
        .collect();
    serde_json::to_vec(&serde_json::json!({"throttle_time_ms": 0, "topics": resources})).unwrap()
}

#[tokio::test]
async fn create_topics_happy_path() {
    let cluster = Arc::new(MockCluster::new(0));
    cluster.set_broker_up(0, true);
    cluster.push_response(ApiKind::CreateTopics, topics_response(&[("orders", 0)]));

    let client = start_client(ClientConfig::default(), cluster);
    let rx = create_topics(&client, vec![NewTopic::with_replication_factor("orders", 3, 1)], None);
    let event = rx.await.unwrap();

    let streamctl_core::AdminResultEvent::CreateTopics { outcome, .. } = event else { panic!("wrong event kind") };
    assert!(outcome.err.is_none());
    assert_eq!(outcome.results.len(), 1);
    assert!(outcome.results[0].error.is_none());
}

#[tokio::test]
async fn reordered_response_preserves_broker_error_code() {
    let cluster = Arc::new(MockCluster::new(0));
    cluster.set_broker_up(0, true);
    // Response elements arrive out of request order; "orders" carries the
    // well-known "topic already exists" code.
    cluster.push_response(ApiKind::CreateTopics, topics_response(&[("metrics", 0), ("orders", 36)]));

    let client = start_client(ClientConfig::default(), cluster);
    let rx = create_topics(
        &client,
        vec![
            NewTopic::with_replication_factor("orders", 3, 1),
            NewTopic::with_replication_factor("metrics", 1, 1),
        ],
        None,
    );
    let event = rx.await.unwrap();

    let streamctl_core::AdminResultEvent::CreateTopics { outcome, .. } = event else { panic!("wrong event kind") };
    assert_eq!(outcome.results[0].topic, "orders");
    assert_eq!(outcome.results[0].error.as_ref().unwrap().kind, AdminErrorKind::Broker(36));
    assert_eq!(outcome.results[1].topic, "metrics");
    assert!(outcome.results[1].error.is_none());
}

#[tokio::test]
async fn hidden_timeout_is_rewritten_to_success() {
    let cluster = Arc::new(MockCluster::new(0));
    cluster.set_broker_up(0, true);
    // error_code 7 with the default (zero) operation_timeout is not a real
    // failure, just the server running out of time to apply the change.
    cluster.push_response(ApiKind::CreateTopics, topics_response(&[("orders", 7)]));

    let client = start_client(ClientConfig::default(), cluster);
    let mut options = AdminOptions::new();
    options.set_operation_timeout_ms(ApiKind::CreateTopics, 0).unwrap();
    let rx = create_topics(&client, vec![NewTopic::with_replication_factor("orders", 3, 1)], Some(options));
    let event = rx.await.unwrap();

    let streamctl_core::AdminResultEvent::CreateTopics { outcome, .. } = event else { panic!("wrong event kind") };
    assert!(outcome.results[0].error.is_none());
}

#[tokio::test(start_paused = true)]
async fn deadline_wins_over_a_broker_that_never_comes_up() {
    let cluster = Arc::new(MockCluster::new(0));
    // Controller never comes up; the request should time out rather than
    // wait forever.
    let mut config = ClientConfig::default();
    config.request_timeout_ms = 1_000;
    let client = start_client(config, cluster);

    let rx = create_topics(&client, vec![NewTopic::with_replication_factor("orders", 3, 1)], None);
    tokio::time::advance(Duration::from_millis(1_500)).await;
    let event = rx.await.unwrap();

    let streamctl_core::AdminResultEvent::CreateTopics { outcome, .. } = event else { panic!("wrong event kind") };
    assert_eq!(outcome.err.as_ref().unwrap().kind, AdminErrorKind::TimedOut);
}

#[tokio::test]
async fn describe_configs_with_broker_resource_targets_that_broker_not_the_controller() {
    let cluster = Arc::new(MockCluster::new(0));
    // Controller (broker 0) is down; only broker 7 is up. A correct
    // implementation resolves the BROKER resource name to broker 7 and
    // never consults the controller.
    cluster.set_broker_up(7, true);
    let response = serde_json::to_vec(&serde_json::json!({
        "version": 1,
        "throttle_time_ms": 0,
        "resources": [{"resource_type": 4, "name": "7", "error_code": 0, "entries": []}],
    }))
    .unwrap();
    cluster.push_response(ApiKind::DescribeConfigs, response);

    let client = start_client(ClientConfig::default(), cluster);
    let rx = describe_configs(&client, vec![ConfigResource::new(ConfigResourceType::Broker, "7")], None);
    let event = rx.await.unwrap();

    let streamctl_core::AdminResultEvent::DescribeConfigs { outcome, .. } = event else { panic!("wrong event kind") };
    assert!(outcome.err.is_none());
    assert_eq!(outcome.results[0].name, "7");
}

#[tokio::test]
async fn explicit_broker_option_is_used_when_no_broker_resource_is_present() {
    let cluster = Arc::new(MockCluster::new(0));
    // Controller (broker 0) is down; only broker 9 is up. With no BROKER
    // resource in the request, `options.broker()` is the only way to reach
    // it, so a correct implementation must fall back to it instead of
    // hardcoding the controller.
    cluster.set_broker_up(9, true);
    let response = serde_json::to_vec(&serde_json::json!({
        "version": 1,
        "throttle_time_ms": 0,
        "resources": [{"resource_type": 2, "name": "orders", "error_code": 0, "entries": []}],
    }))
    .unwrap();
    cluster.push_response(ApiKind::DescribeConfigs, response);

    let client = start_client(ClientConfig::default(), cluster);
    let mut options = AdminOptions::new();
    options.set_broker(9).unwrap();
    let rx = describe_configs(&client, vec![ConfigResource::new(ConfigResourceType::Topic, "orders")], Some(options));
    let event = rx.await.unwrap();

    let streamctl_core::AdminResultEvent::DescribeConfigs { outcome, .. } = event else { panic!("wrong event kind") };
    assert!(outcome.err.is_none());
    assert_eq!(outcome.results[0].name, "orders");
}

#[tokio::test]
async fn duplicate_element_in_response_is_a_request_level_protocol_failure() {
    let cluster = Arc::new(MockCluster::new(0));
    cluster.set_broker_up(0, true);
    let response = serde_json::to_vec(&serde_json::json!({
        "throttle_time_ms": 0,
        "resources": [
            {"resource_type": 2, "name": "orders", "error_code": 0},
            {"resource_type": 2, "name": "orders", "error_code": 0},
        ],
    }))
    .unwrap();
    cluster.push_response(ApiKind::AlterConfigs, response);

    let client = start_client(ClientConfig::default(), cluster);
    let rx = alter_configs(&client, vec![ConfigResource::new(ConfigResourceType::Topic, "orders")], None);
    let event = rx.await.unwrap();

    let streamctl_core::AdminResultEvent::AlterConfigs { outcome, .. } = event else { panic!("wrong event kind") };
    assert_eq!(outcome.err.as_ref().unwrap().kind, AdminErrorKind::BadMsg);
}

#[tokio::test]
async fn two_broker_resources_conflict_without_sending_a_request() {
    let cluster = Arc::new(MockCluster::new(0));
    // No broker is ever marked up; if the driver tried to send anything it
    // would hang forever instead of resolving immediately.
    let client = start_client(ClientConfig::default(), cluster);

    let rx = alter_configs(
        &client,
        vec![
            ConfigResource::new(ConfigResourceType::Broker, "1"),
            ConfigResource::new(ConfigResourceType::Broker, "2"),
        ],
        None,
    );
    let event = tokio::time::timeout(Duration::from_millis(200), rx).await.unwrap().unwrap();

    let streamctl_core::AdminResultEvent::AlterConfigs { outcome, .. } = event else { panic!("wrong event kind") };
    assert_eq!(outcome.err.as_ref().unwrap().kind, AdminErrorKind::Conflict);
}
