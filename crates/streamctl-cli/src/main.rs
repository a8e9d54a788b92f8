mod cli;

use std::sync::Arc;

use clap::Parser;

use streamctl_core::{AdminOptions, ConfigEntry, ConfigResource, ConfigResourceType, DeleteTopic, NewPartitions, NewTopic};
use streamctl_engine::{alter_configs, create_partitions, create_topics, delete_topics, describe_configs};
use streamctl_engine::{start_client, ClientConfig, MockCluster};

use crate::cli::{Cli, Command, ResourceTypeArg};

/// Wire resource-type codes, kept in lockstep with the engine's own mapping
/// so the demo's scripted responses decode cleanly.
fn resource_type_code(t: ConfigResourceType) -> i32 {
    match t {
        ConfigResourceType::Unknown => 0,
        ConfigResourceType::Any => 1,
        ConfigResourceType::Topic => 2,
        ConfigResourceType::Group => 3,
        ConfigResourceType::Broker => 4,
    }
}

fn options(cli: &Cli) -> anyhow::Result<AdminOptions> {
    let mut options = AdminOptions::new();
    options.set_request_timeout_ms(cli.request_timeout_ms)?;
    if cli.broker >= 0 {
        options.set_broker(cli.broker)?;
    }
    Ok(options)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cluster = Arc::new(MockCluster::new(0));
    cluster.set_broker_up(0, true);
    if cli.broker >= 0 {
        cluster.set_broker_up(cli.broker, true);
    }
    // A BROKER-typed resource routes to the broker id named by the resource
    // itself, regardless of `--broker`; bring that broker up too.
    match &cli.command {
        Command::AlterConfig { resource_type: ResourceTypeArg::Broker, name, .. }
        | Command::DescribeConfig { resource_type: ResourceTypeArg::Broker, name } => {
            if let Ok(id) = name.parse::<i32>() {
                cluster.set_broker_up(id, true);
            }
        }
        _ => {}
    }

    match &cli.command {
        Command::CreateTopic { topic, .. } => {
            cluster.push_response(
                streamctl_core::ApiKind::CreateTopics,
                serde_json::to_vec(&serde_json::json!({
                    "throttle_time_ms": 0,
                    "topics": [{"name": topic, "error_code": 0}],
                }))?,
            );
        }
        Command::DeleteTopic { topic } => {
            cluster.push_response(
                streamctl_core::ApiKind::DeleteTopics,
                serde_json::to_vec(&serde_json::json!({
                    "throttle_time_ms": 0,
                    "topics": [{"name": topic, "error_code": 0}],
                }))?,
            );
        }
        Command::CreatePartitions { topic, .. } => {
            cluster.push_response(
                streamctl_core::ApiKind::CreatePartitions,
                serde_json::to_vec(&serde_json::json!({
                    "throttle_time_ms": 0,
                    "topics": [{"name": topic, "error_code": 0}],
                }))?,
            );
        }
        Command::AlterConfig { resource_type, name, .. } => {
            cluster.push_response(
                streamctl_core::ApiKind::AlterConfigs,
                serde_json::to_vec(&serde_json::json!({
                    "throttle_time_ms": 0,
                    "resources": [{
                        "resource_type": resource_type_code((*resource_type).into()),
                        "name": name,
                        "error_code": 0,
                    }],
                }))?,
            );
        }
        Command::DescribeConfig { resource_type, name } => {
            cluster.push_response(
                streamctl_core::ApiKind::DescribeConfigs,
                serde_json::to_vec(&serde_json::json!({
                    "version": 1,
                    "throttle_time_ms": 0,
                    "resources": [{
                        "resource_type": resource_type_code((*resource_type).into()),
                        "name": name,
                        "error_code": 0,
                        "entries": [],
                    }],
                }))?,
            );
        }
    }

    let client = start_client(
        ClientConfig { request_timeout_ms: cli.request_timeout_ms },
        cluster,
    );

    let mut events = client.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                streamctl_engine::ClientEvent::Throttle { broker_id, throttle_time_ms } => {
                    eprintln!("broker {broker_id} requested a {throttle_time_ms}ms throttle");
                }
                streamctl_engine::ClientEvent::Warning { message } => eprintln!("{message}"),
            }
        }
    });

    let event = match &cli.command {
        Command::CreateTopic { topic, partitions, replication_factor } => {
            let new_topic = NewTopic::with_replication_factor(topic.as_str(), *partitions, *replication_factor);
            create_topics(&client, vec![new_topic], Some(options(&cli)?)).await?
        }
        Command::DeleteTopic { topic } => {
            delete_topics(&client, vec![DeleteTopic::new(topic.as_str())], Some(options(&cli)?)).await?
        }
        Command::CreatePartitions { topic, total_count } => {
            create_partitions(
                &client,
                vec![NewPartitions::new(topic.as_str(), *total_count)],
                Some(options(&cli)?),
            )
            .await?
        }
        Command::AlterConfig { resource_type, name, sets } => {
            let mut resource = ConfigResource::new((*resource_type).into(), name.as_str());
            for kv in sets {
                let (key, value) = kv
                    .split_once('=')
                    .ok_or_else(|| anyhow::anyhow!("--set expects KEY=VALUE, got '{kv}'"))?;
                resource.config.push(ConfigEntry::set(key, value));
            }
            alter_configs(&client, vec![resource], Some(options(&cli)?)).await?
        }
        Command::DescribeConfig { resource_type, name } => {
            describe_configs(
                &client,
                vec![ConfigResource::new((*resource_type).into(), name.as_str())],
                Some(options(&cli)?),
            )
            .await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&event)?);

    client.request_stop();
    client.wait().await;
    Ok(())
}
