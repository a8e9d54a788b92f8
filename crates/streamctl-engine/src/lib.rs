#![forbid(unsafe_code)]
#![deny(unreachable_pub)]

//! The asynchronous admin-request engine: a single control loop that drives
//! CreateTopics, DeleteTopics, CreatePartitions, AlterConfigs, and
//! DescribeConfigs requests through broker/controller lookup, wire
//! encode/decode, and reply delivery, independent of any particular
//! transport or metadata implementation.

mod cluster;
mod codec;
mod driver;
mod item;
mod mock;
mod trigger;

pub use cluster::{BrokerHandle, ClusterTransport, Lookup};
pub use driver::{
    alter_configs, create_partitions, create_topics, delete_topics, describe_configs, start_client,
    ClientConfig, ClientEvent, ClientHandle,
};
pub use item::{RequestItem, RequestPayload, RequestState};
pub use mock::MockCluster;
pub use trigger::OneShotTrigger;
