//! Shared value types, options, and error taxonomy for the `streamctl`
//! admin-request engine.

pub mod config;
pub mod error;
pub mod options;
pub mod result;
pub mod topic;

pub use config::{ConfigEntry, ConfigOperation, ConfigResource, ConfigResourceResult, ConfigResourceType, ConfigSource};
pub use error::{AdminError, AdminErrorKind};
pub use options::{AdminOptions, ApiKind};
pub use result::{AdminRequestOutcome, AdminResultEvent};
pub use topic::{DeleteTopic, NewPartitions, NewTopic, ReplicaAssignment, TopicResult};
