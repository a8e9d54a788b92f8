use serde::{Deserialize, Serialize};

use crate::config::ConfigResourceResult;
use crate::error::AdminError;
use crate::options::ApiKind;
use crate::topic::TopicResult;

/// Request-level outcome: either an element list (possibly containing
/// element-level errors) or a request-level failure with an empty element
/// list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRequestOutcome<T> {
    pub err: Option<AdminError>,
    pub results: Vec<T>,
}

impl<T> AdminRequestOutcome<T> {
    pub fn ok(results: Vec<T>) -> Self {
        Self { err: None, results }
    }

    pub fn failed(err: AdminError) -> Self {
        Self {
            err: Some(err),
            results: Vec::new(),
        }
    }
}

/// Result event delivered on the application's `reply_channel`.
///
/// `opaque` carries back whatever the caller set via
/// `AdminOptions::set_opaque`. Accessor lifetimes follow ordinary Rust
/// ownership: the event owns its element vector, so indices are stable and
/// valid for as long as the event itself is held.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AdminResultEvent {
    CreateTopics {
        opaque: Option<serde_json::Value>,
        outcome: AdminRequestOutcome<TopicResult>,
    },
    DeleteTopics {
        opaque: Option<serde_json::Value>,
        outcome: AdminRequestOutcome<TopicResult>,
    },
    CreatePartitions {
        opaque: Option<serde_json::Value>,
        outcome: AdminRequestOutcome<TopicResult>,
    },
    AlterConfigs {
        opaque: Option<serde_json::Value>,
        outcome: AdminRequestOutcome<ConfigResourceResult>,
    },
    DescribeConfigs {
        opaque: Option<serde_json::Value>,
        outcome: AdminRequestOutcome<ConfigResourceResult>,
    },
}

impl AdminResultEvent {
    pub fn kind(&self) -> ApiKind {
        match self {
            AdminResultEvent::CreateTopics { .. } => ApiKind::CreateTopics,
            AdminResultEvent::DeleteTopics { .. } => ApiKind::DeleteTopics,
            AdminResultEvent::CreatePartitions { .. } => ApiKind::CreatePartitions,
            AdminResultEvent::AlterConfigs { .. } => ApiKind::AlterConfigs,
            AdminResultEvent::DescribeConfigs { .. } => ApiKind::DescribeConfigs,
        }
    }

    /// Request-level error, if the whole request failed.
    pub fn err(&self) -> Option<&AdminError> {
        match self {
            AdminResultEvent::CreateTopics { outcome, .. }
            | AdminResultEvent::DeleteTopics { outcome, .. }
            | AdminResultEvent::CreatePartitions { outcome, .. } => outcome.err.as_ref(),
            AdminResultEvent::AlterConfigs { outcome, .. }
            | AdminResultEvent::DescribeConfigs { outcome, .. } => outcome.err.as_ref(),
        }
    }
}
