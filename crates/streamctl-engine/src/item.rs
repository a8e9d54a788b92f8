use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::time::Instant;

use streamctl_core::{AdminError, AdminOptions, ApiKind, ConfigResource, DeleteTopic, NewPartitions, NewTopic};

use crate::trigger::OneShotTrigger;

/// Per-request state graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Init,
    WaitBroker,
    WaitController,
    ConstructRequest,
    WaitResponse,
}

impl RequestState {
    /// Human-readable name embedded in a TIMED_OUT `errstr`.
    pub fn name(self) -> &'static str {
        match self {
            RequestState::Init => "initializing",
            RequestState::WaitBroker => "waiting for broker",
            RequestState::WaitController => "waiting for controller",
            RequestState::ConstructRequest => "constructing request",
            RequestState::WaitResponse => "waiting for response",
        }
    }
}

/// Per-API input element list.
#[derive(Debug, Clone)]
pub enum RequestPayload {
    CreateTopics(Vec<NewTopic>),
    DeleteTopics(Vec<DeleteTopic>),
    CreatePartitions(Vec<NewPartitions>),
    AlterConfigs(Vec<ConfigResource>),
    DescribeConfigs(Vec<ConfigResource>),
}

impl RequestPayload {
    pub fn kind(&self) -> ApiKind {
        match self {
            RequestPayload::CreateTopics(_) => ApiKind::CreateTopics,
            RequestPayload::DeleteTopics(_) => ApiKind::DeleteTopics,
            RequestPayload::CreatePartitions(_) => ApiKind::CreatePartitions,
            RequestPayload::AlterConfigs(_) => ApiKind::AlterConfigs,
            RequestPayload::DescribeConfigs(_) => ApiKind::DescribeConfigs,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RequestPayload::CreateTopics(v) => v.len(),
            RequestPayload::DeleteTopics(v) => v.len(),
            RequestPayload::CreatePartitions(v) => v.len(),
            RequestPayload::AlterConfigs(v) => v.len(),
            RequestPayload::DescribeConfigs(v) => v.len(),
        }
    }
}

/// A request envelope, owned exclusively by whichever of {driver queue,
/// broker-wait, controller-wait, timer, I/O in-flight set} currently
/// references it through its trigger.
pub struct RequestItem {
    pub id: u64,
    pub state: RequestState,
    pub payload: RequestPayload,
    pub options: AdminOptions,
    pub broker_id: i32,
    pub deadline: Instant,
    pub trigger: Arc<OneShotTrigger>,
    pub deadline_task: Option<tokio::task::JoinHandle<()>>,
    pub reply_buf: Option<Vec<u8>>,
    pub err: Option<AdminError>,
    pub reply_tx: Option<oneshot::Sender<streamctl_core::AdminResultEvent>>,
    pub opaque: Option<serde_json::Value>,
}

impl RequestItem {
    pub fn kind(&self) -> ApiKind {
        self.payload.kind()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Minimal `RequestItem` for trigger-only unit tests that never touch
    /// the driver's state machine.
    pub(crate) fn new_test_item(trigger: Arc<OneShotTrigger>) -> RequestItem {
        RequestItem {
            id: 0,
            state: RequestState::Init,
            payload: RequestPayload::DeleteTopics(vec![DeleteTopic::new("t")]),
            options: AdminOptions::new(),
            broker_id: -1,
            deadline: Instant::now() + std::time::Duration::from_secs(60),
            trigger,
            deadline_task: None,
            reply_buf: None,
            err: None,
            reply_tx: None,
            opaque: None,
        }
    }
}
