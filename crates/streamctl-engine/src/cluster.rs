use std::sync::Arc;

use streamctl_core::{AdminError, ApiKind};

use crate::trigger::OneShotTrigger;

/// A live reference to a cluster member. Reference-count-managed: the
/// driver holds exactly one from lookup until it is released in
/// `CONSTRUCT_REQUEST`.
#[derive(Debug, Clone)]
pub struct BrokerHandle {
    pub id: i32,
}

/// Outcome of an async broker/controller lookup. If a live broker handle is
/// returned synchronously the driver advances immediately; otherwise
/// re-entry is caused by the broker subsystem firing the trigger on any
/// state change.
pub enum Lookup {
    Up(BrokerHandle),
    Pending,
}

/// The metadata/broker-connection/controller-election layer, reached only
/// through this trait. A real implementation would track live connections
/// and controller elections; [`crate::mock`] provides a scriptable
/// in-memory stand-in for tests and the CLI demo.
pub trait ClusterTransport: Send + Sync + 'static {
    /// Look up a broker by id. If it isn't currently UP, register `trigger`
    /// to be fired on the next state change and return `Lookup::Pending`.
    fn broker(&self, id: i32, trigger: Arc<OneShotTrigger>) -> Lookup;

    /// Same contract as `broker`, against the current controller.
    fn controller(&self, trigger: Arc<OneShotTrigger>) -> Lookup;

    /// Enqueue a serialized request for `broker`. The reply (or its
    /// absence) is delivered later by calling `trigger.disable()` /
    /// `trigger.post()` — never synchronously from within this call.
    fn send(
        &self,
        broker: BrokerHandle,
        kind: ApiKind,
        payload: Vec<u8>,
        trigger: Arc<OneShotTrigger>,
    ) -> Result<(), AdminError>;
}
