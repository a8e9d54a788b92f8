//! An in-memory [`ClusterTransport`] for tests and the CLI demo, standing
//! in for the metadata/broker-connection layer this crate treats as an
//! external collaborator.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use streamctl_core::{AdminError, ApiKind};

use crate::cluster::{BrokerHandle, ClusterTransport, Lookup};
use crate::trigger::OneShotTrigger;

struct State {
    controller_id: i32,
    up: HashMap<i32, bool>,
    waiters: Vec<Arc<OneShotTrigger>>,
    /// FIFO-scripted raw response bodies, per API.
    scripts: HashMap<ApiKind, VecDeque<Vec<u8>>>,
}

/// A scriptable broker cluster: brokers/controller can be marked up or
/// down, and responses for each API are queued up front and handed out
/// FIFO as `send` calls arrive.
pub struct MockCluster {
    state: Mutex<State>,
}

impl MockCluster {
    pub fn new(controller_id: i32) -> Self {
        Self {
            state: Mutex::new(State {
                controller_id,
                up: HashMap::new(),
                waiters: Vec::new(),
                scripts: HashMap::new(),
            }),
        }
    }

    /// Marks a broker UP (or DOWN) and wakes anyone waiting on a broker or
    /// controller lookup so they re-check.
    pub fn set_broker_up(&self, id: i32, up: bool) {
        let waiters = {
            let mut state = self.state.lock().unwrap();
            state.up.insert(id, up);
            std::mem::take(&mut state.waiters)
        };
        for w in waiters {
            w.fire(None);
        }
    }

    pub fn set_controller(&self, id: i32) {
        let waiters = {
            let mut state = self.state.lock().unwrap();
            state.controller_id = id;
            std::mem::take(&mut state.waiters)
        };
        for w in waiters {
            w.fire(None);
        }
    }

    /// Queues a raw response body to be handed back for the next `send`
    /// of the given API kind, in FIFO order.
    pub fn push_response(&self, kind: ApiKind, body: Vec<u8>) {
        self.state.lock().unwrap().scripts.entry(kind).or_default().push_back(body);
    }

    fn is_up(&self, id: i32) -> bool {
        self.state.lock().unwrap().up.get(&id).copied().unwrap_or(false)
    }
}

impl ClusterTransport for MockCluster {
    fn broker(&self, id: i32, trigger: Arc<OneShotTrigger>) -> Lookup {
        if self.is_up(id) {
            return Lookup::Up(BrokerHandle { id });
        }
        self.state.lock().unwrap().waiters.push(trigger);
        Lookup::Pending
    }

    fn controller(&self, trigger: Arc<OneShotTrigger>) -> Lookup {
        let controller_id = self.state.lock().unwrap().controller_id;
        if self.is_up(controller_id) {
            return Lookup::Up(BrokerHandle { id: controller_id });
        }
        self.state.lock().unwrap().waiters.push(trigger);
        Lookup::Pending
    }

    fn send(
        &self,
        _broker: BrokerHandle,
        kind: ApiKind,
        _payload: Vec<u8>,
        trigger: Arc<OneShotTrigger>,
    ) -> Result<(), AdminError> {
        let body = self.state.lock().unwrap().scripts.get_mut(&kind).and_then(VecDeque::pop_front);

        tokio::spawn(async move {
            match trigger.disable() {
                Some(mut item) => {
                    item.reply_buf = body;
                    trigger.post(item, None);
                }
                None => {
                    eprintln!("mock transport: reply for {} raced a request that already completed, dropping", kind.as_str());
                }
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broker_down_then_up_wakes_waiter() {
        let cluster = MockCluster::new(0);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let trigger = Arc::new(OneShotTrigger::new(tx));
        trigger.reenable(crate::item::test_support::new_test_item(trigger.clone()));

        assert!(matches!(cluster.broker(7, trigger.clone()), Lookup::Pending));
        assert!(rx.try_recv().is_err());

        cluster.set_broker_up(7, true);
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn send_delivers_scripted_response() {
        let cluster = MockCluster::new(0);
        cluster.push_response(ApiKind::DeleteTopics, b"{\"ok\":true}".to_vec());

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let trigger = Arc::new(OneShotTrigger::new(tx));
        trigger.reenable(crate::item::test_support::new_test_item(trigger.clone()));

        cluster
            .send(BrokerHandle { id: 0 }, ApiKind::DeleteTopics, Vec::new(), trigger.clone())
            .unwrap();

        let item = rx.recv().await.unwrap();
        assert_eq!(item.reply_buf.as_deref(), Some(&b"{\"ok\":true}"[..]));
    }
}
