use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, Notify};
use tokio::time::Instant;

use streamctl_core::{
    AdminError, AdminOptions, AdminResultEvent, ApiKind, ConfigResource, ConfigResourceType, DeleteTopic,
    NewPartitions, NewTopic,
};

use crate::cluster::{ClusterTransport, Lookup};
use crate::codec;
use crate::item::{RequestItem, RequestPayload, RequestState};
use crate::trigger::OneShotTrigger;

/// Default request-level deadline and other client-wide settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub request_timeout_ms: i64,
}

impl ClientConfig {
    pub const DEFAULT_REQUEST_TIMEOUT_MS: i64 = 30_000;
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { request_timeout_ms: Self::DEFAULT_REQUEST_TIMEOUT_MS }
    }
}

/// Events forwarded on the client's broadcast channel, independent of any
/// one request's reply channel.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A server-reported throttle hint for a completed request.
    Throttle { broker_id: i32, throttle_time_ms: i32 },
    /// An operational notice (dropped reply, unrecognized resource type,
    /// and the like) worth surfacing but not worth failing a request over.
    Warning { message: String },
}

pub(crate) struct ClientInner {
    pub(crate) event_tx: broadcast::Sender<ClientEvent>,
    stop_requested: AtomicBool,
    notify: Notify,
}

impl ClientInner {
    pub(crate) fn request_stop(&self) {
        if !self.stop_requested.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    fn should_stop(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }
}

/// Handle to a running client driver.
pub struct ClientHandle {
    inner: Arc<ClientInner>,
    queue_tx: mpsc::UnboundedSender<RequestItem>,
    default_request_timeout_ms: i64,
    next_id: AtomicU64,
    join: tokio::task::JoinHandle<()>,
}

/// Starts the driver loop on its own task, wired to `transport` for broker
/// lookups and wire I/O.
pub fn start_client(config: ClientConfig, transport: Arc<dyn ClusterTransport>) -> ClientHandle {
    let (event_tx, _) = broadcast::channel(1024);
    let inner = Arc::new(ClientInner {
        event_tx,
        stop_requested: AtomicBool::new(false),
        notify: Notify::new(),
    });
    let (queue_tx, queue_rx) = mpsc::unbounded_channel();
    let join = tokio::spawn(run(inner.clone(), transport, queue_rx));
    ClientHandle {
        inner,
        queue_tx,
        default_request_timeout_ms: config.request_timeout_ms,
        next_id: AtomicU64::new(1),
        join,
    }
}

impl ClientHandle {
    /// Subscribe to the client's warning/throttle event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Request a graceful shutdown. In-flight requests observe the flag on
    /// their next driver step and are destroyed silently, per the
    /// client-termination cancellation path.
    pub fn request_stop(&self) {
        self.inner.request_stop();
    }

    /// Waits for the driver task to exit (after the queue is dropped).
    pub async fn wait(self) {
        let _ = self.join.await;
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn submit(
        &self,
        payload: RequestPayload,
        options: AdminOptions,
        broker_id: i32,
    ) -> oneshot::Receiver<AdminResultEvent> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request_timeout_ms = options.request_timeout_ms(self.default_request_timeout_ms);
        let deadline = Instant::now() + Duration::from_millis(request_timeout_ms.max(0) as u64);
        let opaque = options.opaque().cloned();
        let trigger = Arc::new(OneShotTrigger::new(self.queue_tx.clone()));
        let item = RequestItem {
            id: self.next_id(),
            state: RequestState::Init,
            payload,
            options,
            broker_id,
            deadline,
            trigger,
            deadline_task: None,
            reply_buf: None,
            err: None,
            reply_tx: Some(reply_tx),
            opaque,
        };
        let _ = self.queue_tx.send(item);
        reply_rx
    }

    fn submit_immediate_failure(
        &self,
        kind: ApiKind,
        opaque: Option<serde_json::Value>,
        err: AdminError,
    ) -> oneshot::Receiver<AdminResultEvent> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let _ = reply_tx.send(codec::failure_event(kind, opaque, err));
        reply_rx
    }
}

/// Before enqueueing an AlterConfigs/DescribeConfigs request, the driver
/// scans `args` for `ConfigResource` elements of type BROKER: zero falls
/// back to `default_broker_id` (the caller's `options.broker()`, itself
/// defaulting to the controller), exactly one routes to that broker id,
/// two or more is a request-level conflict.
fn resolve_broker_id(resources: &[ConfigResource], default_broker_id: i32) -> Result<i32, AdminError> {
    let broker_resources: Vec<&ConfigResource> =
        resources.iter().filter(|r| r.resource_type == ConfigResourceType::Broker).collect();
    match broker_resources.len() {
        0 => Ok(default_broker_id),
        1 => broker_resources[0].broker_id(),
        _ => Err(AdminError::conflict("more than one BROKER resource in a single request")),
    }
}

pub fn create_topics(
    client: &ClientHandle,
    new_topics: Vec<NewTopic>,
    options: Option<AdminOptions>,
) -> oneshot::Receiver<AdminResultEvent> {
    let options = options.unwrap_or_default();
    let opaque = options.opaque().cloned();
    for t in &new_topics {
        if let Err(err) = t.validate() {
            return client.submit_immediate_failure(ApiKind::CreateTopics, opaque, err);
        }
    }
    let broker_id = options.broker();
    client.submit(RequestPayload::CreateTopics(new_topics), options, broker_id)
}

pub fn delete_topics(
    client: &ClientHandle,
    topics: Vec<DeleteTopic>,
    options: Option<AdminOptions>,
) -> oneshot::Receiver<AdminResultEvent> {
    let options = options.unwrap_or_default();
    let opaque = options.opaque().cloned();
    for t in &topics {
        if let Err(err) = t.validate() {
            return client.submit_immediate_failure(ApiKind::DeleteTopics, opaque, err);
        }
    }
    let broker_id = options.broker();
    client.submit(RequestPayload::DeleteTopics(topics), options, broker_id)
}

pub fn create_partitions(
    client: &ClientHandle,
    new_partitions: Vec<NewPartitions>,
    options: Option<AdminOptions>,
) -> oneshot::Receiver<AdminResultEvent> {
    let options = options.unwrap_or_default();
    let opaque = options.opaque().cloned();
    for p in &new_partitions {
        if let Err(err) = p.validate() {
            return client.submit_immediate_failure(ApiKind::CreatePartitions, opaque, err);
        }
    }
    let broker_id = options.broker();
    client.submit(RequestPayload::CreatePartitions(new_partitions), options, broker_id)
}

pub fn alter_configs(
    client: &ClientHandle,
    resources: Vec<ConfigResource>,
    options: Option<AdminOptions>,
) -> oneshot::Receiver<AdminResultEvent> {
    let options = options.unwrap_or_default();
    let opaque = options.opaque().cloned();
    for r in &resources {
        if let Err(err) = r.validate() {
            return client.submit_immediate_failure(ApiKind::AlterConfigs, opaque, err);
        }
    }
    let broker_id = match resolve_broker_id(&resources, options.broker()) {
        Ok(id) => id,
        Err(err) => return client.submit_immediate_failure(ApiKind::AlterConfigs, opaque, err),
    };
    client.submit(RequestPayload::AlterConfigs(resources), options, broker_id)
}

pub fn describe_configs(
    client: &ClientHandle,
    resources: Vec<ConfigResource>,
    options: Option<AdminOptions>,
) -> oneshot::Receiver<AdminResultEvent> {
    let options = options.unwrap_or_default();
    let opaque = options.opaque().cloned();
    for r in &resources {
        if let Err(err) = r.validate() {
            return client.submit_immediate_failure(ApiKind::DescribeConfigs, opaque, err);
        }
    }
    let broker_id = match resolve_broker_id(&resources, options.broker()) {
        Ok(id) => id,
        Err(err) => return client.submit_immediate_failure(ApiKind::DescribeConfigs, opaque, err),
    };
    client.submit(RequestPayload::DescribeConfigs(resources), options, broker_id)
}

async fn run(inner: Arc<ClientInner>, transport: Arc<dyn ClusterTransport>, mut rx: mpsc::UnboundedReceiver<RequestItem>) {
    let mut driver = Driver { inner: inner.clone(), transport };
    loop {
        tokio::select! {
            maybe_item = rx.recv() => {
                match maybe_item {
                    Some(item) => driver.step(item),
                    None => break,
                }
            }
            _ = inner.notify.notified() => {}
        }
    }
}

struct Driver {
    inner: Arc<ClientInner>,
    transport: Arc<dyn ClusterTransport>,
}

impl Driver {
    /// Stops the deadline timer and drops its trigger source. Idempotent:
    /// aborting an already-finished task and removing an absent source are
    /// both no-ops, so this is safe to call from every exit path.
    fn finish(item: &mut RequestItem) {
        if let Some(task) = item.deadline_task.take() {
            task.abort();
        }
        item.trigger.del_source("timeout");
    }

    fn deliver_event(reply_tx: Option<oneshot::Sender<AdminResultEvent>>, event: AdminResultEvent) {
        if let Some(tx) = reply_tx {
            let _ = tx.send(event);
        }
    }

    fn destroy(&self, mut item: RequestItem) {
        Self::finish(&mut item);
    }

    fn publish_failure(&self, mut item: RequestItem, err: AdminError) {
        Self::finish(&mut item);
        let event = codec::failure_event(item.kind(), item.opaque.take(), err);
        Self::deliver_event(item.reply_tx.take(), event);
    }

    fn deliver(&self, mut item: RequestItem, event: AdminResultEvent) {
        Self::finish(&mut item);
        Self::deliver_event(item.reply_tx.take(), event);
    }

    fn arm_deadline(&self, item: &mut RequestItem) {
        item.trigger.add_source("timeout");
        let deadline = item.deadline;
        let trigger = item.trigger.clone();
        item.deadline_task = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            trigger.fire(None);
        }));
    }

    /// Advances `item` through as many state transitions as fall through
    /// synchronously, stopping either at a genuine wait (broker/controller
    /// lookup pending, response not yet in) or at a terminal outcome.
    fn step(&mut self, item: RequestItem) {
        if self.inner.should_stop() {
            self.destroy(item);
            return;
        }
        let mut item = item;
        if let Some(err) = &item.err {
            if err.kind.is_destroy() {
                self.destroy(item);
                return;
            }
        }
        if let Some(err) = item.err.take() {
            self.publish_failure(item, err);
            return;
        }
        if Instant::now() >= item.deadline {
            let err = AdminError::timed_out(item.state.name());
            self.publish_failure(item, err);
            return;
        }

        let mut broker_handle = None;
        loop {
            match item.state {
                RequestState::Init => {
                    self.arm_deadline(&mut item);
                    item.state =
                        if item.broker_id < 0 { RequestState::WaitController } else { RequestState::WaitBroker };
                }
                RequestState::WaitBroker => {
                    let broker_id = item.broker_id;
                    let trigger = item.trigger.clone();
                    trigger.reenable(item);
                    match self.transport.broker(broker_id, trigger.clone()) {
                        Lookup::Up(handle) => match trigger.disable() {
                            Some(reclaimed) => {
                                item = reclaimed;
                                item.state = RequestState::ConstructRequest;
                                broker_handle = Some(handle);
                            }
                            None => return,
                        },
                        Lookup::Pending => return,
                    }
                }
                RequestState::WaitController => {
                    let trigger = item.trigger.clone();
                    trigger.reenable(item);
                    match self.transport.controller(trigger.clone()) {
                        Lookup::Up(handle) => match trigger.disable() {
                            Some(reclaimed) => {
                                item = reclaimed;
                                item.state = RequestState::ConstructRequest;
                                broker_handle = Some(handle);
                            }
                            None => return,
                        },
                        Lookup::Pending => return,
                    }
                }
                RequestState::ConstructRequest => {
                    item.trigger.add_source("send");
                    match codec::encode(&item) {
                        Ok(payload) => {
                            let handle = broker_handle.take().expect("broker handle resolved before ConstructRequest");
                            let trigger = item.trigger.clone();
                            let kind = item.kind();
                            item.state = RequestState::WaitResponse;
                            match self.transport.send(handle, kind, payload, trigger.clone()) {
                                Ok(()) => {
                                    trigger.reenable(item);
                                    return;
                                }
                                Err(err) => {
                                    item.trigger.del_source("send");
                                    self.publish_failure(item, err);
                                    return;
                                }
                            }
                        }
                        Err(err) => {
                            item.trigger.del_source("send");
                            self.publish_failure(item, err);
                            return;
                        }
                    }
                }
                RequestState::WaitResponse => {
                    let buf = item.reply_buf.take().expect("reply_buf filled before WAIT_RESPONSE re-entry");
                    item.trigger.del_source("send");
                    match codec::decode(&item, &buf) {
                        Ok((event, throttle_time_ms)) => {
                            if throttle_time_ms > 0 {
                                let _ = self.inner.event_tx.send(ClientEvent::Throttle {
                                    broker_id: item.broker_id,
                                    throttle_time_ms,
                                });
                            }
                            self.deliver(item, event);
                        }
                        Err(err) => self.publish_failure(item, err),
                    }
                    return;
                }
            }
        }
    }
}
