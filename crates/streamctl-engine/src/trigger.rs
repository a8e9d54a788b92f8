use std::collections::HashSet;
use std::sync::Mutex;

use tokio::sync::mpsc;

use streamctl_core::AdminError;

use crate::item::RequestItem;

enum Slot {
    Armed(RequestItem),
    Idle,
}

struct Inner {
    slot: Slot,
    sources: HashSet<&'static str>,
}

/// Single-consumer wake-up primitive with multiple independent arming
/// sources; guarantees at most one effective fire per arming.
///
/// The trigger never owns the deadline timer or a broker-wait directly —
/// those hold an `Arc<OneShotTrigger>` clone and call `fire`/`disable` on
/// it. Exactly one of them can ever walk away with the item for a given
/// arming.
pub struct OneShotTrigger {
    inner: Mutex<Inner>,
    target: mpsc::UnboundedSender<RequestItem>,
}

impl OneShotTrigger {
    pub(crate) fn new(target: mpsc::UnboundedSender<RequestItem>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                slot: Slot::Idle,
                sources: HashSet::new(),
            }),
            target,
        }
    }

    /// Record that an asynchronous source intends to fire. Diagnostic only.
    pub fn add_source(&self, name: &'static str) {
        self.inner.lock().unwrap().sources.insert(name);
    }

    pub fn del_source(&self, name: &'static str) {
        self.inner.lock().unwrap().sources.remove(name);
    }

    #[cfg(test)]
    pub(crate) fn source_count(&self) -> usize {
        self.inner.lock().unwrap().sources.len()
    }

    /// Atomically claim the item without posting it anywhere. Used by a
    /// source (the response handler) that must mutate the item — e.g. fill
    /// `reply_buf` — before deciding to complete. Returns `None` if another
    /// source already won this arming.
    pub fn disable(&self) -> Option<RequestItem> {
        let mut inner = self.inner.lock().unwrap();
        match std::mem::replace(&mut inner.slot, Slot::Idle) {
            Slot::Armed(item) => Some(item),
            Slot::Idle => None,
        }
    }

    /// Post a claimed item back to the driver queue, pairing with
    /// `disable()`. `err`, if set, is stamped onto the item first.
    pub fn post(&self, mut item: RequestItem, err: Option<AdminError>) {
        if err.is_some() {
            item.err = err;
        }
        let _ = self.target.send(item);
    }

    /// Attempt to complete. Returns `true` ("won") iff this is the first
    /// fire since the last arming; all later calls return `false` ("lost")
    /// and do nothing.
    pub fn fire(&self, err: Option<AdminError>) -> bool {
        match self.disable() {
            Some(item) => {
                self.post(item, err);
                true
            }
            None => false,
        }
    }

    /// Re-attach `item` and arm the trigger for another round.
    pub fn reenable(&self, item: RequestItem) {
        self.inner.lock().unwrap().slot = Slot::Armed(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::test_support::new_test_item;

    #[tokio::test]
    async fn only_the_first_fire_wins() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let trigger = std::sync::Arc::new(OneShotTrigger::new(tx));
        trigger.reenable(new_test_item(trigger.clone()));

        let mut wins = 0;
        for _ in 0..8 {
            if trigger.fire(None) {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn concurrent_fires_produce_exactly_one_post() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let trigger = std::sync::Arc::new(OneShotTrigger::new(tx));
        trigger.reenable(new_test_item(trigger.clone()));

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let trigger = trigger.clone();
            tasks.push(tokio::spawn(async move { trigger.fire(None) }));
        }
        let mut wins = 0;
        for t in tasks {
            if t.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn disable_without_arming_returns_none() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let trigger = OneShotTrigger::new(tx);
        assert!(trigger.disable().is_none());
    }
}
