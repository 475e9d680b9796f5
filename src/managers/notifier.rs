//! Store change notification fan-out with an explicit suppression switch.
//!
//! Each subscriber owns an unbounded tokio channel and receives
//! [`StoreEvent`]s on it. While delivery is
//! disabled, events are dropped and the notifier remembers that something
//! changed; re-enabling then sends a single [`StoreEvent::Reloaded`].

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::types::category::StoreEvent;

/// Identifies one subscriber for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving end of a store subscription.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    events: UnboundedReceiver<StoreEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Drains every event delivered so far, in delivery order.
    pub fn drain(&mut self) -> Vec<StoreEvent> {
        let mut out = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => out.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }
}

#[derive(Debug)]
pub struct Notifier {
    subscribers: Vec<(SubscriptionId, UnboundedSender<StoreEvent>)>,
    next_id: u64,
    enabled: bool,
    dirty: bool,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
            enabled: true,
            dirty: false,
        }
    }

    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, tx));
        tracing::debug!(subscription = id.0, "store observer added");
        Subscription { id, events: rx }
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
        tracing::debug!(subscription = id.0, "store observer removed");
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switches delivery on or off. Turning it on after suppressed changes
    /// sends exactly one catch-up event.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if enabled && self.dirty {
            self.dirty = false;
            tracing::debug!("flushing suppressed store changes as a catch-up reload");
            self.broadcast(StoreEvent::Reloaded);
        }
    }

    /// Delivers `event`, or records it as a pending change while suppressed.
    pub fn emit(&mut self, event: StoreEvent) {
        if self.enabled {
            self.broadcast(event);
        } else {
            self.dirty = true;
        }
    }

    /// Delivers an outcome report regardless of suppression. Reports carry
    /// no data change and would be lost in a catch-up reload.
    pub fn report(&mut self, event: StoreEvent) {
        self.broadcast(event);
    }

    fn broadcast(&mut self, event: StoreEvent) {
        // Receivers dropped without unsubscribing are pruned here
        self.subscribers.retain(|(_, tx)| tx.send(event).is_ok());
    }
}
