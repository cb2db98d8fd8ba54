//! The network layer the chatbox talks to.
//!
//! [`Network`] is the seam to a real transport. [`LocalNetwork`] is an
//! in-process implementation: events are delivered with
//! [`LocalNetwork::deliver`], outgoing messages are collected in an outbox and
//! can optionally be echoed back as `say` events, the way a server would
//! broadcast them.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::events::{EventKind, InboundEvent};

/// Callback invoked for each delivered event of a subscribed kind.
pub type EventHandler = Box<dyn Fn(InboundEvent) + Send + Sync>;

/// Handle returned by [`Network::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Publish/subscribe interface of the network layer.
pub trait Network: Send + Sync {
    /// Whether outgoing messages can currently be sent.
    fn is_connected(&self) -> bool;

    /// Send a chat message. Fire-and-forget.
    fn send_say(&self, message: &str);

    /// Subscribe `handler` to events of `kind`.
    fn on(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId;

    /// Remove a subscription. Unknown ids are ignored.
    fn off(&self, id: SubscriptionId);
}

struct Subscriber {
    id: SubscriptionId,
    kind: EventKind,
    handler: Arc<EventHandler>,
}

/// In-process network with a subscriber table and an outbox.
#[derive(Clone, Default)]
pub struct LocalNetwork {
    inner: Arc<LocalNetworkInner>,
}

#[derive(Default)]
struct LocalNetworkInner {
    subscribers: RwLock<Vec<Subscriber>>,
    next_id: AtomicU64,
    connected: AtomicBool,
    outbox: RwLock<Vec<String>>,
    /// Entity id used to echo sent messages back as `say` events.
    echo_as: RwLock<Option<String>>,
}

impl std::fmt::Debug for LocalNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalNetwork")
            .field("connected", &self.is_connected())
            .field("subscribers", &self.subscriber_count())
            .field("sent", &self.inner.outbox.read().unwrap().len())
            .finish()
    }
}

impl LocalNetwork {
    /// Create a disconnected network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, connected: bool) {
        self.inner.connected.store(connected, Ordering::SeqCst);
        info!(name: "network.connection", connected, "Connection state changed");
    }

    /// Echo every sent message back as a `say` from `eid`.
    pub fn echo_as(&self, eid: impl Into<String>) {
        *self.inner.echo_as.write().unwrap() = Some(eid.into());
    }

    /// Deliver an event to every subscriber of its kind, in subscription order.
    pub fn deliver(&self, event: InboundEvent) {
        let kind = event.kind();
        let handlers: Vec<Arc<EventHandler>> = self
            .inner
            .subscribers
            .read()
            .unwrap()
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| Arc::clone(&s.handler))
            .collect();

        debug!(
            name: "network.deliver",
            kind = %kind,
            handlers = handlers.len(),
            "Delivering event"
        );

        for handler in handlers {
            handler(event.clone());
        }
    }

    /// Messages sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.inner.outbox.read().unwrap().clone()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().unwrap().len()
    }
}

impl Network for LocalNetwork {
    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    fn send_say(&self, message: &str) {
        self.inner.outbox.write().unwrap().push(message.to_string());
        let echo = self.inner.echo_as.read().unwrap().clone();
        if let Some(eid) = echo {
            self.deliver(InboundEvent::say(eid, message));
        }
    }

    fn on(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        self.inner.subscribers.write().unwrap().push(Subscriber {
            id,
            kind,
            handler: Arc::new(handler),
        });
        id
    }

    fn off(&self, id: SubscriptionId) {
        self.inner.subscribers.write().unwrap().retain(|s| s.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_delivers_by_kind() {
        let network = LocalNetwork::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        network.on(
            EventKind::Join,
            Box::new(move |e: InboundEvent| sink.lock().unwrap().push(e)),
        );

        network.deliver(InboundEvent::say("e1", "ignored"));
        network.deliver(InboundEvent::join("e1", "bob"));

        assert_eq!(*seen.lock().unwrap(), vec![InboundEvent::join("e1", "bob")]);
    }

    #[test]
    fn test_off_removes_handler() {
        let network = LocalNetwork::new();
        let count = Arc::new(AtomicU64::new(0));

        let c = Arc::clone(&count);
        let id = network.on(
            EventKind::Say,
            Box::new(move |_: InboundEvent| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );
        network.deliver(InboundEvent::say("e", "one"));
        network.off(id);
        network.off(id);
        network.deliver(InboundEvent::say("e", "two"));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(network.subscriber_count(), 0);
    }

    #[test]
    fn test_send_records_and_echoes() {
        let network = LocalNetwork::new();
        network.set_connected(true);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        network.on(
            EventKind::Say,
            Box::new(move |e: InboundEvent| sink.lock().unwrap().push(e)),
        );

        network.send_say("quiet");
        network.echo_as("me");
        network.send_say("loud");

        assert_eq!(network.sent(), vec!["quiet", "loud"]);
        assert_eq!(*seen.lock().unwrap(), vec![InboundEvent::say("me", "loud")]);
    }

    #[test]
    fn test_starts_disconnected() {
        let network = LocalNetwork::new();
        assert!(!network.is_connected());
        network.set_connected(true);
        assert!(network.is_connected());
    }
}
