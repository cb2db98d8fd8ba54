//! Routing network events and local input into the history buffer.
//!
//! The router subscribes to `say`, `join` and `leave` on the network. Its
//! handlers only enqueue events; the router then drains its queue in arrival
//! order on whichever task owns it ([`EventRouter::pump`] or
//! [`EventRouter::process_next`]). Network threads never touch the buffer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::events::{EventKind, InboundEvent};
use crate::history::{HistoryBuffer, HtmlPane, Pane};
use crate::network::{Network, SubscriptionId};
use crate::render::{escape, escape_and_linkify};
use crate::world::{CHAT_AUDIO_NODE, World};

/// Line shown when the user submits while the network is down.
pub const NOT_CONNECTED: &str = "Not connected!";

/// Decides whether a `join`/`leave` event gets a line. Returning `false`
/// suppresses it.
pub type PresenceFilter = Box<dyn Fn(&InboundEvent) -> bool + Send + Sync>;

/// What happened to a submitted input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Empty or whitespace-only input. Nothing happened.
    Ignored,
    /// The network is down; a local notice was shown. Keep the input.
    NotConnected,
    /// Handed to the network. Clear the input.
    Sent,
}

/// Maps network events and user input onto a [`HistoryBuffer`].
pub struct EventRouter<P: Pane = HtmlPane> {
    history: HistoryBuffer<P>,
    world: Arc<dyn World>,
    network: Arc<dyn Network>,
    presence_filter: Option<PresenceFilter>,
    queue_tx: mpsc::UnboundedSender<InboundEvent>,
    queue_rx: mpsc::UnboundedReceiver<InboundEvent>,
    subscriptions: Vec<SubscriptionId>,
}

impl<P: Pane> std::fmt::Debug for EventRouter<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("history", &self.history)
            .field("presence_filter", &self.presence_filter.is_some())
            .field("subscriptions", &self.subscriptions)
            .finish()
    }
}

impl<P: Pane> EventRouter<P> {
    /// Create an unbound router. Call [`bind`](Self::bind) to start
    /// receiving network events.
    pub fn new(history: HistoryBuffer<P>, world: Arc<dyn World>, network: Arc<dyn Network>) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        Self {
            history,
            world,
            network,
            presence_filter: None,
            queue_tx,
            queue_rx,
            subscriptions: Vec::new(),
        }
    }

    /// Install a filter for presence lines.
    #[must_use]
    pub fn with_presence_filter(mut self, filter: PresenceFilter) -> Self {
        self.presence_filter = Some(filter);
        self
    }

    /// Subscribe to `say`, `join` and `leave`. Binding twice is a no-op.
    pub fn bind(&mut self) {
        if self.is_bound() {
            return;
        }
        for kind in EventKind::ALL {
            let tx = self.queue_tx.clone();
            let id = self.network.on(
                kind,
                Box::new(move |event: InboundEvent| {
                    // The receiver lives as long as the router, which
                    // unsubscribes on drop.
                    let _ = tx.send(event);
                }),
            );
            self.subscriptions.push(id);
        }
        info!(name: "router.bound", subscriptions = self.subscriptions.len(), "Chatbox bound to network");
    }

    /// Remove every subscription made by [`bind`](Self::bind).
    pub fn unbind(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }
        for id in self.subscriptions.drain(..) {
            self.network.off(id);
        }
        info!(name: "router.unbound", "Chatbox unbound from network");
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Handle every queued event, in arrival order. Returns how many ran.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.queue_rx.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    /// Wait for the next queued event and handle it.
    pub async fn process_next(&mut self) {
        // The router holds a sender, so the queue never closes underneath us.
        if let Some(event) = self.queue_rx.recv().await {
            self.handle(event);
        }
    }

    /// Handle one event immediately.
    pub fn handle(&mut self, event: InboundEvent) {
        if event.kind() != EventKind::Say && !self.presence_allowed(&event) {
            debug!(
                name: "router.presence_suppressed",
                eid = %event.eid(),
                kind = %event.kind(),
                "Presence line suppressed"
            );
            return;
        }
        match event {
            InboundEvent::Say { eid, msg } => self.say(&eid, &msg),
            InboundEvent::Join { nick, .. } => self.join(&nick),
            InboundEvent::Leave { eid, reason } => self.leave(&eid, &reason),
        }
    }

    fn presence_allowed(&self, event: &InboundEvent) -> bool {
        self.presence_filter.as_ref().is_none_or(|filter| filter(event))
    }

    /// Render a chat message from `eid`. Unknown speakers are dropped.
    pub fn say(&mut self, eid: &str, msg: &str) {
        let Some(entity) = self.world.find(eid) else {
            debug!(name: "router.unknown_entity", eid, kind = "say", "Dropping event for unknown entity");
            return;
        };

        let classes = if entity.authenticated {
            "nickname auth"
        } else {
            "nickname"
        };
        let output = format!(
            r##"<span class="{classes}"><a href="#">{}</a></span>: {}"##,
            escape(&entity.nick),
            escape_and_linkify(msg)
        );
        self.history.append(&output, true);

        if let Some(sound) = self.world.find_sound(CHAT_AUDIO_NODE) {
            sound.play();
        }
    }

    /// Render a join notice. The entity does not need to be registered yet.
    pub fn join(&mut self, nick: &str) {
        self.history
            .append(&format!("{} connected", escape(nick)), true);
    }

    /// Render a leave notice. Unknown entities are dropped.
    pub fn leave(&mut self, eid: &str, reason: &str) {
        let Some(entity) = self.world.find(eid) else {
            debug!(name: "router.unknown_entity", eid, kind = "leave", "Dropping event for unknown entity");
            return;
        };
        self.history.append(
            &format!(
                "{} disconnected ({})",
                escape(&entity.nick),
                escape(reason)
            ),
            true,
        );
    }

    /// Submit a line typed by the local user.
    ///
    /// The text is forwarded raw; it is escaped when the network echoes it
    /// back as a `say` event. Events already queued are rendered first, so a
    /// local notice never jumps ahead of them.
    pub fn submit(&mut self, input: &str) -> SubmitOutcome {
        self.pump();
        if input.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }
        if !self.network.is_connected() {
            self.history.append(NOT_CONNECTED, true);
            return SubmitOutcome::NotConnected;
        }
        self.network.send_say(input);
        debug!(name: "router.submitted", len = input.len(), "Message sent");
        SubmitOutcome::Sent
    }

    #[must_use]
    pub fn history(&self) -> &HistoryBuffer<P> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryBuffer<P> {
        &mut self.history
    }
}

impl<P: Pane> Drop for EventRouter<P> {
    fn drop(&mut self) {
        self.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::LocalNetwork;
    use crate::render::FixedClock;
    use crate::world::{Entity, EntityRegistry, Sound};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TS: &str = r#"<span class="timestamp">12:00:05</span> "#;

    fn setup() -> (EventRouter, EntityRegistry, LocalNetwork) {
        let world = EntityRegistry::new();
        let network = LocalNetwork::new();
        let history =
            HistoryBuffer::with_clock(HtmlPane::new(), 300, Arc::new(FixedClock::new(12, 0, 5)));
        let router = EventRouter::new(
            history,
            Arc::new(world.clone()),
            Arc::new(network.clone()),
        );
        (router, world, network)
    }

    fn last_markup(router: &EventRouter) -> String {
        router
            .history()
            .lines()
            .last()
            .map(|l| l.markup().to_string())
            .unwrap_or_default()
    }

    #[derive(Debug, Default)]
    struct Bleep(AtomicUsize);

    impl Sound for Bleep {
        fn play(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_say_from_known_entity() {
        let (mut router, world, _) = setup();
        world.insert("e1", Entity::new("alice"));

        router.say("e1", "see http://example.com/x");

        let url = "http:&#x2F;&#x2F;example.com&#x2F;x";
        assert_eq!(
            last_markup(&router),
            format!(
                r##"{TS}<span class="nickname"><a href="#">alice</a></span>: see <a href='{url}'>{url}</a>"##
            )
        );
    }

    #[test]
    fn test_say_marks_authenticated() {
        let (mut router, world, _) = setup();
        world.insert("e1", Entity::new("root").authenticated());
        router.say("e1", "hi");
        assert!(last_markup(&router).contains(r#"<span class="nickname auth">"#));
    }

    #[test]
    fn test_say_escapes_nick_and_message() {
        let (mut router, world, _) = setup();
        world.insert("e1", Entity::new("<b>evil</b>"));
        router.say("e1", "<img src=x onerror=alert(1)>");

        let line = last_markup(&router);
        assert!(line.contains("&lt;b&gt;evil&lt;&#x2F;b&gt;"));
        assert!(line.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(!line.contains("<img"));
        assert!(!line.contains("<b>"));
    }

    #[test]
    fn test_say_from_unknown_entity_is_dropped() {
        let (mut router, _, _) = setup();
        router.say("ghost", "boo");
        assert!(router.history().is_empty());
        assert_eq!(router.history().total_appended(), 0);
    }

    #[test]
    fn test_say_plays_chat_audio_when_present() {
        let (mut router, world, _) = setup();
        world.insert("e1", Entity::new("alice"));
        router.say("e1", "no sound registered");

        let bleep = Arc::new(Bleep::default());
        world.insert_sound(CHAT_AUDIO_NODE, bleep.clone());
        router.say("e1", "one");
        router.say("ghost", "dropped, no sound");

        assert_eq!(bleep.0.load(Ordering::SeqCst), 1);
        assert_eq!(router.history().len(), 2);
    }

    #[test]
    fn test_join_needs_no_entity() {
        let (mut router, _, _) = setup();
        router.join("bob");
        assert_eq!(last_markup(&router), format!("{TS}bob connected"));

        router.join("<i>x</i>");
        assert_eq!(
            last_markup(&router),
            format!("{TS}&lt;i&gt;x&lt;&#x2F;i&gt; connected")
        );
    }

    #[test]
    fn test_leave() {
        let (mut router, world, _) = setup();
        world.insert("e1", Entity::new("carol"));

        router.leave("e1", "Ping timeout <30s>");
        assert_eq!(
            last_markup(&router),
            format!("{TS}carol disconnected (Ping timeout &lt;30s&gt;)")
        );

        router.leave("ghost", "gone");
        assert_eq!(router.history().len(), 1);
    }

    #[test]
    fn test_submit_rules() {
        let (mut router, _, network) = setup();

        assert_eq!(router.submit(""), SubmitOutcome::Ignored);
        assert_eq!(router.submit("   "), SubmitOutcome::Ignored);
        assert!(router.history().is_empty());
        assert!(network.sent().is_empty());

        assert_eq!(router.submit("hi"), SubmitOutcome::NotConnected);
        assert_eq!(router.history().len(), 1);
        assert_eq!(last_markup(&router), format!("{TS}Not connected!"));
        assert!(network.sent().is_empty());

        network.set_connected(true);
        assert_eq!(router.submit("hi"), SubmitOutcome::Sent);
        assert_eq!(router.history().len(), 1);
        assert_eq!(network.sent(), vec!["hi"]);
    }

    #[test]
    fn test_bound_events_arrive_in_order() {
        let (mut router, world, network) = setup();
        world.insert("e1", Entity::new("alice"));
        router.bind();
        router.bind();
        assert_eq!(network.subscriber_count(), 3);

        network.deliver(InboundEvent::join("e1", "alice"));
        network.deliver(InboundEvent::say("e1", "first"));
        network.deliver(InboundEvent::say("nobody", "dropped"));
        network.deliver(InboundEvent::leave("e1", "bye"));

        assert!(router.history().is_empty());
        assert_eq!(router.pump(), 4);

        let text: Vec<String> = router.history().lines().map(|l| l.plain_text()).collect();
        assert_eq!(
            text,
            vec![
                "12:00:05 alice connected",
                "12:00:05 alice: first",
                "12:00:05 alice disconnected (bye)",
            ]
        );
    }

    #[test]
    fn test_submit_renders_after_queued_events() {
        let (mut router, world, network) = setup();
        world.insert("e1", Entity::new("alice"));
        router.bind();

        network.deliver(InboundEvent::say("e1", "first"));
        assert_eq!(router.submit("hi"), SubmitOutcome::NotConnected);
        network.deliver(InboundEvent::say("e1", "second"));
        router.pump();

        let text: Vec<String> = router.history().lines().map(|l| l.plain_text()).collect();
        assert_eq!(
            text,
            vec![
                "12:00:05 alice: first",
                "12:00:05 Not connected!",
                "12:00:05 alice: second",
            ]
        );
    }

    #[test]
    fn test_echoed_send_renders_once() {
        let (mut router, world, network) = setup();
        world.insert("me", Entity::new("me"));
        network.set_connected(true);
        network.echo_as("me");
        router.bind();

        assert_eq!(router.submit("hello"), SubmitOutcome::Sent);
        assert!(router.history().is_empty());
        router.pump();
        assert_eq!(router.history().len(), 1);
        assert!(last_markup(&router).ends_with(": hello"));
    }

    #[test]
    fn test_unbind_and_drop_remove_subscriptions() {
        let (mut router, _, network) = setup();
        router.bind();
        router.unbind();
        assert!(!router.is_bound());
        assert_eq!(network.subscriber_count(), 0);

        network.deliver(InboundEvent::join("e1", "late"));
        assert_eq!(router.pump(), 0);

        router.bind();
        assert_eq!(network.subscriber_count(), 3);
        drop(router);
        assert_eq!(network.subscriber_count(), 0);
    }

    #[test]
    fn test_presence_filter_suppresses_own_events() {
        let (router, world, _) = setup();
        let mut router = router.with_presence_filter(Box::new(|event: &InboundEvent| event.eid() != "me"));
        world.insert("me", Entity::new("me"));
        world.insert("e1", Entity::new("alice"));

        router.handle(InboundEvent::join("me", "me"));
        router.handle(InboundEvent::leave("me", "quit"));
        router.handle(InboundEvent::say("me", "still shown"));
        router.handle(InboundEvent::join("e1", "alice"));

        let text: Vec<String> = router.history().lines().map(|l| l.plain_text()).collect();
        assert_eq!(
            text,
            vec!["12:00:05 me: still shown", "12:00:05 alice connected"]
        );
    }

    #[tokio::test]
    async fn test_events_from_other_threads_keep_order() {
        let (mut router, _, network) = setup();
        router.bind();

        let sender = network.clone();
        std::thread::spawn(move || {
            for i in 0..50 {
                sender.deliver(InboundEvent::join(format!("e{i}"), format!("user{i}")));
            }
        })
        .join()
        .unwrap();

        for _ in 0..50 {
            router.process_next().await;
        }

        let nicks: Vec<String> = router.history().lines().map(|l| l.plain_text()).collect();
        let expected: Vec<String> = (0..50)
            .map(|i| format!("12:00:05 user{i} connected"))
            .collect();
        assert_eq!(nicks, expected);
    }
}
