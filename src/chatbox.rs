//! The chatbox widget shell.
//!
//! Wraps an [`EventRouter`] with the parts of the widget that live outside the
//! rendering pipeline: the single-line input, the widget size, the drag
//! containment and the menu. The shell only talks to the core through
//! [`EventRouter::submit`] and the history buffer it owns.

use std::sync::Arc;

use tracing::info;

use crate::config::ChatboxConfig;
use crate::error::Result;
use crate::history::{HistoryBuffer, HtmlPane, Pane};
use crate::network::Network;
use crate::render::{Clock, SystemClock, escape};
use crate::router::{EventRouter, SubmitOutcome};
use crate::world::World;

/// Longest line the input accepts, in characters.
pub const INPUT_MAX_LENGTH: usize = 180;

/// Height taken by the header and input bar; the output fills the rest.
const CHROME_HEIGHT: u32 = 63;

/// The chatbox input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInput {
    value: String,
    placeholder: String,
}

impl ChatInput {
    fn new(placeholder: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            placeholder: placeholder.into(),
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Append typed text, dropping whatever exceeds [`INPUT_MAX_LENGTH`].
    pub fn type_text(&mut self, text: &str) {
        let room = INPUT_MAX_LENGTH.saturating_sub(self.value.chars().count());
        self.value.extend(text.chars().take(room));
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }
}

/// Widget size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// An entry in the chatbox menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    SaveChat,
}

impl MenuItem {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SaveChat => "Save Chat",
        }
    }
}

/// One mounted chatbox.
#[derive(Debug)]
pub struct Chatbox<P: Pane = HtmlPane> {
    router: EventRouter<P>,
    input: ChatInput,
    size: Size,
    min_size: Size,
    containment: Option<String>,
    menu: Vec<MenuItem>,
}

impl<P: Pane> Chatbox<P> {
    /// Mount a chatbox on `pane` and bind it to `network`.
    pub fn new(
        config: &ChatboxConfig,
        pane: P,
        world: Arc<dyn World>,
        network: Arc<dyn Network>,
    ) -> Result<Self> {
        Self::with_clock(config, pane, Arc::new(SystemClock), world, network)
    }

    /// Like [`new`](Self::new) with an explicit timestamp clock.
    pub fn with_clock(
        config: &ChatboxConfig,
        pane: P,
        clock: Arc<dyn Clock>,
        world: Arc<dyn World>,
        network: Arc<dyn Network>,
    ) -> Result<Self> {
        config.validate()?;

        let history = HistoryBuffer::with_clock(pane, config.history_capacity, clock);
        let mut router = EventRouter::new(history, world, network);
        router.bind();

        let min_size = Size {
            width: config.min_width,
            height: config.min_height,
        };
        let mut chatbox = Self {
            router,
            input: ChatInput::new(config.placeholder.clone()),
            size: min_size,
            min_size,
            containment: config.containment.clone(),
            menu: vec![MenuItem::SaveChat],
        };
        chatbox.router.history_mut().refresh();

        info!(
            name: "chatbox.mounted",
            capacity = config.history_capacity,
            containment = ?chatbox.containment,
            "Chatbox mounted"
        );
        Ok(chatbox)
    }

    #[must_use]
    pub fn router(&self) -> &EventRouter<P> {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut EventRouter<P> {
        &mut self.router
    }

    #[must_use]
    pub fn history(&self) -> &HistoryBuffer<P> {
        self.router.history()
    }

    #[must_use]
    pub fn input(&self) -> &ChatInput {
        &self.input
    }

    pub fn type_text(&mut self, text: &str) {
        self.input.type_text(text);
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Submit the current input. It is cleared only once it was sent.
    pub fn press_enter(&mut self) -> SubmitOutcome {
        let outcome = self.router.submit(self.input.value());
        if outcome == SubmitOutcome::Sent {
            self.input.clear();
        }
        outcome
    }

    /// Handle queued network events.
    pub fn pump(&mut self) -> usize {
        self.router.pump()
    }

    /// Resize the widget, never below the configured minimum.
    pub fn resize(&mut self, width: u32, height: u32) -> Size {
        self.size = Size {
            width: width.max(self.min_size.width),
            height: height.max(self.min_size.height),
        };
        self.router.history_mut().refresh();
        self.size
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Height left for the scrollable output.
    #[must_use]
    pub fn output_height(&self) -> u32 {
        self.size.height.saturating_sub(CHROME_HEIGHT)
    }

    #[must_use]
    pub fn containment(&self) -> Option<&str> {
        self.containment.as_deref()
    }

    #[must_use]
    pub fn menu_items(&self) -> &[MenuItem] {
        &self.menu
    }

    /// Plain-text transcript of the retained lines.
    #[must_use]
    pub fn save_chat(&self) -> String {
        self.history().transcript()
    }

    /// Widget skeleton. The output pane is filled in by the host.
    #[must_use]
    pub fn markup(&self) -> String {
        let containment = self
            .containment
            .as_deref()
            .map(|c| format!(r#" data-containment="{}""#, escape(c)))
            .unwrap_or_default();
        let menu: String = self
            .menu
            .iter()
            .map(|item| format!(r##"<a href="#">{}</a>"##, item.label()))
            .collect();
        let output_height = self.output_height();

        format!(
            r#"<div class="frojs-chatbox ui-widget-content"{containment} style="width: {}px; height: {}px">
<div class="background" style="height: {}px"></div>
<div class="header"><div class="controls"></div></div>
<div class="output-container" style="height: {output_height}px"><div class="scroll-pane"></div><div class="menu">{menu}</div></div>
<div class="input-container-wrap"><div class="input-container">
<input type="text" placeholder="{}" maxlength="{INPUT_MAX_LENGTH}" />
</div></div>
</div>"#,
            self.size.width,
            self.size.height,
            output_height + 3,
            escape(self.input.placeholder()),
        )
    }

    /// Unbind from the network. Dropping the chatbox does the same.
    pub fn teardown(&mut self) {
        self.router.unbind();
    }
}
