//! Capacity-bounded chat history.
//!
//! A [`HistoryBuffer`] owns the rendered lines of one chatbox together with
//! the [`Pane`] they are shown in. It is the only writer to that pane.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use frochat::history::{HistoryBuffer, HtmlPane};
//! use frochat::render::FixedClock;
//!
//! let mut history = HistoryBuffer::with_clock(HtmlPane::new(), 2, Arc::new(FixedClock::new(9, 5, 0)));
//! history.append("one", false);
//! history.append("two", true);
//! history.append("three", false);
//!
//! assert_eq!(history.len(), 2);
//! assert_eq!(history.lines().next().unwrap().markup(), r#"<span class="timestamp">9:05:00</span> two"#);
//! ```

pub mod pane;

pub use pane::{HtmlPane, Pane};

use std::collections::VecDeque;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use crate::render::{Clock, SystemClock, timestamp, unescape};

/// Default number of lines a chatbox keeps.
pub const MAX_HISTORY_LINES: usize = 300;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// One rendered, safe-to-insert line of chat output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    rendered_markup: String,
    timestamped: bool,
}

impl ChatLine {
    /// The line's markup, including the timestamp span if any.
    #[must_use]
    pub fn markup(&self) -> &str {
        &self.rendered_markup
    }

    #[must_use]
    pub fn is_timestamped(&self) -> bool {
        self.timestamped
    }

    /// The line with tags stripped and entities decoded.
    #[must_use]
    pub fn plain_text(&self) -> String {
        unescape(&TAG_RE.replace_all(&self.rendered_markup, ""))
    }
}

/// Append-only, FIFO-evicting history of chat lines.
#[derive(Debug)]
pub struct HistoryBuffer<P: Pane = HtmlPane> {
    capacity: usize,
    lines: VecDeque<ChatLine>,
    total_appended: u64,
    pane: P,
    clock: Arc<dyn Clock>,
}

impl<P: Pane> HistoryBuffer<P> {
    /// Create a buffer that keeps at most `capacity` lines.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(pane: P, capacity: usize) -> Self {
        Self::with_clock(pane, capacity, Arc::new(SystemClock))
    }

    /// Like [`new`](Self::new) with an explicit clock for timestamps.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_clock(pane: P, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        assert!(capacity > 0, "history capacity must be at least one line");
        Self {
            capacity,
            lines: VecDeque::with_capacity(capacity.min(MAX_HISTORY_LINES)),
            total_appended: 0,
            pane,
            clock,
        }
    }

    /// Append a line of markup, evicting the oldest line when full.
    ///
    /// `markup` is inserted verbatim: every untrusted part of it must already
    /// be escaped. The pane is re-measured and then scrolled to the bottom.
    pub fn append(&mut self, markup: &str, timestamped: bool) {
        let rendered_markup = if timestamped {
            format!(
                r#"<span class="timestamp">{}</span> {markup}"#,
                timestamp(self.clock.as_ref())
            )
        } else {
            markup.to_string()
        };

        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
            self.pane.remove_oldest();
            debug!(
                name: "history.evicted",
                capacity = self.capacity,
                total_appended = self.total_appended,
                "Evicted oldest chat line"
            );
        }

        self.pane.append(&format!("<p>{rendered_markup}</p>"));
        self.lines.push_back(ChatLine {
            rendered_markup,
            timestamped,
        });
        self.total_appended += 1;

        self.refresh();
    }

    /// Re-measure the pane and scroll to the newest line.
    pub fn refresh(&mut self) {
        self.pane.reinitialise();
        self.pane.scroll_to_bottom();
    }

    /// Retained lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &ChatLine> {
        self.lines.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of lines ever appended to this buffer.
    #[must_use]
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }

    /// Number of lines dropped to stay within capacity.
    #[must_use]
    pub fn evicted(&self) -> u64 {
        self.total_appended - self.lines.len() as u64
    }

    #[must_use]
    pub fn pane(&self) -> &P {
        &self.pane
    }

    /// Plain-text export of the retained lines, one per line.
    #[must_use]
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.plain_text());
            out.push('\n');
        }
        out
    }
}
