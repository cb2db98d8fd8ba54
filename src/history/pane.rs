//! The scrollable pane a history buffer renders into.

use std::collections::VecDeque;

/// Rendering target for chat lines.
///
/// After every mutation the buffer calls [`reinitialise`](Pane::reinitialise)
/// and then [`scroll_to_bottom`](Pane::scroll_to_bottom). Scrolling before the
/// pane has re-measured its content lands on a stale offset.
pub trait Pane: Send + std::fmt::Debug {
    /// Append one rendered line fragment at the bottom.
    fn append(&mut self, fragment: &str);
    /// Remove the topmost (oldest) line fragment.
    fn remove_oldest(&mut self);
    /// Re-measure content after the DOM changed.
    fn reinitialise(&mut self);
    /// Scroll the viewport to the newest line.
    fn scroll_to_bottom(&mut self);
}

/// An in-memory pane holding the rendered `<p>` fragments.
///
/// Used by the demo server to serve the pane contents over HTTP and by tests
/// to inspect what a real viewport would show.
#[derive(Debug, Default, Clone)]
pub struct HtmlPane {
    fragments: VecDeque<String>,
    reinitialised: u64,
    scrolled: u64,
    /// Whether the last re-measure happened after the last append/remove.
    measured: bool,
    /// Whether the viewport sits at the bottom of freshly measured content.
    at_bottom: bool,
}

impl HtmlPane {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered fragments, oldest first.
    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Concatenated inner HTML of the pane.
    #[must_use]
    pub fn inner_html(&self) -> String {
        self.fragments.iter().map(String::as_str).collect()
    }

    #[must_use]
    pub fn reinitialise_count(&self) -> u64 {
        self.reinitialised
    }

    #[must_use]
    pub fn scroll_count(&self) -> u64 {
        self.scrolled
    }

    /// True when the viewport was scrolled against up-to-date measurements.
    #[must_use]
    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.at_bottom
    }
}

impl Pane for HtmlPane {
    fn append(&mut self, fragment: &str) {
        self.fragments.push_back(fragment.to_string());
        self.measured = false;
        self.at_bottom = false;
    }

    fn remove_oldest(&mut self) {
        self.fragments.pop_front();
        self.measured = false;
        self.at_bottom = false;
    }

    fn reinitialise(&mut self) {
        self.reinitialised += 1;
        self.measured = true;
        self.at_bottom = false;
    }

    fn scroll_to_bottom(&mut self) {
        self.scrolled += 1;
        self.at_bottom = self.measured;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_fragments_in_order() {
        let mut pane = HtmlPane::new();
        pane.append("<p>a</p>");
        pane.append("<p>b</p>");
        pane.remove_oldest();
        pane.append("<p>c</p>");
        assert_eq!(pane.inner_html(), "<p>b</p><p>c</p>");
        assert_eq!(pane.len(), 2);
    }

    #[test]
    fn test_scroll_before_measure_is_not_at_bottom() {
        let mut pane = HtmlPane::new();
        pane.append("<p>a</p>");
        pane.scroll_to_bottom();
        assert!(!pane.is_scrolled_to_bottom());

        pane.reinitialise();
        pane.scroll_to_bottom();
        assert!(pane.is_scrolled_to_bottom());
    }

    #[test]
    fn test_remove_oldest_on_empty_pane_is_noop() {
        let mut pane = HtmlPane::new();
        pane.remove_oldest();
        assert!(pane.is_empty());
    }
}
