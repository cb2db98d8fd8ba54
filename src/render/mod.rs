//! Turning untrusted chat text into safe markup.
//!
//! - [`sanitize`]: HTML entity escaping
//! - [`linkify`]: anchor wrapping for URLs in escaped text
//! - [`timestamp`]: `H:MM:SS` line prefixes
//!
//! Order matters: escape first, then linkify.

pub mod linkify;
pub mod sanitize;
pub mod timestamp;

pub use linkify::linkify;
pub use sanitize::{escape, escape_into, unescape};
pub use timestamp::{Clock, FixedClock, SystemClock, format_timestamp, timestamp};

/// Escape `raw` and then link any URLs in it.
#[must_use]
pub fn escape_and_linkify(raw: &str) -> String {
    linkify(&escape(raw))
}
