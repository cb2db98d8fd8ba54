//! URL detection over already-escaped chat text.
//!
//! The pattern is written against the output of [`escape`](super::escape):
//! `/` only ever appears as `&#x2F;` and a bare `&` only as the start of an
//! entity. Only `&amp;` and `&#x2F;` are accepted inside a URL, so a match
//! never swallows an escaped quote or angle bracket and the inserted anchor
//! stays inside a single-quoted attribute that cannot be closed early.

use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:https?|ftps?):&#x2F;&#x2F;(?:&amp;|&#x2F;|[-A-Z0-9+@#%?=~_|!:,.;])*(?:&amp;|&#x2F;|[-A-Z0-9+@#%=~_|])",
    )
    .expect("URL pattern is valid")
});

/// Wrap every URL-shaped run in `escaped` with an anchor pointing at itself.
///
/// `escaped` must already have gone through the sanitizer; running this on
/// raw text would let crafted input smuggle markup through the anchor.
#[must_use]
pub fn linkify(escaped: &str) -> String {
    URL_RE
        .replace_all(escaped, "<a href='${0}'>${0}</a>")
        .into_owned()
}
