//! HTML escaping for untrusted chat text.

/// Escape `raw` so it can be embedded in markup.
///
/// Replaces `& < > " ' /` with their entities and leaves everything else
/// untouched. Escaping is not idempotent: feeding the output back in
/// escapes the `&` of every entity again, so each untrusted field must be
/// escaped exactly once.
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    escape_into(&mut out, raw);
    out
}

/// Escape `raw` into an existing output buffer.
pub fn escape_into(out: &mut String, raw: &str) {
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(ch),
        }
    }
}

/// Reverse [`escape`] for the six entities it produces.
///
/// Used when exporting rendered lines back to plain text; any other entity is
/// left as-is.
#[must_use]
pub fn unescape(escaped: &str) -> String {
    escaped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x2F;", "/")
        .replace("&amp;", "&")
}
