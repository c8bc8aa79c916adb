//! Shared helpers.

use std::borrow::Cow;

/// Escape text for safe inclusion in HTML content and attribute values.
///
/// Borrows the input when nothing needs escaping.
#[must_use]
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Format a packed RGB colour as `#rrggbb`, clamping to the valid range.
#[must_use]
pub fn html_color(color: i64) -> String {
    format!("#{:06x}", color.clamp(0, 0xFF_FFFF))
}
