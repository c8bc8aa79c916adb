//! Nested list layout.

use std::fmt::Write;

/// Bullet glyphs, rotated by nesting depth.
pub const BULLETS: [char; 4] = ['●', '○', '■', '‣'];

/// Indentation per nesting level.
const INDENT: &str = "    ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    /// Numbered from `start`.
    Ordered { start: u64 },
}

impl ListKind {
    /// Ordered list honouring a purely numeric `start` attribute.
    #[must_use]
    pub fn ordered(start: Option<&str>) -> Self {
        let start = start
            .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);
        Self::Ordered { start }
    }
}

/// Lay out already rendered list items at `depth`.
///
/// Items are indented by four spaces per level. A top-level list is
/// surrounded by blank lines to set it apart from the prose around it.
#[must_use]
pub fn render_list(kind: ListKind, items: &[String], depth: usize) -> String {
    let indent = INDENT.repeat(depth);
    let mut out = String::new();
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        match kind {
            ListKind::Unordered => {
                let bullet = BULLETS[depth % BULLETS.len()];
                write!(out, "{indent}{bullet} {item}").unwrap();
            }
            ListKind::Ordered { start } => {
                let number = start.saturating_add(index as u64);
                write!(out, "{indent}{number}. {item}").unwrap();
            }
        }
    }

    if depth == 0 {
        format!("\n{out}\n\n")
    } else {
        out
    }
}
