//! Chat-markdown parser and trait-based renderer.
//!
//! This crate turns chat-platform markdown (mentions, custom emoji, spoilers,
//! the usual emphasis markers) into either plain text or Matrix-flavoured
//! HTML using the [`RenderBackend`] trait.
//!
//! # Architecture
//!
//! Rendering happens in two phases:
//! - [`parse`] builds an AST of [`Node`]s. Which rules are active depends on
//!   the [`ParseMode`]: the plain backend only recognises platform entities,
//!   the HTML backend recognises the full grammar.
//! - [`MarkdownRenderer`] walks the AST and writes backend output into a
//!   [`Rendered`] buffer. Entities that need an asynchronous directory lookup
//!   (users, channels, custom emoji) are not rendered yet; they are stored as
//!   typed [`Placeholder`] segments and resolved later by the caller through
//!   the same backend ([`RenderBackend::user`] and friends).
//!
//! # Example
//!
//! ```
//! use mxd_markdown::{HtmlBackend, MarkdownRenderer, Placeholder};
//!
//! let rendered = MarkdownRenderer::<HtmlBackend>::new().render("**hi** <@42>");
//! let pending: Vec<_> = rendered.placeholders().collect();
//! assert_eq!(pending, vec![&Placeholder::User { id: "42".to_owned() }]);
//!
//! let html = rendered.into_string_with(|p| format!("[{}]", p.source_syntax()));
//! assert_eq!(html, "<strong>hi</strong> [<@42>]");
//! ```

mod ast;
mod backend;
mod html;
mod parser;
mod placeholder;
mod plain;
mod renderer;
mod util;

pub use ast::{Broadcast, Node, Style};
pub use backend::RenderBackend;
pub use html::{EMOJI_SIZE, HtmlBackend, MATRIX_TO_LINK};
pub use parser::{ParseMode, ParseOptions, parse};
pub use placeholder::{Emoji, Placeholder, PlaceholderKind, ResolvedEntity, Role};
pub use plain::PlainBackend;
pub use renderer::{MarkdownRenderer, Rendered, Segment};
pub use util::{escape_html, html_color};
