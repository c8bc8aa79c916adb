//! Matrix HTML to chat-markdown transcoder.
//!
//! [`MatrixMessageParser`] parses a message's `formatted_body` into a
//! [`ParsedNode`] tree and walks it, emitting chat markdown. Mentions and
//! custom emoji are looked up through a [`MatrixDirectory`] as the walk
//! reaches them, strictly in document order.
//!
//! # Example
//!
//! ```no_run
//! # async fn example(directory: &dyn mxd_matrix::MatrixDirectory) {
//! use mxd_matrix::{MatrixMessage, MatrixMessageParser};
//!
//! let parser = MatrixMessageParser::new();
//! let message = MatrixMessage::html("<strong>hi</strong> <em>there</em>");
//! let text = parser.format_message(&message, "alice", directory).await;
//! assert_eq!(text, "**hi** *there*");
//! # }
//! ```

mod directory;
mod escape;
mod language;
mod list;
mod message;
mod node;
mod parser;
mod shortener;

pub use directory::MatrixDirectory;
pub use escape::escape_markdown;
pub use language::detect_language;
pub use list::{BULLETS, ListKind, render_list};
pub use message::{MatrixMessage, MsgType};
pub use node::{ParsedNode, parse_html};
pub use parser::MatrixMessageParser;
pub use shortener::{HttpLinkShortener, LinkShortener, ShortenError};
