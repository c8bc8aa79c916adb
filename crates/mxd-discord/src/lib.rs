//! Chat-markdown message to Matrix event transcoder.
//!
//! [`DiscordMessageParser`] renders a [`DiscordMessage`] twice, once as the
//! plain `body` and once as the HTML `formatted_body`, then resolves the
//! mentioned users, channels and custom emoji through a
//! [`DiscordDirectory`].
//!
//! Each rendering goes through the same pipeline:
//! 1. quoted reply (one level, never the reply's own reply)
//! 2. message content
//! 3. embeds that are not already linked from the content
//! 4. placeholder sweeps: emoji, then users, then channels

mod compose;
mod dedupe;
mod directory;
mod message;
mod parser;
mod resolve;
mod result;

pub use compose::{Compose, ReplyAuthor};
pub use dedupe::{LinkEquivalence, LinkEquivalenceError};
pub use directory::DiscordDirectory;
pub use message::{
    Author, DiscordMessage, Embed, EmbedAuthor, EmbedField, EmbedFooter, EmbedImage, Guild,
    MessageReference,
};
pub use parser::{DEFAULT_EDIT_INLINE_MAX_LENGTH, DiscordMessageParser};
pub use resolve::resolve_placeholders;
pub use result::{FormattingResult, MessageKind};
