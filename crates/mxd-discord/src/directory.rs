//! Lookup contract used while transcoding.

use async_trait::async_trait;
use mxd_markdown::{Emoji, ResolvedEntity};

use crate::message::DiscordMessage;

/// Resolves platform identifiers to Matrix-side data.
///
/// Every method answers `None` on a miss; the transcoder then falls back to
/// the literal mention syntax.
#[async_trait]
pub trait DiscordDirectory: Send + Sync {
    /// Matrix user for a platform user ID.
    async fn user(&self, id: &str) -> Option<ResolvedEntity>;

    /// Matrix room alias for a platform channel ID.
    async fn channel(&self, id: &str) -> Option<ResolvedEntity>;

    /// `mxc://` URI of the uploaded copy of a custom emoji.
    async fn emoji(&self, emoji: &Emoji) -> Option<String>;

    /// Message referenced by a reply.
    async fn reference(&self, message_id: &str) -> Option<DiscordMessage>;
}
