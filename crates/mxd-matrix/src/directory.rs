//! Lookups needed while converting Matrix messages.

use async_trait::async_trait;
use mxd_markdown::Emoji;

/// Resolves Matrix-side identifiers to chat-platform ones.
#[async_trait]
pub trait MatrixDirectory: Send + Sync {
    /// Whether the sender may notify the whole room with `@room`.
    async fn can_notify_room(&self) -> bool;

    /// Platform user ID for a bridged Matrix user.
    async fn user_id(&self, mxid: &str) -> Option<String>;

    /// Platform channel ID for a bridged room alias.
    async fn channel_id(&self, alias: &str) -> Option<String>;

    /// Platform emoji uploaded from `mxc`. `name` is the image label.
    async fn emoji(&self, mxc: &str, name: &str) -> Option<Emoji>;

    /// Public download URL for an `mxc://` URI.
    fn mxc_to_http(&self, mxc: &str) -> String;
}
