//! Static directory loaded from a JSON fixture.
//!
//! One fixture answers lookups for both directions: chat IDs resolve to
//! Matrix users and rooms, and Matrix IDs resolve back to chat IDs by
//! searching the same tables.
//!
//! ```json
//! {
//!   "users": { "123": { "mxid": "@alice:example.org", "name": "Alice" } },
//!   "channels": { "456": { "mxid": "#general:example.org", "name": "general" } },
//!   "emoji": { "789": { "name": "wave", "mxc": "mxc://example.org/wave" } },
//!   "messages": { "m1": { "content": "earlier", "author": { "id": "123" } } },
//!   "can_notify_room": true,
//!   "media_url": "https://matrix.example.org"
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use mxd_discord::{DiscordDirectory, DiscordMessage};
use mxd_markdown::{Emoji, ResolvedEntity};
use mxd_matrix::MatrixDirectory;
use serde::Deserialize;
use tracing::debug;

use crate::error::CliError;

/// Homeserver used to build media download links when none is configured.
const DEFAULT_MEDIA_URL: &str = "https://matrix.org";

/// Uploaded copy of a custom emoji.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FixtureEmoji {
    pub name: String,
    pub mxc: String,
    #[serde(default)]
    pub animated: bool,
}

/// In-memory directory for both transcoding directions.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct FixtureDirectory {
    users: HashMap<String, ResolvedEntity>,
    channels: HashMap<String, ResolvedEntity>,
    emoji: HashMap<String, FixtureEmoji>,
    messages: HashMap<String, DiscordMessage>,
    can_notify_room: bool,
    media_url: String,
}

impl Default for FixtureDirectory {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            channels: HashMap::new(),
            emoji: HashMap::new(),
            messages: HashMap::new(),
            can_notify_room: false,
            media_url: DEFAULT_MEDIA_URL.to_owned(),
        }
    }
}

impl FixtureDirectory {
    /// Load a fixture file. Without a path every lookup misses.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| CliError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let mut directory: Self = serde_json::from_str(content)?;
        for (id, message) in &mut directory.messages {
            if message.id.is_empty() {
                message.id.clone_from(id);
            }
        }
        Ok(directory)
    }

    fn find_id<'a>(table: &'a HashMap<String, ResolvedEntity>, mxid: &str) -> Option<&'a str> {
        table
            .iter()
            .find(|(_, entity)| entity.mxid == mxid)
            .map(|(id, _)| id.as_str())
    }
}

#[async_trait]
impl DiscordDirectory for FixtureDirectory {
    async fn user(&self, id: &str) -> Option<ResolvedEntity> {
        self.users.get(id).cloned()
    }

    async fn channel(&self, id: &str) -> Option<ResolvedEntity> {
        self.channels.get(id).cloned()
    }

    async fn emoji(&self, emoji: &Emoji) -> Option<String> {
        self.emoji.get(&emoji.id).map(|e| e.mxc.clone())
    }

    async fn reference(&self, message_id: &str) -> Option<DiscordMessage> {
        self.messages.get(message_id).cloned()
    }
}

#[async_trait]
impl MatrixDirectory for FixtureDirectory {
    async fn can_notify_room(&self) -> bool {
        self.can_notify_room
    }

    async fn user_id(&self, mxid: &str) -> Option<String> {
        Self::find_id(&self.users, mxid).map(str::to_owned)
    }

    async fn channel_id(&self, alias: &str) -> Option<String> {
        Self::find_id(&self.channels, alias).map(str::to_owned)
    }

    async fn emoji(&self, mxc: &str, name: &str) -> Option<Emoji> {
        let found = self.emoji.iter().find(|(_, e)| e.mxc == mxc);
        if found.is_none() {
            debug!("No emoji uploaded as {} ({})", mxc, name);
        }
        found.map(|(id, e)| Emoji {
            name: e.name.clone(),
            id: id.clone(),
            animated: e.animated,
        })
    }

    fn mxc_to_http(&self, mxc: &str) -> String {
        match mxc.strip_prefix("mxc://") {
            Some(media) => format!(
                "{}/_matrix/media/v3/download/{media}",
                self.media_url.trim_end_matches('/')
            ),
            None => mxc.to_owned(),
        }
    }
}
