//! Chat-platform message model.

use mxd_markdown::Role;
use serde::{Deserialize, Serialize};

/// Message as received from the chat platform.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiscordMessage {
    #[serde(default)]
    pub id: String,
    /// Raw chat-markdown text.
    pub content: String,
    pub author: Author,
    /// Message this one replies to.
    #[serde(default)]
    pub reference: Option<MessageReference>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    /// The platform actually pinged everyone with this message.
    #[serde(default)]
    pub mention_everyone: bool,
    /// Set when the message was sent through a webhook.
    #[serde(default)]
    pub webhook_id: Option<String>,
    #[serde(default)]
    pub guild: Option<Guild>,
}

impl DiscordMessage {
    /// Roles of the guild the message was posted in.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.guild.iter().flat_map(|g| g.roles.iter().cloned())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageReference {
    pub message_id: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Guild {
    pub id: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Link preview or rich content attached to a message.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author: Option<EmbedAuthor>,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
    #[serde(default)]
    pub image: Option<EmbedImage>,
    #[serde(default)]
    pub footer: Option<EmbedFooter>,
}

impl Embed {
    /// An embed without title and description carries nothing worth showing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        non_empty(self.title.as_deref()).is_none() && non_empty(self.description.as_deref()).is_none()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EmbedAuthor {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EmbedFooter {
    #[serde(default)]
    pub text: Option<String>,
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
