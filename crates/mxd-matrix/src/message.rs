//! Matrix message event content.

use serde::{Deserialize, Serialize};

/// `msgtype` of a room message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MsgType {
    #[default]
    #[serde(rename = "m.text")]
    Text,
    #[serde(rename = "m.notice")]
    Notice,
    /// `/me` action, rendered in italics after the sender's name.
    #[serde(rename = "m.emote")]
    Emote,
    #[serde(other)]
    Other,
}

/// Content of an `m.room.message` event.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MatrixMessage {
    pub body: String,
    /// HTML rendering, present when `format` is `org.matrix.custom.html`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_body: Option<String>,
    #[serde(default)]
    pub msgtype: MsgType,
}

impl MatrixMessage {
    /// Plain-text message.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Message with an HTML body. `body` is set to the same markup.
    pub fn html(html: impl Into<String>) -> Self {
        let html = html.into();
        Self {
            body: html.clone(),
            formatted_body: Some(html),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_msgtype(mut self, msgtype: MsgType) -> Self {
        self.msgtype = msgtype;
        self
    }
}
