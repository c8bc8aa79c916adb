//! Transcoding output.

use serde::{Deserialize, Serialize};

/// Matrix `msgtype` of the produced event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    #[default]
    #[serde(rename = "m.text")]
    Normal,
    /// Messages authored by bots are sent as notices.
    #[serde(rename = "m.notice")]
    BotNotice,
}

impl MessageKind {
    #[must_use]
    pub fn for_author(bot: bool) -> Self {
        if bot { Self::BotNotice } else { Self::Normal }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "m.text",
            Self::BotNotice => "m.notice",
        }
    }
}

/// Plain and HTML renderings of one message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingResult {
    pub body: String,
    pub formatted_body: String,
    pub msgtype: MessageKind,
}
