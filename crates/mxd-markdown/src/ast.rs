//! Syntax tree produced by the chat-markdown parser.

use crate::placeholder::Emoji;

/// Inline formatting wrapped around child nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    /// `**text**`
    Strong,
    /// `*text*` or `_text_`
    Emphasis,
    /// `__text__`
    Underline,
    /// `~~text~~`
    Strikethrough,
    /// `||text||`
    Spoiler,
}

/// Mass-mention keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Broadcast {
    Everyone,
    Here,
}

impl Broadcast {
    /// Keyword as written in the source text, including the sigil.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Everyone => "@everyone",
            Self::Here => "@here",
        }
    }
}

/// A parsed chat-markdown node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Literal text, unescaped.
    Text(String),
    Styled {
        style: Style,
        children: Vec<Node>,
    },
    InlineCode(String),
    CodeBlock {
        lang: Option<String>,
        content: String,
    },
    BlockQuote(Vec<Node>),
    /// Hyperlink. `label` is `None` for autolinks and bare URLs.
    Link {
        url: String,
        label: Option<Vec<Node>>,
    },
    User(String),
    Role(String),
    Channel(String),
    Emoji(Emoji),
    Broadcast(Broadcast),
    LineBreak,
}
