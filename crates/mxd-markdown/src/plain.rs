//! Plain-text backend.
//!
//! Used for the Matrix `body` field. Only platform entities are parsed, so
//! ordinary markdown reaches the output untouched.

use std::fmt::Write;

use crate::ast::Style;
use crate::backend::RenderBackend;
use crate::parser::ParseMode;
use crate::placeholder::{Emoji, ResolvedEntity, Role};

/// Plain-text render backend.
///
/// Parses in [`ParseMode::EntitiesOnly`], so through
/// [`MarkdownRenderer`](crate::MarkdownRenderer) only `text`, the spoiler
/// style and the entity methods are reached. The remaining methods are
/// unreachable from the renderer; they write the construct back as chat
/// markdown for callers that drive the backend with full-grammar nodes.
pub struct PlainBackend;

impl RenderBackend for PlainBackend {
    const PARSE_MODE: ParseMode = ParseMode::EntitiesOnly;

    fn text(text: &str, out: &mut String) {
        out.push_str(text);
    }

    fn style_start(style: Style, out: &mut String) {
        out.push_str(match style {
            Style::Strong => "**",
            Style::Emphasis => "*",
            Style::Underline => "__",
            Style::Strikethrough => "~~",
            Style::Spoiler => "(Spoiler: ",
        });
    }

    fn style_end(style: Style, out: &mut String) {
        out.push_str(match style {
            Style::Strong => "**",
            Style::Emphasis => "*",
            Style::Underline => "__",
            Style::Strikethrough => "~~",
            Style::Spoiler => ")",
        });
    }

    fn inline_code(content: &str, out: &mut String) {
        write!(out, "`{content}`").unwrap();
    }

    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        write!(out, "```{}\n{content}\n```", lang.unwrap_or_default()).unwrap();
    }

    fn blockquote_start(out: &mut String) {
        out.push_str(">>> ");
    }

    fn blockquote_end(out: &mut String) {
        out.push('\n');
    }

    fn autolink(url: &str, out: &mut String) {
        out.push_str(url);
    }

    fn link_start(_url: &str, _out: &mut String) {}

    fn link_end(url: &str, out: &mut String) {
        write!(out, " ({url})").unwrap();
    }

    fn line_break(out: &mut String) {
        out.push('\n');
    }

    fn role(id: &str, role: Option<&Role>, out: &mut String) {
        match role {
            Some(role) => write!(out, "@{}", role.name).unwrap(),
            None => write!(out, "<@&{id}>").unwrap(),
        }
    }

    fn emoji(emoji: &Emoji, mxc: Option<&str>, out: &mut String) {
        if mxc.is_some() {
            write!(out, ":{}:", emoji.name).unwrap();
        } else {
            write!(out, "{emoji}").unwrap();
        }
    }

    fn user(id: &str, entity: Option<&ResolvedEntity>, out: &mut String) {
        match entity {
            Some(user) => write!(out, "{} ({})", user.name, user.mxid).unwrap(),
            None => write!(out, "<@{id}>").unwrap(),
        }
    }

    fn channel(id: &str, entity: Option<&ResolvedEntity>, out: &mut String) {
        match entity {
            Some(channel) => write!(out, "#{}", channel.name).unwrap(),
            None => write!(out, "<#{id}>").unwrap(),
        }
    }
}
