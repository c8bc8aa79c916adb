//! HTML backend for markdown rendering.
//!
//! Produces the HTML subset understood by Matrix clients.

use std::fmt::Write;

use crate::ast::Style;
use crate::backend::RenderBackend;
use crate::parser::ParseMode;
use crate::placeholder::{Emoji, ResolvedEntity, Role};
use crate::util::{escape_html, html_color};

/// Prefix of permalinks to Matrix users and rooms.
pub const MATRIX_TO_LINK: &str = "https://matrix.to/#/";

/// Pixel height of inline custom emoji.
pub const EMOJI_SIZE: u32 = 32;

/// HTML render backend.
///
/// Produces Matrix `formatted_body` markup with:
/// - `<pre><code>` for code blocks
/// - `<span data-mx-spoiler>` for spoilers
/// - `<img data-mx-emoticon>` for custom emoji
/// - `matrix.to` permalinks for users and channels
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    const PARSE_MODE: ParseMode = ParseMode::Full;

    fn text(text: &str, out: &mut String) {
        out.push_str(&escape_html(text));
    }

    fn style_start(style: Style, out: &mut String) {
        out.push_str(match style {
            Style::Strong => "<strong>",
            Style::Emphasis => "<em>",
            Style::Underline => "<u>",
            Style::Strikethrough => "<del>",
            Style::Spoiler => "<span data-mx-spoiler>",
        });
    }

    fn style_end(style: Style, out: &mut String) {
        out.push_str(match style {
            Style::Strong => "</strong>",
            Style::Emphasis => "</em>",
            Style::Underline => "</u>",
            Style::Strikethrough => "</del>",
            Style::Spoiler => "</span>",
        });
    }

    fn inline_code(content: &str, out: &mut String) {
        write!(out, "<code>{}</code>", escape_html(content)).unwrap();
    }

    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        if let Some(lang) = lang {
            write!(
                out,
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(content)
            )
            .unwrap();
        } else {
            write!(out, "<pre><code>{}</code></pre>", escape_html(content)).unwrap();
        }
    }

    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>");
    }

    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>");
    }

    fn autolink(url: &str, out: &mut String) {
        let url = escape_html(url);
        write!(out, r#"<a href="{url}">{url}</a>"#).unwrap();
    }

    fn link_start(url: &str, out: &mut String) {
        write!(out, r#"<a href="{}">"#, escape_html(url)).unwrap();
    }

    fn link_end(_url: &str, out: &mut String) {
        out.push_str("</a>");
    }

    fn line_break(out: &mut String) {
        out.push_str("<br>");
    }

    fn role(id: &str, role: Option<&Role>, out: &mut String) {
        match role {
            Some(role) => write!(
                out,
                r#"<span data-mx-color="{}"><strong>@{}</strong></span>"#,
                html_color(role.color),
                escape_html(&role.name)
            )
            .unwrap(),
            None => write!(out, "&lt;@&amp;{}&gt;", escape_html(id)).unwrap(),
        }
    }

    fn emoji(emoji: &Emoji, mxc: Option<&str>, out: &mut String) {
        let name = escape_html(&emoji.name);
        match mxc {
            Some(mxc) => write!(
                out,
                r#"<img alt=":{name}:" title=":{name}:" height="{EMOJI_SIZE}" src="{}" data-mx-emoticon />"#,
                escape_html(mxc)
            )
            .unwrap(),
            None => {
                let prefix = if emoji.animated { "a" } else { "" };
                write!(out, "&lt;{prefix}:{name}:{}&gt;", escape_html(&emoji.id)).unwrap();
            }
        }
    }

    fn user(id: &str, entity: Option<&ResolvedEntity>, out: &mut String) {
        match entity {
            Some(user) => write!(
                out,
                r#"<a href="{MATRIX_TO_LINK}{}">{}</a>"#,
                escape_html(&user.mxid),
                escape_html(&user.name)
            )
            .unwrap(),
            None => write!(out, "&lt;@{}&gt;", escape_html(id)).unwrap(),
        }
    }

    fn channel(id: &str, entity: Option<&ResolvedEntity>, out: &mut String) {
        match entity {
            Some(channel) => write!(
                out,
                r##"<a href="{MATRIX_TO_LINK}{}">#{}</a>"##,
                escape_html(&channel.mxid),
                escape_html(&channel.name)
            )
            .unwrap(),
            None => write!(out, "&lt;#{}&gt;", escape_html(id)).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut String)) -> String {
        let mut out = String::new();
        f(&mut out);
        out
    }

    #[test]
    fn test_code_block_with_language() {
        let out = render(|o| HtmlBackend::code_block(Some("rust"), "a < b", o));
        assert_eq!(
            out,
            r#"<pre><code class="language-rust">a &lt; b</code></pre>"#
        );
    }

    #[test]
    fn test_emoji_resolved() {
        let emoji = Emoji {
            name: "blah".to_owned(),
            id: "1".to_owned(),
            animated: false,
        };
        let out = render(|o| HtmlBackend::emoji(&emoji, Some("mxc://image"), o));
        assert_eq!(
            out,
            r#"<img alt=":blah:" title=":blah:" height="32" src="mxc://image" data-mx-emoticon />"#
        );
    }

    #[test]
    fn test_emoji_miss_is_escaped_source() {
        let emoji = Emoji {
            name: "blah".to_owned(),
            id: "1".to_owned(),
            animated: true,
        };
        let out = render(|o| HtmlBackend::emoji(&emoji, None, o));
        assert_eq!(out, "&lt;a:blah:1&gt;");
    }

    #[test]
    fn test_user_pill() {
        let user = ResolvedEntity::new("@_discord_12:localhost", "TestUser");
        let out = render(|o| HtmlBackend::user("12", Some(&user), o));
        assert_eq!(
            out,
            r#"<a href="https://matrix.to/#/@_discord_12:localhost">TestUser</a>"#
        );
    }

    #[test]
    fn test_channel_miss() {
        let out = render(|o| HtmlBackend::channel("123", None, o));
        assert_eq!(out, "&lt;#123&gt;");
    }

    #[test]
    fn test_role() {
        let role = Role {
            id: "1".to_owned(),
            name: "Mods & Co".to_owned(),
            color: 0xFF_0000,
        };
        let out = render(|o| HtmlBackend::role("1", Some(&role), o));
        assert_eq!(
            out,
            r##"<span data-mx-color="#ff0000"><strong>@Mods &amp; Co</strong></span>"##
        );
        let out = render(|o| HtmlBackend::role("9", None, o));
        assert_eq!(out, "&lt;@&amp;9&gt;");
    }
}
