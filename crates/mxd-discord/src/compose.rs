//! Block layout around the message body: embeds, quoted replies, edits.

use std::fmt::Write;

use mxd_markdown::{HtmlBackend, PlainBackend, Placeholder, RenderBackend, Rendered, escape_html};

use crate::message::DiscordMessage;

/// Who wrote the message being replied to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyAuthor {
    /// Regular account, rendered as a user pill.
    User { id: String },
    /// Webhook sender, which has no account to link to.
    Webhook { username: String },
}

impl ReplyAuthor {
    #[must_use]
    pub fn of(message: &DiscordMessage) -> Self {
        if message.webhook_id.is_some() {
            Self::Webhook {
                username: message.author.username.clone(),
            }
        } else {
            Self::User {
                id: message.author.id.clone(),
            }
        }
    }
}

/// Backend-specific layout of the blocks surrounding message content.
pub trait Compose: RenderBackend {
    /// Separator written before an embed when something precedes it.
    fn embed_separator(out: &mut String);

    fn embed_title(title: &str, url: Option<&str>, out: &mut String);

    fn embed_author(name: &str, out: &mut String);

    /// Wraps rendered description and footer text.
    fn embed_block_start(out: &mut String);

    fn embed_block_end(out: &mut String);

    /// Opens a field; the rendered value follows.
    fn embed_field_start(name: &str, out: &mut String);

    fn embed_field_end(out: &mut String);

    fn embed_image(url: &str, out: &mut String);

    /// Quote `quoted` as the message being replied to.
    fn reply(author: &ReplyAuthor, quoted: Rendered) -> Rendered;

    /// Edit notice. `stacked` selects the multi-block layout.
    fn edit(old: Rendered, new: Rendered, link: Option<&str>, stacked: bool) -> Rendered;
}

impl Compose for PlainBackend {
    fn embed_separator(out: &mut String) {
        out.push_str("\n\n----");
    }

    fn embed_title(title: &str, url: Option<&str>, out: &mut String) {
        match url {
            Some(url) => write!(out, "\n##### [{title}]({url})").unwrap(),
            None => write!(out, "\n##### {title}").unwrap(),
        }
    }

    fn embed_author(name: &str, out: &mut String) {
        write!(out, "\n**{name}**").unwrap();
    }

    fn embed_block_start(out: &mut String) {
        out.push('\n');
    }

    fn embed_block_end(_out: &mut String) {}

    fn embed_field_start(name: &str, out: &mut String) {
        write!(out, "\n**{name}**\n").unwrap();
    }

    fn embed_field_end(_out: &mut String) {}

    fn embed_image(url: &str, out: &mut String) {
        write!(out, "\nImage: {url}").unwrap();
    }

    fn reply(_author: &ReplyAuthor, quoted: Rendered) -> Rendered {
        let mut out = quoted.prefix_lines("> ");
        out.push_str("\n\n");
        out
    }

    fn edit(old: Rendered, new: Rendered, _link: Option<&str>, _stacked: bool) -> Rendered {
        let mut out = Rendered::from("*edit:* ~~");
        out.append(old);
        out.push_str("~~ -> ");
        out.append(new);
        out
    }
}

impl Compose for HtmlBackend {
    fn embed_separator(out: &mut String) {
        out.push_str("<hr>");
    }

    fn embed_title(title: &str, url: Option<&str>, out: &mut String) {
        match url {
            Some(url) => write!(
                out,
                r#"<h5><a href="{}">{}</a></h5>"#,
                escape_html(url),
                escape_html(title)
            )
            .unwrap(),
            None => write!(out, "<h5>{}</h5>", escape_html(title)).unwrap(),
        }
    }

    fn embed_author(name: &str, out: &mut String) {
        write!(out, "<strong>{}</strong><br>", escape_html(name)).unwrap();
    }

    fn embed_block_start(out: &mut String) {
        out.push_str("<p>");
    }

    fn embed_block_end(out: &mut String) {
        out.push_str("</p>");
    }

    fn embed_field_start(name: &str, out: &mut String) {
        write!(out, "<p><strong>{}</strong><br>", escape_html(name)).unwrap();
    }

    fn embed_field_end(out: &mut String) {
        out.push_str("</p>");
    }

    fn embed_image(url: &str, out: &mut String) {
        let url = escape_html(url);
        write!(out, r#"<p>Image: <a href="{url}">{url}</a></p>"#).unwrap();
    }

    fn reply(author: &ReplyAuthor, quoted: Rendered) -> Rendered {
        let mut out = Rendered::from("<mx-reply><blockquote><a>In reply to</a> ");
        match author {
            ReplyAuthor::User { id } => out.push_placeholder(Placeholder::User { id: id.clone() }),
            ReplyAuthor::Webhook { username } => out.push_str(&escape_html(username)),
        }
        out.push_str("<br>");
        out.append(quoted);
        out.push_str("</blockquote></mx-reply>");
        out
    }

    fn edit(old: Rendered, new: Rendered, link: Option<&str>, stacked: bool) -> Rendered {
        let (link_start, link_end) = match link {
            Some(link) => (format!(r#"<a href="{}">"#, escape_html(link)), "</a>"),
            None => (String::new(), ""),
        };

        let mut out = Rendered::new();
        if stacked {
            out.push_str(&format!("<p>{link_start}<em>edit:</em>{link_end}</p><p><del>"));
            out.append(old);
            out.push_str("</del></p><hr><p>");
            out.append(new);
            out.push_str("</p>");
        } else {
            out.push_str(&format!("{link_start}<em>edit:</em>{link_end} <del>"));
            out.append(old);
            out.push_str("</del> -&gt; ");
            out.append(new);
        }
        out
    }
}
