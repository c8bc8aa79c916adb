//! Matrix HTML to chat-markdown conversion.

use std::sync::{Arc, LazyLock};

use futures::FutureExt;
use futures::future::BoxFuture;
use mxd_config::MatrixConfig;
use mxd_markdown::MATRIX_TO_LINK;
use percent_encoding::percent_decode_str;
use regex::Regex;
use tracing::{debug, warn};

use crate::directory::MatrixDirectory;
use crate::escape::{escape_markdown, escape_markdown_upper};
use crate::language::detect_language;
use crate::list::{ListKind, render_list};
use crate::message::{MatrixMessage, MsgType};
use crate::node::{ParsedNode, parse_html};
use crate::shortener::{HttpLinkShortener, LinkShortener};

/// Displaynames outside this length range are left out of emotes.
const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 32;

static LANGUAGE_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)language-(\w*)").unwrap());

/// Converts Matrix message content to chat markdown.
///
/// Stateless between calls: list nesting is passed down the walk, so one
/// parser can serve concurrent conversions.
#[derive(Clone, Default)]
pub struct MatrixMessageParser {
    determine_code_language: bool,
    shortener: Option<Arc<dyn LinkShortener>>,
}

impl MatrixMessageParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser configured from the `[matrix]` config section.
    #[must_use]
    pub fn from_config(config: &MatrixConfig) -> Self {
        let parser = Self::new().with_code_language_detection(config.determine_code_language);
        match &config.url_shortener {
            Some(shortener) => {
                parser.with_shortener(Arc::new(HttpLinkShortener::from_config(shortener)))
            }
            None => parser,
        }
    }

    /// Guess the language of code blocks that do not declare one.
    #[must_use]
    pub fn with_code_language_detection(mut self, enabled: bool) -> Self {
        self.determine_code_language = enabled;
        self
    }

    /// Shorten image links that cannot be shown as emoji.
    #[must_use]
    pub fn with_shortener(mut self, shortener: Arc<dyn LinkShortener>) -> Self {
        self.shortener = Some(shortener);
        self
    }

    /// Convert a message to chat markdown.
    ///
    /// The HTML body is used when present, otherwise the plain body is
    /// escaped. Emotes are italicised and prefixed with `displayname`.
    pub async fn format_message(
        &self,
        message: &MatrixMessage,
        displayname: &str,
        directory: &dyn MatrixDirectory,
    ) -> String {
        let walker = Walker {
            parser: self,
            directory,
        };

        let reply = match message.formatted_body.as_deref().filter(|b| !b.is_empty()) {
            Some(html) => {
                let nodes = parse_html(html);
                let out = walker.walk_children(&nodes, Scope::default()).await;
                out.trim_end().to_owned()
            }
            None => walker.escape(&message.body, Scope::default()).await,
        };

        if message.msgtype != MsgType::Emote {
            return reply;
        }
        let name_length = displayname.chars().count();
        if (MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&name_length) {
            let name = walker.escape(displayname, Scope::default()).await;
            format!("_{name} {reply}_")
        } else {
            format!("_{reply}_")
        }
    }
}

/// Position of a node in the walk.
#[derive(Clone, Copy, Default)]
struct Scope {
    /// List nesting.
    depth: usize,
    /// Inside an upper-cased heading.
    upper: bool,
}

impl Scope {
    fn list_item(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }

    fn upper(self) -> Self {
        Self {
            upper: true,
            ..self
        }
    }
}

/// One conversion: the parser settings plus the directory to consult.
struct Walker<'a> {
    parser: &'a MatrixMessageParser,
    directory: &'a dyn MatrixDirectory,
}

impl Walker<'_> {
    async fn escape(&self, text: &str, scope: Scope) -> String {
        let room_notify = text.contains("@room") && self.directory.can_notify_room().await;
        if scope.upper {
            escape_markdown_upper(text, room_notify)
        } else {
            escape_markdown(text, room_notify)
        }
    }

    /// Render siblings in order, normalising block separation.
    fn walk_children<'b>(
        &'b self,
        nodes: &'b [ParsedNode],
        scope: Scope,
    ) -> BoxFuture<'b, String> {
        async move {
            let mut out = String::new();
            let mut previous_tag: Option<&str> = None;
            for node in nodes {
                let rendered = self.walk(node, scope).await;
                match node {
                    ParsedNode::Element { tag, .. } => {
                        if tag == "p" && previous_tag == Some("p") && !out.is_empty() {
                            while !out.ends_with("\n\n") {
                                out.push('\n');
                            }
                        } else if is_block(tag)
                            && !out.is_empty()
                            && !out.ends_with('\n')
                            && !rendered.starts_with('\n')
                        {
                            out.push('\n');
                        }
                        previous_tag = Some(tag.as_str());
                    }
                    ParsedNode::Text { text } if text == "\n" => {}
                    ParsedNode::Text { .. } => previous_tag = None,
                }
                out.push_str(&rendered);
            }
            out
        }
        .boxed()
    }

    fn walk<'b>(&'b self, node: &'b ParsedNode, scope: Scope) -> BoxFuture<'b, String> {
        async move {
            let (tag, children) = match node {
                ParsedNode::Text { text } if text == "\n" => return String::new(),
                ParsedNode::Text { text } => return self.escape(text, scope).await,
                ParsedNode::Element { tag, children, .. } => (tag.as_str(), children),
            };

            match tag {
                "em" | "i" => wrap("*", &self.walk_children(children, scope).await),
                "strong" | "b" => wrap("**", &self.walk_children(children, scope).await),
                "u" => wrap("__", &self.walk_children(children, scope).await),
                "del" | "s" | "strike" => wrap("~~", &self.walk_children(children, scope).await),
                "code" => wrap("`", &node.text_content()),
                "pre" => self.code_block(node),
                "a" => self.link(node, scope).await,
                "img" => self.image(node, scope).await,
                "br" => "\n".to_owned(),
                "blockquote" => {
                    let inner = self.walk_children(children, scope).await;
                    let mut out = inner
                        .split('\n')
                        .map(|line| format!("> {line}"))
                        .collect::<Vec<_>>()
                        .join("\n");
                    out.push('\n');
                    out
                }
                "ul" => self.list(node, ListKind::Unordered, scope).await,
                "ol" => self.list(node, ListKind::ordered(node.attribute("start")), scope).await,
                "mx-reply" => String::new(),
                "hr" => "\n----------\n".to_owned(),
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    let level = usize::from(tag.as_bytes()[1] - b'0');
                    let inner = if level <= 2 { scope.upper() } else { scope };
                    let text = self.walk_children(children, inner).await;
                    let marker = if level > 1 {
                        format!("{} ", "#".repeat(level))
                    } else {
                        String::new()
                    };
                    format!("**{marker}{text}**\n")
                }
                "span" => {
                    let content = self.walk_children(children, scope).await;
                    match node.attribute("data-mx-spoiler") {
                        Some("") => format!("||{content}||"),
                        Some(reason) => format!("({reason})||{content}||"),
                        None => content,
                    }
                }
                _ => self.walk_children(children, scope).await,
            }
        }
        .boxed()
    }

    fn code_block(&self, pre: &ParsedNode) -> String {
        let code = pre.children().iter().find(|c| c.tag() == Some("code"));
        let (mut text, class) = match code {
            Some(code) => (code.text_content(), code.attribute("class")),
            None => (pre.text_content(), None),
        };
        if !text.starts_with('\n') {
            text.insert(0, '\n');
        }

        let declared = class
            .and_then(|class| LANGUAGE_CLASS_RE.captures(class))
            .map(|caps| caps[1].to_owned());
        let language = declared.or_else(|| {
            if self.parser.determine_code_language {
                detect_language(&text).map(str::to_owned)
            } else {
                None
            }
        });
        format!("```{}{text}```", language.unwrap_or_default())
    }

    async fn link(&self, node: &ParsedNode, scope: Scope) -> String {
        let href = node.attribute("href").filter(|h| !h.is_empty());

        if let Some(id) = href.and_then(|h| h.strip_prefix(MATRIX_TO_LINK))
            && let Some(mention) = self.mention(id).await
        {
            return mention;
        }

        let content = self.walk_children(node.children(), scope).await;
        match href {
            Some(href) if content != href => format!("[{content}]({href})"),
            _ => content,
        }
    }

    /// Platform mention for a `matrix.to` user or room alias permalink.
    async fn mention(&self, id: &str) -> Option<String> {
        let id = percent_decode_str(id).decode_utf8_lossy();
        let mention = match id.chars().next() {
            Some('@') => self
                .directory
                .user_id(&id)
                .await
                .filter(|u| !u.is_empty())
                .map(|u| format!("<@{u}>")),
            Some('#') => self
                .directory
                .channel_id(&id)
                .await
                .filter(|c| !c.is_empty())
                .map(|c| format!("<#{c}>")),
            _ => None,
        };
        if mention.is_none() {
            debug!("Permalink {} is not a bridged user or channel", id);
        }
        mention
    }

    async fn image(&self, node: &ParsedNode, scope: Scope) -> String {
        let src = node.attribute("src").unwrap_or_default();
        let name = node
            .attribute("alt")
            .filter(|alt| !alt.is_empty())
            .or_else(|| node.attribute("title"))
            .unwrap_or_default();

        if let Some(emoji) = self.directory.emoji(src, name).await {
            return emoji.to_string();
        }

        let label = self.escape(name, scope).await;
        if src.is_empty() {
            return label;
        }
        let url = self.shorten(self.directory.mxc_to_http(src)).await;
        format!("[{label}]({url})")
    }

    async fn shorten(&self, url: String) -> String {
        let Some(shortener) = &self.parser.shortener else {
            return url;
        };
        match shortener.shorten(&url).await {
            Ok(short) => short,
            Err(err) => {
                warn!("Failed to shorten {}: {}", url, err);
                url
            }
        }
    }

    /// Render the `li` children of a list element at the scope's depth.
    async fn list(&self, node: &ParsedNode, kind: ListKind, scope: Scope) -> String {
        let mut items = Vec::new();
        for item in node.children().iter().filter(|c| c.tag() == Some("li")) {
            items.push(self.walk_children(item.children(), scope.list_item()).await);
        }
        render_list(kind, &items, scope.depth)
    }
}

fn wrap(marker: &str, content: &str) -> String {
    format!("{marker}{content}{marker}")
}

/// Elements that start on their own line.
fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "blockquote" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}
