//! Generic markdown renderer with pluggable backend.

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::ast::{Broadcast, Node};
use crate::backend::RenderBackend;
use crate::parser::{ParseOptions, parse};
use crate::placeholder::{Placeholder, Role};

/// Piece of rendered output.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", content = "value", rename_all = "snake_case")
)]
pub enum Segment {
    /// Final backend output.
    Text(String),
    /// Entity still waiting for a directory lookup.
    Pending(Placeholder),
}

/// Rendered output with unresolved entities kept as typed placeholders.
///
/// Adjacent text is always merged into a single [`Segment::Text`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    segments: Vec<Segment>,
}

impl Rendered {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to the trailing text segment, creating it if needed.
    pub fn text_mut(&mut self) -> &mut String {
        if !matches!(self.segments.last(), Some(Segment::Text(_))) {
            self.segments.push(Segment::Text(String::new()));
        }
        let Some(Segment::Text(text)) = self.segments.last_mut() else {
            unreachable!("trailing text segment was just ensured");
        };
        text
    }

    pub fn push_str(&mut self, s: &str) {
        if !s.is_empty() {
            self.text_mut().push_str(s);
        }
    }

    pub fn push_placeholder(&mut self, placeholder: Placeholder) {
        self.segments.push(Segment::Pending(placeholder));
    }

    pub fn push(&mut self, segment: Segment) {
        match segment {
            Segment::Text(text) => self.push_str(&text),
            Segment::Pending(placeholder) => self.push_placeholder(placeholder),
        }
    }

    /// Append another rendering after this one.
    pub fn append(&mut self, other: Rendered) {
        for segment in other.segments {
            self.push(segment);
        }
    }

    /// True when nothing has been rendered and nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| match s {
            Segment::Text(text) => text.is_empty(),
            Segment::Pending(_) => false,
        })
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// Pending placeholders in textual order.
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Pending(p) => Some(p),
            Segment::Text(_) => None,
        })
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.placeholders().next().is_some()
    }

    /// Prefix the first line and every line after a newline with `prefix`.
    ///
    /// Placeholders never contain newlines, so they are carried over as-is.
    #[must_use]
    pub fn prefix_lines(self, prefix: &str) -> Rendered {
        let mut out = Rendered::from(prefix);
        for segment in self.segments {
            match segment {
                Segment::Text(text) => {
                    out.push_str(&text.replace('\n', &format!("\n{prefix}")));
                }
                pending @ Segment::Pending(_) => out.push(pending),
            }
        }
        out
    }

    /// Flatten into a string, rendering any remaining placeholder with `fallback`.
    #[must_use]
    pub fn into_string_with<F>(self, mut fallback: F) -> String
    where
        F: FnMut(&Placeholder) -> String,
    {
        let mut out = String::new();
        for segment in self.segments {
            match segment {
                Segment::Text(text) => out.push_str(&text),
                Segment::Pending(p) => out.push_str(&fallback(&p)),
            }
        }
        out
    }
}

impl From<&str> for Rendered {
    fn from(text: &str) -> Self {
        let mut rendered = Self::new();
        rendered.push_str(text);
        rendered
    }
}

impl From<String> for Rendered {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

/// Generic markdown renderer with pluggable backend.
///
/// Roles are resolved synchronously from the table given to
/// [`with_roles`](Self::with_roles). Users, channels and custom emoji become
/// [`Segment::Pending`] placeholders.
pub struct MarkdownRenderer<B: RenderBackend> {
    roles: HashMap<String, Role>,
    room_mentions: bool,
    masked_links: bool,
    _backend: PhantomData<B>,
}

impl<B: RenderBackend> MarkdownRenderer<B> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            roles: HashMap::new(),
            room_mentions: false,
            masked_links: false,
            _backend: PhantomData,
        }
    }

    /// Roles known to the guild the message was posted in.
    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = roles.into_iter().map(|r| (r.id.clone(), r)).collect();
        self
    }

    /// Render `@everyone`/`@here` as `@room`.
    ///
    /// Set when the platform reports that the message actually pinged everyone.
    #[must_use]
    pub fn with_room_mentions(mut self, enabled: bool) -> Self {
        self.room_mentions = enabled;
        self
    }

    /// Allow `[label](url)` links.
    #[must_use]
    pub fn with_masked_links(mut self, enabled: bool) -> Self {
        self.masked_links = enabled;
        self
    }

    /// Parse and render chat markdown.
    #[must_use]
    pub fn render(&self, markdown: &str) -> Rendered {
        let options = ParseOptions {
            mode: B::PARSE_MODE,
            masked_links: self.masked_links,
        };
        let nodes = parse(markdown, options);
        let mut out = Rendered::new();
        self.render_nodes(&nodes, &mut out);
        out
    }

    fn render_nodes(&self, nodes: &[Node], out: &mut Rendered) {
        for node in nodes {
            self.render_node(node, out);
        }
    }

    fn render_node(&self, node: &Node, out: &mut Rendered) {
        match node {
            Node::Text(text) => B::text(text, out.text_mut()),
            Node::Styled { style, children } => {
                B::style_start(*style, out.text_mut());
                self.render_nodes(children, out);
                B::style_end(*style, out.text_mut());
            }
            Node::InlineCode(content) => B::inline_code(content, out.text_mut()),
            Node::CodeBlock { lang, content } => {
                B::code_block(lang.as_deref(), content, out.text_mut());
            }
            Node::BlockQuote(children) => {
                B::blockquote_start(out.text_mut());
                self.render_nodes(children, out);
                B::blockquote_end(out.text_mut());
            }
            Node::Link { url, label: None } => B::autolink(url, out.text_mut()),
            Node::Link {
                url,
                label: Some(label),
            } => {
                B::link_start(url, out.text_mut());
                self.render_nodes(label, out);
                B::link_end(url, out.text_mut());
            }
            Node::User(id) => out.push_placeholder(Placeholder::User { id: id.clone() }),
            Node::Channel(id) => out.push_placeholder(Placeholder::Channel { id: id.clone() }),
            Node::Emoji(emoji) => out.push_placeholder(Placeholder::Emoji(emoji.clone())),
            Node::Role(id) => B::role(id, self.roles.get(id), out.text_mut()),
            Node::Broadcast(broadcast) => {
                let keyword = if self.room_mentions {
                    "@room"
                } else {
                    Broadcast::keyword(*broadcast)
                };
                B::text(keyword, out.text_mut());
            }
            Node::LineBreak => B::line_break(out.text_mut()),
        }
    }
}

impl<B: RenderBackend> Default for MarkdownRenderer<B> {
    fn default() -> Self {
        Self::new()
    }
}
