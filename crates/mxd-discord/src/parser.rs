//! Chat-markdown message to Matrix event conversion.

use mxd_markdown::{HtmlBackend, MarkdownRenderer, PlainBackend, Rendered};
use tracing::{debug, info};

use crate::compose::{Compose, ReplyAuthor};
use crate::dedupe::{LinkEquivalence, is_linked_in};
use crate::directory::DiscordDirectory;
use crate::message::{DiscordMessage, Embed, non_empty};
use crate::resolve::resolve_placeholders;
use crate::result::{FormattingResult, MessageKind};

/// Longest new content (in characters) still rendered as a one-line edit.
pub const DEFAULT_EDIT_INLINE_MAX_LENGTH: usize = 50;

/// Converts chat-platform messages into Matrix event content.
///
/// # Example
///
/// ```no_run
/// # async fn example(directory: &dyn mxd_discord::DiscordDirectory) {
/// use mxd_discord::{DiscordMessage, DiscordMessageParser};
///
/// let parser = DiscordMessageParser::new();
/// let message = DiscordMessage {
///     content: "**hello** <@1234>".to_owned(),
///     ..DiscordMessage::default()
/// };
/// let result = parser.format_message(&message, directory).await;
/// println!("{}", result.formatted_body);
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct DiscordMessageParser {
    link_equivalences: Vec<LinkEquivalence>,
    edit_inline_max_length: usize,
}

impl DiscordMessageParser {
    /// Create a parser with the default link-equivalence rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            link_equivalences: vec![LinkEquivalence::youtube()],
            edit_inline_max_length: DEFAULT_EDIT_INLINE_MAX_LENGTH,
        }
    }

    /// Add a rule for detecting embeds already linked in the content.
    #[must_use]
    pub fn with_link_equivalence(mut self, rule: LinkEquivalence) -> Self {
        self.link_equivalences.push(rule);
        self
    }

    /// Drop all link-equivalence rules, keeping only verbatim URL matching.
    #[must_use]
    pub fn without_link_equivalences(mut self) -> Self {
        self.link_equivalences.clear();
        self
    }

    /// Set the edit length threshold for the single-line layout.
    #[must_use]
    pub fn with_edit_inline_max_length(mut self, length: usize) -> Self {
        self.edit_inline_max_length = length;
        self
    }

    /// Format a message as plain and HTML Matrix content.
    ///
    /// A referenced message is quoted above the content. Its own reply is
    /// never expanded.
    pub async fn format_message(
        &self,
        message: &DiscordMessage,
        directory: &dyn DiscordDirectory,
    ) -> FormattingResult {
        let reply = self.fetch_reply(message, directory).await;

        let plain = self.compose::<PlainBackend>(message, reply.as_ref());
        let html = self.compose::<HtmlBackend>(message, reply.as_ref());

        FormattingResult {
            body: resolve_placeholders::<PlainBackend>(plain, directory).await,
            formatted_body: resolve_placeholders::<HtmlBackend>(html, directory).await,
            msgtype: MessageKind::for_author(message.author.bot),
        }
    }

    /// Format an edit notice from the previous and the new version.
    ///
    /// Embeds of the previous version are ignored. `link` points at the
    /// original event and wraps the "edit:" label.
    pub async fn format_edit(
        &self,
        old: &DiscordMessage,
        new: &DiscordMessage,
        link: Option<&str>,
        directory: &dyn DiscordDirectory,
    ) -> FormattingResult {
        let old = DiscordMessage {
            embeds: Vec::new(),
            ..old.clone()
        };
        let old_reply = self.fetch_reply(&old, directory).await;
        let new_reply = self.fetch_reply(new, directory).await;

        let stacked = old.content.contains('\n')
            || new.content.contains('\n')
            || new.content.chars().count() > self.edit_inline_max_length;

        let plain = PlainBackend::edit(
            self.compose::<PlainBackend>(&old, old_reply.as_ref()),
            self.compose::<PlainBackend>(new, new_reply.as_ref()),
            link,
            stacked,
        );
        let html = HtmlBackend::edit(
            self.compose::<HtmlBackend>(&old, old_reply.as_ref()),
            self.compose::<HtmlBackend>(new, new_reply.as_ref()),
            link,
            stacked,
        );

        FormattingResult {
            body: resolve_placeholders::<PlainBackend>(plain, directory).await,
            formatted_body: resolve_placeholders::<HtmlBackend>(html, directory).await,
            msgtype: MessageKind::for_author(new.author.bot),
        }
    }

    async fn fetch_reply(
        &self,
        message: &DiscordMessage,
        directory: &dyn DiscordDirectory,
    ) -> Option<DiscordMessage> {
        let reference = message.reference.as_ref()?;
        let reply = directory.reference(&reference.message_id).await;
        if reply.is_none() {
            info!("Referenced message {} not found", reference.message_id);
        }
        reply
    }

    /// Quoted reply, then content, then embeds, with placeholders pending.
    ///
    /// The quoted message is composed with no reply of its own, which caps
    /// reply expansion at one level.
    fn compose<B: Compose>(&self, message: &DiscordMessage, reply: Option<&DiscordMessage>) -> Rendered {
        let mut out = Rendered::new();
        if let Some(reply) = reply {
            let quoted = self.compose::<B>(reply, None);
            out.append(B::reply(&ReplyAuthor::of(reply), quoted));
        }

        let renderer = MarkdownRenderer::<B>::new()
            .with_roles(message.roles())
            .with_room_mentions(message.mention_everyone)
            .with_masked_links(message.author.bot);
        out.append(renderer.render(&message.content));

        self.insert_embeds::<B>(message, &mut out);
        out
    }

    fn insert_embeds<B: Compose>(&self, message: &DiscordMessage, out: &mut Rendered) {
        let renderer = MarkdownRenderer::<B>::new()
            .with_roles(message.roles())
            .with_room_mentions(message.mention_everyone)
            .with_masked_links(true);

        for embed in &message.embeds {
            if embed.is_empty() {
                debug!("Skipping embed without title or description");
                continue;
            }
            if self.is_embed_in_body(&message.content, embed) {
                debug!("Skipping embed already linked in message {}", message.id);
                continue;
            }

            let mut block = Rendered::new();
            if !out.is_empty() {
                B::embed_separator(block.text_mut());
            }
            if let Some(title) = non_empty(embed.title.as_deref()) {
                B::embed_title(title, non_empty(embed.url.as_deref()), block.text_mut());
            }
            if let Some(name) = non_empty(embed.author.as_ref().and_then(|a| a.name.as_deref())) {
                B::embed_author(name, block.text_mut());
            }
            if let Some(description) = non_empty(embed.description.as_deref()) {
                B::embed_block_start(block.text_mut());
                block.append(renderer.render(description));
                B::embed_block_end(block.text_mut());
            }
            for field in &embed.fields {
                B::embed_field_start(&field.name, block.text_mut());
                block.append(renderer.render(&field.value));
                B::embed_field_end(block.text_mut());
            }
            if let Some(image) = &embed.image {
                B::embed_image(&image.url, block.text_mut());
            }
            if let Some(footer) = non_empty(embed.footer.as_ref().and_then(|f| f.text.as_deref())) {
                B::embed_block_start(block.text_mut());
                block.append(renderer.render(footer));
                B::embed_block_end(block.text_mut());
            }
            out.append(block);
        }
    }

    fn is_embed_in_body(&self, content: &str, embed: &Embed) -> bool {
        non_empty(embed.url.as_deref())
            .is_some_and(|url| is_linked_in(content, url, &self.link_equivalences))
    }
}

impl Default for DiscordMessageParser {
    fn default() -> Self {
        Self::new()
    }
}
