//! Render backend abstraction.

use crate::ast::Style;
use crate::parser::ParseMode;
use crate::placeholder::{Emoji, ResolvedEntity, Role};

/// Output format for [`MarkdownRenderer`](crate::MarkdownRenderer).
///
/// Backends are stateless; every method writes into the given buffer. The
/// entity methods ([`emoji`](Self::emoji), [`user`](Self::user),
/// [`channel`](Self::channel)) are called after the asynchronous lookup,
/// with `None` on a directory miss.
pub trait RenderBackend {
    /// Grammar the renderer parses input with for this backend.
    const PARSE_MODE: ParseMode;

    /// Literal text.
    fn text(text: &str, out: &mut String);

    fn style_start(style: Style, out: &mut String);

    fn style_end(style: Style, out: &mut String);

    fn inline_code(content: &str, out: &mut String);

    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    fn blockquote_start(out: &mut String);

    fn blockquote_end(out: &mut String);

    /// Link whose visible text is the URL itself.
    fn autolink(url: &str, out: &mut String);

    fn link_start(url: &str, out: &mut String);

    fn link_end(url: &str, out: &mut String);

    fn line_break(out: &mut String);

    /// Role mention. `role` is `None` when the guild has no such role.
    fn role(id: &str, role: Option<&Role>, out: &mut String);

    /// Custom emoji. `mxc` is the content URI of the uploaded image.
    fn emoji(emoji: &Emoji, mxc: Option<&str>, out: &mut String);

    fn user(id: &str, entity: Option<&ResolvedEntity>, out: &mut String);

    fn channel(id: &str, entity: Option<&ResolvedEntity>, out: &mut String);
}
