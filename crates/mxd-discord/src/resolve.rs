//! Asynchronous resolution of rendered placeholders.

use mxd_markdown::{Placeholder, PlaceholderKind, RenderBackend, Rendered, Segment};
use tracing::debug;

use crate::directory::DiscordDirectory;

/// Resolve every placeholder in `rendered` and flatten it to a string.
///
/// Runs one sweep per kind in [`PlaceholderKind::SWEEP_ORDER`]. Within a
/// sweep placeholders are looked up strictly left to right, one at a time,
/// and each occurrence gets its own lookup.
pub async fn resolve_placeholders<B: RenderBackend>(
    rendered: Rendered,
    directory: &dyn DiscordDirectory,
) -> String {
    let mut rendered = rendered;
    for kind in PlaceholderKind::SWEEP_ORDER {
        rendered = sweep::<B>(rendered, kind, directory).await;
    }
    rendered.into_string_with(render_miss::<B>)
}

async fn sweep<B: RenderBackend>(
    rendered: Rendered,
    kind: PlaceholderKind,
    directory: &dyn DiscordDirectory,
) -> Rendered {
    if !rendered.placeholders().any(|p| p.kind() == kind) {
        return rendered;
    }

    let mut out = Rendered::new();
    for segment in rendered.into_segments() {
        match segment {
            Segment::Pending(placeholder) if placeholder.kind() == kind => {
                let text = resolve_one::<B>(&placeholder, directory).await;
                out.push_str(&text);
            }
            other => out.push(other),
        }
    }
    out
}

async fn resolve_one<B: RenderBackend>(
    placeholder: &Placeholder,
    directory: &dyn DiscordDirectory,
) -> String {
    let mut out = String::new();
    match placeholder {
        Placeholder::Emoji(emoji) => {
            let mxc = directory.emoji(emoji).await;
            if mxc.is_none() {
                debug!("No uploaded image for emoji {}", emoji);
            }
            B::emoji(emoji, mxc.as_deref(), &mut out);
        }
        Placeholder::User { id } => {
            let user = directory.user(id).await;
            if user.is_none() {
                debug!("Unknown user {}", id);
            }
            B::user(id, user.as_ref(), &mut out);
        }
        Placeholder::Channel { id } => {
            let channel = directory.channel(id).await;
            if channel.is_none() {
                debug!("Unknown channel {}", id);
            }
            B::channel(id, channel.as_ref(), &mut out);
        }
    }
    out
}

/// Lookup-miss rendering, used for anything a sweep did not reach.
fn render_miss<B: RenderBackend>(placeholder: &Placeholder) -> String {
    let mut out = String::new();
    match placeholder {
        Placeholder::Emoji(emoji) => B::emoji(emoji, None, &mut out),
        Placeholder::User { id } => B::user(id, None, &mut out),
        Placeholder::Channel { id } => B::channel(id, None, &mut out),
    }
    out
}
