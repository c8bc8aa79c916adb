//! Detection of embeds that only repeat a link already in the message.

use regex::Regex;

/// Invalid [`LinkEquivalence`] pattern.
#[derive(Debug, thiserror::Error)]
pub enum LinkEquivalenceError {
    #[error("{0}")]
    Pattern(#[from] regex::Error),

    #[error("Pattern {0:?} has no capture group for the resource identifier")]
    MissingGroup(String),
}

/// Two URL shapes that address the same resource.
///
/// Both patterns capture the resource identifier in group 1. An embed whose
/// URL matches one shape is considered present when the message content
/// contains the other shape with the same identifier.
#[derive(Clone, Debug)]
pub struct LinkEquivalence {
    canonical: Regex,
    short: Regex,
}

impl LinkEquivalence {
    /// Build a rule from two patterns with one capture group each.
    ///
    /// # Errors
    ///
    /// Returns an error if either pattern is not a valid regex or lacks a
    /// capture group.
    pub fn new(canonical: &str, short: &str) -> Result<Self, LinkEquivalenceError> {
        Ok(Self {
            canonical: with_id_group(canonical)?,
            short: with_id_group(short)?,
        })
    }

    /// Video watch page and its short-link form.
    #[must_use]
    pub fn youtube() -> Self {
        Self::new(
            r"https?://(?:www\.)?youtube\.com/watch\?(?:[^\s&]*&)*v=([^&\s]+)",
            r"https?://youtu\.be/([^/?\s]+)",
        )
        .unwrap()
    }

    /// Whether `url` and some link in `content` name the same resource.
    #[must_use]
    pub fn matches(&self, url: &str, content: &str) -> bool {
        same_id(&self.canonical, url, &self.short, content)
            || same_id(&self.short, url, &self.canonical, content)
    }
}

fn with_id_group(pattern: &str) -> Result<Regex, LinkEquivalenceError> {
    let re = Regex::new(pattern)?;
    if re.captures_len() < 2 {
        return Err(LinkEquivalenceError::MissingGroup(pattern.to_owned()));
    }
    Ok(re)
}

/// `url` must match `url_shape` from its first byte.
fn same_id(url_shape: &Regex, url: &str, content_shape: &Regex, content: &str) -> bool {
    let Some(caps) = url_shape.captures(url) else {
        return false;
    };
    if caps.get(0).is_none_or(|m| m.start() != 0) {
        return false;
    }
    let Some(id) = caps.get(1) else {
        return false;
    };
    content_shape
        .captures_iter(content)
        .any(|found| found.get(1).is_some_and(|m| m.as_str() == id.as_str()))
}

/// True when the embed URL already appears in `content`, verbatim (ignoring
/// one trailing slash) or through one of the `rules`.
pub(crate) fn is_linked_in(content: &str, url: &str, rules: &[LinkEquivalence]) -> bool {
    let url = url.strip_suffix('/').unwrap_or(url);
    if url.is_empty() {
        return false;
    }
    content.contains(url) || rules.iter().any(|rule| rule.matches(url, content))
}
