//! Entities referenced by a message that are resolved outside the renderer.

use std::fmt;

/// Custom emoji reference, as written `<:name:id>` or `<a:name:id>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Emoji {
    pub name: String,
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub animated: bool,
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.animated { "a" } else { "" };
        write!(f, "<{prefix}:{}:{}>", self.name, self.id)
    }
}

/// Kind of a deferred entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Emoji,
    User,
    Channel,
}

impl PlaceholderKind {
    /// Resolution order used when sweeping a rendered buffer.
    pub const SWEEP_ORDER: [Self; 3] = [Self::Emoji, Self::User, Self::Channel];
}

/// Entity reference awaiting an asynchronous directory lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Placeholder {
    Emoji(Emoji),
    User { id: String },
    Channel { id: String },
}

impl Placeholder {
    #[must_use]
    pub fn kind(&self) -> PlaceholderKind {
        match self {
            Self::Emoji(_) => PlaceholderKind::Emoji,
            Self::User { .. } => PlaceholderKind::User,
            Self::Channel { .. } => PlaceholderKind::Channel,
        }
    }

    /// The entity as the user originally typed it, e.g. `<@123>`.
    #[must_use]
    pub fn source_syntax(&self) -> String {
        match self {
            Self::Emoji(emoji) => emoji.to_string(),
            Self::User { id } => format!("<@{id}>"),
            Self::Channel { id } => format!("<#{id}>"),
        }
    }
}

/// Directory answer for a user or channel.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedEntity {
    /// Matrix identifier (user ID or room alias).
    pub mxid: String,
    /// Display name.
    pub name: String,
}

impl ResolvedEntity {
    pub fn new(mxid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mxid: mxid.into(),
            name: name.into(),
        }
    }
}

/// Guild role, resolved synchronously while rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Role {
    pub id: String,
    pub name: String,
    /// Packed `0xRRGGBB` colour. Out-of-range values are clamped on output.
    #[cfg_attr(feature = "serde", serde(default))]
    pub color: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_syntax() {
        let emoji = Emoji {
            name: "blah".to_owned(),
            id: "1234".to_owned(),
            animated: true,
        };
        assert_eq!(Placeholder::Emoji(emoji).source_syntax(), "<a:blah:1234>");
        assert_eq!(
            Placeholder::User { id: "12".to_owned() }.source_syntax(),
            "<@12>"
        );
        assert_eq!(
            Placeholder::Channel { id: "34".to_owned() }.source_syntax(),
            "<#34>"
        );
    }

    #[test]
    fn test_kind() {
        let user = Placeholder::User { id: "1".to_owned() };
        assert_eq!(user.kind(), PlaceholderKind::User);
    }
}
