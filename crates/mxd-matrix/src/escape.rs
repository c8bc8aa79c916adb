//! Escaping of literal text for the chat-markdown dialect.

use std::sync::LazyLock;

use regex::Regex;

/// Characters with markup meaning in chat markdown.
const MARKDOWN_SPECIAL: [char; 6] = ['\\', '*', '_', '~', '`', '|'];

/// Zero-width space, breaks the mention keyword without changing its look.
const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Whitespace-delimited token that starts a link, optionally after an opening
/// bracket.
static URL_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[(<\[]?https?://").unwrap());

/// Escape `text` for literal display in chat markdown.
///
/// `@everyone` and `@here` are defused. `@room` becomes `@here` when
/// `room_notify` allows the sender to ping the room, and is left alone
/// otherwise. URL tokens pass through unchanged.
#[must_use]
pub fn escape_markdown(text: &str, room_notify: bool) -> String {
    escape(text, room_notify, false)
}

/// [`escape_markdown`] for heading text, upper-casing plain words.
///
/// URL tokens and words containing `@` keep their case.
pub(crate) fn escape_markdown_upper(text: &str, room_notify: bool) -> String {
    escape(text, room_notify, true)
}

fn escape(text: &str, room_notify: bool, upper: bool) -> String {
    let mut text = defuse_mentions(text);
    if room_notify && text.contains("@room") {
        text = text.replace("@room", "@here");
    }
    escape_tokens(&text, upper)
}

fn defuse_mentions(text: &str) -> String {
    text.replace("@everyone", &format!("@{ZERO_WIDTH_SPACE}everyone"))
        .replace("@here", &format!("@{ZERO_WIDTH_SPACE}here"))
}

/// Backslash-escape special characters outside URL tokens, keeping the
/// original whitespace.
fn escape_tokens(text: &str, upper: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while !rest.is_empty() {
        let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (word, tail) = rest.split_at(word_end);
        escape_word(word, upper, &mut out);

        let space_end = tail
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(tail.len());
        out.push_str(&tail[..space_end]);
        rest = &tail[space_end..];
    }
    out
}

fn escape_word(word: &str, upper: bool, out: &mut String) {
    if URL_TOKEN_RE.is_match(word) {
        out.push_str(word);
        return;
    }
    let upper_word;
    let word = if upper && !word.contains('@') {
        upper_word = word.to_uppercase();
        upper_word.as_str()
    } else {
        word
    };
    for ch in word.chars() {
        if MARKDOWN_SPECIAL.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape_markdown("hello world!", false), "hello world!");
    }

    #[test]
    fn test_escape_markers() {
        assert_eq!(
            escape_markdown("hello *world* how __are__ you?", false),
            r"hello \*world\* how \_\_are\_\_ you?"
        );
    }

    #[test]
    fn test_escape_backslashes() {
        assert_eq!(
            escape_markdown(r"wow \*this\* is cool", false),
            r"wow \\\*this\\\* is cool"
        );
    }

    #[test]
    fn test_escape_all_special_characters() {
        assert_eq!(
            escape_markdown(r"\ * _ ~ ` |", false),
            r"\\ \* \_ \~ \` \|"
        );
    }

    #[test]
    fn test_urls_pass_through() {
        assert_eq!(
            escape_markdown("*hey* https://example.org/_blah_", false),
            r"\*hey\* https://example.org/_blah_"
        );
        assert_eq!(
            escape_markdown("*hey*\nhttps://example.org/_blah_", false),
            "\\*hey\\*\nhttps://example.org/_blah_"
        );
        assert_eq!(
            escape_markdown("*hey* (https://example.org/_blah_)", false),
            r"\*hey\* (https://example.org/_blah_)"
        );
    }

    #[test]
    fn test_whitespace_is_preserved() {
        assert_eq!(escape_markdown("  a\t_b_  \n", false), "  a\t\\_b\\_  \n");
    }

    #[test]
    fn test_mass_mentions_are_defused() {
        assert_eq!(escape_markdown("hey @everyone", true), "hey @\u{200B}everyone");
        assert_eq!(escape_markdown("hey @here", true), "hey @\u{200B}here");
    }

    #[test]
    fn test_room_mention() {
        assert_eq!(escape_markdown("hey @room", true), "hey @here");
        assert_eq!(escape_markdown("hey @room", false), "hey @room");
    }

    #[test]
    fn test_upper_keeps_urls_and_mentions() {
        assert_eq!(
            escape_markdown_upper("read *this* https://example.org/AbC @room", true),
            r"READ \*THIS\* https://example.org/AbC @here"
        );
    }
}
