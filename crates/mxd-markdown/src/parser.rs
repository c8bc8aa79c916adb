//! Chat-markdown parser.
//!
//! A hand-written scanner that tries each rule at the current position in a
//! fixed priority order and falls back to literal text. Anchored regexes are
//! used for the fixed-shape rules; delimiter pairs are matched by scanning for
//! the first valid closing marker.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{Broadcast, Node, Style};
use crate::placeholder::Emoji;

static CODE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```(?:([a-zA-Z0-9_+\-.#]+?)\n)?\n*([^\n].*?)\n*```").unwrap()
});
static ESCAPE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\\([^0-9A-Za-z\s])").unwrap());
static AUTOLINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<(https?://[^\s>]+)>").unwrap());
static USER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<@!?(\d+)>").unwrap());
static ROLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<@&(\d+)>").unwrap());
static CHANNEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<#(\d+)>").unwrap());
static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<(a?):(\w+):(\d+)>").unwrap());
static MASKED_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^\[\]\n]+)\]\(<?(https?://[^\s()<>]+)>?\)").unwrap()
});
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^https?://[^\s<]+[^<.,:;"')\]\s]"#).unwrap());
static TRIPLE_QUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *>>> ((?s:.*))").unwrap());
static LINE_QUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?: *> [^\n]*(?:\n|$))+").unwrap());

/// Deepest formatting nesting; markers past it stay literal text.
const MAX_NESTING: usize = 32;

/// Which rules the parser recognises.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Full grammar: formatting, code, quotes, links and entities.
    #[default]
    Full,
    /// Only platform entities (mentions, emoji, broadcasts, spoilers).
    /// Everything else stays verbatim text.
    EntitiesOnly,
}

/// Parser configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParseOptions {
    pub mode: ParseMode,
    /// Recognise `[label](url)` links. Only trusted content (embeds,
    /// bot-authored messages) may use masked links.
    pub masked_links: bool,
}

/// Parse chat markdown into a list of nodes.
#[must_use]
pub fn parse(input: &str, options: ParseOptions) -> Vec<Node> {
    Parser { options }.parse_inline(input, Context::default())
}

#[derive(Clone, Copy, Default)]
struct Context {
    in_quote: bool,
    nested: bool,
    depth: usize,
}

impl Context {
    fn nested(self) -> Self {
        Self {
            nested: true,
            depth: self.depth + 1,
            ..self
        }
    }

    fn can_nest(self) -> bool {
        self.depth < MAX_NESTING
    }
}

struct Parser {
    options: ParseOptions,
}

impl Parser {
    fn full(&self) -> bool {
        self.options.mode == ParseMode::Full
    }

    fn parse_inline(&self, src: &str, ctx: Context) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut text = String::new();
        let mut pos = 0;

        while let Some(ch) = src[pos..].chars().next() {
            let prev = src[..pos].chars().next_back();
            match self.match_rule(&src[pos..], prev, ctx) {
                Some((Node::Text(literal), len)) => {
                    text.push_str(&literal);
                    pos += len;
                }
                Some((node, len)) => {
                    if !text.is_empty() {
                        nodes.push(Node::Text(std::mem::take(&mut text)));
                    }
                    nodes.push(node);
                    pos += len;
                }
                None => {
                    text.push(ch);
                    pos += ch.len_utf8();
                }
            }
        }

        if !text.is_empty() {
            nodes.push(Node::Text(text));
        }
        nodes
    }

    /// Try every rule at the start of `rest`, highest priority first.
    fn match_rule(&self, rest: &str, prev: Option<char>, ctx: Context) -> Option<(Node, usize)> {
        let full = self.full();

        if full {
            let line_start = prev.is_none_or(|c| c == '\n');
            if line_start
                && !ctx.nested
                && !ctx.in_quote
                && let Some(m) = self.block_quote(rest)
            {
                return Some(m);
            }
            if let Some(m) = code_block(rest) {
                return Some(m);
            }
            if let Some(caps) = ESCAPE_RE.captures(rest) {
                return Some((Node::Text(caps[1].to_owned()), caps[0].len()));
            }
            if let Some(caps) = AUTOLINK_RE.captures(rest) {
                let url = caps[1].to_owned();
                return Some((Node::Link { url, label: None }, caps[0].len()));
            }
        }

        if let Some(m) = entity(rest) {
            return Some(m);
        }

        if full {
            if self.options.masked_links
                && ctx.can_nest()
                && let Some(caps) = MASKED_LINK_RE.captures(rest)
            {
                let label = self.parse_inline(&caps[1], ctx.nested());
                let url = caps[2].to_owned();
                return Some((
                    Node::Link {
                        url,
                        label: Some(label),
                    },
                    caps[0].len(),
                ));
            }
            if prev.is_none_or(|c| !c.is_alphanumeric())
                && let Some(m) = URL_RE.find(rest)
            {
                let url = m.as_str().to_owned();
                return Some((Node::Link { url, label: None }, m.len()));
            }
        }

        if let Some(m) = broadcast(rest) {
            return Some(m);
        }

        if full {
            if let Some(m) = self.delimited(rest, "**", Some('*'), Style::Strong, ctx) {
                return Some(m);
            }
            if let Some(m) = self.delimited(rest, "__", Some('_'), Style::Underline, ctx) {
                return Some(m);
            }
            if let Some(m) = self.emphasis_star(rest, ctx) {
                return Some(m);
            }
            if prev.is_none_or(|c| !is_word_char(c))
                && let Some(m) = self.emphasis_underscore(rest, ctx)
            {
                return Some(m);
            }
            if let Some(m) = self.delimited(rest, "~~", None, Style::Strikethrough, ctx) {
                return Some(m);
            }
        }

        if let Some(m) = self.delimited(rest, "||", None, Style::Spoiler, ctx) {
            return Some(m);
        }

        if full {
            if let Some(m) = inline_code(rest) {
                return Some(m);
            }
            if rest.starts_with('\n') {
                return Some((Node::LineBreak, 1));
            }
        }

        None
    }

    /// `> ` line runs, or `>>> ` which quotes the remainder of the message.
    fn block_quote(&self, rest: &str) -> Option<(Node, usize)> {
        let quoted = Context {
            in_quote: true,
            ..Context::default()
        };

        if let Some(caps) = TRIPLE_QUOTE_RE.captures(rest) {
            let children = self.parse_inline(&caps[1], quoted);
            return Some((Node::BlockQuote(children), caps[0].len()));
        }

        let m = LINE_QUOTE_RE.find(rest)?;
        let block = m.as_str();
        let content = block
            .strip_suffix('\n')
            .unwrap_or(block)
            .split('\n')
            .map(strip_quote_marker)
            .collect::<Vec<_>>()
            .join("\n");
        let children = self.parse_inline(&content, quoted);
        Some((Node::BlockQuote(children), m.len()))
    }

    fn delimited(
        &self,
        rest: &str,
        delim: &str,
        forbid_after: Option<char>,
        style: Style,
        ctx: Context,
    ) -> Option<(Node, usize)> {
        if !ctx.can_nest() {
            return None;
        }
        let body = rest.strip_prefix(delim)?;
        let close = find_closing(body, delim, forbid_after)?;
        let children = self.parse_inline(&body[..close], ctx.nested());
        Some((Node::Styled { style, children }, close + delim.len() * 2))
    }

    /// `*text*`: the opener must be followed by non-whitespace and the closer
    /// must not follow whitespace. `**` pairs inside are skipped.
    fn emphasis_star(&self, rest: &str, ctx: Context) -> Option<(Node, usize)> {
        if !ctx.can_nest() {
            return None;
        }
        let body = rest.strip_prefix('*')?;
        let first = body.chars().next()?;
        if first.is_whitespace() || first == '*' {
            return None;
        }

        let mut i = 0;
        let mut prev = first;
        while let Some(c) = body[i..].chars().next() {
            if c == '\\' {
                i += 1;
                if let Some(escaped) = body[i..].chars().next() {
                    i += escaped.len_utf8();
                    prev = escaped;
                }
                continue;
            }
            if body[i..].starts_with("**") {
                i += 2;
                prev = '*';
                continue;
            }
            if c == '*' && i > 0 && !prev.is_whitespace() {
                let children = self.parse_inline(&body[..i], ctx.nested());
                let node = Node::Styled {
                    style: Style::Emphasis,
                    children,
                };
                return Some((node, i + 2));
            }
            prev = c;
            i += c.len_utf8();
        }
        None
    }

    /// `_text_`: must close at a word boundary and may not contain a lone `_`.
    fn emphasis_underscore(&self, rest: &str, ctx: Context) -> Option<(Node, usize)> {
        if !ctx.can_nest() {
            return None;
        }
        let body = rest.strip_prefix('_')?;

        let mut i = 0;
        while let Some(c) = body[i..].chars().next() {
            if c == '\\' {
                i += 1;
                if let Some(escaped) = body[i..].chars().next() {
                    i += escaped.len_utf8();
                }
                continue;
            }
            if body[i..].starts_with("__") {
                i += 2;
                continue;
            }
            if c == '_' {
                let after = body[i + 1..].chars().next();
                if i == 0 || after.is_some_and(is_word_char) {
                    return None;
                }
                let children = self.parse_inline(&body[..i], ctx.nested());
                let node = Node::Styled {
                    style: Style::Emphasis,
                    children,
                };
                return Some((node, i + 2));
            }
            i += c.len_utf8();
        }
        None
    }
}

fn code_block(rest: &str) -> Option<(Node, usize)> {
    let caps = CODE_BLOCK_RE.captures(rest)?;
    let node = Node::CodeBlock {
        lang: caps.get(1).map(|m| m.as_str().to_owned()),
        content: caps[2].to_owned(),
    };
    Some((node, caps[0].len()))
}

/// Mentions and custom emoji, all written inside angle brackets.
fn entity(rest: &str) -> Option<(Node, usize)> {
    if !rest.starts_with('<') {
        return None;
    }
    if let Some(caps) = USER_RE.captures(rest) {
        return Some((Node::User(caps[1].to_owned()), caps[0].len()));
    }
    if let Some(caps) = ROLE_RE.captures(rest) {
        return Some((Node::Role(caps[1].to_owned()), caps[0].len()));
    }
    if let Some(caps) = CHANNEL_RE.captures(rest) {
        return Some((Node::Channel(caps[1].to_owned()), caps[0].len()));
    }
    if let Some(caps) = EMOJI_RE.captures(rest) {
        let emoji = Emoji {
            animated: !caps[1].is_empty(),
            name: caps[2].to_owned(),
            id: caps[3].to_owned(),
        };
        return Some((Node::Emoji(emoji), caps[0].len()));
    }
    None
}

fn broadcast(rest: &str) -> Option<(Node, usize)> {
    [Broadcast::Everyone, Broadcast::Here]
        .into_iter()
        .find(|b| rest.starts_with(b.keyword()))
        .map(|b| (Node::Broadcast(b), b.keyword().len()))
}

/// Code span delimited by a backtick run of matching length.
fn inline_code(rest: &str) -> Option<(Node, usize)> {
    let body = rest.trim_start_matches('`');
    let ticks = rest.len() - body.len();
    if ticks == 0 {
        return None;
    }

    let mut offset = 0;
    while let Some(found) = body[offset..].find('`') {
        let pos = offset + found;
        let run = body[pos..].len() - body[pos..].trim_start_matches('`').len();
        if run == ticks {
            let node = Node::InlineCode(body[..pos].to_owned());
            return Some((node, pos + ticks * 2));
        }
        offset = pos + run;
    }
    None
}

/// Byte offset of the first closing `delim` after at least one content char.
fn find_closing(body: &str, delim: &str, forbid_after: Option<char>) -> Option<usize> {
    let mut i = 0;
    while let Some(c) = body[i..].chars().next() {
        if c == '\\' {
            i += 1;
            if let Some(escaped) = body[i..].chars().next() {
                i += escaped.len_utf8();
            }
            continue;
        }
        if i > 0 && body[i..].starts_with(delim) {
            let after = body[i + delim.len()..].chars().next();
            if forbid_after.is_none() || after != forbid_after {
                return Some(i);
            }
        }
        i += c.len_utf8();
    }
    None
}

fn strip_quote_marker(line: &str) -> &str {
    let line = line.trim_start_matches(' ');
    let line = line.strip_prefix('>').unwrap_or(line);
    line.strip_prefix(' ').unwrap_or(line)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn full(input: &str) -> Vec<Node> {
        parse(input, ParseOptions::default())
    }

    fn text(s: &str) -> Node {
        Node::Text(s.to_owned())
    }

    fn styled(style: Style, children: Vec<Node>) -> Node {
        Node::Styled { style, children }
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(full("hello world"), vec![text("hello world")]);
    }

    #[test]
    fn test_strong_with_nested_emphasis() {
        assert_eq!(
            full("**bold *and* more**"),
            vec![styled(
                Style::Strong,
                vec![
                    text("bold "),
                    styled(Style::Emphasis, vec![text("and")]),
                    text(" more"),
                ]
            )]
        );
    }

    #[test]
    fn test_triple_star_is_strong_emphasis() {
        assert_eq!(
            full("***x***"),
            vec![styled(
                Style::Strong,
                vec![styled(Style::Emphasis, vec![text("x")])]
            )]
        );
    }

    #[test]
    fn test_emphasis_requires_non_space_after_opener() {
        assert_eq!(full("* not em*"), vec![text("* not em*")]);
        assert_eq!(full("*not em *"), vec![text("*not em *")]);
    }

    #[test]
    fn test_underscore_inside_word_is_literal() {
        assert_eq!(full("snake_case_name"), vec![text("snake_case_name")]);
    }

    #[test]
    fn test_underscore_emphasis() {
        assert_eq!(
            full("an _emphasised_ word"),
            vec![
                text("an "),
                styled(Style::Emphasis, vec![text("emphasised")]),
                text(" word"),
            ]
        );
    }

    #[test]
    fn test_marker_runs_do_not_exhaust_the_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(|| full(&"*".repeat(4000)))
            .unwrap();
        let nodes = handle.join().unwrap();
        assert!(!nodes.is_empty());
    }

    #[test]
    fn test_nesting_past_the_limit_stays_literal() {
        // Each `**` pair peels two markers off both ends of a run.
        let input = "*".repeat(4 * (MAX_NESTING + 2));

        let mut nodes = full(&input);
        let mut levels = 0;
        while let [Node::Styled { style: Style::Strong, children }] = nodes.as_slice() {
            levels += 1;
            nodes = children.clone();
        }
        assert_eq!(levels, MAX_NESTING);
        assert_eq!(nodes, vec![text("********")]);
    }

    #[test]
    fn test_underline_strike_spoiler() {
        assert_eq!(
            full("__u__ ~~s~~ ||p||"),
            vec![
                styled(Style::Underline, vec![text("u")]),
                text(" "),
                styled(Style::Strikethrough, vec![text("s")]),
                text(" "),
                styled(Style::Spoiler, vec![text("p")]),
            ]
        );
    }

    #[test]
    fn test_unclosed_delimiters_are_literal() {
        assert_eq!(full("**foo ~~bar"), vec![text("**foo ~~bar")]);
    }

    #[test]
    fn test_escape() {
        assert_eq!(full(r"\*not em\*"), vec![text("*not em*")]);
        assert_eq!(full(r"\a"), vec![text(r"\a")]);
    }

    #[test]
    fn test_code_block_with_language() {
        assert_eq!(
            full("```rust\nfn main() {}\n```"),
            vec![Node::CodeBlock {
                lang: Some("rust".to_owned()),
                content: "fn main() {}".to_owned(),
            }]
        );
    }

    #[test]
    fn test_code_block_without_language() {
        assert_eq!(
            full("```\n*raw*\n```"),
            vec![Node::CodeBlock {
                lang: None,
                content: "*raw*".to_owned(),
            }]
        );
    }

    #[test]
    fn test_inline_code_run_length() {
        assert_eq!(
            full("``a`b`` c"),
            vec![Node::InlineCode("a`b".to_owned()), text(" c")]
        );
    }

    #[test]
    fn test_line_break() {
        assert_eq!(
            full("a\nb"),
            vec![text("a"), Node::LineBreak, text("b")]
        );
    }

    #[test]
    fn test_line_quote() {
        assert_eq!(
            full("> one\n> two\nafter"),
            vec![
                Node::BlockQuote(vec![text("one"), Node::LineBreak, text("two")]),
                text("after"),
            ]
        );
    }

    #[test]
    fn test_triple_quote_takes_rest() {
        assert_eq!(
            full("hi\n>>> all\nof this"),
            vec![
                text("hi"),
                Node::LineBreak,
                Node::BlockQuote(vec![text("all"), Node::LineBreak, text("of this")]),
            ]
        );
    }

    #[test]
    fn test_quote_only_at_line_start() {
        assert_eq!(full("a > b"), vec![text("a > b")]);
    }

    #[test]
    fn test_quotes_do_not_nest() {
        assert_eq!(
            full("> > inner"),
            vec![Node::BlockQuote(vec![text("> inner")])]
        );
    }

    #[test]
    fn test_entities() {
        assert_eq!(
            full("<@!12><@&34><#56><a:wave:78><:smile:90>"),
            vec![
                Node::User("12".to_owned()),
                Node::Role("34".to_owned()),
                Node::Channel("56".to_owned()),
                Node::Emoji(Emoji {
                    name: "wave".to_owned(),
                    id: "78".to_owned(),
                    animated: true,
                }),
                Node::Emoji(Emoji {
                    name: "smile".to_owned(),
                    id: "90".to_owned(),
                    animated: false,
                }),
            ]
        );
    }

    #[test]
    fn test_broadcasts() {
        assert_eq!(
            full("@everyone and @here"),
            vec![
                Node::Broadcast(Broadcast::Everyone),
                text(" and "),
                Node::Broadcast(Broadcast::Here),
            ]
        );
    }

    #[test]
    fn test_bare_url_drops_trailing_punctuation() {
        assert_eq!(
            full("see https://example.com/a_b_c."),
            vec![
                text("see "),
                Node::Link {
                    url: "https://example.com/a_b_c".to_owned(),
                    label: None,
                },
                text("."),
            ]
        );
    }

    #[test]
    fn test_autolink() {
        assert_eq!(
            full("<https://example.com>"),
            vec![Node::Link {
                url: "https://example.com".to_owned(),
                label: None,
            }]
        );
    }

    #[test]
    fn test_masked_links_only_when_enabled() {
        let input = "[click](https://example.com)";
        assert_eq!(
            full(input),
            vec![
                text("[click]("),
                Node::Link {
                    url: "https://example.com".to_owned(),
                    label: None,
                },
                text(")"),
            ]
        );

        let options = ParseOptions {
            masked_links: true,
            ..ParseOptions::default()
        };
        assert_eq!(
            parse(input, options),
            vec![Node::Link {
                url: "https://example.com".to_owned(),
                label: Some(vec![text("click")]),
            }]
        );
    }

    #[test]
    fn test_entities_only_mode() {
        let options = ParseOptions {
            mode: ParseMode::EntitiesOnly,
            masked_links: false,
        };
        assert_eq!(
            parse("**x** <@1>\n> ||s|| `c`", options),
            vec![
                text("**x** "),
                Node::User("1".to_owned()),
                text("\n> "),
                styled(Style::Spoiler, vec![text("s")]),
                text(" `c`"),
            ]
        );
    }
}
