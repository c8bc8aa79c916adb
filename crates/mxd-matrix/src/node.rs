//! Owned HTML tree for the target-dialect walker.

use std::collections::BTreeMap;

use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, QualName, local_name, namespace_url, ns, parse_fragment};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Node of a parsed `formatted_body` fragment.
///
/// The tree is converted out of the DOM so it can be shared across `await`
/// points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedNode {
    Text {
        text: String,
    },
    Element {
        /// Lower-case local tag name.
        tag: String,
        attributes: BTreeMap<String, String>,
        children: Vec<ParsedNode>,
    },
}

impl ParsedNode {
    /// Tag name for elements, `None` for text.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element { tag, .. } => Some(tag),
            Self::Text { .. } => None,
        }
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Self::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            Self::Text { .. } => None,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[ParsedNode] {
        match self {
            Self::Element { children, .. } => children,
            Self::Text { .. } => &[],
        }
    }

    /// Concatenated text of this node and all descendants, entities decoded.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text { text } => out.push_str(text),
            Self::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// Parse an HTML fragment as it would appear inside `<body>`.
///
/// Never fails: malformed markup is repaired by the HTML5 tree builder.
#[must_use]
pub fn parse_html(html: &str) -> Vec<ParsedNode> {
    let context = QualName::new(None, ns!(html), local_name!("body"));
    let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, vec![]).one(html);

    // The fragment is parsed into a synthetic <html> root.
    let document = dom.document.children.borrow();
    document
        .iter()
        .flat_map(convert_children)
        .collect()
}

fn convert_children(handle: &Handle) -> Vec<ParsedNode> {
    handle.children.borrow().iter().filter_map(convert).collect()
}

fn convert(handle: &Handle) -> Option<ParsedNode> {
    match &handle.data {
        NodeData::Text { contents } => Some(ParsedNode::Text {
            text: contents.borrow().to_string(),
        }),
        NodeData::Element { name, attrs, .. } => Some(ParsedNode::Element {
            tag: name.local.to_string(),
            attributes: attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect(),
            children: convert_children(handle),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(text: &str) -> ParsedNode {
        ParsedNode::Text {
            text: text.to_owned(),
        }
    }

    #[test]
    fn test_parse_text_only() {
        assert_eq!(parse_html("foxes &amp; foxes"), vec![text("foxes & foxes")]);
    }

    #[test]
    fn test_parse_nested_elements() {
        let nodes = parse_html(r#"a <a href="https://example.com"><em>b</em></a>"#);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0], text("a "));
        assert_eq!(nodes[1].tag(), Some("a"));
        assert_eq!(nodes[1].attribute("href"), Some("https://example.com"));
        assert_eq!(nodes[1].children()[0].tag(), Some("em"));
        assert_eq!(nodes[1].text_content(), "b");
    }

    #[test]
    fn test_tags_are_lower_case() {
        let nodes = parse_html("<STRONG>x</STRONG>");
        assert_eq!(nodes[0].tag(), Some("strong"));
    }

    #[test]
    fn test_custom_elements_and_empty_attributes() {
        let nodes = parse_html("<mx-reply>q</mx-reply><span data-mx-spoiler>s</span>");
        assert_eq!(nodes[0].tag(), Some("mx-reply"));
        assert_eq!(nodes[1].attribute("data-mx-spoiler"), Some(""));
    }

    #[test]
    fn test_whitespace_between_blocks_is_kept() {
        let nodes = parse_html("<p>a</p>\n<p>b</p>");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[1], text("\n"));
    }

    #[test]
    fn test_text_content_of_text_node() {
        assert_eq!(text("x").text_content(), "x");
        assert!(text("x").children().is_empty());
        assert_eq!(text("x").attribute("href"), None);
    }
}
