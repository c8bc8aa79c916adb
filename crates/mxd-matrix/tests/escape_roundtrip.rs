//! Text escaped for chat markdown reads back as the same literal text.

use mxd_markdown::{Node, ParseOptions, parse};
use mxd_matrix::escape_markdown;
use pretty_assertions::assert_eq;

fn literal_text(nodes: &[Node]) -> Option<String> {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            _ => return None,
        }
    }
    Some(out)
}

#[test]
fn test_escaped_text_parses_back_to_itself() {
    let samples = [
        "plain words",
        "*stars* and _underscores_",
        "**bold** __under__ ~~strike~~",
        "||spoiler|| and `code` and ```block```",
        r"back\slash \* already escaped",
        "a*b_c~d`e|f\\g",
        "snake_case_name * 2",
        "mixed **_~|`\\ all together",
    ];
    for sample in samples {
        let escaped = escape_markdown(sample, false);
        let nodes = parse(&escaped, ParseOptions::default());
        assert_eq!(
            literal_text(&nodes).as_deref(),
            Some(sample),
            "escaped form: {escaped}"
        );
    }
}

#[test]
fn test_urls_survive_unescaped() {
    let escaped = escape_markdown("see https://example.org/_a_ *now*", false);
    assert_eq!(escaped, r"see https://example.org/_a_ \*now\*");
}
