//! Guessing the language of an unlabelled code block.
//!
//! Each language has a handful of weighted signals. The best scoring
//! language wins if it reaches a minimum score and is not tied.

use std::sync::LazyLock;

use regex::Regex;

const MIN_SCORE: u32 = 2;

struct Signature {
    language: &'static str,
    signals: Vec<(Regex, u32)>,
}

impl Signature {
    fn new(language: &'static str, signals: &[(&str, u32)]) -> Self {
        Self {
            language,
            signals: signals
                .iter()
                .map(|(pattern, weight)| (Regex::new(pattern).unwrap(), *weight))
                .collect(),
        }
    }

    fn score(&self, code: &str) -> u32 {
        self.signals
            .iter()
            .filter(|(re, _)| re.is_match(code))
            .map(|(_, weight)| weight)
            .sum()
    }
}

static SIGNATURES: LazyLock<Vec<Signature>> = LazyLock::new(|| {
    vec![
        Signature::new(
            "xml",
            &[
                (r"</[A-Za-z][\w:-]*\s*>", 3),
                (r"<[A-Za-z][\w:-]*(\s[^<>]*)?/?>", 1),
                (r"<\?xml", 5),
                (r"(?i)<!DOCTYPE", 5),
            ],
        ),
        Signature::new(
            "rust",
            &[
                (r"\bfn\s+\w+\s*[<(]", 3),
                (r"\blet\s+mut\b", 3),
                (r"\bimpl\b", 2),
                (r"\bpub\s+(fn|struct|enum|mod)\b", 3),
                (r"\w+!\(", 1),
                (r"\w::\w", 1),
            ],
        ),
        Signature::new(
            "python",
            &[
                (r"(?m)^\s*def\s+\w+\(.*\)\s*:", 3),
                (r"(?m)^\s*from\s+\S+\s+import\b", 3),
                (r"(?m)^\s*import\s+\w+\s*$", 2),
                (r"\belif\b", 3),
                (r"\bself\.", 1),
                (r"(?m):\s*$", 1),
            ],
        ),
        Signature::new(
            "javascript",
            &[
                (r"\bfunction\b", 2),
                (r"\b(const|let)\s+\w+\s*=", 2),
                (r"console\.log\(", 3),
                (r"===|!==", 2),
                (r"\brequire\(", 2),
                (r"=>", 1),
            ],
        ),
        Signature::new(
            "bash",
            &[
                (r"^#!/(usr/)?bin/(env\s+)?(ba|z)?sh", 5),
                (r"(?m)^\s*(echo|cd|export|sudo|apt|ls|mkdir|rm)\s", 2),
                (r"(?m)^\s*(fi|done|esac)\s*$", 3),
                (r"\$\{?\w+\}?", 1),
            ],
        ),
        Signature::new(
            "css",
            &[
                (r"(?m)^\s*[.#]?[\w-]+(\s*[,>]\s*[.#]?[\w-]+)*\s*\{", 2),
                (r"(?m)^\s*[\w-]+\s*:\s*[^;{}]+;\s*$", 2),
                (r"@media\b", 3),
            ],
        ),
        Signature::new(
            "sql",
            &[
                (r"(?is)\bselect\b.+\bfrom\b", 3),
                (r"(?i)\binsert\s+into\b", 3),
                (r"(?i)\bcreate\s+table\b", 3),
                (r"(?i)\bwhere\b", 1),
            ],
        ),
    ]
});

/// Best guess for the language of `code`, `None` when unsure.
#[must_use]
pub fn detect_language(code: &str) -> Option<&'static str> {
    if looks_like_json(code) {
        return Some("json");
    }

    let mut best: Option<(&'static str, u32)> = None;
    let mut tied = false;
    for signature in SIGNATURES.iter() {
        let score = signature.score(code);
        match best {
            Some((_, top)) if score == top => tied = true,
            Some((_, top)) if score < top => {}
            _ => {
                best = Some((signature.language, score));
                tied = false;
            }
        }
    }

    match best {
        Some((language, score)) if score >= MIN_SCORE && !tied => Some(language),
        _ => None,
    }
}

fn looks_like_json(code: &str) -> bool {
    let trimmed = code.trim();
    (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
}
