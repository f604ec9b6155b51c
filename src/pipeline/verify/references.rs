use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::PaperRecord;

/// Bracketed tokens (`[P2]`, `(P2)`, `[Paper 2]`, `(2)`, `[2]`) or bare
/// `Paper 2` / `P2` words. Bracketed forms take precedence at a position.
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\[(]\s*(?:paper|p)?\s*([0-9]+)\s*[\])]|\b(?:paper|p)\s*([0-9]+)\b").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenText {
    pub text: String,
    /// Reference numbers that matched no paper, in order of appearance.
    pub unresolved: Vec<String>,
}

/// Replace paper reference tokens with `<title> (PMID: <id>)`.
///
/// Tokens that point outside the paper list are replaced with a visible
/// error marker; no token is silently removed. Replacement text is not
/// scanned again.
pub fn rewrite_references(text: &str, papers: &[PaperRecord]) -> RewrittenText {
    let mut unresolved = Vec::new();

    let rewritten = REFERENCE_RE.replace_all(text, |caps: &Captures| {
        let digits = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();

        let paper = digits
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| papers.get(i));

        match paper {
            Some(p) => format!("{} (PMID: {})", p.title, p.pmid),
            None => {
                unresolved.push(digits.to_string());
                format!("(Citation Error: Paper ID #{digits} not found)")
            }
        }
    });

    if !unresolved.is_empty() {
        tracing::warn!(count = unresolved.len(), "Reasoning cites papers that were not retrieved");
    }

    RewrittenText {
        text: rewritten.into_owned(),
        unresolved,
    }
}
