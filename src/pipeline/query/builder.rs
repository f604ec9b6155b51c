//! Vocabulary validation of model-proposed query blocks.
//!
//! No controlled term reaches the query without a confirmed lookup: failed
//! lookups count as invalid and the term is searched as free text instead.

use std::sync::LazyLock;

use futures_util::future::join_all;
use regex::Regex;

use super::types::{QueryBlock, TermCheck, ValidatedBlock};
use crate::pipeline::context::VocabularyCache;
use crate::pipeline::literature::VocabularyLookup;

/// Inline field tags such as `[mh]`, `[MeSH Terms]`, `[majr]`, `[tiab]`.
static FIELD_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\[[^\]]*\]").unwrap());

const QUOTE_CHARS: &[char] = &['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

/// Double quotes would end the `"term"[tag]` phrase early.
const INNER_DOUBLE_QUOTES: &[char] = &['"', '\u{201C}', '\u{201D}'];

/// Strip field tags, quotes and surrounding whitespace from a proposed term.
pub fn clean_term(raw: &str) -> String {
    let untagged = FIELD_TAG_RE.replace_all(raw, "");
    let unquoted = untagged
        .trim()
        .trim_matches(QUOTE_CHARS)
        .replace(INNER_DOUBLE_QUOTES, " ");
    unquoted.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleaned, non-empty terms without exact duplicates, in proposal order.
fn unique_clean_terms(raw: &[String]) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in raw.iter().map(|t| clean_term(t)) {
        if !term.is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

async fn lookup<V: VocabularyLookup>(vocabulary: &V, term: &str) -> bool {
    match vocabulary.is_descriptor(term).await {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(term, error = %e, "Vocabulary lookup failed, treating term as invalid");
            false
        }
    }
}

/// Validate every block's controlled terms and build its clauses.
///
/// Uncached terms of one block are looked up concurrently; outcomes are
/// recorded in term order so the cache contents do not depend on timing.
pub async fn validate_blocks<V: VocabularyLookup>(
    blocks: &[QueryBlock],
    vocabulary: &V,
    cache: &mut VocabularyCache,
) -> Vec<ValidatedBlock> {
    let mut validated = Vec::with_capacity(blocks.len());

    for block in blocks {
        let terms = unique_clean_terms(&block.mesh_terms);
        let pending: Vec<&String> = terms.iter().filter(|t| cache.get(t).is_none()).collect();

        let outcomes = join_all(pending.iter().map(|term| lookup(vocabulary, term))).await;
        for (term, valid) in pending.iter().zip(outcomes) {
            cache.record(term, valid);
        }

        let checks: Vec<TermCheck> = terms
            .into_iter()
            .map(|term| {
                let valid = cache.get(&term).unwrap_or(false);
                TermCheck { term, valid }
            })
            .collect();

        let free_text: Vec<String> = block
            .free_text_terms
            .iter()
            .map(|t| clean_term(t))
            .collect();

        let result = ValidatedBlock::assemble(&block.concept, checks, &free_text);
        tracing::debug!(
            concept = %block.concept,
            valid = result.checks().iter().filter(|c| c.valid).count(),
            demoted = result.checks().iter().filter(|c| !c.valid).count(),
            "Validated query block"
        );
        validated.push(result);
    }

    validated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::FakeVocabulary;

    fn block(concept: &str, mesh: &[&str], free: &[&str]) -> QueryBlock {
        QueryBlock {
            concept: concept.into(),
            mesh_terms: mesh.iter().map(|s| s.to_string()).collect(),
            free_text_terms: free.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn clean_term_strips_tags_and_quotes() {
        assert_eq!(clean_term("\"Bronchial Spasm\"[mh]"), "Bronchial Spasm");
        assert_eq!(clean_term("  Asthma [MeSH Terms] "), "Asthma");
        assert_eq!(clean_term("\u{201C}Sugammadex\u{201D}[majr]"), "Sugammadex");
        assert_eq!(clean_term("[mh]"), "");
    }

    #[test]
    fn clean_term_removes_inner_double_quotes() {
        assert_eq!(clean_term("Crohn\"s Disease"), "Crohn s Disease");
        assert_eq!(clean_term("\"post\" \"extubation\"[tiab]"), "post extubation");
        assert_eq!(clean_term("  \"\"  "), "");

        let block = ValidatedBlock::assemble("Condition", vec![], &[clean_term("a \"b\" c")]);
        assert_eq!(block.combined_clause(), Some("\"a b c\"[tiab]"));
    }

    #[tokio::test]
    async fn valid_terms_become_controlled_clauses() {
        let vocabulary = FakeVocabulary::with_valid(&["Bronchial Spasm", "Sugammadex"]);
        let mut cache = VocabularyCache::default();
        let blocks = vec![
            block("Condition", &["Bronchial Spasm[mh]"], &["bronchospasm"]),
            block("Trigger", &["Sugammadex"], &[]),
        ];

        let validated = validate_blocks(&blocks, &vocabulary, &mut cache).await;

        assert_eq!(
            validated[0].combined_clause(),
            Some("(\"Bronchial Spasm\"[mh] OR \"bronchospasm\"[tiab])")
        );
        assert_eq!(validated[1].combined_clause(), Some("\"Sugammadex\"[mh]"));
    }

    #[tokio::test]
    async fn lookup_failure_fails_closed() {
        let vocabulary = FakeVocabulary::failing();
        let mut cache = VocabularyCache::default();
        let blocks = vec![block("Condition", &["Anaphylaxis"], &[])];

        let validated = validate_blocks(&blocks, &vocabulary, &mut cache).await;

        assert_eq!(validated[0].controlled_clause(), None);
        assert_eq!(validated[0].combined_clause(), Some("\"Anaphylaxis\"[tiab]"));
        assert_eq!(cache.get("Anaphylaxis"), Some(false));
    }

    #[tokio::test]
    async fn terms_are_looked_up_once_per_run() {
        let vocabulary = FakeVocabulary::with_valid(&["Asthma"]);
        let mut cache = VocabularyCache::default();
        let blocks = vec![
            block("A", &["Asthma", "\"Asthma\"[mh]"], &[]),
            block("B", &["Asthma[majr]"], &[]),
        ];

        validate_blocks(&blocks, &vocabulary, &mut cache).await;

        assert_eq!(vocabulary.calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn unknown_terms_are_demoted_to_free_text() {
        let vocabulary = FakeVocabulary::with_valid(&["Hypotension"]);
        let mut cache = VocabularyCache::default();
        let blocks = vec![block(
            "Condition",
            &["Hypotension", "Refractory Vasoplegia"],
            &["refractory vasoplegia"],
        )];

        let validated = validate_blocks(&blocks, &vocabulary, &mut cache).await;

        assert_eq!(validated[0].free_text_terms(), &["refractory vasoplegia".to_string()]);
        assert!(validated[0]
            .checks()
            .iter()
            .any(|c| c.term == "Refractory Vasoplegia" && !c.valid));
    }
}
