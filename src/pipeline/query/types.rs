use serde::{Deserialize, Serialize};

use crate::models::QueryStrength;

/// One concept of the search strategy as proposed by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryBlock {
    pub concept: String,
    /// Candidate controlled-vocabulary (MeSH) terms; unverified.
    pub mesh_terms: Vec<String>,
    pub free_text_terms: Vec<String>,
}

/// Outcome of checking one candidate controlled term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCheck {
    pub term: String,
    pub valid: bool,
}

/// A query block after vocabulary validation. Built once by
/// [`ValidatedBlock::assemble`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedBlock {
    concept: String,
    checks: Vec<TermCheck>,
    free_text_terms: Vec<String>,
    controlled_clause: Option<String>,
    free_text_clause: Option<String>,
    combined_clause: Option<String>,
}

impl ValidatedBlock {
    /// Build the block's clauses. Invalid controlled terms are demoted to
    /// free text rather than dropped.
    pub fn assemble(concept: &str, checks: Vec<TermCheck>, free_text: &[String]) -> Self {
        let mut free_text_terms: Vec<String> = Vec::new();
        let demoted = checks.iter().filter(|c| !c.valid).map(|c| c.term.as_str());
        for term in free_text.iter().map(String::as_str).chain(demoted) {
            let term = term.trim();
            if term.is_empty() {
                continue;
            }
            let lower = term.to_lowercase();
            if !free_text_terms.iter().any(|t| t.to_lowercase() == lower) {
                free_text_terms.push(term.to_string());
            }
        }

        let controlled: Vec<&str> = checks
            .iter()
            .filter(|c| c.valid)
            .map(|c| c.term.as_str())
            .collect();
        let controlled_clause = or_group(&controlled, "mh");
        let free_refs: Vec<&str> = free_text_terms.iter().map(String::as_str).collect();
        let free_text_clause = or_group(&free_refs, "tiab");

        let combined_clause = match (&controlled_clause, &free_text_clause) {
            (Some(c), Some(f)) => Some(format!("({c} OR {f})")),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        };

        Self {
            concept: concept.to_string(),
            checks,
            free_text_terms,
            controlled_clause,
            free_text_clause,
            combined_clause,
        }
    }

    pub fn concept(&self) -> &str {
        &self.concept
    }

    pub fn checks(&self) -> &[TermCheck] {
        &self.checks
    }

    /// Free-text terms including demoted controlled terms.
    pub fn free_text_terms(&self) -> &[String] {
        &self.free_text_terms
    }

    pub fn controlled_clause(&self) -> Option<&str> {
        self.controlled_clause.as_deref()
    }

    pub fn free_text_clause(&self) -> Option<&str> {
        self.free_text_clause.as_deref()
    }

    /// `None` when the block contributes nothing to the query.
    pub fn combined_clause(&self) -> Option<&str> {
        self.combined_clause.as_deref()
    }
}

/// `"a"[tag]` for one term, `("a"[tag] OR "b"[tag])` for several.
fn or_group(terms: &[&str], tag: &str) -> Option<String> {
    match terms {
        [] => None,
        [single] => Some(format!("\"{single}\"[{tag}]")),
        many => {
            let joined = many
                .iter()
                .map(|t| format!("\"{t}\"[{tag}]"))
                .collect::<Vec<_>>()
                .join(" OR ");
            Some(format!("({joined})"))
        }
    }
}

/// The executed search strategy and the counts that chose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    pub narrow: String,
    pub broad: String,
    pub chosen: String,
    pub strength: QueryStrength,
    pub narrow_count: u64,
    pub broad_count: u64,
}

/// Identifiers headed for detail fetch, with their provenance counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePool {
    pub ids: Vec<String>,
    pub from_search: usize,
    pub from_network: usize,
}
