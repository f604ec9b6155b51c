//! Evidence verification and level recalculation.
//!
//! Every level asserted by the model is checked against the abstract it
//! claims to quote. Quotations that cannot be found cost levels; a claim with
//! no surviving quotation is voided. The result is a pure function of the
//! evaluations and the paper list.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::types::{PaperEvaluation, VerificationNote, VerificationOutcome, VerifiedCitation};
use crate::models::{ClosestMatchPolicy, PaperRecord};

static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Quotations this short match too easily to count as evidence.
const MIN_QUOTE_CHARS: usize = 5;

fn is_quote_mark(c: char) -> bool {
    matches!(c, '"' | '\'' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}')
}

/// Resolve a model paper reference to a 1-based index into `paper_count` papers.
///
/// Uses the first run of ASCII digits of the reference's string form, so
/// `3`, `"3"`, `"P3"`, `"[P3]"` and `"Paper 3"` all resolve to 3.
pub fn resolve_reference(reference: &Value, paper_count: usize) -> Option<usize> {
    let text = match reference {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let index: usize = DIGIT_RUN_RE.find(&text)?.as_str().parse().ok()?;
    (1..=paper_count).contains(&index).then_some(index)
}

/// Trim, drop one surrounding quote mark on each side, lower-case.
pub fn normalize_quote(quote: &str) -> String {
    let trimmed = quote.trim();
    let trimmed = trimmed.strip_prefix(is_quote_mark).unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(is_quote_mark).unwrap_or(trimmed);
    trimmed.trim().to_lowercase()
}

/// True when the normalized quotation occurs in the lower-cased abstract.
pub fn quote_is_confirmed(quote: &str, abstract_lower: &str) -> bool {
    let normalized = normalize_quote(quote);
    normalized.chars().count() > MIN_QUOTE_CHARS && abstract_lower.contains(&normalized)
}

/// Apply the downgrade table. The returned level never exceeds the
/// (clamped) asserted level.
pub fn apply_downgrade(
    asserted: u8,
    quotes_total: usize,
    quotes_confirmed: usize,
) -> (u8, Option<VerificationNote>) {
    let asserted = asserted.clamp(1, 4);
    if quotes_total == 0 {
        (1, Some(VerificationNote::NoEvidence))
    } else if quotes_confirmed == 0 {
        (0, Some(VerificationNote::Hallucinated))
    } else if quotes_confirmed < quotes_total {
        (asserted.saturating_sub(1).max(1), Some(VerificationNote::PartialMatch))
    } else {
        (asserted, None)
    }
}

/// Verify each evaluation against its paper's abstract.
///
/// Evaluations whose reference does not resolve are discarded. Duplicate
/// references are verified independently.
pub fn verify_evaluations(
    evaluations: &[PaperEvaluation],
    papers: &[PaperRecord],
    policy: ClosestMatchPolicy,
) -> VerificationOutcome {
    let mut outcome = VerificationOutcome::default();

    for evaluation in evaluations {
        let Some(index) = resolve_reference(&evaluation.paper_ref, papers.len()) else {
            tracing::debug!(reference = %evaluation.paper_ref, "Discarding unresolvable paper reference");
            continue;
        };
        let paper = &papers[index - 1];
        let abstract_lower = paper.abstract_text.to_lowercase();

        let confirmed: Vec<String> = evaluation
            .evidence_quotes
            .iter()
            .filter(|q| quote_is_confirmed(q, &abstract_lower))
            .cloned()
            .collect();

        let (level, note) = apply_downgrade(
            evaluation.asserted_level,
            evaluation.evidence_quotes.len(),
            confirmed.len(),
        );
        outcome.max_level = outcome.max_level.max(level);

        if level == 0 {
            let reason = note.map(|n| n.as_str()).unwrap_or_default();
            outcome
                .system_notes
                .push(format!("Paper [P{index}] invalidated: {reason}."));
            if policy == ClosestMatchPolicy::DropInvalidated {
                continue;
            }
        }

        outcome.citations.push(VerifiedCitation {
            paper_index: index,
            pmid: paper.pmid.clone(),
            title: paper.title.clone(),
            doi: paper.doi.clone(),
            url: paper.url.clone(),
            verified_level: level,
            asserted_level: evaluation.asserted_level,
            evidence_quotes: confirmed,
            verification_note: note,
            matched_elements: evaluation.matched_elements.clone(),
            unmatched_elements: evaluation.unmatched_elements.clone(),
            difference: evaluation.difference.clone(),
        });
    }

    // Stable: equal levels keep the model's order.
    outcome
        .citations
        .sort_by(|a, b| b.verified_level.cmp(&a.verified_level));

    tracing::info!(
        evaluated = evaluations.len(),
        kept = outcome.citations.len(),
        invalidated = outcome.system_notes.len(),
        max_level = outcome.max_level,
        "Evidence verification complete"
    );

    outcome
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::UNKNOWN_YEAR;

    fn paper(pmid: &str, abstract_text: &str) -> PaperRecord {
        PaperRecord {
            pmid: pmid.into(),
            title: format!("Title {pmid}"),
            abstract_text: abstract_text.into(),
            journal: "J".into(),
            year: UNKNOWN_YEAR.into(),
            doi: None,
            url: PaperRecord::pubmed_url(pmid),
        }
    }

    fn evaluation(reference: Value, level: u8, quotes: &[&str]) -> PaperEvaluation {
        PaperEvaluation {
            paper_ref: reference,
            asserted_level: level,
            matched_elements: "condition".into(),
            unmatched_elements: "N/A".into(),
            difference: "N/A".into(),
            evidence_quotes: quotes.iter().map(|q| q.to_string()).collect(),
        }
    }

    const ABSTRACT: &str = "A 54-year-old man developed severe bronchospasm after sugammadex \
                            administration during emergence from general anesthesia.";

    #[test]
    fn references_resolve_from_many_shapes() {
        assert_eq!(resolve_reference(&json!(3), 5), Some(3));
        assert_eq!(resolve_reference(&json!("P3"), 5), Some(3));
        assert_eq!(resolve_reference(&json!("[P3]"), 5), Some(3));
        assert_eq!(resolve_reference(&json!("Paper 3"), 5), Some(3));
        assert_eq!(resolve_reference(&json!(0), 5), None);
        assert_eq!(resolve_reference(&json!("P6"), 5), None);
        assert_eq!(resolve_reference(&json!("none"), 5), None);
        assert_eq!(resolve_reference(&Value::Null, 5), None);
    }

    #[test]
    fn quote_normalization() {
        assert_eq!(normalize_quote("  \"Severe Bronchospasm\" "), "severe bronchospasm");
        assert_eq!(normalize_quote("\u{201C}after sugammadex\u{201D}"), "after sugammadex");
        assert!(quote_is_confirmed("\"SEVERE BRONCHOSPASM\"", &ABSTRACT.to_lowercase()));
        // five characters or fewer never confirm
        assert!(!quote_is_confirmed("man d", &ABSTRACT.to_lowercase()));
    }

    #[test]
    fn partial_confirmation_costs_one_level() {
        let papers = vec![paper("1", ABSTRACT)];
        let evals = vec![evaluation(
            json!(1),
            4,
            &["severe bronchospasm after sugammadex", "refractory to epinephrine"],
        )];

        let outcome = verify_evaluations(&evals, &papers, ClosestMatchPolicy::DropInvalidated);

        let cite = &outcome.citations[0];
        assert_eq!(cite.verified_level, 3);
        assert_eq!(cite.verification_note, Some(VerificationNote::PartialMatch));
        assert_eq!(cite.verification_note.unwrap().as_str(), "partial evidence match");
        assert_eq!(cite.evidence_quotes, vec!["severe bronchospasm after sugammadex"]);
        assert_eq!(outcome.max_level, 3);
    }

    #[test]
    fn zero_quotations_cap_at_level_one() {
        let papers = vec![paper("1", ABSTRACT)];
        let evals = vec![evaluation(json!("P1"), 4, &[])];

        let outcome = verify_evaluations(&evals, &papers, ClosestMatchPolicy::DropInvalidated);

        assert_eq!(outcome.citations[0].verified_level, 1);
        assert_eq!(
            outcome.citations[0].verification_note,
            Some(VerificationNote::NoEvidence)
        );
        assert_eq!(outcome.max_level, 1);
    }

    #[test]
    fn full_fabrication_is_voided_and_excluded_from_max() {
        let papers = vec![paper("1", ABSTRACT), paper("2", "Unrelated pediatric dental case.")];
        let evals = vec![
            evaluation(json!(1), 2, &["severe bronchospasm after sugammadex"]),
            evaluation(json!(2), 3, &["bronchospasm after sugammadex", "during emergence"]),
        ];

        let outcome = verify_evaluations(&evals, &papers, ClosestMatchPolicy::DropInvalidated);

        assert_eq!(outcome.citations.len(), 1);
        assert_eq!(outcome.citations[0].pmid, "1");
        assert_eq!(outcome.max_level, 2);
        assert_eq!(
            outcome.system_notes,
            vec!["Paper [P2] invalidated: hallucinated evidence invalidated."]
        );
    }

    #[test]
    fn blank_quotation_counts_against_the_claim() {
        let papers = vec![paper("1", ABSTRACT), paper("2", ABSTRACT)];
        let evals = vec![
            evaluation(json!(1), 4, &["severe bronchospasm", ""]),
            evaluation(json!(2), 3, &["   "]),
        ];

        let outcome = verify_evaluations(&evals, &papers, ClosestMatchPolicy::DropInvalidated);

        assert_eq!(outcome.citations.len(), 1);
        assert_eq!(outcome.citations[0].verified_level, 3);
        assert_eq!(
            outcome.citations[0].verification_note,
            Some(VerificationNote::PartialMatch)
        );
        assert_eq!(outcome.max_level, 3);
        assert_eq!(
            outcome.system_notes,
            vec!["Paper [P2] invalidated: hallucinated evidence invalidated."]
        );
    }

    #[test]
    fn non_string_quotation_from_the_model_is_unconfirmed() {
        let report = crate::pipeline::llm::schema::read_evaluation(&json!({
            "paper_evaluations": [
                {"paper_id": 1, "match_level": 4, "evidence_quotes": ["severe bronchospasm", 5, null]}
            ]
        }));
        let papers = vec![paper("1", ABSTRACT)];

        let outcome =
            verify_evaluations(&report.evaluations, &papers, ClosestMatchPolicy::DropInvalidated);

        assert_eq!(outcome.citations[0].verified_level, 3);
        assert_eq!(outcome.citations[0].evidence_quotes, vec!["severe bronchospasm"]);
        assert_eq!(outcome.max_level, 3);
    }

    #[test]
    fn retained_invalidated_matches_stay_at_level_zero() {
        let papers = vec![paper("1", ABSTRACT)];
        let evals = vec![evaluation(json!(1), 3, &["completely invented sentence"])];

        let outcome = verify_evaluations(&evals, &papers, ClosestMatchPolicy::RetainInvalidated);

        assert_eq!(outcome.citations.len(), 1);
        assert_eq!(outcome.citations[0].verified_level, 0);
        assert!(outcome.citations[0].evidence_quotes.is_empty());
        assert_eq!(outcome.max_level, 0);
        assert_eq!(outcome.system_notes.len(), 1);
    }

    #[test]
    fn verified_level_never_exceeds_asserted() {
        for asserted in 1..=4u8 {
            for total in 0..=3usize {
                for confirmed in 0..=total {
                    let (level, _) = apply_downgrade(asserted, total, confirmed);
                    assert!(level <= asserted, "{asserted}/{total}/{confirmed} -> {level}");
                }
            }
        }
        // out-of-range assertions are clamped first
        assert_eq!(apply_downgrade(9, 1, 1), (4, None));
    }

    #[test]
    fn missing_abstract_never_confirms() {
        let papers = vec![paper("1", "")];
        let evals = vec![evaluation(json!(1), 4, &["No abstract available"])];

        let outcome = verify_evaluations(&evals, &papers, ClosestMatchPolicy::DropInvalidated);

        assert!(outcome.citations.is_empty());
        assert_eq!(outcome.max_level, 0);
    }

    #[test]
    fn unresolvable_references_are_discarded_and_sort_is_stable() {
        let papers = vec![paper("1", ABSTRACT), paper("2", ABSTRACT), paper("3", ABSTRACT)];
        let quote = ["severe bronchospasm"];
        let evals = vec![
            evaluation(json!(2), 2, &quote),
            evaluation(json!("P9"), 4, &quote),
            evaluation(json!(3), 4, &quote),
            evaluation(json!(1), 2, &quote),
        ];

        let outcome = verify_evaluations(&evals, &papers, ClosestMatchPolicy::DropInvalidated);

        let order: Vec<&str> = outcome.citations.iter().map(|c| c.pmid.as_str()).collect();
        assert_eq!(order, vec!["3", "2", "1"]);
        assert_eq!(outcome.max_level, 4);
    }
}
