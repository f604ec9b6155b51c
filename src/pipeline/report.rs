//! Plain-text email draft of an analysis, addressed to the submitting author.

use std::fmt::Write as _;

use serde::Serialize;
use url::form_urlencoded::byte_serialize;

use super::types::AnalysisResult;
use crate::models::{CaseInput, QueryStrength};

const RULE: &str = "----------------------------------------";
const BANNER: &str = "========================================";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailDraft {
    /// `None` when the case carried no usable contact address.
    pub to: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Percent-encode for a mailto URI; spaces become `%20`, not `+`.
fn mailto_encode(text: &str) -> String {
    byte_serialize(text.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl EmailDraft {
    /// Build the draft from the result and the submitted case only.
    pub fn from_analysis(result: &AnalysisResult, case: &CaseInput) -> Self {
        let subject = format!(
            "Case report screening result: {} Priority (Novelty {}%)",
            result.judgement, result.score
        );

        Self {
            to: case.contact_email().map(str::to_string),
            subject,
            body: render_body(result, case),
        }
    }

    pub fn mailto_link(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.to.as_deref().unwrap_or_default(),
            mailto_encode(&self.subject),
            mailto_encode(&self.body)
        )
    }
}

fn section(body: &mut String, title: &str) {
    let _ = write!(body, "\n[{title}]\n{RULE}\n");
}

fn render_body(result: &AnalysisResult, case: &CaseInput) -> String {
    let mut body = String::new();

    let _ = writeln!(body, "{BANNER}\nCase Report Analysis\n{BANNER}");

    section(&mut body, "Judgement");
    let _ = writeln!(body, "Priority: {}", result.judgement);
    let _ = writeln!(
        body,
        "Novelty Score: {}% (based on CATTO level {})",
        result.score, result.max_level
    );

    section(&mut body, "Reasoning");
    let _ = writeln!(body, "{}", result.reasoning);

    section(&mut body, "Search Query");
    let _ = writeln!(body, "{}", result.query.chosen);
    let _ = writeln!(
        body,
        "({} query, {} hits)",
        result.query.strength,
        match result.query.strength {
            QueryStrength::Narrow => result.query.narrow_count,
            QueryStrength::Broad => result.query.broad_count,
        }
    );

    section(&mut body, "Quick Literature Check");
    if result.fetched_count == 0 {
        let _ = writeln!(body, "PubMed returned no literature for verification.");
    }
    if result.citations.is_empty() {
        let _ = writeln!(body, "No specific papers found.");
    }
    for (i, cite) in result.citations.iter().enumerate() {
        let _ = writeln!(body, "[{}] {}", i + 1, cite.title);
        let _ = writeln!(body, "    PMID: {}", cite.pmid);
        if let Some(doi) = &cite.doi {
            let _ = writeln!(body, "    DOI: {doi}");
        }
        if !cite.evidence_quotes.is_empty() {
            let _ = writeln!(body, "    Evidence: \"{}\"", cite.evidence_quotes.join("\", \""));
        }
        let _ = writeln!(body, "    Matched Elements: {}", cite.matched_elements);
        let _ = writeln!(body, "    Unmatched Elements: {}", cite.unmatched_elements);
        let _ = writeln!(body, "    Difference: {}", cite.difference);
        if let Some(note) = cite.verification_note {
            let _ = writeln!(body, "    Verification: {note}");
        }
        body.push('\n');
    }

    if let Some(narrative) = &result.narrative {
        section(&mut body, "Knowledge Gap");
        let _ = writeln!(body, "{}", narrative.knowledge_gap);
        if !narrative.novelty_sharpeners.is_empty() {
            let _ = writeln!(body, "\nNovelty sharpeners:");
            for item in &narrative.novelty_sharpeners {
                let _ = writeln!(body, "- {item}");
            }
        }
    }

    section(&mut body, "Submitted CATTO Data");
    for ((label, value), letter) in case.attributes().iter().zip('A'..) {
        let _ = writeln!(body, "{letter}. {label}:\n{}\n", value.trim());
    }

    body.trim().to_string()
}
