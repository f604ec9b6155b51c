use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One paper assessment as claimed by the model. Nothing here is trusted
/// until it has been checked against the retrieved abstract.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperEvaluation {
    /// The model's paper reference exactly as it appeared (`3`, `"P3"`, ...).
    pub paper_ref: Value,
    /// Asserted match level, already clamped into 1..=4.
    pub asserted_level: u8,
    pub matched_elements: String,
    pub unmatched_elements: String,
    pub difference: String,
    pub evidence_quotes: Vec<String>,
}

/// Why a verified level differs from the asserted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationNote {
    #[serde(rename = "no evidence provided")]
    NoEvidence,
    #[serde(rename = "hallucinated evidence invalidated")]
    Hallucinated,
    #[serde(rename = "partial evidence match")]
    PartialMatch,
}

impl VerificationNote {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoEvidence => "no evidence provided",
            Self::Hallucinated => "hallucinated evidence invalidated",
            Self::PartialMatch => "partial evidence match",
        }
    }
}

impl std::fmt::Display for VerificationNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A paper assessment after evidence verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedCitation {
    /// 1-based position of the paper in the evaluation prompt.
    pub paper_index: usize,
    pub pmid: String,
    pub title: String,
    pub doi: Option<String>,
    pub url: String,
    pub verified_level: u8,
    pub asserted_level: u8,
    /// Only quotations found in the abstract, as the model wrote them.
    pub evidence_quotes: Vec<String>,
    pub verification_note: Option<VerificationNote>,
    pub matched_elements: String,
    pub unmatched_elements: String,
    pub difference: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationOutcome {
    /// Sorted by verified level, highest first.
    pub citations: Vec<VerifiedCitation>,
    /// Highest verified level, 0 when nothing survived.
    pub max_level: u8,
    pub system_notes: Vec<String>,
}
