use serde::{Deserialize, Serialize};

/// Year recorded when neither the structured nor the free-form date has one.
pub const UNKNOWN_YEAR: &str = "unknown";

/// Shown to the model in place of a missing abstract.
pub const NO_ABSTRACT: &str = "No abstract available";

/// Canonical literature record, normalized from the citation database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub pmid: String,
    pub title: String,
    /// Empty when the record has no abstract.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub journal: String,
    pub year: String,
    pub doi: Option<String>,
    pub url: String,
}

impl PaperRecord {
    pub fn pubmed_url(pmid: &str) -> String {
        format!("https://pubmed.ncbi.nlm.nih.gov/{pmid}/")
    }

    /// Abstract text as presented in prompts.
    pub fn display_abstract(&self) -> &str {
        if self.abstract_text.trim().is_empty() {
            NO_ABSTRACT
        } else {
            &self.abstract_text
        }
    }
}
