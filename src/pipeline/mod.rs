pub mod context;
pub mod literature;
pub mod llm;
pub mod orchestrator;
pub mod query;
pub mod report;
pub mod types;
pub mod verify;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::NoveltyPipeline;
pub use report::EmailDraft;
pub use types::{AnalysisResult, NarrativeSummary};

use thiserror::Error;

use literature::SourceError;
use llm::LlmError;

/// Hard failures that abort an analysis run. Soft failures (expansion,
/// vocabulary lookups, counts, the narrative step) never surface here.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Model response could not be read: {0}")]
    ResponseParse(String),

    #[error("Citation database unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Model service unavailable: {0}")]
    ModelUnavailable(String),

    #[error("No usable search terms were produced")]
    EmptyQuery,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AnalysisError {
    /// Message suitable for showing to the author.
    pub fn user_message(&self) -> String {
        match self {
            Self::ResponseParse(_) => {
                "The AI response could not be understood. Please try again.".to_string()
            }
            Self::SourceUnavailable(_) => {
                "PubMed could not be reached. Please try again in a moment.".to_string()
            }
            Self::ModelUnavailable(_) => {
                "The AI model could not be reached. Please try again in a moment.".to_string()
            }
            Self::EmptyQuery => {
                "No usable search terms could be derived from the case. Please add detail and resubmit."
                    .to_string()
            }
            Self::InvalidInput(detail) => format!("The case could not be analyzed: {detail}"),
        }
    }

    /// True when resubmitting the same case may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidInput(_))
    }
}

impl From<SourceError> for AnalysisError {
    fn from(e: SourceError) -> Self {
        Self::SourceUnavailable(e.to_string())
    }
}

impl From<LlmError> for AnalysisError {
    fn from(e: LlmError) -> Self {
        Self::ModelUnavailable(e.to_string())
    }
}
