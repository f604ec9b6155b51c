use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CattoReconstruction, Judgement, SearchCore};
use crate::pipeline::query::{CompiledQuery, ValidatedBlock};
use crate::pipeline::verify::VerifiedCitation;

/// Knowledge-gap statement and suggestions derived from verified data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeSummary {
    pub knowledge_gap: String,
    pub novelty_sharpeners: Vec<String>,
}

/// Everything one analysis run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub run_id: Uuid,
    pub reconstruction: CattoReconstruction,
    pub search_core: SearchCore,
    pub query_blocks: Vec<ValidatedBlock>,
    pub query: CompiledQuery,
    /// Identifiers sent to detail fetch.
    pub candidate_count: usize,
    /// Records actually retrieved.
    pub fetched_count: usize,
    /// Highest verified match level; drives the score.
    pub max_level: u8,
    /// The model's own claim, for audit only. `None` when evaluation was skipped.
    pub asserted_max_level: Option<u8>,
    pub score: u8,
    pub judgement: Judgement,
    /// Reasoning with references rewritten and verification notes appended.
    pub reasoning: String,
    pub citations: Vec<VerifiedCitation>,
    pub system_notes: Vec<String>,
    pub narrative: Option<NarrativeSummary>,
    pub completed_at: DateTime<Utc>,
}
