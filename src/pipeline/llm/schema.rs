//! Lenient readers for the three model response schemas.
//!
//! Missing or mistyped fields fall back to defaults instead of failing the
//! run; only a response that is not JSON at all is an error (see
//! `json_extract`).

use serde_json::{Map, Value};

use crate::models::{CattoReconstruction, SearchCore, NOT_AVAILABLE};
use crate::pipeline::query::QueryBlock;
use crate::pipeline::types::NarrativeSummary;
use crate::pipeline::verify::PaperEvaluation;

/// Output of the pre-analysis call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreAnalysis {
    pub reconstruction: CattoReconstruction,
    pub search_core: SearchCore,
    pub blocks: Vec<QueryBlock>,
}

/// Output of the evaluation call, before any verification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationReport {
    /// The model's own max level claim, kept for audit only.
    pub asserted_max_level: u8,
    pub evaluations: Vec<PaperEvaluation>,
    pub reasoning: String,
}

// ═══════════════════════════════════════════════════════════
// Field helpers
// ═══════════════════════════════════════════════════════════

fn object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object)
}

/// Scalar as text; `None` for empty strings, null, arrays and objects.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_or_na(map: Option<&Map<String, Value>>, key: &str) -> String {
    scalar_text(map.and_then(|m| m.get(key))).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// A string or an array of strings; other members are dropped.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Every asserted quotation, kept verbatim so the verifier counts it.
/// Blank and non-string members stay in as text that can never be confirmed.
fn quote_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| map.get(*k).filter(|v| !v.is_null()))
}

/// Integer from a number or a numeric string.
fn integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════
// Readers
// ═══════════════════════════════════════════════════════════

pub fn read_pre_analysis(value: &Value) -> PreAnalysis {
    let catto = object(value.get("reconstructed_catto"));
    let core = object(value.get("search_core"));

    let raw_blocks = value
        .get("query_blocks")
        .or_else(|| value.get("pubmed_query").and_then(|q| q.get("blocks")))
        .and_then(Value::as_array);

    let blocks = raw_blocks
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .enumerate()
                .map(|(i, block)| read_block(block, i + 1))
                .collect()
        })
        .unwrap_or_default();

    PreAnalysis {
        reconstruction: CattoReconstruction {
            condition_event: text_or_na(catto, "condition_event"),
            anatomy: text_or_na(catto, "anatomy"),
            trigger_exposure: text_or_na(catto, "trigger_exposure"),
            timing: text_or_na(catto, "timing"),
            host_factors: text_or_na(catto, "host_factors"),
            key_findings: text_or_na(catto, "key_findings"),
            management_outcome: text_or_na(catto, "management_outcome"),
        },
        search_core: SearchCore {
            mandatory: text_or_na(core, "mandatory"),
            structural: text_or_na(core, "structural"),
            contextual: text_or_na(core, "contextual"),
            modifier: text_or_na(core, "modifier"),
        },
        blocks,
    }
}

fn read_block(block: &Map<String, Value>, position: usize) -> QueryBlock {
    QueryBlock {
        concept: scalar_text(first_present(block, &["concept", "label"]))
            .unwrap_or_else(|| format!("Block {position}")),
        mesh_terms: string_list(first_present(block, &["mesh_terms", "mesh"])),
        free_text_terms: string_list(first_present(block, &["free_text_terms", "free_text"])),
    }
}

pub fn read_evaluation(value: &Value) -> EvaluationReport {
    let evaluations: Vec<PaperEvaluation> = value
        .get("paper_evaluations")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).map(read_paper_evaluation).collect())
        .unwrap_or_default();

    let asserted_max_level = integer(value.get("max_level_found"))
        .map(|n| n.clamp(0, 4) as u8)
        .unwrap_or_else(|| evaluations.iter().map(|e| e.asserted_level).max().unwrap_or(0));

    let reasoning = scalar_text(value.get("reasoning_with_ids"))
        .or_else(|| scalar_text(value.get("reasoning")))
        .unwrap_or_default();

    EvaluationReport {
        asserted_max_level,
        evaluations,
        reasoning,
    }
}

fn read_paper_evaluation(item: &Map<String, Value>) -> PaperEvaluation {
    let map = Some(item);
    PaperEvaluation {
        paper_ref: first_present(item, &["paper_id", "paper_ref", "id"])
            .cloned()
            .unwrap_or(Value::Null),
        asserted_level: integer(item.get("match_level")).unwrap_or(1).clamp(1, 4) as u8,
        matched_elements: text_or_na(map, "matched_elements"),
        unmatched_elements: text_or_na(map, "unmatched_elements"),
        difference: text_or_na(map, "difference"),
        evidence_quotes: quote_list(item.get("evidence_quotes")),
    }
}

pub fn read_narrative(value: &Value) -> NarrativeSummary {
    NarrativeSummary {
        knowledge_gap: scalar_text(value.get("knowledge_gap")).unwrap_or_default(),
        novelty_sharpeners: string_list(value.get("novelty_sharpeners")),
    }
}
