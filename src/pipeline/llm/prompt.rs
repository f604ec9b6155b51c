use serde_json::json;

use super::types::LlmRequest;
use crate::models::{CaseInput, PaperRecord, SearchCore};
use crate::pipeline::verify::VerifiedCitation;

pub const PRE_ANALYSIS_SYSTEM_PROMPT: &str = r#"You are an expert anesthesiologist and clinical researcher helping an author decide whether a case report is novel.
Work only from the case data you are given. Output a single JSON object and nothing else."#;

pub const EVALUATION_SYSTEM_PROMPT: &str = r#"You are an expert anesthesiologist comparing a case against retrieved literature.
Refer to papers ONLY by their identifiers ([P1], [P2], ...). Every claim about a paper must be backed by text copied verbatim from its abstract.
Output a single JSON object and nothing else."#;

pub const NARRATIVE_SYSTEM_PROMPT: &str = r#"You are an experienced case-report editor.
Use only the verified evidence you are given; do not introduce papers or facts that are not listed.
Output a single JSON object and nothing else."#;

const PRE_ANALYSIS_INSTRUCTIONS: &str = r#"STEP 1: CATTO Reconstruction
Restate the case as a standardized definition (condition/event, anatomy, trigger/exposure, timing, host factors, key findings, management/outcome).

STEP 2: Search Core
Define the Search Core: the mandatory concept, the structural (anatomical) concept, the contextual trigger and any modifier.

STEP 3: Query Blocks
Split the Search Core into 2-4 concept blocks in order of importance (most essential first).
For each block propose candidate MeSH descriptor names (plain names, no field tags) and free-text synonyms.

OUTPUT JSON FORMAT:
{
  "reconstructed_catto": {
    "condition_event": "...",
    "anatomy": "...",
    "trigger_exposure": "...",
    "timing": "...",
    "host_factors": "...",
    "key_findings": "...",
    "management_outcome": "..."
  },
  "search_core": {
    "mandatory": "...",
    "structural": "...",
    "contextual": "...",
    "modifier": "..."
  },
  "query_blocks": [
    { "concept": "Condition/Event", "mesh_terms": ["..."], "free_text_terms": ["..."] }
  ]
}"#;

const EVALUATION_INSTRUCTIONS: &str = r#"STEP 4: CATTO Level Evaluation
Evaluate each relevant paper's match level (1-4):
- Level 1: Condition/Event matches: the abstract describes the same condition or event.
- Level 2: + Anatomy matches.
- Level 3: + Trigger/Exposure matches.
- Level 4: + Timing matches (induction, maintenance, emergence, post-operative phase).

STEP 5: Novelty Assessment
Report "max_level_found" (integer 0-4), the highest match level found (0 means no match).

STEP 6: Quick Literature Check
Return "paper_evaluations" for the papers that support your assessment.

EVIDENCE RULES:
- "evidence_quotes": 1-2 short phrases COPIED VERBATIM from that paper's abstract, 20-120 characters each.
- No paraphrasing. Quotes are checked by exact substring match.
- If no direct evidence exists, return an empty array [].
- Do not assign level 3-4 without clear quoted evidence.

OUTPUT JSON FORMAT:
{
  "max_level_found": 0,
  "judgement": "High | Moderate | Low",
  "paper_evaluations": [
    {
      "paper_id": 1,
      "match_level": 1,
      "matched_elements": "...",
      "unmatched_elements": "...",
      "difference": "...",
      "evidence_quotes": ["..."]
    }
  ],
  "reasoning_with_ids": "Explain the level. Cite papers as [P1], [P2], ..."
}"#;

const NARRATIVE_INSTRUCTIONS: &str = r#"Based only on the verified literature above:
1. "knowledge_gap": describe in 2-4 sentences what this case adds that the listed literature does not cover.
2. "novelty_sharpeners": 2-5 concrete suggestions (data to report, comparisons to draw) that would make the report's novelty clearer.

OUTPUT JSON FORMAT:
{
  "knowledge_gap": "...",
  "novelty_sharpeners": ["..."]
}"#;

/// Clinical fields only; the contact address never reaches the model.
fn case_json(case: &CaseInput) -> String {
    let value = json!({
        "main_event_1line": case.main_event_1line,
        "condition_event": case.condition_event,
        "anatomy": case.anatomy,
        "trigger_exposure": case.trigger_exposure,
        "timing": case.timing,
        "host_factors": case.host_factors,
        "key_findings": case.key_findings,
        "management_outcome": case.management_outcome,
        "novelty_differences": case.novelty_differences,
    });
    format!("{value:#}")
}

fn search_core_json(core: &SearchCore) -> String {
    let value = json!({
        "mandatory": core.mandatory,
        "structural": core.structural,
        "contextual": core.contextual,
        "modifier": core.modifier,
    });
    format!("{value:#}")
}

/// Papers as `[P<n>] Title: ... Abstract: ...`, numbered from 1.
pub fn format_papers(papers: &[PaperRecord]) -> String {
    papers
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "[P{}] Title: {}\nAbstract: {}",
                i + 1,
                p.title,
                p.display_abstract()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn pre_analysis_request(case: &CaseInput) -> LlmRequest {
    let prompt = format!(
        "INPUT DATA:\n{}\n\n{PRE_ANALYSIS_INSTRUCTIONS}",
        case_json(case)
    );
    LlmRequest::json(PRE_ANALYSIS_SYSTEM_PROMPT, prompt)
}

pub fn evaluation_request(core: &SearchCore, papers: &[PaperRecord]) -> LlmRequest {
    let prompt = format!(
        "SEARCH CORE:\n{}\n\nRETRIEVED PAPERS:\n{}\n\n{EVALUATION_INSTRUCTIONS}",
        search_core_json(core),
        format_papers(papers)
    );
    LlmRequest::json(EVALUATION_SYSTEM_PROMPT, prompt)
}

/// Narrative prompt built from verified data only.
pub fn narrative_request(
    core: &SearchCore,
    max_level: u8,
    citations: &[VerifiedCitation],
) -> LlmRequest {
    let mut prompt = format!(
        "SEARCH CORE:\n{}\n\nVERIFIED MAX MATCH LEVEL: {max_level}\n\nVERIFIED LITERATURE:\n",
        search_core_json(core)
    );

    let kept: Vec<&VerifiedCitation> = citations.iter().filter(|c| c.verified_level > 0).collect();
    if kept.is_empty() {
        prompt.push_str("(no literature survived verification)\n");
    }
    for cite in kept {
        prompt.push_str(&format!(
            "- {} (PMID: {}), level {}\n  Matched: {}\n  Unmatched: {}\n  Difference: {}\n",
            cite.title,
            cite.pmid,
            cite.verified_level,
            cite.matched_elements,
            cite.unmatched_elements,
            cite.difference
        ));
        for quote in &cite.evidence_quotes {
            prompt.push_str(&format!("  Evidence: \"{quote}\"\n"));
        }
    }

    prompt.push('\n');
    prompt.push_str(NARRATIVE_INSTRUCTIONS);
    LlmRequest::json(NARRATIVE_SYSTEM_PROMPT, prompt)
}
