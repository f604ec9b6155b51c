use chrono::Utc;
use tracing::Instrument;

use super::context::RunContext;
use super::literature::{LiteratureSource, VocabularyLookup};
use super::llm::prompt::{evaluation_request, narrative_request, pre_analysis_request};
use super::llm::schema::{read_evaluation, read_narrative, read_pre_analysis, PreAnalysis};
use super::llm::{extract_json, LlmGenerate, ModelResponse};
use super::query::{compile_query, gather_candidates, validate_blocks};
use super::types::{AnalysisResult, NarrativeSummary};
use super::verify::{rewrite_references, verdict_for_level, verify_evaluations, VerificationOutcome};
use super::AnalysisError;
use crate::models::{CaseInput, SearchCore};
use crate::pipeline_config::PipelineConfig;

const NO_LITERATURE_REASONING: &str = "Detailed analysis could not be performed because no relevant papers were found in PubMed matching the generated search queries. This suggests the case is likely novel (High Priority) or the search terms were too specific.";

/// Full screening pipeline.
///
/// Coordinates: pre-analysis → vocabulary validation → query escalation →
/// candidate gathering → detail fetch → evaluation → evidence verification →
/// scoring → reference rewriting → narrative.
pub struct NoveltyPipeline<G: LlmGenerate, S: LiteratureSource, V: VocabularyLookup> {
    generator: G,
    source: S,
    vocabulary: V,
    config: PipelineConfig,
}

impl<G: LlmGenerate, S: LiteratureSource, V: VocabularyLookup> NoveltyPipeline<G, S, V> {
    pub fn new(generator: G, source: S, vocabulary: V, config: PipelineConfig) -> Self {
        Self {
            generator,
            source,
            vocabulary,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analyze one case. Each call gets a fresh run context.
    pub async fn run(&self, case: &CaseInput) -> Result<AnalysisResult, AnalysisError> {
        if case.is_blank() {
            return Err(AnalysisError::InvalidInput(
                "no case attributes were provided".into(),
            ));
        }

        let ctx = RunContext::new(case.contact_email());
        let span = tracing::info_span!("analysis", run_id = %ctx.run_id);
        self.execute(case, ctx).instrument(span).await
    }

    async fn execute(
        &self,
        case: &CaseInput,
        mut ctx: RunContext,
    ) -> Result<AnalysisResult, AnalysisError> {
        // Step 1: reconstruction, search core and query blocks
        let pre = self.pre_analysis(case).await?;
        tracing::info!(blocks = pre.blocks.len(), "Pre-analysis complete");

        // Step 2: vocabulary validation and query escalation
        let blocks = validate_blocks(&pre.blocks, &self.vocabulary, &mut ctx.vocabulary).await;
        let query = compile_query(&blocks, &self.config.escalation, &self.source)
            .await
            .ok_or(AnalysisError::EmptyQuery)?;

        // Step 3: candidates and records
        let pool = gather_candidates(&self.source, &query, &self.config.candidates).await?;
        let papers = self.source.fetch_details(&pool.ids).await?;
        tracing::info!(
            requested = pool.ids.len(),
            fetched = papers.len(),
            "Fetched paper details"
        );

        let PreAnalysis {
            reconstruction,
            search_core,
            ..
        } = pre;

        if papers.is_empty() {
            tracing::warn!("No literature found, skipping evaluation");
            let verdict = verdict_for_level(0);
            return Ok(AnalysisResult {
                run_id: ctx.run_id,
                reconstruction,
                search_core,
                query_blocks: blocks,
                query,
                candidate_count: pool.ids.len(),
                fetched_count: 0,
                max_level: 0,
                asserted_max_level: None,
                score: verdict.score,
                judgement: verdict.judgement,
                reasoning: NO_LITERATURE_REASONING.to_string(),
                citations: Vec::new(),
                system_notes: Vec::new(),
                narrative: None,
                completed_at: Utc::now(),
            });
        }

        // Step 4: evaluation, untrusted until verified
        let text = self
            .generator
            .generate(&evaluation_request(&search_core, &papers))
            .await?;
        let report = extract_json(&text)
            .map(|value| read_evaluation(&value))
            .into_result()
            .map_err(AnalysisError::ResponseParse)?;

        // Step 5: verification and scoring
        let outcome = verify_evaluations(&report.evaluations, &papers, self.config.closest_match);
        let verdict = verdict_for_level(outcome.max_level);
        if report.asserted_max_level != outcome.max_level {
            tracing::info!(
                asserted = report.asserted_max_level,
                verified = outcome.max_level,
                "Model level claim corrected by verification"
            );
        }

        let mut reasoning = rewrite_references(&report.reasoning, &papers).text;
        if !outcome.system_notes.is_empty() {
            reasoning.push_str(&format!(
                "\n\n[System Verification Note: {}]",
                outcome.system_notes.join(" ")
            ));
        }

        // Step 6: narrative from verified data only
        let narrative = if self.config.narrative_enabled {
            self.narrative(&search_core, &outcome).await
        } else {
            None
        };

        tracing::info!(
            score = verdict.score,
            judgement = verdict.judgement.as_str(),
            "Analysis complete"
        );

        Ok(AnalysisResult {
            run_id: ctx.run_id,
            reconstruction,
            search_core,
            query_blocks: blocks,
            query,
            candidate_count: pool.ids.len(),
            fetched_count: papers.len(),
            max_level: outcome.max_level,
            asserted_max_level: Some(report.asserted_max_level),
            score: verdict.score,
            judgement: verdict.judgement,
            reasoning,
            citations: outcome.citations,
            system_notes: outcome.system_notes,
            narrative,
            completed_at: Utc::now(),
        })
    }

    async fn pre_analysis(&self, case: &CaseInput) -> Result<PreAnalysis, AnalysisError> {
        let text = self.generator.generate(&pre_analysis_request(case)).await?;
        extract_json(&text)
            .map(|value| read_pre_analysis(&value))
            .into_result()
            .map_err(AnalysisError::ResponseParse)
    }

    /// Soft step: any failure is logged and the narrative omitted.
    async fn narrative(
        &self,
        core: &SearchCore,
        outcome: &VerificationOutcome,
    ) -> Option<NarrativeSummary> {
        let request = narrative_request(core, outcome.max_level, &outcome.citations);
        let text = match self.generator.generate(&request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Narrative generation failed");
                return None;
            }
        };

        match extract_json(&text) {
            ModelResponse::Parsed(value) => Some(read_narrative(&value)),
            ModelResponse::ParseFailure(reason) => {
                tracing::warn!(reason = %reason, "Narrative response unreadable");
                None
            }
        }
    }
}
