//! Screening API router.
//!
//! Returns a composable `Router` with routes under `/api/`. The pipeline is
//! shared across requests through an `Arc`; every request gets its own run.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::error::ApiError;
use crate::models::CaseInput;
use crate::pipeline::literature::{LiteratureSource, VocabularyLookup};
use crate::pipeline::llm::LlmGenerate;
use crate::pipeline::{AnalysisResult, EmailDraft, NoveltyPipeline};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub result: AnalysisResult,
    pub email: EmailDraft,
    pub mailto: String,
}

/// Build the screening API router.
///
/// CORS is permissive so a static submission form on any origin can post.
pub fn api_router<G, S, V>(pipeline: Arc<NoveltyPipeline<G, S, V>>) -> Router
where
    G: LlmGenerate + 'static,
    S: LiteratureSource + 'static,
    V: VocabularyLookup + 'static,
{
    let routes = Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze::<G, S, V>))
        .with_state(pipeline);

    Router::new()
        .nest("/api", routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// `GET /api/health`
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
    })
}

/// `POST /api/analyze`: run one screening and return the result with its email draft.
async fn analyze<G, S, V>(
    State(pipeline): State<Arc<NoveltyPipeline<G, S, V>>>,
    payload: Result<Json<CaseInput>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError>
where
    G: LlmGenerate + 'static,
    S: LiteratureSource + 'static,
    V: VocabularyLookup + 'static,
{
    let Json(case) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let result = pipeline.run(&case).await?;
    let email = EmailDraft::from_analysis(&result, &case);
    let mailto = email.mailto_link();

    tracing::info!(
        run_id = %result.run_id,
        score = result.score,
        citations = result.citations.len(),
        "Analysis served"
    );

    Ok(Json(AnalyzeResponse {
        result,
        email,
        mailto,
    }))
}
