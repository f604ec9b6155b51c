pub mod api;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod pipeline_config;

use tracing_subscriber::EnvFilter;

use config::AppConfig;
use pipeline::literature::{MeshClient, PubMedClient};
use pipeline::llm::LlmBackend;
use pipeline::NoveltyPipeline;

/// The pipeline wired to live HTTP services.
pub type DefaultPipeline = NoveltyPipeline<LlmBackend, PubMedClient, MeshClient>;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Build the live pipeline from configuration.
pub fn build_pipeline(config: &AppConfig) -> Result<DefaultPipeline, String> {
    let timeout = config.http_timeout_secs;

    let generator = LlmBackend::from_settings(&config.llm, timeout)
        .map_err(|e| format!("Model backend: {e}"))?;
    let source = PubMedClient::new(&config.pubmed, timeout)
        .map_err(|e| format!("PubMed client: {e}"))?;
    let vocabulary = MeshClient::new(&config.mesh_base_url, timeout)
        .map_err(|e| format!("MeSH client: {e}"))?;

    tracing::info!(
        backend = generator.name(),
        pubmed = %config.pubmed.base_url,
        "Pipeline configured"
    );

    Ok(NoveltyPipeline::new(
        generator,
        source,
        vocabulary,
        config.pipeline.clone(),
    ))
}
