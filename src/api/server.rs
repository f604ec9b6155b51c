//! HTTP server lifecycle: bind, serve the screening router, stop on Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::router::api_router;
use crate::pipeline::literature::{LiteratureSource, VocabularyLookup};
use crate::pipeline::llm::LlmGenerate;
use crate::pipeline::NoveltyPipeline;

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Bind `addr` and serve until the process receives Ctrl-C.
pub async fn serve<G, S, V>(
    pipeline: Arc<NoveltyPipeline<G, S, V>>,
    addr: SocketAddr,
) -> Result<(), String>
where
    G: LlmGenerate + 'static,
    S: LiteratureSource + 'static,
    V: VocabularyLookup + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind API server on {addr}: {e}"))?;

    let local = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let app = api_router(pipeline);

    tracing::info!(addr = %local, "Screening API server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("API server error: {e}"))?;

    tracing::info!("Screening API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Screening API server received shutdown signal");
}
