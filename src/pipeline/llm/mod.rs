pub mod backend;
pub mod gemini;
pub mod json_extract;
pub mod ollama;
pub mod prompt;
pub mod schema;
pub mod types;

pub use backend::LlmBackend;
pub use gemini::GeminiClient;
pub use json_extract::{extract_json, ModelResponse};
pub use ollama::OllamaClient;
pub use types::{LlmGenerate, LlmRequest};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Model service unreachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Model service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected model service payload: {0}")]
    ResponseParsing(String),

    #[error("No API key configured for {0}")]
    MissingApiKey(&'static str),
}

impl LlmError {
    /// Map a reqwest transport error onto the layer's variants.
    pub(crate) fn from_transport(e: reqwest::Error, base_url: &str, timeout_secs: u64) -> Self {
        if e.is_connect() {
            Self::Connection(base_url.to_string())
        } else if e.is_timeout() {
            Self::Timeout(timeout_secs)
        } else {
            Self::HttpClient(e.to_string())
        }
    }
}
