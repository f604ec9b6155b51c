use std::env;

use crate::pipeline_config::PipelineConfig;

/// Application-level constants
pub const APP_NAME: &str = "CATTO Novelty";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tracing filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "catto_novelty=info,tower_http=info"
}

const DEFAULT_BIND: &str = "127.0.0.1:8787";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";
const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-flash-latest";
const DEFAULT_PUBMED_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const DEFAULT_PUBMED_TOOL: &str = "CaseReport-CATTO";
const DEFAULT_PUBMED_EMAIL: &str = "user@example.com";
const DEFAULT_MESH_URL: &str = "https://id.nlm.nih.gov/mesh";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// Which generative model backend answers the three analysis prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Ollama,
    Gemini,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub gemini_api_key: Option<String>,
}

/// E-utilities connection settings. `tool` and `email` identify the caller to NCBI.
#[derive(Debug, Clone)]
pub struct PubMedSettings {
    pub base_url: String,
    pub tool: String,
    pub email: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub http_timeout_secs: u64,
    pub llm: LlmSettings,
    pub pubmed: PubMedSettings,
    pub mesh_base_url: String,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let provider = match get("CATTO_LLM_BACKEND").as_deref() {
            Some(v) if v.eq_ignore_ascii_case("gemini") => LlmProvider::Gemini,
            Some(v) if !v.eq_ignore_ascii_case("ollama") => {
                tracing::warn!(value = v, "Unknown CATTO_LLM_BACKEND, using ollama");
                LlmProvider::Ollama
            }
            _ => LlmProvider::Ollama,
        };

        Self {
            bind_addr: or("CATTO_BIND", DEFAULT_BIND),
            http_timeout_secs: get("CATTO_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            llm: LlmSettings {
                provider,
                ollama_base_url: or("OLLAMA_BASE_URL", DEFAULT_OLLAMA_URL),
                ollama_model: or("OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
                gemini_base_url: or("GEMINI_BASE_URL", DEFAULT_GEMINI_URL),
                gemini_model: or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                gemini_api_key: get("GEMINI_API_KEY"),
            },
            pubmed: PubMedSettings {
                base_url: or("PUBMED_BASE_URL", DEFAULT_PUBMED_URL),
                tool: or("PUBMED_TOOL", DEFAULT_PUBMED_TOOL),
                email: or("PUBMED_EMAIL", DEFAULT_PUBMED_EMAIL),
                api_key: get("PUBMED_API_KEY"),
            },
            mesh_base_url: or("MESH_BASE_URL", DEFAULT_MESH_URL),
            pipeline: PipelineConfig::from_lookup(&get),
        }
    }
}
