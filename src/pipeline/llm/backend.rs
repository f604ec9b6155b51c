use super::gemini::GeminiClient;
use super::ollama::OllamaClient;
use super::types::{LlmGenerate, LlmRequest};
use super::LlmError;
use crate::config::{LlmProvider, LlmSettings};

/// Runtime-selected model backend.
pub enum LlmBackend {
    Ollama(OllamaClient),
    Gemini(GeminiClient),
}

impl LlmBackend {
    pub fn from_settings(settings: &LlmSettings, timeout_secs: u64) -> Result<Self, LlmError> {
        match settings.provider {
            LlmProvider::Ollama => Ok(Self::Ollama(OllamaClient::new(
                &settings.ollama_base_url,
                &settings.ollama_model,
                timeout_secs,
            )?)),
            LlmProvider::Gemini => Ok(Self::Gemini(GeminiClient::new(
                &settings.gemini_base_url,
                &settings.gemini_model,
                settings.gemini_api_key.as_deref(),
                timeout_secs,
            )?)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ollama(_) => "ollama",
            Self::Gemini(_) => "gemini",
        }
    }
}

impl LlmGenerate for LlmBackend {
    async fn generate(&self, request: &LlmRequest) -> Result<String, LlmError> {
        match self {
            Self::Ollama(client) => client.generate(request).await,
            Self::Gemini(client) => client.generate(request).await,
        }
    }
}
