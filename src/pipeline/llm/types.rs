use std::future::Future;

use super::LlmError;

/// One prompt sent to the generative model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmRequest {
    pub system: String,
    pub prompt: String,
    /// Ask the backend to constrain its output to a JSON document.
    pub strict_json: bool,
}

impl LlmRequest {
    pub fn json(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            strict_json: true,
        }
    }
}

/// Text generation backend. The model is treated as an untrusted oracle:
/// callers validate everything it returns.
pub trait LlmGenerate: Send + Sync {
    fn generate(
        &self,
        request: &LlmRequest,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}
