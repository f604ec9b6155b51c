use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::{LlmGenerate, LlmRequest};
use super::LlmError;

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey("Gemini"))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    /// Text of the first candidate, all parts concatenated.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        Some(content.parts.into_iter().map(|p| p.text).collect())
    }
}

impl LlmGenerate for GeminiClient {
    async fn generate(&self, request: &LlmRequest) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            system_instruction: (!request.system.is_empty()).then(|| Content {
                role: None,
                parts: vec![Part {
                    text: &request.system,
                }],
            }),
            generation_config: request.strict_json.then_some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(e, &self.base_url, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        parsed
            .into_text()
            .ok_or_else(|| LlmError::ResponseParsing("response has no candidates".into()))
    }
}
