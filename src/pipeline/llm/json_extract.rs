use serde_json::Value;

/// Model output after structural parsing. The model is not trusted to
/// produce well-formed output, so failure is an ordinary value.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse<T> {
    Parsed(T),
    ParseFailure(String),
}

impl<T> ModelResponse<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ModelResponse<U> {
        match self {
            Self::Parsed(value) => ModelResponse::Parsed(f(value)),
            Self::ParseFailure(reason) => ModelResponse::ParseFailure(reason),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Parsed(value) => Ok(value),
            Self::ParseFailure(reason) => Err(reason),
        }
    }
}

/// Parse the text between the first `{` and the last `}`.
///
/// Handles prose preambles and markdown fences around the object; nothing
/// else is attempted.
pub fn extract_json(text: &str) -> ModelResponse<Value> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return ModelResponse::ParseFailure("no JSON object found in response".into());
    };
    if end < start {
        return ModelResponse::ParseFailure("no JSON object found in response".into());
    }

    match serde_json::from_str(&text[start..=end]) {
        Ok(value) => ModelResponse::Parsed(value),
        Err(e) => {
            tracing::warn!(error = %e, length = text.len(), "Model returned malformed JSON");
            ModelResponse::ParseFailure(format!("invalid JSON: {e}"))
        }
    }
}
