//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::AnalysisError;

/// Structured error response body for the submission form.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String, bool) {
        match self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone(), false)
            }
            ApiError::Analysis(err) => {
                let (status, code) = match err {
                    AnalysisError::ResponseParse(_) => {
                        (StatusCode::BAD_GATEWAY, "MODEL_RESPONSE_UNREADABLE")
                    }
                    AnalysisError::SourceUnavailable(_) => {
                        (StatusCode::SERVICE_UNAVAILABLE, "SOURCE_UNAVAILABLE")
                    }
                    AnalysisError::ModelUnavailable(_) => {
                        (StatusCode::SERVICE_UNAVAILABLE, "MODEL_UNAVAILABLE")
                    }
                    AnalysisError::EmptyQuery => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_QUERY")
                    }
                    AnalysisError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                };
                (status, code, err.user_message(), err.is_retryable())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, retryable) = self.parts();

        if status.is_server_error() {
            tracing::warn!(code, detail = %self, "Analysis request failed");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                retryable,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn unreadable_model_response_returns_502() {
        let response = ApiError::from(AnalysisError::ResponseParse("no json".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "MODEL_RESPONSE_UNREADABLE");
        assert_eq!(json["error"]["retryable"], true);
    }

    #[tokio::test]
    async fn source_outage_returns_503() {
        let response =
            ApiError::from(AnalysisError::SourceUnavailable("timeout".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "SOURCE_UNAVAILABLE");
        // Internal detail stays out of the user message
        assert!(!json["error"]["message"].as_str().unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn empty_query_returns_422() {
        let response = ApiError::from(AnalysisError::EmptyQuery).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"]["code"], "EMPTY_QUERY");
    }

    #[tokio::test]
    async fn invalid_input_is_a_final_bad_request() {
        let response =
            ApiError::from(AnalysisError::InvalidInput("empty".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert_eq!(json["error"]["retryable"], false);
    }

    #[tokio::test]
    async fn bad_request_keeps_its_detail() {
        let response = ApiError::BadRequest("expected a JSON object".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "expected a JSON object"
        );
    }
}
