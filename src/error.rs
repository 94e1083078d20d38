use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Raised when a model reply cannot be turned into JSON.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    #[error("unparsable text")]
    UnparsableText,
}

/// Raised when a parsed payload does not have the shape a use case needs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostProcessError {
    #[error("malformed entry{}: {}", .ingredient.as_ref().map(|n| format!(" `{}`", n)).unwrap_or_default(), .reason)]
    MalformedEntry {
        ingredient: Option<String>,
        reason: String,
    },
}

impl PostProcessError {
    pub fn entry(ingredient: &str, reason: impl Into<String>) -> Self {
        PostProcessError::MalformedEntry {
            ingredient: Some(ingredient.to_string()),
            reason: reason.into(),
        }
    }

    pub fn payload(reason: impl Into<String>) -> Self {
        PostProcessError::MalformedEntry {
            ingredient: None,
            reason: reason.into(),
        }
    }
}

pub const UNPARSABLE_REPLY_MESSAGE: &str = "Could not parse model response as JSON.";

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model gateway unavailable: {0}")]
    UpstreamUnavailable(anyhow::Error),

    #[error("{}", UNPARSABLE_REPLY_MESSAGE)]
    UnparsableReply(#[from] NormalizationError),

    #[error(transparent)]
    MalformedEntry(#[from] PostProcessError),

    #[error("Internal error: {0}")]
    Internal(anyhow::Error),
}

/// Which key an endpoint family uses for its error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStyle {
    Error,   // {"error": "..."}
    Detail,  // {"detail": "..."}
}

/// An [`AnalysisError`] bound to the body style of the endpoint that raised it.
#[derive(Debug)]
pub struct ApiError {
    pub style: ErrorStyle,
    pub error: AnalysisError,
}

impl ApiError {
    pub fn new(style: ErrorStyle, error: AnalysisError) -> Self {
        Self { style, error }
    }

    pub fn status(&self) -> StatusCode {
        match &self.error {
            AnalysisError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AnalysisError::UnparsableReply(_) => StatusCode::BAD_REQUEST,
            AnalysisError::MalformedEntry(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AnalysisError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            AnalysisError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.error {
            AnalysisError::InvalidInput(msg) => msg.clone(),
            AnalysisError::UnparsableReply(_) => UNPARSABLE_REPLY_MESSAGE.to_string(),
            AnalysisError::MalformedEntry(e) => format!("Model response has a {}", e),
            AnalysisError::UpstreamUnavailable(e) => {
                log::error!("❌ Model gateway failure: {:#}", e);
                "Model service is unavailable, please try again later.".to_string()
            }
            AnalysisError::Internal(e) => {
                log::error!("❌ Internal error: {:#}", e);
                "Internal server error.".to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        let body = match self.style {
            ErrorStyle::Error => json!({ "error": message }),
            ErrorStyle::Detail => json!({ "detail": message }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unparsable_reply_uses_documented_body() {
        let err = ApiError::new(
            ErrorStyle::Error,
            AnalysisError::from(NormalizationError::UnparsableText),
        );
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Could not parse model response as JSON."})
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_hides_details() {
        let err = ApiError::new(
            ErrorStyle::Detail,
            AnalysisError::UpstreamUnavailable(anyhow::anyhow!("connection refused to 10.0.0.1")),
        );
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        let detail = body["detail"].as_str().unwrap();
        assert!(!detail.contains("10.0.0.1"));
    }

    #[test]
    fn test_malformed_entry_names_ingredient() {
        let err = PostProcessError::entry("Milk", "days_left is missing");
        assert_eq!(err.to_string(), "malformed entry `Milk`: days_left is missing");

        let err = PostProcessError::payload("expected an object");
        assert_eq!(err.to_string(), "malformed entry: expected an object");
    }

    #[test]
    fn test_malformed_entry_status() {
        let err = ApiError::new(
            ErrorStyle::Error,
            PostProcessError::entry("Milk", "days_left is missing").into(),
        );
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
