use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::dto::ErrorResponse;

const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("GEMINI_API_KEY is not set in the function environment variables")]
    MissingApiKey,

    #[error("Invalid Gemini configuration: {0}")]
    Configuration(String),

    #[error("Failed to generate reply from Gemini")]
    Downstream { status: u16, details: String },

    #[error("Gemini returned an empty reply")]
    EmptyReply,

    #[error("{0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl ReplyError {
    pub fn to_error_response(&self) -> ErrorResponse {
        let message = message_or_fallback(self.to_string());

        match self {
            Self::Downstream { status, details } => ErrorResponse {
                error: message,
                status: Some(*status),
                details: Some(details.clone()),
            },
            _ => ErrorResponse::new(message),
        }
    }
}

fn message_or_fallback(message: String) -> String {
    if message.trim().is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        message
    }
}

impl IntoResponse for ReplyError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(self.to_error_response()),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downstream_error_keeps_diagnostics() {
        let body = ReplyError::Downstream {
            status: 429,
            details: "{\"error\":\"quota\"}".to_string(),
        }
        .to_error_response();
        assert_eq!(body.error, "Failed to generate reply from Gemini");
        assert_eq!(body.status, Some(429));
        assert_eq!(body.details.as_deref(), Some("{\"error\":\"quota\"}"));
    }

    #[test]
    fn missing_key_names_the_variable() {
        let body = ReplyError::MissingApiKey.to_error_response();
        assert!(body.error.contains("GEMINI_API_KEY"));
        assert!(body.status.is_none());
        assert!(body.details.is_none());
    }

    #[test]
    fn blank_message_falls_back() {
        assert_eq!(message_or_fallback("  ".to_string()), FALLBACK_MESSAGE);
        assert_eq!(message_or_fallback("boom".to_string()), "boom");
    }

    #[test]
    fn invalid_body_reports_parser_message() {
        let error = serde_json::from_str::<crate::dto::ReplyRequest>("not json").unwrap_err();
        let body = ReplyError::InvalidBody(error).to_error_response();
        assert!(body.error.contains("expected"));
    }

    #[test]
    fn responds_with_internal_server_error() {
        let response = ReplyError::EmptyReply.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
