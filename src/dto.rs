use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_SENDER: &str = "Unknown sender";
pub const DEFAULT_SUBJECT: &str = "No subject";
pub const DEFAULT_BODY: &str = "No email body provided.";
pub const DEFAULT_TONE: &str = "neutral";

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ReplyRequest {
    /// Address or name of the original sender
    #[serde(default)]
    pub sender: Option<String>,
    /// Subject line of the original email
    #[serde(default)]
    pub subject: Option<String>,
    /// Full email thread to reply to
    #[serde(default)]
    pub body: Option<String>,
    /// Desired tone, e.g. formal, friendly or concise
    #[serde(default)]
    pub tone: Option<String>,
}

/// A [`ReplyRequest`] with every field trimmed and defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedRequest {
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub tone: String,
}

impl ReplyRequest {
    pub fn sanitized(&self) -> SanitizedRequest {
        SanitizedRequest {
            sender: or_default(self.sender.as_deref(), DEFAULT_SENDER),
            subject: or_default(self.subject.as_deref(), DEFAULT_SUBJECT),
            body: or_default(self.body.as_deref(), DEFAULT_BODY),
            tone: or_default(self.tone.as_deref(), DEFAULT_TONE),
        }
    }
}

fn or_default(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReplyResponse {
    /// Generated reply text, never empty
    pub reply: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable failure description
    pub error: String,
    /// Status code returned by the generation API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Raw error body returned by the generation API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: None,
            details: None,
        }
    }
}
