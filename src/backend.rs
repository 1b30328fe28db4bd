use async_trait::async_trait;
use serde::Deserialize;

use crate::dto::ReplyRequest;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Failed to reach reply service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Rejected(String),

    #[error("Reply service returned status {0} without an error message")]
    Status(u16),

    #[error("Reply service response did not contain a reply")]
    MissingReply,

    #[error("Reply service returned an unreadable body: {0}")]
    Decode(#[source] serde_json::Error),
}

/// The reply endpoint as seen from the form.
#[async_trait]
pub trait ReplyBackend: Send + Sync {
    async fn request_reply(&self, request: &ReplyRequest) -> Result<String, BackendError>;
}

// Either half of the endpoint's response shape
#[derive(Debug, Default, Deserialize)]
struct EndpointBody {
    #[serde(default)]
    reply: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct HttpReplyBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpReplyBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ReplyBackend for HttpReplyBackend {
    async fn request_reply(&self, request: &ReplyRequest) -> Result<String, BackendError> {
        tracing::debug!("Requesting reply from {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body: EndpointBody = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to decode reply service response ({status}): {e}");
                if status.is_success() {
                    return Err(BackendError::Decode(e));
                }
                EndpointBody::default()
            }
        };

        if let Some(error) = body.error {
            return Err(BackendError::Rejected(error));
        }
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        body.reply
            .filter(|reply| !reply.trim().is_empty())
            .ok_or(BackendError::MissingReply)
    }
}
