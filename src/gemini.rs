use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{config::GeminiSettings, error::ReplyError};

pub const TEMPERATURE: f64 = 0.7;

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Single-turn request with the prompt as the only content part.
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

// `null` for the list or for any item decodes as empty
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

impl GenerateContentResponse {
    /// Response with a single candidate made of the given text parts.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    parts: parts
                        .into_iter()
                        .map(|text| Part {
                            text: Some(text.into()),
                        })
                        .collect(),
                }),
            }],
        }
    }
}

/// Anything that can turn a prompt into a generation payload.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse, ReplyError>;
}

pub struct GeminiClient {
    client: reqwest::Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Self {
        Self::with_client(reqwest::Client::new(), settings)
    }

    pub fn with_client(client: reqwest::Client, settings: GeminiSettings) -> Self {
        Self { client, settings }
    }

    fn endpoint(&self, api_key: &str) -> Result<Url, ReplyError> {
        let mut url = Url::parse(&self.settings.api_base).map_err(|e| {
            ReplyError::Configuration(format!(
                "invalid API base '{}': {e}",
                self.settings.api_base
            ))
        })?;

        url.path_segments_mut()
            .map_err(|()| {
                ReplyError::Configuration(format!(
                    "API base '{}' cannot carry a path",
                    self.settings.api_base
                ))
            })?
            .pop_if_empty()
            .push("models")
            .push(&format!("{}:generateContent", self.settings.model));

        url.query_pairs_mut().append_pair("key", api_key);

        Ok(url)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse, ReplyError> {
        let api_key = self.settings.api_key().ok_or(ReplyError::MissingApiKey)?;
        let url = self.endpoint(api_key)?;

        tracing::debug!(
            "Calling Gemini model '{}' at {}",
            self.settings.model,
            url.path()
        );

        // Strip the URL from transport errors so the key never reaches a response body
        let response = self
            .client
            .post(url)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            let details = response
                .text()
                .await
                .map_err(reqwest::Error::without_url)?;
            tracing::error!("Gemini API error: {} {}", status, details);
            return Err(ReplyError::Downstream {
                status: status.as_u16(),
                details,
            });
        }

        let payload = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(reqwest::Error::without_url)?;

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_base: &str, model: &str) -> GeminiClient {
        GeminiClient::new(GeminiSettings {
            api_key: Some("k".to_string()),
            api_base: api_base.to_string(),
            model: model.to_string(),
        })
    }

    #[test]
    fn builds_generate_content_url() {
        let url = client("https://generativelanguage.googleapis.com/v1beta", "gemini-1.5-pro")
            .endpoint("abc")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent?key=abc"
        );
    }

    #[test]
    fn trailing_slash_in_base_is_ignored() {
        let url = client("http://localhost:9000/v1beta/", "m").endpoint("k").unwrap();
        assert_eq!(url.path(), "/v1beta/models/m:generateContent");
    }

    #[test]
    fn model_name_is_segment_encoded() {
        let url = client("http://localhost:9000/v1beta", "tuned/model one")
            .endpoint("k")
            .unwrap();
        assert_eq!(url.path(), "/v1beta/models/tuned%2Fmodel%20one:generateContent");
    }

    #[test]
    fn invalid_base_is_a_configuration_error() {
        let err = client("not a url", "m").endpoint("k").unwrap_err();
        assert!(matches!(err, ReplyError::Configuration(_)));
    }

    #[test]
    fn request_body_matches_wire_format() {
        let json = serde_json::to_value(GenerateContentRequest::from_prompt("hi")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{ "parts": [{ "text": "hi" }] }],
                "generationConfig": { "temperature": 0.7 }
            })
        );
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{}]}},{}]}"#).unwrap();
        assert_eq!(response.candidates.len(), 2);
        assert!(response.candidates[1].content.is_none());

        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.candidates.is_empty());
    }

    #[test]
    fn response_tolerates_explicit_nulls() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":null}"#).unwrap();
        assert!(response.candidates.is_empty());

        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":null}}]}"#).unwrap();
        assert!(response.candidates[0].content.as_ref().unwrap().parts.is_empty());

        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[null]}"#).unwrap();
        assert!(response.candidates[0].content.is_none());

        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[null,{"text":"Hi"},{"text":null}]}}]}"#,
        )
        .unwrap();
        let parts = &response.candidates[0].content.as_ref().unwrap().parts;
        let texts: Vec<_> = parts.iter().map(|part| part.text.as_deref()).collect();
        assert_eq!(texts, [None, Some("Hi"), None]);
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = GeminiClient::new(GeminiSettings::default());
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, ReplyError::MissingApiKey));
    }
}
