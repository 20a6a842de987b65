use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::GroundingSource;

/// What the model sent back: its text plus any search-grounding sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderReply {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

/// A generative model that answers a prompt with search grounding enabled.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<ProviderReply>;
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: serde_json::Map<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    tools: Vec<Tool>,
}

pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl NewsProvider for GeminiClient {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<ProviderReply> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user".into(),
                parts: vec![Part { text: prompt.into() }],
            }],
            generation_config: GenerationConfig { temperature: 0.6 },
            tools: vec![Tool {
                google_search: serde_json::Map::new(),
            }],
        };

        let res = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let bytes = res.bytes().await?;

        if !status.is_success() {
            let details: Value = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            let status = StatusCode::from_u16(status.as_u16())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return Err(AppError::ProviderError { status, details });
        }

        // A 2xx that is not JSON (e.g. a gateway page) is a failure, not an empty answer
        let json: Value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::FetchError(format!("Provider returned non-JSON body: {}", e)))?;

        Ok(reply_from_json(&json))
    }
}

// Missing text counts as an empty array
pub fn reply_from_json(json: &Value) -> ProviderReply {
    let candidate = &json["candidates"][0];

    let text = candidate["content"]["parts"][0]["text"]
        .as_str()
        .filter(|text| !text.is_empty())
        .unwrap_or("[]")
        .to_string();

    let sources = candidate["groundingMetadata"]["groundingChunks"]
        .as_array()
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| {
                    let web = chunk.get("web")?;
                    let uri = web["uri"].as_str()?;
                    Some(GroundingSource {
                        title: web["title"]
                            .as_str()
                            .filter(|t| !t.is_empty())
                            .unwrap_or("Source")
                            .to_string(),
                        uri: uri.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    ProviderReply { text, sources }
}
