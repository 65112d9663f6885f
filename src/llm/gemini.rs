//! Gemini `generateContent` backend with a JSON response schema.

use crate::ai::history::TurnRole;
use crate::llm::error::GatewayError;
use crate::llm::provider::{GenerateRequest, ModelBackend};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    temperature: f32,
}

fn content(role: Option<&'static str>, text: &str) -> Content {
    Content {
        role,
        parts: vec![Part {
            text: text.to_string(),
        }],
    }
}

pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_retries: u32,
    provider_id: String,
}

impl GeminiBackend {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: 1.0,
            max_retries: 0,
            provider_id: "gemini".to_string(),
        }
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.provider_id = id;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        self
    }

    fn build_body(&self, request: &GenerateRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: request
                .turns
                .iter()
                .map(|turn| {
                    let role = match turn.role {
                        TurnRole::User => "user",
                        TurnRole::Model => "model",
                    };
                    content(Some(role), &turn.content)
                })
                .collect(),
            system_instruction: content(None, &request.system_instruction),
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: request.response_schema.clone(),
                temperature: request.temperature.unwrap_or(self.temperature),
            },
        }
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GatewayError> {
        if self.api_key.is_empty() {
            return Err(GatewayError::MissingApiKey(self.provider_id.clone()));
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = self.build_body(request);
        let client = self.client.clone();
        let api_key = self.api_key.clone();

        tracing::debug!(model = %self.model, turns = request.turns.len(), "gemini generateContent");

        let response = crate::utils::http::request_with_retry(
            move || {
                let client = client.clone();
                let url = url.clone();
                let body = body.clone();
                let api_key = api_key.clone();
                async move {
                    client
                        .post(&url)
                        .header("x-goog-api-key", api_key)
                        .json(&body)
                        .send()
                        .await
                }
            },
            self.max_retries,
        )
        .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GatewayError::status(status, error_text));
        }

        let body: Value = response.json().await?;
        let text = body["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(text)
    }

    fn id(&self) -> &str {
        &self.provider_id
    }
}
