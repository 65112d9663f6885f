use crate::ai::history::TurnRole;
use crate::llm::error::GatewayError;
use crate::llm::provider::{GenerateRequest, ModelBackend};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub temperature: Option<f32>,
    response_format: ResponseFormat,
}

/// OpenAI-compatible `/chat/completions` backend in JSON mode.
///
/// JSON mode does not enforce a schema, so the instruction carries the
/// expected shape and the gateway validates it.
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_retries: u32,
    provider_id: String,
}

impl OpenAiBackend {
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
            provider_id: "openai".to_string(),
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

    fn build_messages(request: &GenerateRequest) -> Vec<Message> {
        let schema_hint = format!(
            "{}\n\nReply with a single JSON object matching this schema:\n{}",
            request.system_instruction, request.response_schema
        );
        let mut messages = vec![Message {
            role: "system".to_string(),
            content: schema_hint,
        }];
        messages.extend(request.turns.iter().map(|turn| Message {
            role: match turn.role {
                TurnRole::User => "user".to_string(),
                TurnRole::Model => "assistant".to_string(),
            },
            content: turn.content.clone(),
        }));
        messages
    }
}

#[async_trait]
impl ModelBackend for OpenAiBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GatewayError> {
        if self.api_key.is_empty() {
            return Err(GatewayError::MissingApiKey(self.provider_id.clone()));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: Self::build_messages(request),
            stream: false,
            temperature: Some(request.temperature.unwrap_or(self.temperature)),
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let client = self.client.clone();
        let api_key = self.api_key.clone();

        tracing::debug!(model = %self.model, turns = request.turns.len(), "chat completion");

        let response = crate::utils::http::request_with_retry(
            move || {
                let client = client.clone();
                let url = url.clone();
                let body = body.clone();
                let api_key = api_key.clone();
                async move {
                    client
                        .post(&url)
                        .header("Authorization", format!("Bearer {}", api_key))
                        .header("Content-Type", "application/json")
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
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        if content.trim().is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(content)
    }

    fn id(&self) -> &str {
        &self.provider_id
    }
}
