//! Model backend trait: common interface for the generative-model providers.

use crate::ai::history::HistoryTurn;
use crate::llm::error::GatewayError;
use async_trait::async_trait;
use serde_json::Value;

/// Everything a backend needs for one structured completion.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub system_instruction: String,
    /// Full context, ending with the new user turn.
    pub turns: Vec<HistoryTurn>,
    /// Sampling temperature; `None` leaves the backend's configured value.
    pub temperature: Option<f32>,
    /// JSON schema the reply must follow (`{text, emotion}`).
    pub response_schema: Value,
}

/// Common interface for model providers (Gemini, OpenAI-compatible).
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Non-streaming completion. Returns the raw reply text, expected to be
    /// a JSON document; validation happens in the gateway.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GatewayError>;

    /// Provider identifier (e.g. "gemini", "openai").
    fn id(&self) -> &str;
}
