//! Model gateway: the only path from the session to the model backend.
//!
//! Owns the request/response contract: builds the request from the turn
//! history, validates the structured reply against the emotion catalog and
//! degrades every failure into the in-character fallback. The turn history
//! itself belongs to the session and is lent in for each call.

use crate::ai::emotion::Emotion;
use crate::ai::history::TurnHistory;
use crate::ai::prompts;
use crate::llm::error::GatewayError;
use crate::llm::provider::{GenerateRequest, ModelBackend};
use crate::session::language::Language;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RalseiResponse {
    pub text: String,
    pub emotion: Emotion,
}

#[derive(Debug, Deserialize)]
struct RawReply {
    text: String,
    emotion: String,
}

impl RalseiResponse {
    pub fn new(text: impl Into<String>, emotion: Emotion) -> Self {
        Self {
            text: text.into(),
            emotion,
        }
    }

    /// Fixed apology in the active language, neutral face.
    pub fn fallback(language: Language) -> Self {
        Self::new(language.fallback_text(), Emotion::Neutral)
    }

    /// Validate a raw model reply.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let reply: RawReply = serde_json::from_str(strip_code_fence(raw))?;
        let emotion =
            Emotion::parse(&reply.emotion).ok_or(GatewayError::UnknownEmotion(reply.emotion))?;
        let text = reply.text.trim();
        if text.is_empty() {
            return Err(GatewayError::EmptyText);
        }
        Ok(Self::new(text, emotion))
    }

    /// Canonical JSON form stored as the model turn in the history.
    pub fn to_wire(&self) -> String {
        serde_json::json!({ "text": self.text, "emotion": self.emotion.as_str() }).to_string()
    }
}

/// Some models wrap JSON mode output in a Markdown fence anyway.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub struct ModelGateway {
    backend: Arc<dyn ModelBackend>,
    temperature: Option<f32>,
}

impl ModelGateway {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend,
            temperature: None,
        }
    }

    /// Per-request temperature override.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn backend_id(&self) -> &str {
        self.backend.id()
    }

    /// One exchange, surfacing failures.
    ///
    /// The user turn is recorded before the call and stays on failure; the
    /// model turn is recorded only for a valid reply.
    pub async fn try_send(
        &self,
        history: &mut TurnHistory,
        text: &str,
        language: Language,
    ) -> Result<RalseiResponse, GatewayError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GatewayError::EmptyInput);
        }

        history.push_user(text);
        let request = GenerateRequest {
            system_instruction: prompts::system_instruction(language),
            turns: history.turns().to_vec(),
            temperature: self.temperature,
            response_schema: prompts::response_schema(),
        };

        let raw = self.backend.generate(&request).await?;
        let reply = RalseiResponse::parse(&raw)?;
        history.push_model(reply.to_wire());
        Ok(reply)
    }

    /// One exchange that always yields a reply.
    pub async fn send(
        &self,
        history: &mut TurnHistory,
        text: &str,
        language: Language,
    ) -> RalseiResponse {
        match self.try_send(history, text, language).await {
            Ok(reply) => {
                tracing::debug!(provider = self.backend.id(), emotion = %reply.emotion, "model replied");
                reply
            }
            Err(e) => {
                tracing::warn!(provider = self.backend.id(), error = %e, "model call failed, using fallback");
                RalseiResponse::fallback(language)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::history::TurnRole;
    use crate::session::tests::mock_gateway::ScriptedBackend;

    #[test]
    fn parse_accepts_valid_reply() {
        let reply = RalseiResponse::parse(r#"{"text":" hi! ","emotion":"love_1"}"#).unwrap();
        assert_eq!(reply, RalseiResponse::new("hi!", Emotion::Love1));
    }

    #[test]
    fn parse_unwraps_code_fence() {
        let raw = "```json\n{\"text\":\"hi\",\"emotion\":\"sad\"}\n```";
        assert_eq!(RalseiResponse::parse(raw).unwrap().emotion, Emotion::Sad);
    }

    #[test]
    fn fence_tag_is_case_insensitive() {
        for raw in [
            "```JSON\n{\"text\":\"hi\",\"emotion\":\"mad\"}\n```",
            "```Json {\"text\":\"hi\",\"emotion\":\"mad\"}```",
            "```\n{\"text\":\"hi\",\"emotion\":\"mad\"}\n```",
        ] {
            assert_eq!(RalseiResponse::parse(raw).unwrap().emotion, Emotion::Mad);
        }
    }

    #[test]
    fn parse_rejects_out_of_set_emotion() {
        let err = RalseiResponse::parse(r#"{"text":"hi","emotion":"happy"}"#).unwrap_err();
        assert!(matches!(err, GatewayError::UnknownEmotion(tag) if tag == "happy"));
    }

    #[test]
    fn parse_rejects_missing_fields_and_empty_text() {
        assert!(matches!(
            RalseiResponse::parse(r#"{"text":"hi"}"#),
            Err(GatewayError::Malformed(_))
        ));
        assert!(matches!(
            RalseiResponse::parse("not json"),
            Err(GatewayError::Malformed(_))
        ));
        assert!(matches!(
            RalseiResponse::parse(r#"{"text":"  ","emotion":"sad"}"#),
            Err(GatewayError::EmptyText)
        ));
    }

    #[tokio::test]
    async fn success_records_both_turns() {
        let backend = ScriptedBackend::replying(&[r#"{"text":"hello","emotion":"sad"}"#]);
        let gateway = ModelGateway::new(backend.clone());
        let mut history = TurnHistory::seeded(Language::English);

        let reply = gateway.send(&mut history, "  hi ", Language::English).await;
        assert_eq!(reply, RalseiResponse::new("hello", Emotion::Sad));

        let turns = history.turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[2].role, TurnRole::User);
        assert_eq!(turns[2].content, "hi");
        assert_eq!(turns[3].role, TurnRole::Model);
        assert_eq!(RalseiResponse::parse(&turns[3].content).unwrap(), reply);
    }

    #[tokio::test]
    async fn request_carries_temperature_override() {
        let backend = ScriptedBackend::replying(&[
            r#"{"text":"a","emotion":"sad"}"#,
            r#"{"text":"b","emotion":"sad"}"#,
        ]);
        let mut history = TurnHistory::seeded(Language::English);

        ModelGateway::new(backend.clone())
            .send(&mut history, "one", Language::English)
            .await;
        ModelGateway::new(backend.clone())
            .with_temperature(0.4)
            .send(&mut history, "two", Language::English)
            .await;

        let temps: Vec<Option<f32>> = backend.requests().iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![None, Some(0.4)]);
    }

    #[tokio::test]
    async fn failure_yields_fallback_and_keeps_user_turn() {
        let backend = ScriptedBackend::failing();
        let gateway = ModelGateway::new(backend);
        let mut history = TurnHistory::seeded(Language::Italian);

        let reply = gateway.send(&mut history, "ciao", Language::Italian).await;
        assert_eq!(reply, RalseiResponse::fallback(Language::Italian));
        assert_eq!(reply.emotion, Emotion::Neutral);
        assert_eq!(history.len(), 3);
        assert_eq!(history.turns()[2].content, "ciao");
    }

    #[tokio::test]
    async fn invalid_emotion_is_a_failure() {
        let backend = ScriptedBackend::replying(&[r#"{"text":"hey","emotion":"joyful"}"#]);
        let gateway = ModelGateway::new(backend);
        let mut history = TurnHistory::seeded(Language::English);

        let err = gateway
            .try_send(&mut history, "hi", Language::English)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnknownEmotion(_)));
        assert_eq!(
            gateway.send(&mut history, "hi", Language::English).await,
            RalseiResponse::fallback(Language::English)
        );
    }

    #[tokio::test]
    async fn empty_input_never_reaches_backend() {
        let backend = ScriptedBackend::replying(&[r#"{"text":"x","emotion":"sad"}"#]);
        let gateway = ModelGateway::new(backend.clone());
        let mut history = TurnHistory::seeded(Language::English);

        let err = gateway.try_send(&mut history, "   ", Language::English).await;
        assert!(matches!(err, Err(GatewayError::EmptyInput)));
        assert_eq!(history.len(), 2);
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn request_carries_language_and_schema() {
        let backend = ScriptedBackend::replying(&[r#"{"text":"x","emotion":"sad"}"#]);
        let gateway = ModelGateway::new(backend.clone());
        let mut history = TurnHistory::seeded(Language::Italian);
        gateway.send(&mut history, "ciao", Language::Italian).await;

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].system_instruction.contains("Italian"));
        assert_eq!(requests[0].response_schema, prompts::response_schema());
        assert_eq!(requests[0].turns.last().map(|t| t.content.as_str()), Some("ciao"));
    }
}
