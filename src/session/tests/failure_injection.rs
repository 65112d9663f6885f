//! End-to-end failures through the real Gemini backend against a mock server.

use crate::ai::emotion::Emotion;
use crate::ai::gateway::ModelGateway;
use crate::ai::history::TurnRole;
use crate::config::TimelineConfig;
use crate::llm::gemini::GeminiBackend;
use crate::session::clock::ManualClock;
use crate::session::controller::{SessionController, SessionState};
use crate::session::conversation::Role;
use crate::session::language::Language;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn controller_for(server: &MockServer, api_key: &str) -> (SessionController, ManualClock) {
    let backend = GeminiBackend::new(api_key.to_string(), Some(server.uri()), None);
    let clock = ManualClock::new();
    let ctrl = SessionController::new(
        Arc::new(ModelGateway::new(Arc::new(backend))),
        Arc::new(clock.clone()),
        TimelineConfig::default(),
    );
    (ctrl, clock)
}

fn activate(ctrl: &mut SessionController, clock: &ManualClock, language: Language) {
    assert!(ctrl.start(language));
    clock.advance(Duration::from_secs(2));
    ctrl.tick();
    assert_eq!(ctrl.state(), SessionState::Active);
}

fn candidate(text: &str) -> serde_json::Value {
    json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
}

async fn assert_falls_back(response: ResponseTemplate, language: Language) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(response)
        .mount(&server)
        .await;
    let (mut ctrl, clock) = controller_for(&server, "k");
    activate(&mut ctrl, &clock, language);

    assert!(ctrl.submit("hello?").await);

    let last = ctrl.messages().last().unwrap();
    assert_eq!(last.role(), Role::Model);
    assert_eq!(last.text(), language.fallback_text());
    assert_eq!(ctrl.current_emotion(), Emotion::Neutral);
    assert!(!ctrl.is_typing());
    assert!(!ctrl.is_dying());

    // the user turn stays, no model turn is recorded for the failure
    let turns = ctrl.history().turns();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[2].role, TurnRole::User);
    assert_eq!(turns[2].content, "hello?");
}

#[tokio::test]
async fn server_error_falls_back() {
    assert_falls_back(
        ResponseTemplate::new(500).set_body_string("internal"),
        Language::English,
    )
    .await;
}

#[tokio::test]
async fn malformed_reply_falls_back() {
    assert_falls_back(
        ResponseTemplate::new(200).set_body_json(candidate("I am not JSON")),
        Language::Italian,
    )
    .await;
}

#[tokio::test]
async fn unknown_emotion_falls_back() {
    assert_falls_back(
        ResponseTemplate::new(200)
            .set_body_json(candidate(r#"{"text":"hehe","emotion":"ecstatic"}"#)),
        Language::English,
    )
    .await;
}

#[tokio::test]
async fn blank_text_falls_back() {
    assert_falls_back(
        ResponseTemplate::new(200).set_body_json(candidate(r#"{"text":"   ","emotion":"sad"}"#)),
        Language::English,
    )
    .await;
}

#[tokio::test]
async fn empty_candidates_fall_back() {
    assert_falls_back(
        ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })),
        Language::English,
    )
    .await;
}

#[tokio::test]
async fn undecodable_body_falls_back() {
    assert_falls_back(
        ResponseTemplate::new(200).set_body_string("<html>gateway timeout</html>"),
        Language::English,
    )
    .await;
}

#[tokio::test]
async fn missing_key_falls_back_without_a_request() {
    let server = MockServer::start().await;
    let (mut ctrl, clock) = controller_for(&server, "");
    activate(&mut ctrl, &clock, Language::English);

    assert!(ctrl.submit("hi").await);
    assert_eq!(
        ctrl.messages().last().unwrap().text(),
        Language::English.fallback_text()
    );
    assert_eq!(ctrl.current_emotion(), Emotion::Neutral);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn recovery_after_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate("```json\n{\"text\":\"You're back!\",\"emotion\":\"love_3\"}\n```")),
        )
        .mount(&server)
        .await;

    let (mut ctrl, clock) = controller_for(&server, "k");
    activate(&mut ctrl, &clock, Language::English);

    assert!(ctrl.submit("first").await);
    assert_eq!(ctrl.current_emotion(), Emotion::Neutral);

    assert!(ctrl.submit("second").await);
    assert_eq!(ctrl.messages().last().unwrap().text(), "You're back!");
    assert_eq!(ctrl.current_emotion(), Emotion::Love3);

    // seed pair, failed user turn, then the successful exchange
    let roles: Vec<TurnRole> = ctrl.history().turns().iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![
            TurnRole::User,
            TurnRole::Model,
            TurnRole::User,
            TurnRole::User,
            TurnRole::Model
        ]
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn dead_reply_over_the_wire_starts_cutscene() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate(r#"{"text":"*collapses*","emotion":"dead"}"#)),
        )
        .mount(&server)
        .await;
    let (mut ctrl, clock) = controller_for(&server, "k");
    activate(&mut ctrl, &clock, Language::English);

    assert!(ctrl.submit("take this").await);
    assert!(ctrl.is_dying());
    assert_eq!(ctrl.current_emotion(), Emotion::Dead);
}
