//! Conversation and emotion state machine for a scripted character chat.
//!
//! A presentation layer drives [`ChatService`] (or a [`SessionController`]
//! directly): start the session, submit text, toggle the language, and read
//! back messages, the current emotion and the derived theme. Replies come
//! from a generative model behind [`ModelGateway`]; any backend failure turns
//! into an in-character fallback so the conversation never stalls.

pub mod ai;
pub mod commands;
pub mod config;
pub mod llm;
pub mod logging;
pub mod session;
pub mod utils;

pub use ai::emotion::{classify, Emotion, MoodClass};
pub use ai::gateway::{ModelGateway, RalseiResponse};
pub use ai::mood::{CutsceneState, Palette, SessionPhase};
pub use commands::chat::ChatService;
pub use config::{ChatConfig, TimelineConfig};
pub use llm::error::GatewayError;
pub use llm::provider::{GenerateRequest, ModelBackend};
pub use session::controller::{SessionController, SessionView};
pub use session::conversation::{ChatMessage, Role};
pub use session::events::SessionEvent;
pub use session::language::Language;
