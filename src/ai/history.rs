//! Turn history mirror sent to the model as conversational context.
//!
//! Owned by the session, lent to the gateway for each call. Never shown to
//! the UI: the visible log lives in `ConversationStore`.

use crate::ai::emotion::Emotion;
use crate::ai::gateway::RalseiResponse;
use crate::session::language::Language;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: TurnRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnHistory {
    language: Language,
    turns: Vec<HistoryTurn>,
}

impl Default for TurnHistory {
    fn default() -> Self {
        Self::seeded(Language::default())
    }
}

impl TurnHistory {
    /// Canned opening exchange matching the greeting shown after the intro.
    pub fn seeded(language: Language) -> Self {
        let greeting = RalseiResponse {
            text: language.initial_message().to_string(),
            emotion: Emotion::Waving,
        };
        Self {
            language,
            turns: vec![
                HistoryTurn {
                    role: TurnRole::User,
                    content: language.opening_line().to_string(),
                },
                HistoryTurn {
                    role: TurnRole::Model,
                    content: greeting.to_wire(),
                },
            ],
        }
    }

    /// Drop everything and re-seed in `language`.
    pub fn reset(&mut self, language: Language) {
        *self = Self::seeded(language);
    }

    /// Language the seed was written in.
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn turns(&self) -> &[HistoryTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub(crate) fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(HistoryTurn {
            role: TurnRole::User,
            content: text.into(),
        });
    }

    pub(crate) fn push_model(&mut self, raw: impl Into<String>) {
        self.turns.push(HistoryTurn {
            role: TurnRole::Model,
            content: raw.into(),
        });
    }
}
