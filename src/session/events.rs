use crate::ai::emotion::Emotion;
use crate::session::conversation::ChatMessage;
use crate::session::language::Language;
use serde::Serialize;

/// State changes published to presentation (auto-scroll, focus, overlays).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    IntroStarted { language: Language },
    IntroFinished,
    MessageAppended { message: ChatMessage },
    TypingChanged { typing: bool },
    EmotionChanged { previous: Emotion, current: Emotion },
    CutsceneStarted,
    CutsceneFading,
    CutsceneFinished,
    LanguageChanged { language: Language },
    SessionReset,
}
