//! Emotion catalog: the closed set of expression tags the model may return.
//!
//! Each tag maps to a sprite reference and to a mood class. The mood class
//! drives the UI theme; keeping it an exhaustive `match` means a new tag
//! cannot be added without deciding how it is themed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    #[serde(rename = "waving")]
    Waving,
    #[serde(rename = "neutral")]
    Neutral,
    #[serde(rename = "sad")]
    Sad,
    #[serde(rename = "intrusive")]
    Intrusive,
    #[serde(rename = "shocked")]
    Shocked,
    #[serde(rename = "slight_compliment")]
    SlightCompliment,
    #[serde(rename = "medium_compliment")]
    MediumCompliment,
    #[serde(rename = "high_compliment")]
    HighCompliment,
    #[serde(rename = "flustered_talking")]
    FlusteredTalking,
    #[serde(rename = "mad")]
    Mad,
    #[serde(rename = "love_1")]
    Love1,
    #[serde(rename = "love_2")]
    Love2,
    #[serde(rename = "love_3")]
    Love3,
    #[serde(rename = "yandere")]
    Yandere,
    #[serde(rename = "dead")]
    Dead,
}

/// How an emotion colors the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodClass {
    Default,
    DarkMood,
    Dead,
}

impl Emotion {
    pub const ALL: [Emotion; 15] = [
        Emotion::Waving,
        Emotion::Neutral,
        Emotion::Sad,
        Emotion::Intrusive,
        Emotion::Shocked,
        Emotion::SlightCompliment,
        Emotion::MediumCompliment,
        Emotion::HighCompliment,
        Emotion::FlusteredTalking,
        Emotion::Mad,
        Emotion::Love1,
        Emotion::Love2,
        Emotion::Love3,
        Emotion::Yandere,
        Emotion::Dead,
    ];

    /// Wire tag, as the model emits it.
    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Waving => "waving",
            Emotion::Neutral => "neutral",
            Emotion::Sad => "sad",
            Emotion::Intrusive => "intrusive",
            Emotion::Shocked => "shocked",
            Emotion::SlightCompliment => "slight_compliment",
            Emotion::MediumCompliment => "medium_compliment",
            Emotion::HighCompliment => "high_compliment",
            Emotion::FlusteredTalking => "flustered_talking",
            Emotion::Mad => "mad",
            Emotion::Love1 => "love_1",
            Emotion::Love2 => "love_2",
            Emotion::Love3 => "love_3",
            Emotion::Yandere => "yandere",
            Emotion::Dead => "dead",
        }
    }

    /// Parse a wire tag. Surrounding whitespace and case are ignored,
    /// anything outside the catalog is rejected.
    pub fn parse(raw: &str) -> Option<Emotion> {
        let tag = raw.trim().to_ascii_lowercase();
        Emotion::ALL.into_iter().find(|e| e.as_str() == tag)
    }

    /// Sprite shown while this emotion is current.
    pub fn asset(self) -> &'static str {
        match self {
            Emotion::Waving => "https://imgur.com/5p03SMs.png",
            Emotion::Neutral => "https://imgur.com/9K4aTR9.png",
            Emotion::Sad => "https://imgur.com/popSt9R.png",
            Emotion::Intrusive => "https://imgur.com/F43gtVp.png",
            Emotion::Shocked => "https://imgur.com/FKyAtqw.png",
            Emotion::SlightCompliment => "https://imgur.com/yHZAoav.png",
            Emotion::MediumCompliment => "https://imgur.com/Dmczyic.png",
            Emotion::HighCompliment => "https://imgur.com/dEjz1QB.png",
            Emotion::FlusteredTalking => "https://imgur.com/LLhUf7d.png",
            Emotion::Mad => "https://imgur.com/Hya70KN.png",
            Emotion::Love1 => "https://imgur.com/7k62sBu.png",
            Emotion::Love2 => "https://imgur.com/rTq1Nus.png",
            Emotion::Love3 => "https://imgur.com/8ho4oP4.png",
            Emotion::Yandere => "https://imgur.com/gGqBpP9.png",
            Emotion::Dead => "https://imgur.com/VMICoHw.png",
        }
    }

    pub fn is_dead(self) -> bool {
        classify(self) == MoodClass::Dead
    }

    pub fn is_dark_mood(self) -> bool {
        classify(self) == MoodClass::DarkMood
    }
}

/// Mood class of an emotion.
pub fn classify(emotion: Emotion) -> MoodClass {
    match emotion {
        Emotion::Dead => MoodClass::Dead,
        Emotion::Mad | Emotion::Yandere => MoodClass::DarkMood,
        Emotion::Waving
        | Emotion::Neutral
        | Emotion::Sad
        | Emotion::Intrusive
        | Emotion::Shocked
        | Emotion::SlightCompliment
        | Emotion::MediumCompliment
        | Emotion::HighCompliment
        | Emotion::FlusteredTalking
        | Emotion::Love1
        | Emotion::Love2
        | Emotion::Love3 => MoodClass::Default,
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEmotion(pub String);

impl fmt::Display for UnknownEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown emotion tag: {:?}", self.0)
    }
}

impl std::error::Error for UnknownEmotion {}

impl FromStr for Emotion {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::parse(s).ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}

// ── Tests ──────────────────────────────────────────────────
