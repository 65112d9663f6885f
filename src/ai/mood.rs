//! Phase/Mood controller.
//!
//! Everything here is derived from the current emotion except one bit of
//! state: whether the death cutscene is running. The cutscene fires only on
//! the rising edge into `Dead`; repeated `Dead` replies keep the terminal
//! look without replaying it.

use crate::ai::emotion::{classify, Emotion, MoodClass};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Intro,
    Normal,
    DarkMood,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Pink flash while the intro plays.
    Intro,
    /// Washed-out white after death.
    Dead,
    /// High-contrast black for mad / yandere.
    DarkMood,
    Default,
}

/// Phase for the current frame. Precedence: intro > dead > dark mood > normal.
pub fn phase(intro_active: bool, emotion: Emotion) -> SessionPhase {
    if intro_active {
        return SessionPhase::Intro;
    }
    match classify(emotion) {
        MoodClass::Dead => SessionPhase::Dead,
        MoodClass::DarkMood => SessionPhase::DarkMood,
        MoodClass::Default => SessionPhase::Normal,
    }
}

pub fn palette(intro_active: bool, emotion: Emotion) -> Palette {
    match phase(intro_active, emotion) {
        SessionPhase::Intro => Palette::Intro,
        SessionPhase::Dead => Palette::Dead,
        SessionPhase::DarkMood => Palette::DarkMood,
        SessionPhase::Normal => Palette::Default,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CutsceneState {
    Idle,
    /// Overlay visible, video running.
    Playing,
    /// Video ended, overlay fading out.
    FadingOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodTransition {
    pub previous: Emotion,
    pub current: Emotion,
    pub cutscene_started: bool,
}

impl MoodTransition {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

#[derive(Debug, Clone)]
pub struct MoodController {
    current: Emotion,
    cutscene: CutsceneState,
}

impl Default for MoodController {
    fn default() -> Self {
        Self::new()
    }
}

impl MoodController {
    pub fn new() -> Self {
        Self {
            current: Emotion::Waving,
            cutscene: CutsceneState::Idle,
        }
    }

    pub fn current(&self) -> Emotion {
        self.current
    }

    pub fn cutscene(&self) -> CutsceneState {
        self.cutscene
    }

    pub fn is_dying(&self) -> bool {
        self.cutscene != CutsceneState::Idle
    }

    /// Record the emotion of a fresh model reply.
    pub fn observe(&mut self, next: Emotion) -> MoodTransition {
        let previous = self.current;
        let cutscene_started = next.is_dead() && !previous.is_dead();
        if cutscene_started {
            self.cutscene = CutsceneState::Playing;
        }
        self.current = next;
        MoodTransition {
            previous,
            current: next,
            cutscene_started,
        }
    }

    /// Video finished; start the fade. Returns false unless the cutscene was playing.
    pub fn begin_fade(&mut self) -> bool {
        if self.cutscene == CutsceneState::Playing {
            self.cutscene = CutsceneState::FadingOut;
            true
        } else {
            false
        }
    }

    /// Clear the overlay. Returns false if nothing was showing.
    pub fn finish_cutscene(&mut self) -> bool {
        let was_active = self.is_dying();
        self.cutscene = CutsceneState::Idle;
        was_active
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
