//! Locale toggle and the per-locale copy the core hands to presentation.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Italian,
}

impl Language {
    pub fn toggle(self) -> Language {
        match self {
            Language::English => Language::Italian,
            Language::Italian => Language::English,
        }
    }

    /// First line Ralsei says once the intro finishes.
    pub fn initial_message(self) -> &'static str {
        match self {
            Language::English => "O-oh! Hello there! I didn't expect to see anyone here in the dark... I'm Ralsei! It's so nice to meet you! *smiles sweetly*",
            Language::Italian => "O-oh! Ciao! Non mi aspettavo di vedere nessuno qui nel buio... Io sono Ralsei! È un piacere conoscerti! *sorride dolcemente*",
        }
    }

    /// User line that opens the seeded history.
    pub fn opening_line(self) -> &'static str {
        match self {
            Language::English => "Hello Ralsei!",
            Language::Italian => "Ciao Ralsei!",
        }
    }

    /// In-character apology used when the backend gives us nothing usable.
    pub fn fallback_text(self) -> &'static str {
        match self {
            Language::English => "O-oh... my head is spinning a little. Could you say that again? *adjusts glasses*",
            Language::Italian => "O-oh... mi gira un po' la testa. Puoi ripeterlo? *si sistema gli occhiali*",
        }
    }

    /// Name used inside the system instruction.
    pub fn prompt_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Italian => "Italian",
        }
    }

    pub fn copy(self) -> LocaleCopy {
        match self {
            Language::English => LocaleCopy {
                tagline: "A lonely prince is waiting to meet you in the void...",
                start_label: "Start Chat",
                language_label: "English",
                badge: "EN",
                input_placeholder: "Say something...",
            },
            Language::Italian => LocaleCopy {
                tagline: "Un principe solitario aspetta di incontrarti nel vuoto...",
                start_label: "Inizia Chat",
                language_label: "Italiano",
                badge: "IT",
                input_placeholder: "Dì qualcosa...",
            },
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => f.write_str("english"),
            Language::Italian => f.write_str("italian"),
        }
    }
}

/// Landing and chrome strings for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocaleCopy {
    pub tagline: &'static str,
    pub start_label: &'static str,
    pub language_label: &'static str,
    pub badge: &'static str,
    pub input_placeholder: &'static str,
}
