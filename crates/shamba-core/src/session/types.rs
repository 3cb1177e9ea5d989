//! Session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::farmer::Language;

/// Where the conversation currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MenuState {
    /// Top-level menu; every command is available
    #[default]
    MainMenu,
    /// Waiting for `simulate <crop> <date> <size>` arguments
    SimulationInput,
}

/// Per-farmer conversational state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Current menu state
    pub state: MenuState,
    /// Session-local language (may diverge from the stored profile
    /// preference until a toggle persists it)
    pub language: Language,
    /// Last inbound message timestamp
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// Fresh session at the main menu.
    pub fn new(language: Language) -> Self {
        Self {
            state: MenuState::MainMenu,
            language,
            last_activity: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_at_main_menu() {
        let session = Session::new(Language::En);
        assert_eq!(session.state, MenuState::MainMenu);
        assert_eq!(session.language, Language::En);
    }
}
