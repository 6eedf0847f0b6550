//=========================================================================
// Game State
//=========================================================================
//
// High-level application flow and the level progression it drives.
//
// Architecture:
//   GameStateMachine
//     ├─ state: ApplicationState
//     ├─ levels: GameLevelSequence (cursor)
//     ├─ catalog: SceneCatalog
//     └─ scenes: SceneLifecycleManager
//
// Flow:
//   change_state() → state updated → action table → scene requests
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::str::FromStr;

//=== Internal Dependencies ===============================================

use crate::core::error::GameError;

//=== Module Declarations =================================================

mod levels;
mod machine;

//=== Public API ==========================================================

pub use levels::{GameLevelSequence, LevelSelection, LevelSource};
pub use machine::GameStateMachine;

//=== ApplicationState ====================================================

/// The application's current high-level mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApplicationState {
    #[default]
    Idle,
    MainMenu,
    Playing,
    Paused,
    Restart,
    GameOver,
    QuitGame,
}

impl ApplicationState {
    pub const ALL: [ApplicationState; 7] = [
        Self::Idle,
        Self::MainMenu,
        Self::Playing,
        Self::Paused,
        Self::Restart,
        Self::GameOver,
        Self::QuitGame,
    ];

    /// Canonical name, as used by `Display` and `FromStr`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::MainMenu => "MainMenu",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Restart => "Restart",
            Self::GameOver => "GameOver",
            Self::QuitGame => "QuitGame",
        }
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ApplicationState {
    type Err = GameError;

    /// Parses a state name, ignoring case and `_`/`-` separators
    /// (`"game_over"`, `"GameOver"` and `"game-over"` are equivalent).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|state| state.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| GameError::UnrecognizedState(s.to_string()))
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        assert_eq!(ApplicationState::default(), ApplicationState::Idle);
    }

    #[test]
    fn parses_names_loosely() {
        assert_eq!("GameOver".parse::<ApplicationState>(), Ok(ApplicationState::GameOver));
        assert_eq!("game_over".parse::<ApplicationState>(), Ok(ApplicationState::GameOver));
        assert_eq!("main-menu".parse::<ApplicationState>(), Ok(ApplicationState::MainMenu));
        assert_eq!("PAUSED".parse::<ApplicationState>(), Ok(ApplicationState::Paused));
    }

    #[test]
    fn unknown_name_is_unrecognized() {
        assert_eq!(
            "Victory".parse::<ApplicationState>(),
            Err(GameError::UnrecognizedState("Victory".to_string()))
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for state in ApplicationState::ALL {
            assert_eq!(state.to_string().parse::<ApplicationState>(), Ok(state));
        }
    }
}
