//=========================================================================
// Command Bridge Interface
//=========================================================================
//
// Driver-to-logic command type.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::state::ApplicationState;

//=== GameCommand =========================================================

/// Requests sent to the logic thread via the command channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    /// Run a state transition.
    ChangeState(ApplicationState),

    /// Run a state transition by name (UI buttons, scripts).
    ChangeStateNamed(String),

    /// Load the next level (`None`) or the named one, then play.
    StartLevel(Option<String>),

    /// Toggle between playing and paused.
    TogglePause,

    /// Stop the logic loop after this tick.
    Shutdown,
}
