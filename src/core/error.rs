//=========================================================================
// Error Types
//=========================================================================
//
// Recoverable conditions reported by the scene and game-state layers.
//
// None of these terminate the process. Only LoadFailure/UnloadFailure
// abort the requested operation; the loaded set stays at its last
// consistent state.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::scene::{LoaderError, SceneId, SceneState};

//=== SceneError ==========================================================

/// Conditions reported by the scene lifecycle manager.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("Scene identifier must not be empty")]
    EmptyIdentifier,

    /// The scene is already in the loaded set. Informational.
    #[error("Scene '{0}' is already loaded")]
    AlreadyLoaded(SceneId),

    #[error("Scene '{0}' is not currently loaded")]
    NotLoaded(SceneId),

    /// Another operation for the scene is outstanding.
    #[error("Scene '{id}' is busy ({state:?})")]
    Busy { id: SceneId, state: SceneState },

    #[error("Failed to load scene '{id}': {source}")]
    LoadFailure {
        id: SceneId,
        #[source]
        source: LoaderError,
    },

    #[error("Failed to unload scene '{id}': {source}")]
    UnloadFailure {
        id: SceneId,
        #[source]
        source: LoaderError,
    },
}

//=== GameError ===========================================================

/// Conditions reported by the game-state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The level cursor would move past the end of the sequence.
    #[error("Level index {index} is out of range ({len} levels)")]
    LevelIndexOutOfRange { index: usize, len: usize },

    /// A state name from outside did not match any application state.
    #[error("Unrecognized application state '{0}'")]
    UnrecognizedState(String),

    #[error(transparent)]
    Scene(#[from] SceneError),
}
