//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_scenes::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Runtime
pub use crate::engine::{Game, GameBuilder};
pub use crate::core::command_bridge::GameCommand;

// Configuration
pub use crate::core::config::{GameConfig, GameInfo, RuntimeConfig};

// Errors
pub use crate::core::error::{GameError, SceneError};

// Game state
pub use crate::core::state::{ApplicationState, GameLevelSequence, GameStateMachine, LevelSelection};

// Scene system
pub use crate::core::scene::{
    LoadMode, ManualLoader, SceneCatalog, SceneEvent, SceneId, SceneLifecycleManager,
    SceneLoader, SceneState, ThreadedLoader,
};
