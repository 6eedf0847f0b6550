//=========================================================================
// Core Systems
//
// Everything that runs on the game logic thread.
//
// Responsibilities:
// - Track scene residency and serialize loader work (`scene`)
// - Map application intent onto scene requests (`state`)
// - Receive driver commands over crossbeam channels (`command_bridge`)
// - Load game settings from TOML (`config`)
//
// Notes:
// Loaders may finish work on any thread, but completions are applied only
// on the thread that owns the SceneLifecycleManager, so the loaded set
// is never shared.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod command_bridge;
pub mod config;
pub mod error;
pub mod scene;
pub mod state;

//=== Public API ==========================================================

pub use command_bridge::GameCommand;
pub use config::{ConfigError, GameConfig, GameInfo, RuntimeConfig};
pub use error::{GameError, SceneError};
pub use scene::{LoadMode, SceneId, SceneLifecycleManager, SceneState};
pub use state::{ApplicationState, GameStateMachine};
