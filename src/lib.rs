//=========================================================================
// Aetheric Scenes Library Root
//
// Scene lifecycle coordination and game-state flow for the logic thread.
//
// Responsibilities:
// - Track which scenes are loaded and serialize load/unload work per scene
// - Drive the application state machine (menu, play, pause, game over)
// - Run a fixed-rate logic loop fed by driver commands
//
// Typical usage:
// ```no_run
// use aetheric_scenes::prelude::*;
//
// let config = GameConfig::load("game.toml").unwrap();
// let loader = ThreadedLoader::new(config.scenes.scene_ids());
// let game = GameBuilder::new().with_config(config).build(loader);
// let commands = game.commands();
// let handle = game.spawn().unwrap();
// commands.send(GameCommand::StartLevel(None)).unwrap();
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the scene manager, state machine, config and command
// types. Most applications only need the prelude.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `engine` defines the game builder and the logic loop.
//
mod engine;

//--- Public Exports ------------------------------------------------------

pub use engine::{Game, GameBuilder};
