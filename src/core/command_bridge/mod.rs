//=========================================================================
// Command Bridge
//=========================================================================
//
// Bridges driver threads (UI, input, scripts) with the game logic thread.
//
// Drivers never touch the state machine directly. They send GameCommand
// values over a bounded crossbeam channel and the logic thread applies
// them at the start of each tick.
//
// Components:
// - `interface`: Command type (the contract)
// - `command_collector`: Logic-side bounded collection per tick
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod command_collector;
pub(crate) mod interface;

//=== Public API ==========================================================

pub(crate) use command_collector::{CommandCollector, TickControl};
pub use interface::GameCommand;
