//=========================================================================
// Command Collector
//=========================================================================
//
// Driver command collector with bounded polling and shutdown detection.
//
// Architecture:
//   Receiver<GameCommand> → collect_frame() → commands → TickControl
//
// Bounded polling keeps one tick from starving scene completion handling
// when drivers flood the channel.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::GameCommand;

//=== TickControl =========================================================

/// Update loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickControl {
    Continue,
    Exit,
}

//=== CommandCollector ====================================================

const MAX_COMMANDS_PER_FRAME: usize = 100;

/// Collects driver commands for one tick.
pub(crate) struct CommandCollector {
    receiver: Receiver<GameCommand>,
    commands: Vec<GameCommand>,
}

impl CommandCollector {
    /// Creates a collector draining `receiver`.
    pub(crate) fn new(receiver: Receiver<GameCommand>) -> Self {
        Self {
            receiver,
            commands: Vec::with_capacity(8),
        }
    }

    /// Collects pending commands (bounded per tick).
    ///
    /// Commands received before a `Shutdown` are kept so the caller can
    /// apply them before exiting. A disconnected channel also means exit.
    pub(crate) fn collect_frame(&mut self) -> TickControl {
        self.commands.clear();
        let mut drained = 0;

        while drained < MAX_COMMANDS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(GameCommand::Shutdown) => {
                    debug!("Shutdown command received");
                    return TickControl::Exit;
                }
                Ok(command) => {
                    self.commands.push(command);
                    drained += 1;
                }
                Err(TryRecvError::Disconnected) => {
                    debug!("All command senders dropped");
                    return TickControl::Exit;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= MAX_COMMANDS_PER_FRAME {
            warn!("Command queue backlog: drained {} commands this frame", drained);
        }

        TickControl::Continue
    }

    /// Returns collected commands for this frame.
    #[cfg(test)]
    pub(crate) fn commands(&self) -> &[GameCommand] {
        &self.commands
    }

    /// Takes ownership of collected commands, leaving an empty vec.
    pub(crate) fn take_commands(&mut self) -> Vec<GameCommand> {
        std::mem::take(&mut self.commands)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
