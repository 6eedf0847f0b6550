//=========================================================================
// Game Runtime
//
// Fixed-rate logic loop around a GameStateMachine.
//
// Architecture:
// ```text
//     GameBuilder  ──build(loader)──>  Game  ──run()/spawn()──>  [Logic Loop]
//         │                             │
//         ├─ with_tps()                 ├─ commands() → Sender<GameCommand>
//         ├─ with_channel_capacity()    └─ init(|machine| ..)
//         └─ with_config()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::command_bridge::{CommandCollector, GameCommand, TickControl};
use crate::core::config::{GameConfig, GameInfo};
use crate::core::scene::{SceneCatalog, SceneEvent, SceneLifecycleManager, SceneLoader};
use crate::core::state::GameStateMachine;

//=== GameBuilder =========================================================

/// Builder for configuring and constructing a [`Game`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (logic updates per second)
/// - **Channel capacity**: 128 commands
/// - **Shutdown grace**: 2 seconds
///
/// # Examples
///
/// ```no_run
/// use aetheric_scenes::prelude::*;
///
/// let catalog = SceneCatalog::new()
///     .with_scene("main_menu", "MainMenu")
///     .with_level("level_1", "Forest");
/// let loader = ThreadedLoader::new(catalog.scene_ids());
///
/// let game = GameBuilder::new()
///     .with_tps(30.0)
///     .with_catalog(catalog)
///     .build(loader);
///
/// let commands = game.commands();
/// let handle = game.spawn().unwrap();
///
/// commands.send(GameCommand::StartLevel(None)).unwrap();
/// commands.send(GameCommand::Shutdown).unwrap();
///
/// let machine = handle.join().unwrap();
/// assert!(machine.is_scene_loaded("Forest"));
/// ```
pub struct GameBuilder {
    tps: f64,
    channel_capacity: usize,
    shutdown_grace: Duration,
    info: GameInfo,
    catalog: SceneCatalog,
}

impl GameBuilder {
    /// Creates a new builder with default settings and an empty catalog.
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            shutdown_grace: Duration::from_secs(2),
            info: GameInfo::default(),
            catalog: SceneCatalog::default(),
        }
    }

    /// Sets the target ticks per second for the logic loop.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the capacity of the driver → logic command channel.
    ///
    /// Senders block once the channel is full.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// How long the loop waits for outstanding scene operations on exit.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Sets the scene catalog the state machine resolves roles and levels from.
    pub fn with_catalog(mut self, catalog: SceneCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the game information shown by the UI layer.
    pub fn with_info(mut self, info: GameInfo) -> Self {
        self.info = info;
        self
    }

    /// Applies runtime settings, game info and the scene catalog from a
    /// loaded configuration.
    ///
    /// # Panics
    ///
    /// Panics on the same values as [`with_tps`](Self::with_tps) and
    /// [`with_channel_capacity`](Self::with_channel_capacity). A config that
    /// passed [`GameConfig::validate`] never does.
    pub fn with_config(self, config: GameConfig) -> Self {
        self.with_tps(config.runtime.tps)
            .with_channel_capacity(config.runtime.channel_capacity)
            .with_info(config.info)
            .with_catalog(config.scenes)
    }

    /// Builds the game around `loader`.
    pub fn build<L>(self, loader: L) -> Game
    where
        L: SceneLoader + 'static,
    {
        info!(
            "Building game '{}' (TPS: {}, channel: {})",
            self.info.title, self.tps, self.channel_capacity
        );

        let scenes = SceneLifecycleManager::new(loader);
        let machine = GameStateMachine::new(scenes, self.catalog).with_info(self.info);
        let (command_tx, command_rx) = bounded(self.channel_capacity);

        Game {
            machine,
            tps: self.tps,
            channel_capacity: self.channel_capacity,
            shutdown_grace: self.shutdown_grace,
            command_tx,
            command_rx,
        }
    }
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Game ================================================================

/// A configured game ready to run.
///
/// # Architecture
///
/// ```text
/// Driver threads ──GameCommand──► Logic loop (@ TPS)
///                                   ├─► GameStateMachine
///                                   │     └─► SceneLifecycleManager
///                                   │           └─► SceneLoader ──┐
///                                   └─◄── SceneCompletion ◄───────┘
/// ```
pub struct Game {
    machine: GameStateMachine,
    tps: f64,
    channel_capacity: usize,
    shutdown_grace: Duration,
    command_tx: Sender<GameCommand>,
    command_rx: Receiver<GameCommand>,
}

impl Game {
    //--- Initialization ---------------------------------------------------

    /// Returns a sender for driver commands.
    ///
    /// The loop exits once every sender handed out here has been dropped,
    /// so keep at least one alive for as long as the game should run.
    pub fn commands(&self) -> Sender<GameCommand> {
        self.command_tx.clone()
    }

    /// Configures the state machine before the loop starts.
    pub fn init<F>(mut self, init_fn: F) -> Self
    where
        F: FnOnce(&mut GameStateMachine),
    {
        info!("Initializing game state");
        init_fn(&mut self.machine);
        self
    }

    //--- Execution --------------------------------------------------------

    /// Runs the logic loop on the current thread until exit.
    ///
    /// # Lifecycle
    ///
    /// 1. Runs the start-up transition (Idle → MainMenu)
    /// 2. Each tick: applies commands, applies scene completions, paces
    /// 3. Exits on `Shutdown`, when all command senders are gone, or when
    ///    the game entered `QuitGame`
    /// 4. Waits up to the shutdown grace for outstanding scene operations
    ///
    /// Returns the state machine in its final state.
    pub fn run(self) -> GameStateMachine {
        let Game {
            mut machine,
            tps,
            channel_capacity,
            shutdown_grace,
            command_tx,
            command_rx,
        } = self;

        info!(
            "Starting game loop (TPS: {}, channel: {})",
            tps, channel_capacity
        );

        // Only driver-held senders keep the loop alive
        drop(command_tx);

        let frame_duration = Duration::from_secs_f64(1.0 / tps);
        let mut collector = CommandCollector::new(command_rx);

        if let Err(e) = machine.start() {
            error!("Start-up transition failed: {}", e);
        }

        loop {
            let frame_start = Instant::now();

            //--- Step 1: Gather driver commands --------------------------
            let control = collector.collect_frame();

            //--- Step 2: Apply commands ----------------------------------
            for command in collector.take_commands() {
                apply_command(&mut machine, command);
            }

            //--- Step 3: Apply scene completions -------------------------
            log_events(&machine.update());

            //--- Step 4: Exit check --------------------------------------
            if control == TickControl::Exit || machine.quit_requested() {
                info!("Game loop exiting.");
                break;
            }

            //--- Step 5: Maintain pacing ---------------------------------
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                thread::sleep(frame_duration - elapsed);
            }
        }

        //--- Cleanup: let outstanding scene work land ---------------------
        if machine.scenes().in_flight() > 0 {
            info!(
                "Waiting for {} scene operations to finish",
                machine.scenes().in_flight()
            );
            log_events(&machine.scenes_mut().wait_for_idle(shutdown_grace));
        }

        info!("Game shutdown complete (state: {})", machine.state());
        machine
    }

    /// Runs the logic loop on a named background thread.
    pub fn spawn(self) -> io::Result<thread::JoinHandle<GameStateMachine>> {
        thread::Builder::new()
            .name("game-logic".to_string())
            .spawn(move || self.run())
    }
}

//=== Loop Helpers ========================================================

fn apply_command(machine: &mut GameStateMachine, command: GameCommand) {
    debug!("Applying command {:?}", command);

    let result = match command {
        GameCommand::ChangeState(state) => machine.change_state(state),
        GameCommand::ChangeStateNamed(name) => machine.change_state_by_name(&name),
        GameCommand::StartLevel(name) => machine.start_level(name.as_deref()).map(|_| ()),
        GameCommand::TogglePause => machine.toggle_pause(),
        GameCommand::Shutdown => Ok(()),
    };

    if let Err(e) = result {
        warn!("Command failed: {}", e);
    }
}

fn log_events(events: &[SceneEvent]) {
    for event in events {
        match event {
            SceneEvent::Failed(e) => warn!("Scene operation failed: {}", e),
            other => debug!("Scene event: {:?}", other),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
