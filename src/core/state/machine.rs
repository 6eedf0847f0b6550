//=========================================================================
// Game State Machine
//=========================================================================
//
// Maps application intent to scene lifecycle requests.
//
// Transitions are synchronous: the new state is stored first, then the
// state's action runs. Scene work started by an action completes later,
// possibly after the next transition has begun.
//
//   Idle      → MainMenu
//   MainMenu  → single-load main menu
//   Playing   → (level already requested by start_level)
//   Paused    → additive-load pause menu, freeze time
//   Restart   → reset scenes + cursor, start_level(None)
//   GameOver  → single-load game over
//   QuitGame  → quit flag + quit hook
//
// Leaving Paused restores time flow and unloads the pause menu.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::levels::{GameLevelSequence, LevelSelection};
use super::ApplicationState;
use crate::core::config::GameInfo;
use crate::core::error::{GameError, SceneError};
use crate::core::scene::catalog::{GAME_OVER, MAIN_MENU, PAUSE_MENU};
use crate::core::scene::{
    LoadMode, SceneCatalog, SceneEvent, SceneId, SceneLifecycleManager,
};

//=== GameStateMachine ====================================================

/// Owns the application state, the level cursor and the scene manager.
///
/// # Example
///
/// ```rust
/// use aetheric_scenes::prelude::*;
///
/// let loader = ManualLoader::new();
/// let catalog = SceneCatalog::new()
///     .with_scene("main_menu", "MainMenu")
///     .with_level("level_1", "Forest");
///
/// let mut game = GameStateMachine::new(SceneLifecycleManager::new(loader.clone()), catalog);
/// game.start().unwrap();
/// assert_eq!(game.state(), ApplicationState::MainMenu);
///
/// loader.complete_all();
/// game.update();
/// assert!(game.is_scene_loaded("MainMenu"));
/// ```
pub struct GameStateMachine {
    state: ApplicationState,
    scenes: SceneLifecycleManager,
    catalog: SceneCatalog,
    levels: GameLevelSequence,
    info: GameInfo,
    time_scale: f32,
    quit_requested: bool,
    on_quit: Option<Box<dyn FnMut() + Send>>,
}

impl GameStateMachine {
    //--- Construction -----------------------------------------------------

    /// Creates a machine in [`ApplicationState::Idle`].
    ///
    /// The level sequence is taken from the catalog's level order. Call
    /// [`start`](Self::start) to run the start-up transition.
    pub fn new(scenes: SceneLifecycleManager, catalog: SceneCatalog) -> Self {
        catalog.log_summary();
        let levels = GameLevelSequence::new(catalog.level_sequence());

        Self {
            state: ApplicationState::Idle,
            scenes,
            catalog,
            levels,
            info: GameInfo::default(),
            time_scale: 1.0,
            quit_requested: false,
            on_quit: None,
        }
    }

    /// Sets the game information exposed to the UI layer.
    pub fn with_info(mut self, info: GameInfo) -> Self {
        self.info = info;
        self
    }

    /// Installs the hook invoked when the machine enters
    /// [`ApplicationState::QuitGame`].
    pub fn with_quit_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.set_quit_hook(hook);
        self
    }

    /// Replaces the hook invoked on entering `QuitGame`.
    pub fn set_quit_hook<F>(&mut self, hook: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.on_quit = Some(Box::new(hook));
    }

    //--- Transitions ------------------------------------------------------

    /// Runs the start-up transition (`Idle`, which moves on to `MainMenu`).
    pub fn start(&mut self) -> Result<(), GameError> {
        self.change_state(ApplicationState::Idle)
    }

    /// Makes `new_state` current, then runs its action.
    ///
    /// The state change itself always happens. An `Err` reports that the
    /// state's scene request could not be issued.
    pub fn change_state(&mut self, new_state: ApplicationState) -> Result<(), GameError> {
        let previous = std::mem::replace(&mut self.state, new_state);
        debug!("Game state {} -> {}", previous, new_state);

        if previous == ApplicationState::Paused && new_state != ApplicationState::Paused {
            self.leave_pause();
        }

        self.run_state_action()
    }

    /// Changes state by name, for commands that arrive as text.
    ///
    /// An unrecognized name sets the state to `Idle` and is reported back as
    /// [`GameError::UnrecognizedState`].
    pub fn change_state_by_name(&mut self, name: &str) -> Result<(), GameError> {
        match name.parse::<ApplicationState>() {
            Ok(state) => self.change_state(state),
            Err(e) => {
                warn!("{}! Defaulting to Idle.", e);
                if self.state == ApplicationState::Paused {
                    self.leave_pause();
                }
                self.state = ApplicationState::Idle;
                Err(e)
            }
        }
    }

    /// Loads a level and switches to `Playing`.
    ///
    /// With `None` the next level in the sequence is used. If no level can
    /// be selected, or its load cannot be issued, the state is unchanged.
    pub fn start_level(&mut self, name: Option<&str>) -> Result<LevelSelection, GameError> {
        let selection = self.get_game_level(name)?;
        self.change_state(ApplicationState::Playing)?;
        Ok(selection)
    }

    /// Toggles between `Playing` and `Paused`. Ignored on the main menu.
    pub fn toggle_pause(&mut self) -> Result<(), GameError> {
        match self.state {
            ApplicationState::MainMenu => {
                debug!("Pause ignored on the main menu");
                Ok(())
            }
            ApplicationState::Paused => self.change_state(ApplicationState::Playing),
            _ => self.change_state(ApplicationState::Paused),
        }
    }

    /// Advances the level cursor and issues a single-mode load for the
    /// selected level. Does not change state.
    pub fn get_game_level(&mut self, name: Option<&str>) -> Result<LevelSelection, GameError> {
        let selection = self.levels.advance(name)?;
        self.request_load(&selection.scene, LoadMode::Single)?;
        Ok(selection)
    }

    /// Forgets all scenes and the level cursor without waiting for
    /// outstanding loader work.
    pub fn reset_all(&mut self) {
        self.scenes.reset_all();
        self.levels.reset();
    }

    /// Applies scene completions that arrived since the last update.
    pub fn update(&mut self) -> Vec<SceneEvent> {
        self.scenes.poll_completions()
    }

    //--- Queries ----------------------------------------------------------

    /// Current application state.
    pub fn state(&self) -> ApplicationState {
        self.state
    }

    /// Index of the current level, `None` before the first level.
    pub fn current_level_index(&self) -> Option<usize> {
        self.levels.cursor()
    }

    /// Level sequence and its cursor.
    pub fn levels(&self) -> &GameLevelSequence {
        &self.levels
    }

    /// Game-time multiplier: `0.0` while paused, `1.0` otherwise.
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Whether game time is stopped (paused).
    pub fn is_time_frozen(&self) -> bool {
        self.time_scale == 0.0
    }

    /// Whether `QuitGame` has been entered.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Whether `id` is in the loaded set.
    pub fn is_scene_loaded(&self, id: &str) -> bool {
        self.scenes.is_loaded(id)
    }

    /// The scene lifecycle manager.
    pub fn scenes(&self) -> &SceneLifecycleManager {
        &self.scenes
    }

    /// Mutable access to the scene lifecycle manager.
    pub fn scenes_mut(&mut self) -> &mut SceneLifecycleManager {
        &mut self.scenes
    }

    /// The scene catalog roles and levels resolve through.
    pub fn catalog(&self) -> &SceneCatalog {
        &self.catalog
    }

    /// Game information for the UI layer.
    pub fn info(&self) -> &GameInfo {
        &self.info
    }

    //--- Internal Helpers -------------------------------------------------

    fn run_state_action(&mut self) -> Result<(), GameError> {
        match self.state {
            ApplicationState::Idle => {
                info!("Idle");
                self.change_state(ApplicationState::MainMenu)
            }
            ApplicationState::MainMenu => {
                info!("MainMenu");
                self.load_role(MAIN_MENU, LoadMode::Single)
            }
            ApplicationState::Playing => {
                info!("Playing Game");
                Ok(())
            }
            ApplicationState::Paused => {
                info!("Paused");
                self.time_scale = 0.0;
                self.load_role(PAUSE_MENU, LoadMode::Additive)
            }
            ApplicationState::Restart => {
                info!("Restart Game");
                self.reset_all();
                self.start_level(None).map(|_| ())
            }
            ApplicationState::GameOver => {
                info!("Game Over");
                self.load_role(GAME_OVER, LoadMode::Single)
            }
            ApplicationState::QuitGame => {
                info!("Quit Game");
                self.quit_requested = true;
                if let Some(hook) = self.on_quit.as_mut() {
                    hook();
                }
                Ok(())
            }
        }
    }

    fn leave_pause(&mut self) {
        self.time_scale = 1.0;

        if let Some(pause_menu) = self.catalog.pause_menu().cloned() {
            // NotLoaded here just means the pause menu never made it in
            if let Err(e) = self.scenes.request_unload(&pause_menu) {
                debug!("Pause menu not unloaded: {}", e);
            }
        }
    }

    fn load_role(&mut self, role: &str, mode: LoadMode) -> Result<(), GameError> {
        let Some(id) = self.catalog.resolve(role).cloned() else {
            warn!("No scene mapped for '{}', skipping load", role);
            return Ok(());
        };
        self.request_load(&id, mode)
    }

    fn request_load(&mut self, id: &SceneId, mode: LoadMode) -> Result<(), GameError> {
        match self.scenes.request_load(id, mode) {
            Ok(_) | Err(SceneError::AlreadyLoaded(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
