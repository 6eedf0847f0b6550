//=========================================================================
// Scene System
//=========================================================================
//
// Tracks which scenes are loaded and serializes load/unload work per scene.
//
// Architecture:
//   SceneLifecycleManager
//     ├─ records: HashMap<SceneId, SceneRecord>
//     ├─ loader: Box<dyn SceneLoader>
//     └─ completions: crossbeam Receiver<SceneCompletion>
//
// Flow:
//   request_load() → SceneLoader::begin_load() → [loader thread]
//        → CompletionHandle::succeed() → poll_completions() → record updated
//
//=========================================================================

//=== External Dependencies ===============================================

use std::borrow::Borrow;
use std::fmt;

use serde::Deserialize;

//=== Module Declarations =================================================

pub mod catalog;
mod lifecycle;
mod loader;
mod manual_loader;

//=== Public API ==========================================================

pub use catalog::SceneCatalog;
pub use lifecycle::{RequestOutcome, SceneEvent, SceneLifecycleManager};
pub use loader::{
    CompletionHandle, LoaderError, OperationId, SceneCompletion, SceneLoader, SceneOp,
    ThreadedLoader,
};
pub use manual_loader::ManualLoader;

//=== SceneId =============================================================

/// Identifier of a loadable scene.
///
/// Wraps the loader-facing scene name. Lookups by `&str` work on any map
/// keyed by `SceneId` through the [`Borrow`] impl.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct SceneId(String);

impl SceneId {
    /// Wraps a loader-facing scene name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The scene name as passed to the loader.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty identifiers never name a real scene and are rejected by the
    /// lifecycle manager.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SceneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SceneId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SceneId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

//=== LoadMode ============================================================

/// How a scene is brought in relative to the scenes already loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadMode {
    /// Replaces the exclusive scene and everything loaded beside it.
    #[default]
    Single,

    /// Loads alongside the scenes already present (menus, overlays).
    Additive,
}

impl LoadMode {
    /// Maps a loader-style `additive` flag to a mode.
    pub fn from_additive(additive: bool) -> Self {
        if additive {
            Self::Additive
        } else {
            Self::Single
        }
    }

    /// Whether the scene loads alongside the resident ones.
    pub fn is_additive(self) -> bool {
        self == Self::Additive
    }
}

//=== SceneState ==========================================================

/// Lifecycle position of a single scene identifier.
///
/// `Unloaded → Loading → Loaded → Unloading → Unloaded`. A failed load falls
/// back to `Unloaded`; a failed unload falls back to `Loaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneState {
    Unloaded,
    Loading,
    Loaded,
    Unloading,
}

impl SceneState {
    /// Whether an operation for this scene is currently outstanding.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Loading | Self::Unloading)
    }

    /// Whether the scene counts as a member of the loaded set.
    ///
    /// A scene being unloaded is still loaded until the unload completes.
    pub fn is_resident(self) -> bool {
        matches!(self, Self::Loaded | Self::Unloading)
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn scene_id_looks_up_by_str() {
        let mut map = HashMap::new();
        map.insert(SceneId::from("MainMenu"), 1);

        assert_eq!(map.get("MainMenu"), Some(&1));
        assert_eq!(map.get("PauseMenu"), None);
    }

    #[test]
    fn load_mode_from_additive_flag() {
        assert_eq!(LoadMode::from_additive(true), LoadMode::Additive);
        assert_eq!(LoadMode::from_additive(false), LoadMode::Single);
        assert_eq!(LoadMode::default(), LoadMode::Single);
    }

    #[test]
    fn resident_states_are_loaded_and_unloading() {
        assert!(!SceneState::Unloaded.is_resident());
        assert!(!SceneState::Loading.is_resident());
        assert!(SceneState::Loaded.is_resident());
        assert!(SceneState::Unloading.is_resident());

        assert!(SceneState::Loading.is_in_flight());
        assert!(!SceneState::Loaded.is_in_flight());
    }
}
