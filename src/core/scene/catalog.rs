//=========================================================================
// Scene Catalog
//=========================================================================
//
// Resolves logical scene names ("main_menu", "level_1") to loader-facing
// scene identifiers, plus the ordered list of game levels.
//
// The table is authored elsewhere (editor tooling, config file) and handed
// over before first use. Missing entries resolve to None.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{debug, warn};
use serde::Deserialize;

//=== Internal Dependencies ===============================================

use super::SceneId;

//=== Well-Known Roles ====================================================

pub const MAIN_MENU: &str = "main_menu";
pub const PAUSE_MENU: &str = "pause_menu";
pub const OPTIONS_MENU: &str = "options_menu";
pub const HUD: &str = "hud";
pub const GAME_OVER: &str = "game_over";

//=== SceneCatalog ========================================================

/// Logical-name → scene-identifier table.
///
/// ```rust
/// # use aetheric_scenes::core::scene::SceneCatalog;
/// let catalog = SceneCatalog::new()
///     .with_scene("main_menu", "MainMenu")
///     .with_level("level_1", "Forest");
///
/// assert_eq!(catalog.main_menu().map(|id| id.as_str()), Some("MainMenu"));
/// assert!(catalog.pause_menu().is_none());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneCatalog {
    names: HashMap<String, SceneId>,
    levels: Vec<String>,
}

impl SceneCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    //--- Building ---------------------------------------------------------

    /// Adds or replaces the mapping for `name`.
    pub fn with_scene(mut self, name: impl Into<String>, id: impl Into<SceneId>) -> Self {
        self.insert(name, id);
        self
    }

    /// Maps `name` to `id` and appends `name` to the level order.
    pub fn with_level(mut self, name: impl Into<String>, id: impl Into<SceneId>) -> Self {
        let name = name.into();
        self.insert(name.clone(), id);
        self.levels.push(name);
        self
    }

    /// Maps `name` to `id`, warning when an existing mapping is replaced.
    pub fn insert(&mut self, name: impl Into<String>, id: impl Into<SceneId>) {
        let name = name.into();
        let id = id.into();
        if let Some(previous) = self.names.insert(name.clone(), id.clone()) {
            warn!("Scene name '{}' remapped from '{}' to '{}'", name, previous, id);
        }
    }

    //--- Resolution -------------------------------------------------------

    /// Resolves a logical name. Unknown names and empty identifiers give
    /// `None`.
    pub fn resolve(&self, name: &str) -> Option<&SceneId> {
        self.names.get(name).filter(|id| !id.is_empty())
    }

    /// Scene for the main menu role.
    pub fn main_menu(&self) -> Option<&SceneId> {
        self.resolve(MAIN_MENU)
    }

    /// Scene for the pause menu role.
    pub fn pause_menu(&self) -> Option<&SceneId> {
        self.resolve(PAUSE_MENU)
    }

    /// Scene for the options menu role.
    pub fn options_menu(&self) -> Option<&SceneId> {
        self.resolve(OPTIONS_MENU)
    }

    /// Scene for the in-game HUD role.
    pub fn hud(&self) -> Option<&SceneId> {
        self.resolve(HUD)
    }

    /// Scene for the game over role.
    pub fn game_over(&self) -> Option<&SceneId> {
        self.resolve(GAME_OVER)
    }

    /// Level scene identifiers in load order.
    ///
    /// Level names that do not resolve are skipped with a warning.
    pub fn level_sequence(&self) -> Vec<SceneId> {
        self.levels
            .iter()
            .filter_map(|name| {
                let resolved = self.resolve(name).cloned();
                if resolved.is_none() {
                    warn!("Level '{}' has no scene mapped, skipping", name);
                }
                resolved
            })
            .collect()
    }

    /// Every resolvable scene identifier, sorted and deduplicated.
    pub fn scene_ids(&self) -> Vec<SceneId> {
        let mut ids: Vec<SceneId> = self
            .names
            .values()
            .filter(|id| !id.is_empty())
            .cloned()
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Logs the resolved table at debug level.
    pub fn log_summary(&self) {
        for role in [MAIN_MENU, PAUSE_MENU, OPTIONS_MENU, HUD, GAME_OVER] {
            match self.resolve(role) {
                Some(id) => debug!("{} is: {}", role, id),
                None => debug!("{} is unresolved", role),
            }
        }
        for (i, id) in self.level_sequence().iter().enumerate() {
            debug!("Game level {} is: {}", i, id);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_roles() {
        let catalog = SceneCatalog::new()
            .with_scene(MAIN_MENU, "MainMenu")
            .with_scene(GAME_OVER, "GameOver");

        assert_eq!(catalog.main_menu(), Some(&SceneId::from("MainMenu")));
        assert_eq!(catalog.game_over(), Some(&SceneId::from("GameOver")));
        assert_eq!(catalog.pause_menu(), None);
        assert_eq!(catalog.resolve("does_not_exist"), None);
    }

    #[test]
    fn empty_identifier_is_unresolved() {
        let catalog = SceneCatalog::new().with_scene(HUD, "");
        assert_eq!(catalog.hud(), None);
        assert!(catalog.scene_ids().is_empty());
    }

    #[test]
    fn level_sequence_keeps_order_and_skips_unresolved() {
        let mut catalog = SceneCatalog::new()
            .with_level("level_1", "Forest")
            .with_level("level_2", "Cave");
        catalog.levels.push("level_3".to_string());

        assert_eq!(
            catalog.level_sequence(),
            vec![SceneId::from("Forest"), SceneId::from("Cave")]
        );
    }

    #[test]
    fn scene_ids_are_sorted_and_unique() {
        let catalog = SceneCatalog::new()
            .with_scene(MAIN_MENU, "Menu")
            .with_scene(OPTIONS_MENU, "Menu")
            .with_level("level_1", "Arena");

        assert_eq!(
            catalog.scene_ids(),
            vec![SceneId::from("Arena"), SceneId::from("Menu")]
        );
    }

    #[test]
    fn deserializes_from_toml() {
        let catalog: SceneCatalog = toml::from_str(
            r#"
            levels = ["level_1"]

            [names]
            main_menu = "MainMenu"
            level_1 = "Level1"
            "#,
        )
        .unwrap();

        assert_eq!(catalog.main_menu(), Some(&SceneId::from("MainMenu")));
        assert_eq!(catalog.level_sequence(), vec![SceneId::from("Level1")]);
    }
}
