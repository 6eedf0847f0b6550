//=========================================================================
// Game Level Sequence
//=========================================================================
//
// Ordered level scenes plus the cursor of the level currently selected.
//
// The cursor starts at None (no level loaded). After every advance() it is
// either None or a valid index: running past the last level is an error
// and leaves the cursor on the last level.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::core::error::GameError;
use crate::core::scene::SceneId;

//=== LevelSelection ======================================================

/// How a level was picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSource {
    /// The level after the previous one.
    Next,

    /// The level with the requested name.
    Named,

    /// The requested name was unknown; the first level was used instead.
    Fallback { requested: String },
}

/// A level chosen by [`GameLevelSequence::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSelection {
    pub index: usize,
    pub scene: SceneId,
    pub source: LevelSource,
}

//=== GameLevelSequence ===================================================

#[derive(Debug, Clone, Default)]
pub struct GameLevelSequence {
    levels: Vec<SceneId>,
    cursor: Option<usize>,
}

impl GameLevelSequence {
    /// Creates a sequence with the cursor before the first level.
    pub fn new(levels: Vec<SceneId>) -> Self {
        Self {
            levels,
            cursor: None,
        }
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether there are no levels at all.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level scenes in play order.
    pub fn levels(&self) -> &[SceneId] {
        &self.levels
    }

    /// Index of the selected level, `None` before the first selection.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Scene of the selected level, if any.
    pub fn current(&self) -> Option<&SceneId> {
        self.cursor.and_then(|i| self.levels.get(i))
    }

    /// Index of the level whose scene is named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.levels.iter().position(|level| level.as_str() == name)
    }

    /// Returns the cursor to "no level loaded".
    pub fn reset(&mut self) {
        self.cursor = None;
    }

    /// Selects the next level (`name == None`) or the named level.
    ///
    /// An unknown name falls back to the first level.
    ///
    /// # Errors
    ///
    /// [`GameError::LevelIndexOutOfRange`] when advancing past the last
    /// level or when the sequence is empty. The cursor does not move.
    pub fn advance(&mut self, name: Option<&str>) -> Result<LevelSelection, GameError> {
        debug!(
            "Initial level index: {:?}, total game levels: {}",
            self.cursor,
            self.levels.len()
        );

        let (index, source) = match name {
            None => {
                let next = self.cursor.map_or(0, |i| i + 1);
                if next >= self.levels.len() {
                    warn!("No more game levels");
                    return Err(GameError::LevelIndexOutOfRange {
                        index: next,
                        len: self.levels.len(),
                    });
                }
                (next, LevelSource::Next)
            }
            Some(name) => match self.position(name) {
                Some(index) => (index, LevelSource::Named),
                None => {
                    warn!(
                        "Game level '{}' not found. Defaulting to the first level.",
                        name
                    );
                    if self.levels.is_empty() {
                        return Err(GameError::LevelIndexOutOfRange { index: 0, len: 0 });
                    }
                    (
                        0,
                        LevelSource::Fallback {
                            requested: name.to_string(),
                        },
                    )
                }
            },
        };

        self.cursor = Some(index);
        let scene = self.levels[index].clone();
        debug!("Level to load: {} (index {})", scene, index);

        Ok(LevelSelection {
            index,
            scene,
            source,
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
