//! Level configuration supplied by the level catalog.

use crate::error::{Error, Result};
use crate::types::{Coord, Pose};
use serde::{Deserialize, Serialize};

/// A short text in both supported languages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub zh: String,
}

impl LocalizedText {
    pub fn new(en: &str, zh: &str) -> Self {
        Self {
            en: en.to_string(),
            zh: zh.to_string(),
        }
    }
}

/// Optional victory constraints beyond reaching the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictoryConditions {
    /// Coins that must be collected; defaults to all coins on the level.
    pub required_coins: Option<u32>,
    /// Maximum moves allowed; unbounded when absent.
    pub max_moves: Option<u32>,
}

/// Static description of one game level.
///
/// Immutable for the lifetime of a run; the engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    pub id: String,
    pub name: LocalizedText,
    /// Grid is `grid_size` × `grid_size`, origin top-left.
    pub grid_size: i32,
    pub start_pos: Pose,
    pub target_pos: Coord,
    #[serde(default)]
    pub walls: Vec<Coord>,
    #[serde(default)]
    pub coins: Vec<Coord>,
    /// Command ids enabled for this level, in editor order.
    pub available_commands: Vec<String>,
    #[serde(default)]
    pub default_code: String,
    #[serde(default)]
    pub victory_conditions: Option<VictoryConditions>,
    #[serde(default)]
    pub difficulty: u8,
}

impl LevelConfig {
    /// Effective required-coin count: explicit value, else total coins.
    pub fn required_coins(&self) -> u32 {
        self.victory_conditions
            .and_then(|v| v.required_coins)
            .unwrap_or(self.coins.len() as u32)
    }

    /// Effective max-move bound, if one is configured.
    pub fn max_moves(&self) -> Option<u32> {
        self.victory_conditions.and_then(|v| v.max_moves)
    }

    /// Check the structural invariants the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.grid_size <= 0 {
            return Err(Error::Validation(format!(
                "Level {}: grid size must be positive",
                self.id
            )));
        }

        if !self.start_pos.coord().in_bounds(self.grid_size) {
            return Err(Error::Validation(format!(
                "Level {}: start position out of bounds",
                self.id
            )));
        }

        if !self.target_pos.in_bounds(self.grid_size) {
            return Err(Error::Validation(format!(
                "Level {}: target position out of bounds",
                self.id
            )));
        }

        if self.walls.contains(&self.start_pos.coord()) {
            return Err(Error::Validation(format!(
                "Level {}: start position is a wall",
                self.id
            )));
        }

        if self.walls.contains(&self.target_pos) {
            return Err(Error::Validation(format!(
                "Level {}: target position is a wall",
                self.id
            )));
        }

        for cell in self.walls.iter().chain(self.coins.iter()) {
            if !cell.in_bounds(self.grid_size) {
                return Err(Error::Validation(format!(
                    "Level {}: cell {} out of bounds",
                    self.id, cell
                )));
            }
        }

        Ok(())
    }
}
