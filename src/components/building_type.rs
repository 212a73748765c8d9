use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::GridPosition;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingTypeId(pub String);

impl From<&str> for BuildingTypeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for BuildingTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDef {
    pub level: u32,
    /// Gold needed to reach this level (for level 1, the build cost).
    pub gold_cost: i64,
    pub income_per_second: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingTypeDef {
    pub id: BuildingTypeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub display_name: String,
    pub width: i32,
    pub height: i32,
    pub levels: Vec<LevelDef>,
}

impl BuildingTypeDef {
    pub fn max_level(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn level(&self, level: u32) -> Option<&LevelDef> {
        if level == 0 {
            return None;
        }
        self.levels.get(level as usize - 1)
    }

    pub fn name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.id.0
        } else {
            &self.display_name
        }
    }

    /// Cells covered when anchored at `origin`, row-major.
    pub fn tiles_occupied(&self, origin: GridPosition) -> Vec<GridPosition> {
        let mut tiles = Vec::with_capacity((self.width * self.height).max(0) as usize);
        for dy in 0..self.height {
            for dx in 0..self.width {
                tiles.push(origin.offset(dx, dy));
            }
        }
        tiles
    }

    pub fn color(&self) -> Color {
        match self.id.0.as_str() {
            "house" => Color::srgb(0.8, 0.5, 0.3),
            "farm" => Color::srgb(0.5, 0.7, 0.2),
            "mine" => Color::srgb(0.45, 0.45, 0.5),
            _ => Color::srgb(0.6, 0.6, 0.7),
        }
    }
}
