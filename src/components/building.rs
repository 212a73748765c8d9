use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::components::BuildingTypeId;

/// Integer cell coordinate. A building is anchored at its lowest x/y cell;
/// footprints extend towards +x and +y.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Saturates at the `i32` limits, which lie outside any grid.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingId(pub String);

impl BuildingId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<&str> for BuildingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A placed building. Owned by the registry; everything else refers to it by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingInstance {
    pub id: BuildingId,
    pub type_id: BuildingTypeId,
    pub position: GridPosition,
    pub level: u32,
    /// Stored and persisted only. Footprints stay axis-aligned.
    pub rotation: i32,
}

impl BuildingInstance {
    pub fn new(type_id: BuildingTypeId, position: GridPosition) -> Self {
        Self {
            id: BuildingId::generate(),
            type_id,
            position,
            level: 1,
            rotation: 0,
        }
    }
}

/// Marker for the view entity that renders a building.
#[derive(Component, Debug, Clone)]
pub struct BuildingSprite {
    pub id: BuildingId,
}

#[derive(Component)]
pub struct PlacementPreview;
