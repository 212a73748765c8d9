use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::error::{CommandError, SaveError};
use crate::systems::building::CityState;
use crate::systems::events::{CityEvent, EventSink};

#[derive(Resource)]
pub struct SaveLoadConfig {
    pub path: String,
}

impl Default for SaveLoadConfig {
    fn default() -> Self {
        Self {
            path: "saves/city.json".to_string(),
        }
    }
}

/// Flat, self-contained copy of the ledger and registry. Type definitions
/// are not included; they are resolved by id when read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SaveSnapshot {
    pub gold: i64,
    #[serde(default)]
    pub buildings: Vec<BuildingInstance>,
}

impl SaveSnapshot {
    pub fn capture(city: &CityState<'_>) -> Self {
        Self {
            gold: city.ledger.balance(),
            buildings: city.registry.get_all(),
        }
    }
}

pub fn write_save_file(path: &str, snapshot: &SaveSnapshot) -> Result<(), SaveError> {
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }
    let serialized = serde_json::to_string_pretty(snapshot).map_err(SaveError::Encode)?;
    fs::write(path, serialized)?;
    Ok(())
}

/// `Ok(None)` when the slot is empty.
pub fn read_save_file(path: &str) -> Result<Option<SaveSnapshot>, SaveError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let snapshot = serde_json::from_str(&contents).map_err(SaveError::Parse)?;
    Ok(Some(snapshot))
}

pub fn save_game(
    city: &CityState<'_>,
    config: &SaveLoadConfig,
    bus: &mut impl EventSink,
) -> Result<SaveSnapshot, CommandError> {
    let snapshot = SaveSnapshot::capture(city);
    match write_save_file(&config.path, &snapshot) {
        Ok(()) => {
            info!(
                "Saved game to {} (gold: {}, buildings: {})",
                config.path,
                snapshot.gold,
                snapshot.buildings.len()
            );
            bus.publish(CityEvent::info("Game saved."));
            Ok(snapshot)
        }
        Err(err) => {
            error!("Failed to save game to {}: {}", config.path, err);
            let err = CommandError::from(err);
            bus.publish(CityEvent::warning(err.to_string()));
            Err(err)
        }
    }
}

pub fn load_game(
    city: &mut CityState<'_>,
    config: &SaveLoadConfig,
    bus: &mut impl EventSink,
) -> Result<SaveSnapshot, CommandError> {
    let snapshot = match read_save_file(&config.path) {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            info!("No save found at {}", config.path);
            let err = CommandError::NoSaveFound;
            bus.publish(CityEvent::warning(err.to_string()));
            return Err(err);
        }
        Err(err) => {
            error!("Failed to read save {}: {}", config.path, err);
            let err = CommandError::from(err);
            bus.publish(CityEvent::warning(err.to_string()));
            return Err(err);
        }
    };

    apply_snapshot(city, &snapshot, bus);

    info!(
        "Loaded game from {} (gold: {}, buildings: {})",
        config.path,
        snapshot.gold,
        snapshot.buildings.len()
    );
    bus.publish(CityEvent::info("Game loaded."));
    Ok(snapshot)
}

/// Replaces the city with `snapshot` and rebuilds grid occupancy from it.
pub fn apply_snapshot(city: &mut CityState<'_>, snapshot: &SaveSnapshot, bus: &mut impl EventSink) {
    for old in city.registry.get_all() {
        bus.publish(CityEvent::BuildingDeleted { id: old.id });
    }
    city.grid.clear(bus);

    city.ledger.set_balance(snapshot.gold, bus);
    city.registry.load_all(snapshot.buildings.clone());
    if city.registry.len() != snapshot.buildings.len() {
        warn!(
            "Save lists {} buildings but only {} ids are distinct; later duplicates win",
            snapshot.buildings.len(),
            city.registry.len()
        );
    }

    for building in city.registry.get_all() {
        match city.catalog.get_type(&building.type_id) {
            Some(building_type) => city.grid.set_occupancy(
                building.position,
                building_type.width,
                building_type.height,
                true,
                bus,
            ),
            None => warn!(
                "Loaded building {} has unknown type {}; no cells reserved",
                building.id, building.type_id
            ),
        }
        let message = format!("Loaded {} at {}", building.type_id, building.position);
        bus.publish(CityEvent::BuildingBuilt(building));
        bus.publish(CityEvent::info(message));
    }
}
