use bevy::prelude::*;

use crate::components::*;
use crate::error::CommandError;
use crate::systems::building::CityState;
use crate::systems::events::{CityEvent, EventSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub id: BuildingId,
    pub position: GridPosition,
}

/// Relocates a building. On failure the old footprint is occupied again
/// before returning.
pub fn move_building(
    city: &mut CityState<'_>,
    request: &MoveRequest,
    bus: &mut impl EventSink,
) -> Result<BuildingInstance, CommandError> {
    let result = try_move(city, request, bus);
    match &result {
        Ok(building) => {
            info!("Moved {} to {}", building.id, building.position);
            bus.publish(CityEvent::info("Building moved."));
        }
        Err(err) => {
            warn!("Move of {} to {} rejected: {}", request.id, request.position, err);
            bus.publish(CityEvent::warning(err.to_string()));
        }
    }
    result
}

fn try_move(
    city: &mut CityState<'_>,
    request: &MoveRequest,
    bus: &mut impl EventSink,
) -> Result<BuildingInstance, CommandError> {
    let mut building = city
        .registry
        .get_by_id(&request.id)
        .cloned()
        .ok_or_else(|| CommandError::UnknownBuilding(request.id.clone()))?;

    let building_type = city
        .catalog
        .get_type(&building.type_id)
        .ok_or_else(|| CommandError::UnknownType(building.type_id.clone()))?;
    let (width, height) = (building_type.width, building_type.height);

    city.grid
        .set_occupancy(building.position, width, height, false, bus);

    if !city.grid.can_place(request.position, width, height) {
        city.grid
            .set_occupancy(building.position, width, height, true, bus);
        return Err(CommandError::CellsOccupied);
    }

    city.grid
        .set_occupancy(request.position, width, height, true, bus);

    building.position = request.position;
    city.registry.update(building.clone());
    bus.publish(CityEvent::BuildingMoved {
        id: building.id.clone(),
        position: building.position,
    });

    Ok(building)
}
