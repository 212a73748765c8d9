use bevy::prelude::*;

use crate::components::*;
use crate::error::CommandError;
use crate::systems::building::CityState;
use crate::systems::events::{CityEvent, EventSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub type_id: BuildingTypeId,
    pub position: GridPosition,
}

/// Places a new level-1 building, paying its level-1 cost.
pub fn build_building(
    city: &mut CityState<'_>,
    request: &BuildRequest,
    bus: &mut impl EventSink,
) -> Result<BuildingInstance, CommandError> {
    let result = try_build(city, request, bus);
    match &result {
        Ok(building) => {
            info!("Built {} {} at {}", building.type_id, building.id, building.position);
            bus.publish(CityEvent::info("Building constructed."));
        }
        Err(err) => {
            warn!("Build of {} at {} rejected: {}", request.type_id, request.position, err);
            bus.publish(CityEvent::warning(err.to_string()));
        }
    }
    result
}

fn try_build(
    city: &mut CityState<'_>,
    request: &BuildRequest,
    bus: &mut impl EventSink,
) -> Result<BuildingInstance, CommandError> {
    let building_type = city
        .catalog
        .get_type(&request.type_id)
        .ok_or_else(|| CommandError::UnknownType(request.type_id.clone()))?;

    if !city
        .grid
        .can_place(request.position, building_type.width, building_type.height)
    {
        return Err(CommandError::CellsOccupied);
    }

    let cost = building_type
        .level(1)
        .map(|level| level.gold_cost)
        .ok_or_else(|| CommandError::UnknownType(request.type_id.clone()))?;
    if !city.ledger.try_adjust(-cost, bus) {
        return Err(CommandError::InsufficientGold {
            required: cost,
            available: city.ledger.balance(),
        });
    }

    city.grid.set_occupancy(
        request.position,
        building_type.width,
        building_type.height,
        true,
        bus,
    );

    let building = BuildingInstance::new(request.type_id.clone(), request.position);
    city.registry.add(building.clone());
    bus.publish(CityEvent::BuildingBuilt(building.clone()));

    Ok(building)
}
