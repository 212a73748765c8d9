use bevy::prelude::*;

use crate::components::*;
use crate::error::CommandError;
use crate::systems::building::CityState;
use crate::systems::events::{CityEvent, EventSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub id: BuildingId,
}

/// Removes a building and frees its footprint. A building whose type has
/// vanished from the catalog is still removed, but its cells stay occupied.
pub fn delete_building(
    city: &mut CityState<'_>,
    request: &DeleteRequest,
    bus: &mut impl EventSink,
) -> Result<BuildingInstance, CommandError> {
    let result = try_delete(city, request, bus);
    match &result {
        Ok(building) => {
            info!("Deleted {} {}", building.type_id, building.id);
            bus.publish(CityEvent::info("Building deleted."));
        }
        Err(err) => {
            warn!("Delete of {} rejected: {}", request.id, err);
            bus.publish(CityEvent::warning(err.to_string()));
        }
    }
    result
}

fn try_delete(
    city: &mut CityState<'_>,
    request: &DeleteRequest,
    bus: &mut impl EventSink,
) -> Result<BuildingInstance, CommandError> {
    let building = city
        .registry
        .get_by_id(&request.id)
        .cloned()
        .ok_or_else(|| CommandError::UnknownBuilding(request.id.clone()))?;

    match city.catalog.get_type(&building.type_id) {
        Some(building_type) => city.grid.set_occupancy(
            building.position,
            building_type.width,
            building_type.height,
            false,
            bus,
        ),
        None => warn!(
            "Type {} of {} is not in the catalog; its cells stay occupied",
            building.type_id, building.id
        ),
    }

    city.registry.remove(&building.id);
    bus.publish(CityEvent::BuildingDeleted {
        id: building.id.clone(),
    });

    Ok(building)
}
