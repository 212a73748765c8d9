use bevy::prelude::*;

use crate::components::*;
use crate::error::CommandError;
use crate::systems::building::CityState;
use crate::systems::events::{CityEvent, EventSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeRequest {
    pub id: BuildingId,
}

/// Raises a building one level, paying the next level's cost.
pub fn upgrade_building(
    city: &mut CityState<'_>,
    request: &UpgradeRequest,
    bus: &mut impl EventSink,
) -> Result<BuildingInstance, CommandError> {
    let result = try_upgrade(city, request, bus);
    match &result {
        Ok(building) => {
            info!("Upgraded {} to level {}", building.id, building.level);
            bus.publish(CityEvent::info("Building upgraded."));
        }
        Err(err) => {
            warn!("Upgrade of {} rejected: {}", request.id, err);
            bus.publish(CityEvent::warning(err.to_string()));
        }
    }
    result
}

fn try_upgrade(
    city: &mut CityState<'_>,
    request: &UpgradeRequest,
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

    let next_level = building.level + 1;
    let Some(next) = building_type.level(next_level) else {
        return Err(CommandError::MaxLevelReached {
            level: building_type.max_level(),
        });
    };

    if !city.ledger.try_adjust(-next.gold_cost, bus) {
        return Err(CommandError::InsufficientGold {
            required: next.gold_cost,
            available: city.ledger.balance(),
        });
    }

    building.level = next_level;
    city.registry.update(building.clone());
    bus.publish(CityEvent::BuildingUpgraded {
        id: building.id.clone(),
        level: next_level,
    });

    Ok(building)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::building::testing::TestCity;
    use crate::systems::building::{build_building, BuildRequest};

    fn house(city: &mut TestCity) -> BuildingInstance {
        let request = BuildRequest {
            type_id: "house".into(),
            position: GridPosition::new(0, 0),
        };
        build_building(&mut city.state(), &request, &mut Vec::new()).unwrap()
    }

    #[test]
    fn upgrade_pays_next_level_cost() {
        let mut city = TestCity::with_gold(200);
        let building = house(&mut city);
        let mut events = Vec::new();

        let upgraded = upgrade_building(
            &mut city.state(),
            &UpgradeRequest {
                id: building.id.clone(),
            },
            &mut events,
        )
        .unwrap();

        assert_eq!(upgraded.level, 2);
        assert_eq!(city.ledger.balance(), 200 - 50 - 100);
        assert_eq!(city.registry.get_by_id(&building.id).map(|b| b.level), Some(2));
        assert_eq!(
            events,
            vec![
                CityEvent::EconomyStateChanged { gold: 50 },
                CityEvent::BuildingUpgraded {
                    id: building.id.clone(),
                    level: 2
                },
                CityEvent::info("Building upgraded."),
            ]
        );
    }

    #[test]
    fn max_level_fails_regardless_of_gold() {
        let mut city = TestCity::with_gold(1_000_000);
        let building = house(&mut city);
        let request = UpgradeRequest {
            id: building.id.clone(),
        };
        upgrade_building(&mut city.state(), &request, &mut Vec::new()).unwrap();
        upgrade_building(&mut city.state(), &request, &mut Vec::new()).unwrap();
        let balance = city.ledger.balance();

        let err = upgrade_building(&mut city.state(), &request, &mut Vec::new()).unwrap_err();
        assert_eq!(err, CommandError::MaxLevelReached { level: 3 });
        assert_eq!(city.ledger.balance(), balance);
        assert_eq!(city.registry.get_by_id(&building.id).map(|b| b.level), Some(3));
    }

    #[test]
    fn insufficient_gold_keeps_level() {
        let mut city = TestCity::with_gold(120);
        let building = house(&mut city);
        let mut events = Vec::new();

        let err = upgrade_building(
            &mut city.state(),
            &UpgradeRequest {
                id: building.id.clone(),
            },
            &mut events,
        )
        .unwrap_err();

        assert_eq!(
            err,
            CommandError::InsufficientGold {
                required: 100,
                available: 70
            }
        );
        assert_eq!(city.ledger.balance(), 70);
        assert_eq!(city.registry.get_by_id(&building.id).map(|b| b.level), Some(1));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn unknown_building_is_rejected() {
        let mut city = TestCity::with_gold(100);
        let request = UpgradeRequest { id: "ghost".into() };
        assert_eq!(
            upgrade_building(&mut city.state(), &request, &mut Vec::new()),
            Err(CommandError::UnknownBuilding("ghost".into()))
        );
    }

    #[test]
    fn out_of_range_level_counts_as_max_level() {
        let mut city = TestCity::with_gold(10_000);
        let mut stray = BuildingInstance::new("farm".into(), GridPosition::new(0, 0));
        stray.level = 7;
        city.registry.add(stray.clone());

        let request = UpgradeRequest { id: stray.id.clone() };
        assert_eq!(
            upgrade_building(&mut city.state(), &request, &mut Vec::new()),
            Err(CommandError::MaxLevelReached { level: 2 })
        );
    }
}
