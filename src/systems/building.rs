use std::collections::HashMap;

use bevy::prelude::*;

use crate::components::*;
use crate::systems::catalog::BuildingCatalog;
use crate::systems::economy::EconomyLedger;
use crate::systems::grid::GridStore;

pub mod build;
pub mod delete;
pub mod move_building;
pub mod upgrade;

pub use build::*;
pub use delete::*;
pub use move_building::*;
pub use upgrade::*;

/// Live buildings keyed by id.
#[derive(Resource, Debug, Default, Clone)]
pub struct BuildingRegistry {
    buildings: HashMap<BuildingId, BuildingInstance>,
}

impl BuildingRegistry {
    pub fn add(&mut self, instance: BuildingInstance) {
        self.buildings.insert(instance.id.clone(), instance);
    }

    pub fn remove(&mut self, id: &BuildingId) -> Option<BuildingInstance> {
        self.buildings.remove(id)
    }

    /// Replaces a known building. Unknown ids are ignored.
    pub fn update(&mut self, instance: BuildingInstance) -> bool {
        match self.buildings.get_mut(&instance.id) {
            Some(existing) => {
                *existing = instance;
                true
            }
            None => false,
        }
    }

    pub fn get_by_id(&self, id: &BuildingId) -> Option<&BuildingInstance> {
        self.buildings.get(id)
    }

    pub fn contains(&self, id: &BuildingId) -> bool {
        self.buildings.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// Detached copy of every building, ordered by position then id.
    pub fn get_all(&self) -> Vec<BuildingInstance> {
        let mut all: Vec<BuildingInstance> = self.buildings.values().cloned().collect();
        all.sort_by(|a, b| {
            (a.position.y, a.position.x, &a.id).cmp(&(b.position.y, b.position.x, &b.id))
        });
        all
    }

    /// Gold per second across all buildings. Buildings whose type or level
    /// the catalog does not know contribute nothing.
    pub fn total_income(&self, catalog: &BuildingCatalog) -> i64 {
        self.buildings
            .values()
            .filter_map(|building| catalog.get_level_def(&building.type_id, building.level))
            .map(|level| level.income_per_second)
            .sum()
    }

    /// The building whose footprint covers `cell`, if any.
    pub fn building_at(&self, cell: GridPosition, catalog: &BuildingCatalog) -> Option<&BuildingInstance> {
        self.buildings.values().find(|building| {
            catalog.get_type(&building.type_id).is_some_and(|def| {
                let dx = i64::from(cell.x) - i64::from(building.position.x);
                let dy = i64::from(cell.y) - i64::from(building.position.y);
                (0..i64::from(def.width)).contains(&dx) && (0..i64::from(def.height)).contains(&dy)
            })
        })
    }

    /// Swaps in a whole new building set in one step.
    pub fn load_all(&mut self, buildings: Vec<BuildingInstance>) {
        self.buildings = buildings
            .into_iter()
            .map(|building| (building.id.clone(), building))
            .collect();
    }
}

/// Mutable borrow of everything a command handler may touch. Holding one
/// means no other handler or the income tick can run.
pub struct CityState<'a> {
    pub catalog: &'a BuildingCatalog,
    pub grid: &'a mut GridStore,
    pub registry: &'a mut BuildingRegistry,
    pub ledger: &'a mut EconomyLedger,
}


pub struct BuildingPlugin;

impl Plugin for BuildingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BuildingRegistry>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn building(type_id: &str, x: i32, y: i32, level: u32) -> BuildingInstance {
        BuildingInstance {
            level,
            ..BuildingInstance::new(type_id.into(), GridPosition::new(x, y))
        }
    }

    #[test]
    fn ids_are_unique() {
        let a = building("house", 0, 0, 1);
        let b = building("house", 0, 0, 1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn update_ignores_unknown_ids() {
        let mut registry = BuildingRegistry::default();
        let house = building("house", 0, 0, 1);
        registry.add(house.clone());

        let moved = BuildingInstance {
            position: GridPosition::new(4, 4),
            ..house.clone()
        };
        assert!(registry.update(moved));
        assert_eq!(
            registry.get_by_id(&house.id).map(|b| b.position),
            Some(GridPosition::new(4, 4))
        );
        assert!(!registry.update(building("farm", 1, 1, 1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn get_all_is_a_detached_copy() {
        let mut registry = BuildingRegistry::default();
        let house = building("house", 0, 0, 1);
        registry.add(house.clone());

        let snapshot = registry.get_all();
        registry.remove(&house.id);
        assert_eq!(snapshot, vec![house]);
        assert!(registry.is_empty());
    }

    #[test]
    fn total_income_skips_unresolvable_buildings() {
        let catalog = BuildingCatalog::default();
        let mut registry = BuildingRegistry::default();
        registry.add(building("house", 0, 0, 2));
        registry.add(building("mine", 4, 0, 1));
        registry.add(building("castle", 8, 0, 1));
        registry.add(building("farm", 12, 0, 9));

        assert_eq!(registry.total_income(&catalog), 2 + 5);
    }

    #[test]
    fn building_at_uses_catalog_footprint() {
        let catalog = BuildingCatalog::default();
        let mut registry = BuildingRegistry::default();
        let farm = building("farm", 2, 2, 1);
        registry.add(farm.clone());

        assert_eq!(
            registry.building_at(GridPosition::new(4, 4), &catalog).map(|b| &b.id),
            Some(&farm.id)
        );
        assert!(registry.building_at(GridPosition::new(5, 2), &catalog).is_none());
        assert!(registry.building_at(GridPosition::new(1, 2), &catalog).is_none());
    }

    #[test]
    fn building_at_handles_positions_near_i32_limits() {
        let catalog = BuildingCatalog::default();
        let mut registry = BuildingRegistry::default();
        let far = building("house", i32::MAX, i32::MIN, 1);
        registry.add(far.clone());

        assert!(registry.building_at(GridPosition::new(0, 0), &catalog).is_none());
        assert!(registry.building_at(GridPosition::new(i32::MIN, i32::MAX), &catalog).is_none());
        assert_eq!(
            registry
                .building_at(GridPosition::new(i32::MAX, i32::MIN + 1), &catalog)
                .map(|b| &b.id),
            Some(&far.id)
        );
    }

    #[test]
    fn load_all_replaces_contents() {
        let mut registry = BuildingRegistry::default();
        let old = building("house", 0, 0, 1);
        registry.add(old.clone());

        let fresh = vec![building("farm", 3, 3, 1), building("mine", 9, 9, 2)];
        registry.load_all(fresh.clone());

        assert!(!registry.contains(&old.id));
        assert_eq!(registry.len(), 2);
        for b in &fresh {
            assert_eq!(registry.get_by_id(&b.id), Some(b));
        }
    }
}
