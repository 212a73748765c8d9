use std::collections::HashSet;
use std::fs;

use bevy::prelude::*;

use crate::components::*;
use crate::error::CatalogError;

#[derive(Resource)]
pub struct CatalogConfig {
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: "assets/catalog/buildings.json".to_string(),
        }
    }
}

/// Read-only building definitions, in configuration order.
#[derive(Resource, Debug, Clone)]
pub struct BuildingCatalog {
    types: Vec<BuildingTypeDef>,
}

impl BuildingCatalog {
    pub fn new(types: Vec<BuildingTypeDef>) -> Result<Self, CatalogError> {
        validate_types(&types)?;
        Ok(Self { types })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let types: Vec<BuildingTypeDef> = serde_json::from_str(json)?;
        Self::new(types)
    }

    pub fn from_file(path: &str) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Loads the configured catalog, falling back to the built-in one.
    pub fn load_or_default(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(catalog) => {
                info!("Loaded {} building types from {}", catalog.types.len(), path);
                catalog
            }
            Err(err) => {
                error!("Failed to load catalog {}: {}. Using built-in catalog.", path, err);
                Self::default()
            }
        }
    }

    pub fn get_type(&self, type_id: &BuildingTypeId) -> Option<&BuildingTypeDef> {
        self.types.iter().find(|def| &def.id == type_id)
    }

    pub fn get_level_def(&self, type_id: &BuildingTypeId, level: u32) -> Option<&LevelDef> {
        self.get_type(type_id).and_then(|def| def.level(level))
    }

    pub fn max_level(&self, type_id: &BuildingTypeId) -> Option<u32> {
        self.get_type(type_id).map(BuildingTypeDef::max_level)
    }

    /// Cost of the next level above `level`, if there is one.
    pub fn upgrade_cost(&self, type_id: &BuildingTypeId, level: u32) -> Option<i64> {
        self.get_level_def(type_id, level + 1).map(|def| def.gold_cost)
    }

    pub fn types(&self) -> &[BuildingTypeDef] {
        &self.types
    }
}

impl Default for BuildingCatalog {
    fn default() -> Self {
        Self {
            types: default_building_types(),
        }
    }
}

fn validate_types(types: &[BuildingTypeDef]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for def in types {
        if !seen.insert(&def.id) {
            return Err(CatalogError::Invalid(format!("duplicate type '{}'", def.id)));
        }
        if def.width < 1 || def.height < 1 {
            return Err(CatalogError::Invalid(format!(
                "type '{}' has an empty footprint {}x{}",
                def.id, def.width, def.height
            )));
        }
        if def.levels.is_empty() {
            return Err(CatalogError::Invalid(format!("type '{}' has no levels", def.id)));
        }
        for (index, level) in def.levels.iter().enumerate() {
            if level.level != index as u32 + 1 {
                return Err(CatalogError::Invalid(format!(
                    "type '{}' level #{} is numbered {}",
                    def.id,
                    index + 1,
                    level.level
                )));
            }
            if level.gold_cost < 0 || level.income_per_second < 0 {
                return Err(CatalogError::Invalid(format!(
                    "type '{}' level {} has a negative cost or income",
                    def.id, level.level
                )));
            }
        }
    }
    Ok(())
}

fn levels(table: &[(i64, i64)]) -> Vec<LevelDef> {
    table
        .iter()
        .enumerate()
        .map(|(index, (gold_cost, income_per_second))| LevelDef {
            level: index as u32 + 1,
            gold_cost: *gold_cost,
            income_per_second: *income_per_second,
        })
        .collect()
}

fn default_building_types() -> Vec<BuildingTypeDef> {
    vec![
        BuildingTypeDef {
            id: "house".into(),
            title: "House".to_string(),
            display_name: "House".to_string(),
            width: 2,
            height: 2,
            levels: levels(&[(50, 1), (100, 2), (200, 4)]),
        },
        BuildingTypeDef {
            id: "farm".into(),
            title: "Farm".to_string(),
            display_name: "Farm".to_string(),
            width: 3,
            height: 3,
            levels: levels(&[(80, 2), (160, 4)]),
        },
        BuildingTypeDef {
            id: "mine".into(),
            title: "Mine".to_string(),
            display_name: "Gold Mine".to_string(),
            width: 2,
            height: 2,
            levels: levels(&[(150, 5), (300, 8), (600, 12)]),
        },
    ]
}

pub struct CatalogPlugin;

impl Plugin for CatalogPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CatalogConfig>();
        if !app.world().contains_resource::<BuildingCatalog>() {
            let path = app.world().resource::<CatalogConfig>().path.clone();
            app.insert_resource(BuildingCatalog::load_or_default(&path));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_catalog_is_valid() {
        let catalog = BuildingCatalog::default();
        assert!(validate_types(catalog.types()).is_ok());
        assert_eq!(catalog.types().len(), 3);
    }

    #[test]
    fn level_lookup_reports_out_of_range() {
        let catalog = BuildingCatalog::default();
        let house = BuildingTypeId::from("house");
        assert_eq!(catalog.get_level_def(&house, 1).map(|l| l.gold_cost), Some(50));
        assert!(catalog.get_level_def(&house, 0).is_none());
        assert!(catalog.get_level_def(&house, 4).is_none());
        assert!(catalog.get_level_def(&"castle".into(), 1).is_none());
        assert_eq!(catalog.max_level(&house), Some(3));
        assert_eq!(catalog.upgrade_cost(&house, 1), Some(100));
        assert_eq!(catalog.upgrade_cost(&house, 3), None);
    }

    #[test]
    fn parses_json_configuration() {
        let json = r#"[
            {
                "id": "tower",
                "display_name": "Watch Tower",
                "width": 1,
                "height": 2,
                "levels": [
                    { "level": 1, "gold_cost": 30, "income_per_second": 0 },
                    { "level": 2, "gold_cost": 60, "income_per_second": 1 }
                ]
            }
        ]"#;
        let catalog = BuildingCatalog::from_json(json).unwrap();
        let tower = catalog.get_type(&"tower".into()).unwrap();
        assert_eq!(tower.name(), "Watch Tower");
        assert_eq!((tower.width, tower.height), (1, 2));
        assert_eq!(tower.max_level(), 2);
    }

    #[test]
    fn rejects_misnumbered_levels() {
        let json = r#"[{ "id": "x", "width": 1, "height": 1,
            "levels": [ { "level": 2, "gold_cost": 1, "income_per_second": 1 } ] }]"#;
        assert!(matches!(
            BuildingCatalog::from_json(json),
            Err(CatalogError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_duplicates_and_empty_footprints() {
        let mut types = default_building_types();
        types.push(types[0].clone());
        assert!(BuildingCatalog::new(types).is_err());

        let mut types = default_building_types();
        types[1].width = 0;
        assert!(BuildingCatalog::new(types).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_built_in() {
        let catalog = BuildingCatalog::load_or_default("does/not/exist.json");
        assert!(catalog.get_type(&"farm".into()).is_some());
    }
}
