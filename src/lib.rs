use bevy::app::PluginGroupBuilder;
use bevy::prelude::*;

pub mod components;
pub mod error;
pub mod systems;
pub mod ui;


use systems::{BuildingPlugin, CatalogPlugin, CommandPlugin, EconomyPlugin, EventBusPlugin, GridPlugin};

/// The headless simulation: grid, catalog, registry, ledger, command
/// dispatch and the event bus. Runs under `MinimalPlugins`.
pub struct CityCorePlugins;

impl PluginGroup for CityCorePlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(EventBusPlugin)
            .add(CatalogPlugin)
            .add(GridPlugin)
            .add(BuildingPlugin)
            .add(EconomyPlugin)
            .add(CommandPlugin)
    }
}
