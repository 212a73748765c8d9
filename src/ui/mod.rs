use bevy::app::PluginGroupBuilder;
use bevy::prelude::*;

use crate::systems::GridLinesPlugin;

pub mod building_view;
pub mod money_display;
pub mod notifications;
pub mod toolbar;

pub use building_view::*;
pub use money_display::*;
pub use notifications::*;
pub use toolbar::*;

/// Windowed presentation on top of [`crate::CityCorePlugins`]. Reads
/// `CityEvent`s and submits `CityCommand`s, never touching city state directly.
pub struct CityViewPlugins;

impl PluginGroup for CityViewPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(GridLinesPlugin)
            .add(BuildingViewPlugin)
            .add(MoneyDisplayPlugin)
            .add(NotificationPlugin)
            .add(ToolbarPlugin)
    }
}
