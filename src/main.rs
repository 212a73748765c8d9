use bevy::prelude::*;

use city_builder::systems::{CityCommand, CityCommandQueue};
use city_builder::ui::CityViewPlugins;
use city_builder::CityCorePlugins;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "City Builder".to_string(),
                resolution: (1280.0, 860.0).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins((CityCorePlugins, CityViewPlugins))
        .add_systems(Startup, setup)
        .run();
}

fn setup(mut commands: Commands, mut queue: ResMut<CityCommandQueue>) {
    commands.spawn(Camera2d);

    // Restore the previous session if one was saved.
    queue.enqueue(CityCommand::Load);
}
