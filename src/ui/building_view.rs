use bevy::prelude::*;

use crate::components::*;
use crate::systems::*;

#[derive(Component)]
pub struct LevelLabel;

pub struct BuildingViewPlugin;

impl Plugin for BuildingViewPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, sync_building_sprites);
    }
}

/// Center of a footprint anchored at `origin`, in world space.
pub(crate) fn footprint_center(origin: GridPosition, def: &BuildingTypeDef, grid_settings: &GridSettings) -> Vec2 {
    let base = grid_to_world(
        origin,
        grid_settings.tile_size,
        grid_settings.width,
        grid_settings.height,
    );
    base + Vec2::new(
        (def.width - 1) as f32 * grid_settings.tile_size / 2.0,
        (def.height - 1) as f32 * grid_settings.tile_size / 2.0,
    )
}

fn spawn_building_sprite(
    commands: &mut Commands,
    grid_settings: &GridSettings,
    def: &BuildingTypeDef,
    building: &BuildingInstance,
) {
    let center = footprint_center(building.position, def, grid_settings);
    let size = Vec2::new(
        def.width as f32 * grid_settings.tile_size - 2.0,
        def.height as f32 * grid_settings.tile_size - 2.0,
    );

    commands
        .spawn((
            Sprite {
                color: def.color(),
                custom_size: Some(size),
                ..default()
            },
            Transform::from_xyz(center.x, center.y, 2.0),
            BuildingSprite {
                id: building.id.clone(),
            },
            building.position,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text2d::new(building.level.to_string()),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Transform::from_xyz(0.0, 0.0, 1.0),
                LevelLabel,
            ));
        });
}

fn sync_building_sprites(
    mut commands: Commands,
    mut events: EventReader<CityEvent>,
    grid_settings: Res<GridSettings>,
    catalog: Res<BuildingCatalog>,
    registry: Res<BuildingRegistry>,
    mut sprites: Query<(Entity, &BuildingSprite, &mut Transform, &mut GridPosition, &Children)>,
    mut labels: Query<&mut Text2d, With<LevelLabel>>,
) {
    for event in events.read() {
        match event {
            CityEvent::BuildingBuilt(building) => {
                let Some(def) = catalog.get_type(&building.type_id) else {
                    warn!("No catalog entry to draw {}", building.type_id);
                    continue;
                };
                spawn_building_sprite(&mut commands, &grid_settings, def, building);
            }
            CityEvent::BuildingMoved { id, position } => {
                let Some(def) = registry
                    .get_by_id(id)
                    .and_then(|building| catalog.get_type(&building.type_id))
                else {
                    continue;
                };
                let center = footprint_center(*position, def, &grid_settings);
                for (_, sprite, mut transform, mut grid_pos, _) in &mut sprites {
                    if &sprite.id == id {
                        transform.translation.x = center.x;
                        transform.translation.y = center.y;
                        *grid_pos = *position;
                    }
                }
            }
            CityEvent::BuildingUpgraded { id, level } => {
                for (_, sprite, _, _, children) in &sprites {
                    if &sprite.id != id {
                        continue;
                    }
                    for &child in children.iter() {
                        if let Ok(mut label) = labels.get_mut(child) {
                            label.0 = level.to_string();
                        }
                    }
                }
            }
            CityEvent::BuildingDeleted { id } => {
                for (entity, sprite, _, _, _) in &sprites {
                    if &sprite.id == id {
                        commands.entity(entity).despawn_recursive();
                    }
                }
            }
            _ => {}
        }
    }
}
