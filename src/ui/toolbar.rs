use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::components::*;
use crate::systems::*;
use crate::ui::building_view::footprint_center;

const TOOLBAR_HEIGHT: f32 = 56.0;

const TYPE_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Select,
    Place(BuildingTypeId),
    Move(BuildingId),
}

#[derive(Resource, Default)]
pub struct ToolbarState {
    pub mode: InputMode,
    pub selected_building: Option<BuildingId>,
}

#[derive(Component)]
pub struct Toolbar;

#[derive(Component)]
pub struct ToolbarHint;

pub struct ToolbarPlugin;

impl Plugin for ToolbarPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ToolbarState>()
            .add_systems(Startup, setup_toolbar)
            .add_systems(
                Update,
                (
                    handle_hotkeys,
                    handle_world_clicks,
                    clear_stale_selection,
                    update_toolbar_hint,
                    update_placement_preview,
                )
                    .chain(),
            );
    }
}

fn setup_toolbar(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Px(TOOLBAR_HEIGHT),
                position_type: PositionType::Absolute,
                bottom: Val::Px(0.0),
                left: Val::Px(0.0),
                padding: UiRect::all(Val::Px(8.0)),
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgb(0.15, 0.15, 0.15)),
            Toolbar,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                ToolbarHint,
            ));
        });
}

fn handle_hotkeys(
    keys: Res<ButtonInput<KeyCode>>,
    catalog: Res<BuildingCatalog>,
    mut state: ResMut<ToolbarState>,
    mut grid_settings: ResMut<GridSettings>,
    mut requests: EventWriter<CityCommand>,
) {
    for (key, def) in TYPE_KEYS.iter().zip(catalog.types()) {
        if keys.just_pressed(*key) {
            state.mode = InputMode::Place(def.id.clone());
            state.selected_building = None;
            info!("Selected building type: {}", def.name());
        }
    }

    if keys.just_pressed(KeyCode::Escape) {
        state.mode = InputMode::Select;
        state.selected_building = None;
    }

    if let Some(id) = state.selected_building.clone() {
        if keys.just_pressed(KeyCode::KeyU) {
            requests.send(CityCommand::Upgrade(UpgradeRequest { id: id.clone() }));
        }
        if keys.just_pressed(KeyCode::KeyM) {
            state.mode = InputMode::Move(id.clone());
        }
        if keys.just_pressed(KeyCode::Delete) || keys.just_pressed(KeyCode::KeyX) {
            requests.send(CityCommand::Delete(DeleteRequest { id }));
            state.selected_building = None;
            state.mode = InputMode::Select;
        }
    }

    if keys.just_pressed(KeyCode::KeyP) {
        requests.send(CityCommand::Save);
    }
    if keys.just_pressed(KeyCode::KeyL) {
        requests.send(CityCommand::Load);
    }
    if keys.just_pressed(KeyCode::KeyG) {
        grid_settings.show_grid = !grid_settings.show_grid;
    }
}

/// Grid cell under the mouse, if the cursor is over the grid.
fn cursor_cell(
    window_query: &Query<&Window, With<PrimaryWindow>>,
    camera_query: &Query<(&Camera, &GlobalTransform)>,
    grid_settings: &GridSettings,
) -> Option<GridPosition> {
    let window = window_query.get_single().ok()?;
    let (camera, camera_transform) = camera_query.get_single().ok()?;
    let cursor_pos = window.cursor_position()?;
    let world_pos = camera.viewport_to_world_2d(camera_transform, cursor_pos).ok()?;
    world_to_grid(
        world_pos,
        grid_settings.tile_size,
        grid_settings.width,
        grid_settings.height,
    )
}

#[allow(clippy::too_many_arguments)]
fn handle_world_clicks(
    mouse: Res<ButtonInput<MouseButton>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    grid_settings: Res<GridSettings>,
    catalog: Res<BuildingCatalog>,
    registry: Res<BuildingRegistry>,
    mut state: ResMut<ToolbarState>,
    mut requests: EventWriter<CityCommand>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(cell) = cursor_cell(&window_query, &camera_query, &grid_settings) else {
        return;
    };

    match std::mem::take(&mut state.mode) {
        InputMode::Place(type_id) => {
            requests.send(CityCommand::Build(BuildRequest {
                type_id,
                position: cell,
            }));
        }
        InputMode::Move(id) => {
            requests.send(CityCommand::Move(MoveRequest { id, position: cell }));
        }
        InputMode::Select => {
            state.selected_building = registry
                .building_at(cell, &catalog)
                .map(|building| building.id.clone());
        }
    }
}

fn clear_stale_selection(mut events: EventReader<CityEvent>, mut state: ResMut<ToolbarState>) {
    for event in events.read() {
        if let CityEvent::BuildingDeleted { id } = event {
            if state.selected_building.as_ref() == Some(id) {
                state.selected_building = None;
            }
            if state.mode == InputMode::Move(id.clone()) {
                state.mode = InputMode::Select;
            }
        }
    }
}

fn update_toolbar_hint(
    state: Res<ToolbarState>,
    catalog: Res<BuildingCatalog>,
    registry: Res<BuildingRegistry>,
    mut query: Query<&mut Text, With<ToolbarHint>>,
) {
    if !state.is_changed() && !registry.is_changed() {
        return;
    }

    let keys: Vec<String> = catalog
        .types()
        .iter()
        .take(TYPE_KEYS.len())
        .enumerate()
        .map(|(index, def)| {
            let cost = def.level(1).map(|level| level.gold_cost).unwrap_or_default();
            format!("[{}] {} ({}g)", index + 1, def.name(), cost)
        })
        .collect();

    let detail = match (&state.mode, &state.selected_building) {
        (InputMode::Place(type_id), _) => format!("Click to place {}", type_id),
        (InputMode::Move(_), _) => "Click the destination".to_string(),
        (InputMode::Select, Some(id)) => match registry.get_by_id(id) {
            Some(building) => {
                let upgrade = catalog
                    .upgrade_cost(&building.type_id, building.level)
                    .map(|cost| format!("[U] upgrade {}g", cost))
                    .unwrap_or_else(|| "max level".to_string());
                format!(
                    "{} L{} | {} | [M] move | [X] delete",
                    building.type_id, building.level, upgrade
                )
            }
            None => String::new(),
        },
        (InputMode::Select, None) => "[P] save | [L] load | [G] grid".to_string(),
    };

    for mut text in &mut query {
        **text = format!("{}    {}", keys.join("  "), detail);
    }
}

#[allow(clippy::too_many_arguments)]
fn update_placement_preview(
    mut commands: Commands,
    previews: Query<Entity, With<PlacementPreview>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    grid_settings: Res<GridSettings>,
    state: Res<ToolbarState>,
    catalog: Res<BuildingCatalog>,
    registry: Res<BuildingRegistry>,
    grid: Res<GridStore>,
) {
    for entity in &previews {
        commands.entity(entity).despawn();
    }

    // The footprint being moved does not block its own destination.
    let (def, own_cells) = match &state.mode {
        InputMode::Select => return,
        InputMode::Place(type_id) => (catalog.get_type(type_id), Vec::new()),
        InputMode::Move(id) => match registry.get_by_id(id) {
            Some(building) => {
                let def = catalog.get_type(&building.type_id);
                let cells = def
                    .map(|def| def.tiles_occupied(building.position))
                    .unwrap_or_default();
                (def, cells)
            }
            None => return,
        },
    };
    let Some(def) = def else {
        return;
    };
    let Some(cell) = cursor_cell(&window_query, &camera_query, &grid_settings) else {
        return;
    };

    let blocked = def.tiles_occupied(cell).into_iter().any(|tile| {
        !grid.in_bounds(tile) || (grid.is_occupied(tile) && !own_cells.contains(&tile))
    });
    let color = if blocked {
        Color::srgba(1.0, 0.3, 0.3, 0.5)
    } else {
        Color::srgba(1.0, 1.0, 1.0, 0.5)
    };

    let center = footprint_center(cell, def, &grid_settings);
    commands.spawn((
        Sprite {
            color,
            custom_size: Some(Vec2::new(
                def.width as f32 * grid_settings.tile_size,
                def.height as f32 * grid_settings.tile_size,
            )),
            ..default()
        },
        Transform::from_xyz(center.x, center.y, 3.0),
        PlacementPreview,
    ));
}
