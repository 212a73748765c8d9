use bevy::prelude::*;

use crate::components::GridPosition;
use crate::systems::events::{CellStateChanged, CityEvent, EventSink};

pub const TILE_SIZE: f32 = 24.0;
pub const GRID_WIDTH: i32 = 32;
pub const GRID_HEIGHT: i32 = 32;

#[derive(Resource)]
pub struct GridSettings {
    pub tile_size: f32,
    pub width: i32,
    pub height: i32,
    pub show_grid: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            show_grid: true,
        }
    }
}

/// Occupancy bitmap for the build area. Cells are stored row-major.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct GridStore {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl Default for GridStore {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }
}

impl GridStore {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![false; (width * height) as usize],
        }
    }

    pub fn in_bounds(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: GridPosition) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn is_occupied(&self, pos: GridPosition) -> bool {
        self.index(pos).map(|i| self.cells[i]).unwrap_or(false)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }

    /// True when every cell of the rectangle is inside the grid and free.
    pub fn can_place(&self, origin: GridPosition, width: i32, height: i32) -> bool {
        // Compared against the remaining room so huge origins cannot overflow.
        if width < 1
            || height < 1
            || origin.x < 0
            || origin.y < 0
            || width > self.width - origin.x
            || height > self.height - origin.y
        {
            return false;
        }

        for y in origin.y..origin.y + height {
            for x in origin.x..origin.x + width {
                if self.is_occupied(GridPosition::new(x, y)) {
                    return false;
                }
            }
        }

        true
    }

    /// Writes the flag for every cell of the rectangle, y outer and x inner,
    /// publishing one `CellStateChanged` per cell written. Callers validate
    /// first; cells outside the grid are skipped.
    pub fn set_occupancy(
        &mut self,
        origin: GridPosition,
        width: i32,
        height: i32,
        occupied: bool,
        bus: &mut impl EventSink,
    ) {
        for dy in 0..height {
            for dx in 0..width {
                let (Some(x), Some(y)) = (origin.x.checked_add(dx), origin.y.checked_add(dy)) else {
                    warn!("Skipping cell beyond i32 range from {}", origin);
                    continue;
                };
                let pos = GridPosition::new(x, y);
                let Some(index) = self.index(pos) else {
                    warn!("Skipping out-of-bounds cell {}", pos);
                    continue;
                };
                self.cells[index] = occupied;
                bus.publish(CityEvent::CellStateChanged(CellStateChanged {
                    position: pos,
                    occupied,
                }));
            }
        }
    }

    /// Frees every cell, publishing a change for each cell that was occupied.
    pub fn clear(&mut self, bus: &mut impl EventSink) {
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = GridPosition::new(x, y);
                if self.is_occupied(pos) {
                    self.set_occupancy(pos, 1, 1, false, bus);
                }
            }
        }
    }
}

pub struct GridPlugin;

impl Plugin for GridPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GridSettings>();
        if !app.world().contains_resource::<GridStore>() {
            let settings = app.world().resource::<GridSettings>();
            let store = GridStore::new(settings.width, settings.height);
            app.insert_resource(store);
        }
    }
}

#[derive(Component)]
pub struct GridLines;

/// Draws the cell lattice. Only used by the windowed shell.
pub struct GridLinesPlugin;

impl Plugin for GridLinesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_grid_lines)
            .add_systems(Update, update_grid_visibility);
    }
}

fn setup_grid_lines(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    grid_settings: Res<GridSettings>,
) {
    let tile_size = grid_settings.tile_size;
    let width = grid_settings.width as f32 * tile_size;
    let height = grid_settings.height as f32 * tile_size;

    for x in 0..=grid_settings.width {
        let x_pos = x as f32 * tile_size - width / 2.0;

        commands.spawn((
            Mesh2d(meshes.add(Rectangle::new(1.0, height))),
            MeshMaterial2d(materials.add(Color::srgba(0.3, 0.3, 0.3, 0.4))),
            Transform::from_xyz(x_pos, 0.0, 0.0),
            GridLines,
        ));
    }

    for y in 0..=grid_settings.height {
        let y_pos = y as f32 * tile_size - height / 2.0;

        commands.spawn((
            Mesh2d(meshes.add(Rectangle::new(width, 1.0))),
            MeshMaterial2d(materials.add(Color::srgba(0.3, 0.3, 0.3, 0.4))),
            Transform::from_xyz(0.0, y_pos, 0.0),
            GridLines,
        ));
    }
}

fn update_grid_visibility(
    grid_settings: Res<GridSettings>,
    mut query: Query<&mut Visibility, With<GridLines>>,
) {
    if grid_settings.is_changed() {
        for mut visibility in &mut query {
            *visibility = if grid_settings.show_grid {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
        }
    }
}

pub fn world_to_grid(world_pos: Vec2, tile_size: f32, grid_width: i32, grid_height: i32) -> Option<GridPosition> {
    let width = grid_width as f32 * tile_size;
    let height = grid_height as f32 * tile_size;

    let grid_x = ((world_pos.x + width / 2.0) / tile_size).floor() as i32;
    let grid_y = ((world_pos.y + height / 2.0) / tile_size).floor() as i32;

    if grid_x >= 0 && grid_x < grid_width && grid_y >= 0 && grid_y < grid_height {
        Some(GridPosition::new(grid_x, grid_y))
    } else {
        None
    }
}

/// World-space center of a cell.
pub fn grid_to_world(grid_pos: GridPosition, tile_size: f32, grid_width: i32, grid_height: i32) -> Vec2 {
    let width = grid_width as f32 * tile_size;
    let height = grid_height as f32 * tile_size;

    Vec2::new(
        grid_pos.x as f32 * tile_size - width / 2.0 + tile_size / 2.0,
        grid_pos.y as f32 * tile_size - height / 2.0 + tile_size / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: i32, y: i32) -> GridPosition {
        GridPosition::new(x, y)
    }

    #[test]
    fn rejects_out_of_bounds_footprints() {
        let grid = GridStore::new(8, 8);
        assert!(grid.can_place(pos(0, 0), 8, 8));
        assert!(!grid.can_place(pos(-1, 0), 2, 2));
        assert!(!grid.can_place(pos(0, -1), 2, 2));
        assert!(!grid.can_place(pos(7, 0), 2, 1));
        assert!(!grid.can_place(pos(0, 7), 1, 2));
    }

    #[test]
    fn rejects_footprints_overlapping_occupied_cells() {
        let mut grid = GridStore::new(8, 8);
        let mut events = Vec::new();
        grid.set_occupancy(pos(2, 2), 2, 2, true, &mut events);

        assert!(!grid.can_place(pos(3, 3), 2, 2));
        assert!(!grid.can_place(pos(1, 1), 2, 2));
        assert!(grid.can_place(pos(4, 2), 2, 2));
        assert!(grid.can_place(pos(0, 0), 2, 2));
    }

    #[test]
    fn can_place_matches_cellwise_definition() {
        let mut grid = GridStore::new(6, 5);
        let mut events = Vec::new();
        grid.set_occupancy(pos(1, 1), 1, 2, true, &mut events);
        grid.set_occupancy(pos(4, 3), 2, 1, true, &mut events);

        for oy in -2..7 {
            for ox in -2..8 {
                for (w, h) in [(1, 1), (2, 2), (3, 1), (1, 3)] {
                    let origin = pos(ox, oy);
                    let expected = (oy..oy + h).all(|y| {
                        (ox..ox + w).all(|x| {
                            let cell = pos(x, y);
                            grid.in_bounds(cell) && !grid.is_occupied(cell)
                        })
                    });
                    assert_eq!(grid.can_place(origin, w, h), expected, "{origin} {w}x{h}");
                }
            }
        }
    }

    #[test]
    fn extreme_origins_are_out_of_bounds() {
        let mut grid = GridStore::new(8, 8);
        assert!(!grid.can_place(pos(i32::MAX, 0), 2, 2));
        assert!(!grid.can_place(pos(0, i32::MAX), 2, 2));
        assert!(!grid.can_place(pos(i32::MAX - 1, i32::MAX - 1), 2, 2));
        assert!(!grid.can_place(pos(i32::MIN, 0), 2, 2));

        let mut events = Vec::new();
        grid.set_occupancy(pos(i32::MAX, i32::MAX), 2, 2, true, &mut events);
        assert!(events.is_empty());
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn set_occupancy_publishes_row_major() {
        let mut grid = GridStore::new(8, 8);
        let mut events = Vec::new();
        grid.set_occupancy(pos(3, 4), 2, 2, true, &mut events);

        let cells: Vec<_> = events
            .iter()
            .map(|event| match event {
                CityEvent::CellStateChanged(change) => (change.position, change.occupied),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(
            cells,
            vec![
                (pos(3, 4), true),
                (pos(4, 4), true),
                (pos(3, 5), true),
                (pos(4, 5), true),
            ]
        );
    }

    #[test]
    fn occupy_then_free_restores_grid() {
        let mut grid = GridStore::new(10, 10);
        let mut events = Vec::new();
        grid.set_occupancy(pos(0, 0), 3, 1, true, &mut events);
        let before = grid.clone();

        grid.set_occupancy(pos(5, 5), 3, 2, true, &mut events);
        assert_ne!(grid, before);
        grid.set_occupancy(pos(5, 5), 3, 2, false, &mut events);
        assert_eq!(grid, before);
    }

    #[test]
    fn clear_only_reports_occupied_cells() {
        let mut grid = GridStore::new(4, 4);
        let mut events = Vec::new();
        grid.set_occupancy(pos(1, 1), 2, 1, true, &mut events);
        events.clear();

        grid.clear(&mut events);
        assert_eq!(events.len(), 2);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn world_and_grid_coordinates_agree() {
        let settings = GridSettings::default();
        let cell = pos(5, 9);
        let world = grid_to_world(cell, settings.tile_size, settings.width, settings.height);
        assert_eq!(
            world_to_grid(world, settings.tile_size, settings.width, settings.height),
            Some(cell)
        );
        assert_eq!(
            world_to_grid(Vec2::splat(10_000.0), settings.tile_size, settings.width, settings.height),
            None
        );
    }
}
