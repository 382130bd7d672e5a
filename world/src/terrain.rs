//! Destructible cell grid forming the battlefield.

use tank_battle_core::{CellCoord, CellRectSize, SetupError};

/// Dense grid of solid and empty cells stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainGrid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl TerrainGrid {
    /// Creates a grid in which every cell is empty.
    #[must_use]
    pub fn empty(width: u32, height: u32) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![false; capacity],
        }
    }

    /// Builds a grid from text rows where `#` marks a solid cell and any other
    /// character an empty one.
    ///
    /// Returns `None` when the rows are empty or of unequal length.
    #[must_use]
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Option<Self> {
        let width = rows.first()?.as_ref().chars().count();
        if width == 0 {
            return None;
        }
        let mut cells = Vec::with_capacity(width * rows.len());
        for row in rows {
            let row = row.as_ref();
            if row.chars().count() != width {
                return None;
            }
            cells.extend(row.chars().map(|cell| cell == '#'));
        }
        Some(Self {
            width: u32::try_from(width).ok()?,
            height: u32::try_from(rows.len()).ok()?,
            cells,
        })
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the cell is solid.
    ///
    /// # Panics
    ///
    /// Panics when the coordinates lie outside the grid.
    #[must_use]
    pub fn terrain_at(&self, column: u32, row: u32) -> bool {
        assert!(
            column < self.width && row < self.height,
            "terrain query ({column}, {row}) outside {}x{} grid",
            self.width,
            self.height
        );
        self.cells[self.offset(column, row)]
    }

    /// Reports whether the cell is solid, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<bool> {
        self.index(cell).map(|index| self.cells[index])
    }

    /// Reports whether any cell of a footprint anchored at `origin` is solid.
    ///
    /// Cells beyond the grid edges count as solid, so the floor and the side
    /// walls support tanks.
    #[must_use]
    pub fn check_tank_collision(&self, origin: CellCoord, size: CellRectSize) -> bool {
        (0..size.height()).any(|dy| {
            (0..size.width()).any(|dx| {
                let cell = CellCoord::new(
                    origin.column().saturating_add(dx),
                    origin.row().saturating_add(dy),
                );
                self.get(cell).unwrap_or(true)
            })
        })
    }

    /// Resting row for a footprint anchored at `column`: the lowest row at
    /// which the footprint overlaps no solid cell.
    pub fn tank_y_position(&self, column: u32, size: CellRectSize) -> Result<u32, SetupError> {
        let last = self
            .height
            .checked_sub(size.height())
            .ok_or(SetupError::InvalidPlacement { column })?;
        (0..=last)
            .rev()
            .find(|&row| !self.check_tank_collision(CellCoord::new(column, row), size))
            .ok_or(SetupError::InvalidPlacement { column })
    }

    /// Clears every cell whose centre lies within `radius` of the centre.
    ///
    /// Returns the number of cells that were solid and are now empty.
    pub fn destroy_terrain(&mut self, centre_x: f32, centre_y: f32, radius: f32) -> usize {
        if radius.is_nan() || radius < 0.0 || self.cells.is_empty() {
            return 0;
        }
        let radius_squared = radius * radius;
        let min_column = clamp_floor(centre_x - radius, self.width);
        let max_column = clamp_ceil(centre_x + radius, self.width);
        let min_row = clamp_floor(centre_y - radius, self.height);
        let max_row = clamp_ceil(centre_y + radius, self.height);

        let mut cleared = 0;
        for row in min_row..=max_row {
            for column in min_column..=max_column {
                let dx = column as f32 - centre_x;
                let dy = row as f32 - centre_y;
                if dx * dx + dy * dy > radius_squared {
                    continue;
                }
                let index = self.offset(column, row);
                if self.cells[index] {
                    self.cells[index] = false;
                    cleared += 1;
                }
            }
        }
        cleared
    }

    /// Performs a single settling step.
    ///
    /// Each column is scanned from the bottom up and every solid cell above an
    /// empty one moves down a row. A stack resting on a gap descends as a unit.
    /// Returns whether any cell moved.
    pub fn gravity(&mut self) -> bool {
        let mut moved = false;
        for column in 0..self.width {
            let mut row = self.height.saturating_sub(1);
            while row > 0 {
                let below = self.offset(column, row);
                let above = self.offset(column, row - 1);
                if !self.cells[below] && self.cells[above] {
                    self.cells.swap(below, above);
                    moved = true;
                }
                row -= 1;
            }
        }
        moved
    }

    /// Reports whether a further settling step would move nothing.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        (0..self.width).all(|column| {
            (1..self.height).all(|row| {
                !self.cells[self.offset(column, row - 1)] || self.cells[self.offset(column, row)]
            })
        })
    }

    /// Marks every cell along the line between the endpoints as solid.
    pub fn fill_line(&mut self, from: CellCoord, to: CellCoord) {
        self.set_line(from, to, true);
    }

    /// Marks every cell along the line between the endpoints as empty.
    pub fn carve_line(&mut self, from: CellCoord, to: CellCoord) {
        self.set_line(from, to, false);
    }

    /// Fills the cell and everything beneath it down to the bottom row.
    pub(crate) fn fill_down(&mut self, cell: CellCoord) {
        if cell.column() >= self.width {
            return;
        }
        for row in cell.row()..self.height {
            let index = self.offset(cell.column(), row);
            self.cells[index] = true;
        }
    }

    /// Number of solid cells in the grid.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }

    fn set_line(&mut self, from: CellCoord, to: CellCoord, solid: bool) {
        for cell in rasterize_line(from, to) {
            if let Some(index) = self.index(cell) {
                self.cells[index] = solid;
            }
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.width && cell.row() < self.height {
            Some(self.offset(cell.column(), cell.row()))
        } else {
            None
        }
    }

    fn offset(&self, column: u32, row: u32) -> usize {
        row as usize * self.width as usize + column as usize
    }
}

/// Cells visited by a Bresenham line between the endpoints, both inclusive.
#[must_use]
pub fn rasterize_line(from: CellCoord, to: CellCoord) -> Vec<CellCoord> {
    let (mut x, mut y) = (i64::from(from.column()), i64::from(from.row()));
    let (end_x, end_y) = (i64::from(to.column()), i64::from(to.row()));
    let dx = (end_x - x).abs();
    let dy = -(end_y - y).abs();
    let step_x = if x < end_x { 1 } else { -1 };
    let step_y = if y < end_y { 1 } else { -1 };
    let mut error = dx + dy;

    let mut cells = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    loop {
        cells.push(CellCoord::new(x as u32, y as u32));
        if x == end_x && y == end_y {
            break;
        }
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            x += step_x;
        }
        if doubled <= dx {
            error += dx;
            y += step_y;
        }
    }
    cells
}

fn clamp_floor(value: f32, extent: u32) -> u32 {
    value.floor().clamp(0.0, extent.saturating_sub(1) as f32) as u32
}

fn clamp_ceil(value: f32, extent: u32) -> u32 {
    value.ceil().clamp(0.0, extent.saturating_sub(1) as f32) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const TANK: CellRectSize = CellRectSize::new(4, 3);

    fn ridge() -> TerrainGrid {
        TerrainGrid::from_rows(&[
            "..........",
            "..........",
            "..........",
            "..........",
            "......####",
            "...#######",
            "##########",
            "##########",
        ])
        .expect("valid rows")
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(TerrainGrid::from_rows(&["##", "#"]).is_none());
        assert!(TerrainGrid::from_rows::<&str>(&[]).is_none());
    }

    #[test]
    #[should_panic]
    fn terrain_at_fails_fast_outside_grid() {
        let _ = ridge().terrain_at(10, 0);
    }

    #[test]
    fn tank_y_position_is_true_resting_height() {
        let terrain = ridge();
        for column in 0..=terrain.width() - TANK.width() {
            let row = terrain.tank_y_position(column, TANK).expect("landing spot");
            assert!(!terrain.check_tank_collision(CellCoord::new(column, row), TANK));
            assert!(terrain.check_tank_collision(CellCoord::new(column, row + 1), TANK));
        }
        assert_eq!(terrain.tank_y_position(0, TANK), Ok(2));
        assert_eq!(terrain.tank_y_position(6, TANK), Ok(1));
    }

    #[test]
    fn tank_y_position_reports_fully_solid_column() {
        let terrain = TerrainGrid::from_rows(&["####", "####", "####", "####"]).expect("rows");
        assert_eq!(
            terrain.tank_y_position(0, TANK),
            Err(SetupError::InvalidPlacement { column: 0 })
        );
    }

    #[test]
    fn footprint_beyond_edges_collides() {
        let terrain = TerrainGrid::empty(10, 10);
        assert!(terrain.check_tank_collision(CellCoord::new(7, 0), TANK));
        assert!(terrain.check_tank_collision(CellCoord::new(0, 8), TANK));
        assert!(!terrain.check_tank_collision(CellCoord::new(6, 7), TANK));
    }

    #[test]
    fn destroy_terrain_clears_only_cells_within_radius() {
        let mut terrain = TerrainGrid::from_rows(&["#########"; 9]).expect("rows");
        let before = terrain.clone();
        let (cx, cy, radius) = (4.0_f32, 4.0_f32, 2.5_f32);
        let cleared = terrain.destroy_terrain(cx, cy, radius);

        let mut expected = 0;
        for row in 0..9 {
            for column in 0..9 {
                let dx = column as f32 - cx;
                let dy = row as f32 - cy;
                let inside = dx * dx + dy * dy <= radius * radius;
                if inside {
                    expected += 1;
                    assert!(!terrain.terrain_at(column, row));
                } else {
                    assert_eq!(terrain.terrain_at(column, row), before.terrain_at(column, row));
                }
            }
        }
        assert_eq!(cleared, expected);
        assert_eq!(terrain.destroy_terrain(cx, cy, radius), 0);
    }

    #[test]
    fn destroy_terrain_clips_at_edges() {
        let mut terrain = TerrainGrid::from_rows(&["####", "####"]).expect("rows");
        assert_eq!(terrain.destroy_terrain(-1.0, 0.0, 1.0), 1);
        assert!(!terrain.terrain_at(0, 0));
        assert_eq!(terrain.solid_count(), 7);
    }

    #[test]
    fn gravity_drops_stack_as_a_unit() {
        let mut terrain = TerrainGrid::from_rows(&["#", "#", ".", "#"]).expect("rows");
        assert!(terrain.gravity());
        assert_eq!(terrain, TerrainGrid::from_rows(&[".", "#", "#", "#"]).expect("rows"));
        assert!(terrain.is_settled());
        assert!(!terrain.gravity());
    }

    #[test]
    fn gravity_never_moves_supported_cells_or_loses_mass() {
        let mut terrain = TerrainGrid::from_rows(&[
            "#..#.",
            ".#.#.",
            "#...#",
            ".#..#",
            "#####",
        ])
        .expect("rows");
        let mass = terrain.solid_count();
        while terrain.gravity() {
            assert_eq!(terrain.solid_count(), mass);
        }
        assert!(terrain.is_settled());
        assert!(terrain.terrain_at(0, 4) && terrain.terrain_at(4, 4));
        assert!(!terrain.terrain_at(2, 3));
    }

    #[test]
    fn carving_diagonal_keeps_anti_diagonal_intact() {
        let mut terrain = TerrainGrid::empty(4, 4);
        for (column, row) in [(0, 3), (1, 2), (2, 1), (3, 0)] {
            terrain.fill_line(CellCoord::new(column, row), CellCoord::new(column, row));
        }
        terrain.carve_line(CellCoord::new(0, 0), CellCoord::new(3, 3));

        for index in 0..4 {
            assert!((0..4).any(|column| terrain.terrain_at(column, index)));
            assert!((0..4).any(|row| terrain.terrain_at(index, row)));
        }
        assert!(!terrain.terrain_at(0, 0));
        assert!(!terrain.terrain_at(3, 3));
    }

    #[test]
    fn rasterized_line_is_connected_and_inclusive() {
        let cells = rasterize_line(CellCoord::new(2, 9), CellCoord::new(11, 3));
        assert_eq!(cells.first(), Some(&CellCoord::new(2, 9)));
        assert_eq!(cells.last(), Some(&CellCoord::new(11, 3)));
        for pair in cells.windows(2) {
            assert!(pair[0].column().abs_diff(pair[1].column()) <= 1);
            assert!(pair[0].row().abs_diff(pair[1].row()) <= 1);
        }
    }
}
