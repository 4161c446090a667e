use crate::piece::{CellState, Shape};

pub const GRID_WIDTH: usize = 12;
pub const GRID_HEIGHT: usize = 20;

pub type Row = [CellState; GRID_WIDTH];

const EMPTY_ROW: Row = [CellState::Empty; GRID_WIDTH];

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

impl Position {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i16, dy: i16) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Settled material. Dimensions are fixed at `GRID_WIDTH x GRID_HEIGHT`;
/// row 0 is the top.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    rows: Vec<Row>,
}

impl Grid {
    pub fn new() -> Self {
        Self {
            rows: vec![EMPTY_ROW; GRID_HEIGHT],
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn cell(&self, x: usize, y: usize) -> CellState {
        self.rows[y][x]
    }

    pub fn set(&mut self, x: usize, y: usize, cell: CellState) {
        self.rows[y][x] = cell;
    }

    /// True when any filled cell of `shape` placed at `position` lands left,
    /// right or below the grid, or on an occupied cell. Rows above the top
    /// are open.
    pub fn collides(&self, shape: &Shape, position: Position) -> bool {
        for (col, row) in shape.filled_cells() {
            let x = position.x as i32 + col as i32;
            let y = position.y as i32 + row as i32;
            if x < 0 || x >= GRID_WIDTH as i32 || y >= GRID_HEIGHT as i32 {
                return true;
            }
            if y < 0 {
                continue;
            }
            if !self.rows[y as usize][x as usize].is_empty() {
                return true;
            }
        }
        false
    }

    /// Writes the shape's filled cells into the grid. The caller checks
    /// `collides` first; cells that fall outside the grid are dropped.
    pub fn merge(&mut self, shape: &Shape, position: Position) {
        debug_assert!(!self.collides(shape, position));
        for (col, row) in shape.filled_cells() {
            let x = position.x as i32 + col as i32;
            let y = position.y as i32 + row as i32;
            if (0..GRID_WIDTH as i32).contains(&x) && (0..GRID_HEIGHT as i32).contains(&y) {
                self.rows[y as usize][x as usize] = shape.cell(col, row);
            }
        }
    }

    /// Removes every full row, bottom to top, inserting an empty row at the
    /// top for each. Returns the number of rows removed.
    pub fn sweep_full_rows(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = GRID_HEIGHT;

        while y > 0 {
            if self.is_row_complete(y - 1) {
                self.rows.remove(y - 1);
                self.rows.insert(0, EMPTY_ROW);
                cleared += 1;
                // Rows above shifted down into y - 1, check it again
            } else {
                y -= 1;
            }
        }

        cleared
    }

    pub fn reset(&mut self) {
        self.rows.fill(EMPTY_ROW);
    }

    /// Where `shape` would come to rest if dropped straight down from
    /// `position`. Read-only.
    pub fn landing_position(&self, shape: &Shape, position: Position) -> Position {
        let mut landing = position;
        while !self.collides(shape, landing.offset(0, 1)) {
            landing = landing.offset(0, 1);
        }
        landing
    }

    pub fn is_row_complete(&self, y: usize) -> bool {
        self.rows[y].iter().all(|cell| !cell.is_empty())
    }

    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.rows[y].iter().filter(|cell| !cell.is_empty()).count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| !cell.is_empty()).count()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
