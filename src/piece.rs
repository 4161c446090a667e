// ============================================================================
// Piece Catalog
// ============================================================================

/// Largest frame any piece needs (the I piece).
pub const MAX_SHAPE_SIZE: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Identity value stored in settled grid cells (1..=7).
    pub fn id(self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::J => 2,
            PieceKind::L => 3,
            PieceKind::O => 4,
            PieceKind::S => 5,
            PieceKind::T => 6,
            PieceKind::Z => 7,
        }
    }

    fn pattern(self) -> &'static [&'static str] {
        match self {
            PieceKind::I => &["....", "####", "....", "...."],
            PieceKind::J => &["#..", "###", "..."],
            PieceKind::L => &["..#", "###", "..."],
            PieceKind::O => &["##", "##"],
            PieceKind::S => &[".##", "##.", "..."],
            PieceKind::T => &["...", "###", ".#."],
            PieceKind::Z => &["##.", ".##", "..."],
        }
    }

    /// Canonical spawn orientation. Every call returns a fresh working copy.
    pub fn shape(self) -> Shape {
        let pattern = self.pattern();
        let mut cells = [[CellState::Empty; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (row, line) in pattern.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch == '#' {
                    cells[row][col] = CellState::Filled(self);
                }
            }
        }
        Shape {
            kind: self,
            size: pattern.len(),
            cells,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
    #[default]
    Empty,
    Filled(PieceKind),
}

impl CellState {
    pub fn is_empty(self) -> bool {
        self == CellState::Empty
    }

    /// 0 for empty, otherwise the piece identity value.
    pub fn value(self) -> u8 {
        match self {
            CellState::Empty => 0,
            CellState::Filled(kind) => kind.id(),
        }
    }
}

// ============================================================================
// Shape
// ============================================================================

/// A square matrix holding one piece in its current orientation.
///
/// Only the top-left `size x size` corner of `cells` is meaningful.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Shape {
    kind: PieceKind,
    size: usize,
    cells: [[CellState; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Width (and height) of the shape's frame.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell(&self, col: usize, row: usize) -> CellState {
        if col < self.size && row < self.size {
            self.cells[row][col]
        } else {
            CellState::Empty
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> + '_ {
        self.cells[..self.size].iter().map(|row| &row[..self.size])
    }

    /// Shape-local `(col, row)` coordinates of every filled cell.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| !cell.is_empty())
                .map(move |(col, _)| (col, row))
        })
    }

    /// Rotates 90 degrees clockwise in place: transpose, then reverse each row.
    pub fn rotate_clockwise(&mut self) {
        let n = self.size;
        for row in 0..n {
            for col in 0..row {
                let tmp = self.cells[row][col];
                self.cells[row][col] = self.cells[col][row];
                self.cells[col][row] = tmp;
            }
        }
        for row in self.cells[..n].iter_mut() {
            row[..n].reverse();
        }
    }

    pub fn rotate_counter_clockwise(&mut self) {
        for _ in 0..3 {
            self.rotate_clockwise();
        }
    }
}
