use crate::bag::{Bag, PieceProvider};
use crate::grid::{Grid, Position, Row, GRID_WIDTH};
use crate::piece::{CellState, PieceKind, Shape};

// ============================================================================
// Configuration
// ============================================================================

pub const PREVIEW_COUNT: usize = 3;

// Timing (in milliseconds)
pub const DEFAULT_DROP_INTERVAL_MS: u64 = 1000;

// Scoring
pub const SCORE_PER_LINE: u32 = 100;
pub const SCORE_PER_HARD_DROP_ROW: u32 = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameConfig {
    pub drop_interval_ms: u64,
    /// Seed for the bag randomizer; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            drop_interval_ms: DEFAULT_DROP_INTERVAL_MS,
            seed: None,
        }
    }
}

// ============================================================================
// Types
// ============================================================================

/// Column that centers a frame of `size` cells horizontally.
pub fn spawn_x(size: usize) -> i16 {
    (GRID_WIDTH / 2) as i16 - (size / 2) as i16
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ActivePiece {
    pub shape: Shape,
    pub position: Position,
}

impl ActivePiece {
    /// Canonical shape of `kind`, centered on the top row.
    pub fn new(kind: PieceKind) -> Self {
        Self::from_shape(kind.shape())
    }

    pub fn new_at(kind: PieceKind, x: i16, y: i16) -> Self {
        Self {
            shape: kind.shape(),
            position: Position { x, y },
        }
    }

    fn from_shape(shape: Shape) -> Self {
        Self {
            shape,
            position: Position {
                x: spawn_x(shape.size()),
                y: 0,
            },
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.shape.kind()
    }

    /// Grid coordinates of every filled cell.
    pub fn blocks(&self) -> Vec<Position> {
        self.shape
            .filled_cells()
            .map(|(col, row)| self.position.offset(col as i16, row as i16))
            .collect()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PieceState {
    /// Placed at the spawn row and not yet moved down.
    Spawned,
    Falling,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceSpawned(PieceKind),
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    HardDropped { distance: u32 },
    PieceHeld,
    ToppedOut,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub grid: Grid,
    pub current_piece: ActivePiece,
    pub score: u32,
    held: Option<Shape>,
    hold_used: bool,
    piece_state: PieceState,
    drop_counter_ms: u64,
    drop_interval_ms: u64,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        let bag = match config.seed {
            Some(seed) => Bag::seeded(seed),
            None => Bag::new(),
        };
        let mut game = Self::with_provider(Box::new(bag));
        game.drop_interval_ms = config.drop_interval_ms;
        game
    }

    /// Empty grid, first piece drawn from `provider`.
    pub fn with_provider(provider: Box<dyn PieceProvider>) -> Self {
        let placeholder = ActivePiece::new(PieceKind::O);
        let mut game = Self::with_parts(Grid::new(), placeholder, provider);
        game.spawn();
        game
    }

    /// Starts from a prepared grid and piece. Later pieces come from a fresh
    /// random bag.
    pub fn with_grid(grid: Grid, current_piece: ActivePiece) -> Self {
        Self::with_parts(grid, current_piece, Box::new(Bag::new()))
    }

    pub fn with_parts(
        grid: Grid,
        current_piece: ActivePiece,
        provider: Box<dyn PieceProvider>,
    ) -> Self {
        Self {
            grid,
            current_piece,
            score: 0,
            held: None,
            hold_used: false,
            piece_state: PieceState::Spawned,
            drop_counter_ms: 0,
            drop_interval_ms: DEFAULT_DROP_INTERVAL_MS,
            piece_provider: provider,
            events: Vec::new(),
        }
    }

    fn collides(&self, piece: &ActivePiece) -> bool {
        self.grid.collides(&piece.shape, piece.position)
    }

    pub fn is_valid_position(&self, piece: &ActivePiece) -> bool {
        !self.collides(piece)
    }

    fn try_shift(&mut self, dx: i16, dy: i16) -> bool {
        let moved = ActivePiece {
            position: self.current_piece.position.offset(dx, dy),
            ..self.current_piece
        };
        if self.collides(&moved) {
            return false;
        }
        self.current_piece = moved;
        if dy > 0 {
            self.piece_state = PieceState::Falling;
        }
        true
    }

    /// Draws the next piece and places it at the spawn position. A blocked
    /// spawn tops out: the grid is cleared and the score reset.
    pub fn spawn(&mut self) {
        let kind = self.piece_provider.next_piece();
        self.current_piece = ActivePiece::new(kind);
        self.piece_state = PieceState::Spawned;
        self.hold_used = false;
        self.events.push(GameEvent::PieceSpawned(kind));

        if self.collides(&self.current_piece) {
            self.top_out();
        }
    }

    fn top_out(&mut self) {
        self.grid.reset();
        self.score = 0;
        self.events.push(GameEvent::ToppedOut);
    }

    /// Shifts the piece one column; `dir` is -1 (left) or 1 (right).
    /// Returns false, leaving the piece in place, when blocked.
    pub fn move_piece(&mut self, dir: i16) -> bool {
        if self.try_shift(dir, 0) {
            self.events.push(GameEvent::PieceMoved);
            true
        } else {
            false
        }
    }

    /// Moves down one row, locking the piece if it cannot.
    pub fn soft_drop(&mut self) {
        if !self.try_shift(0, 1) {
            self.lock_and_spawn();
        }
        self.drop_counter_ms = 0;
    }

    pub fn hard_drop(&mut self) {
        let mut distance = 0;
        while self.try_shift(0, 1) {
            distance += 1;
        }
        self.lock_and_spawn();
        self.drop_counter_ms = 0;
        self.score += distance * SCORE_PER_HARD_DROP_ROW;
        self.events.push(GameEvent::HardDropped { distance });
    }

    fn lock_and_spawn(&mut self) {
        self.grid
            .merge(&self.current_piece.shape, self.current_piece.position);
        self.events.push(GameEvent::PieceLocked);

        let lines = self.grid.sweep_full_rows();
        if lines > 0 {
            self.score += lines * SCORE_PER_LINE;
            self.events.push(GameEvent::LinesCleared(lines));
        }

        self.spawn();
    }

    /// Rotates clockwise, probing horizontal kicks of +1, -2, +3, ... (applied
    /// cumulatively) until the piece fits or the next kick would exceed the
    /// shape width. A failed search restores orientation and column.
    pub fn rotate(&mut self) -> bool {
        let original_x = self.current_piece.position.x;
        self.current_piece.shape.rotate_clockwise();

        let mut offset: i16 = 1;
        while self.collides(&self.current_piece) {
            self.current_piece.position.x += offset;
            offset = -(offset + offset.signum());
            if offset > self.current_piece.shape.size() as i16 {
                self.current_piece.shape.rotate_counter_clockwise();
                self.current_piece.position.x = original_x;
                return false;
            }
        }

        self.events.push(GameEvent::PieceRotated);
        true
    }

    /// Puts the active piece on hold, once per spawned piece. With an empty
    /// hold slot the next piece is drawn; otherwise the held piece swaps in.
    pub fn hold(&mut self) -> bool {
        if self.hold_used {
            return false;
        }

        let current = self.current_piece.shape;
        match self.held.replace(current) {
            Some(previous) => self.current_piece.shape = previous,
            None => self.spawn(),
        }
        self.current_piece = ActivePiece::from_shape(self.current_piece.shape);
        self.piece_state = PieceState::Spawned;
        self.hold_used = true;
        self.events.push(GameEvent::PieceHeld);

        // A swapped-in piece can land on settled material; treat it like a
        // blocked spawn.
        if self.collides(&self.current_piece) {
            self.top_out();
        }
        true
    }

    /// Advances the gravity timer by `elapsed_ms`. Once the accumulated time
    /// exceeds the drop interval the piece soft-drops. Returns whether it did.
    pub fn tick(&mut self, elapsed_ms: u64) -> bool {
        self.drop_counter_ms = self.drop_counter_ms.saturating_add(elapsed_ms);
        if self.drop_counter_ms > self.drop_interval_ms {
            self.soft_drop();
            return true;
        }
        false
    }

    pub fn drop_interval_ms(&self) -> u64 {
        self.drop_interval_ms
    }

    pub fn held_piece(&self) -> Option<&Shape> {
        self.held.as_ref()
    }

    pub fn hold_used(&self) -> bool {
        self.hold_used
    }

    pub fn piece_state(&self) -> PieceState {
        self.piece_state
    }

    pub fn preview(&self) -> Vec<PieceKind> {
        self.piece_provider.preview(PREVIEW_COUNT)
    }

    /// Where the active piece would land on a hard drop.
    pub fn ghost_position(&self) -> Position {
        self.grid
            .landing_position(&self.current_piece.shape, self.current_piece.position)
    }

    /// Returns the visual grid state with the current piece overlaid
    pub fn render_grid(&self) -> Vec<Row> {
        let mut visual_grid = self.grid.rows().to_vec();

        for block in self.current_piece.blocks() {
            if block.y >= 0
                && (block.y as usize) < visual_grid.len()
                && block.x >= 0
                && (block.x as usize) < GRID_WIDTH
            {
                visual_grid[block.y as usize][block.x as usize] =
                    CellState::Filled(self.current_piece.kind());
            }
        }

        visual_grid
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;

    pub fn empty_grid() -> Grid {
        Grid::new()
    }

    pub fn fill_row(grid: &mut Grid, y: usize) {
        for x in 0..GRID_WIDTH {
            grid.set(x, y, CellState::Filled(PieceKind::T));
        }
    }

    pub fn fill_row_with_gap(grid: &mut Grid, y: usize, gap_x: usize) {
        for x in 0..GRID_WIDTH {
            if x != gap_x {
                grid.set(x, y, CellState::Filled(PieceKind::T));
            }
        }
    }
}
