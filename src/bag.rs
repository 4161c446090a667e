use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::piece::PieceKind;

/// Number of piece kinds in one shuffled bag.
pub const BAG_SIZE: usize = PieceKind::ALL.len();

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> PieceKind;

    /// Up to `count` upcoming pieces in draw order, without consuming them.
    fn preview(&self, count: usize) -> Vec<PieceKind>;
}

// ============================================================================
// Bag Randomizer
// ============================================================================

/// Bag randomizer. Whenever fewer than `BAG_SIZE` pieces are queued, a fresh
/// shuffled permutation of all kinds is appended.
pub struct Bag {
    queue: VecDeque<PieceKind>,
    rng: StdRng,
}

impl Bag {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            queue: VecDeque::with_capacity(BAG_SIZE * 2),
            rng,
        }
    }

    pub fn ensure_supply(&mut self) {
        while self.queue.len() < BAG_SIZE {
            let mut bag = PieceKind::ALL;
            bag.shuffle(&mut self.rng);
            self.queue.extend(bag);
        }
    }

    pub fn queue(&self) -> &VecDeque<PieceKind> {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for Bag {
    fn next_piece(&mut self) -> PieceKind {
        self.ensure_supply();
        match self.queue.pop_front() {
            Some(kind) => kind,
            None => unreachable!("ensure_supply leaves at least one full bag queued"),
        }
    }

    fn preview(&self, count: usize) -> Vec<PieceKind> {
        self.queue.iter().take(count).copied().collect()
    }
}

// ============================================================================
// Fixed Sequence
// ============================================================================

/// Cycles through a fixed list of pieces. Used for deterministic games.
pub struct SequencePieceProvider {
    pieces: Vec<PieceKind>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<PieceKind>) -> Self {
        assert!(!pieces.is_empty(), "piece sequence must not be empty");
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> PieceKind {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }

    fn preview(&self, count: usize) -> Vec<PieceKind> {
        (0..count)
            .map(|i| self.pieces[(self.index + i) % self.pieces.len()])
            .collect()
    }
}
