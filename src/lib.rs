//! Falling-block puzzle engine.
//!
//! The engine owns a 12x20 grid, a bag randomizer and one active piece. A
//! frontend reads the state for display and drives it through the
//! [`game::Game`] operations plus a per-frame [`game::Game::tick`].

pub mod bag;
pub mod game;
pub mod grid;
pub mod piece;
