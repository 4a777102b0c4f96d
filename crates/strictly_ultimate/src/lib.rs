//! Pure ultimate tic-tac-toe board logic.
//!
//! The board is nine 3x3 sub-boards. Each mark sends the opponent to the
//! sub-board matching the cell just played, unless that sub-board is
//! already won. This crate computes sub-board winners and the forced
//! sub-board, and converts positions to and from the canonical text form
//! shared with the analysis engine.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod direction;
mod notation;
pub mod rules;
mod types;

pub use board::{BoardState, LocalBoard};
pub use direction::Direction;
pub use notation::{Notation, NotationError};
pub use types::{Mark, Move, MoveError, Square};
