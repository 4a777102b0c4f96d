//! Win detection for a single 3x3 sub-board.
//!
//! Pure functions over a slice of squares, kept apart from board storage
//! so the same check serves local boards and notation decoding.

use super::types::{Mark, Square};
use tracing::instrument;

/// Winning lines, checked in this order; the first complete line decides.
pub const LINES: [[usize; 3]; 8] = [
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Returns the mark owning the first fully occupied line, if any.
///
/// A full sub-board without a line is not reported as drawn.
#[instrument(level = "trace")]
pub fn check_winner(squares: &[Square; 9]) -> Option<Mark> {
    for [a, b, c] in LINES {
        let sq = squares[a];
        if let Square::Occupied(mark) = sq
            && sq == squares[b]
            && sq == squares[c]
        {
            return Some(mark);
        }
    }

    None
}
