//! Board storage: nine local boards of nine cells each.

use super::rules::check_winner;
use super::types::{Mark, Move, MoveError, Square};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One 3x3 sub-board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LocalBoard {
    /// Squares in row-major order (0-8).
    squares: [Square; 9],
}

impl LocalBoard {
    /// Creates an empty sub-board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sub-board from its squares.
    pub fn from_squares(squares: [Square; 9]) -> Self {
        Self { squares }
    }

    /// Gets the square at the given cell (0-8).
    pub fn get(&self, cell: usize) -> Option<Square> {
        self.squares.get(cell).copied()
    }

    /// Returns all squares.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Owner of the first complete line, if any.
    pub fn winner(&self) -> Option<Mark> {
        check_winner(&self.squares)
    }
}

/// The full board: nine sub-boards in row-major order.
///
/// Boards are values: placing a mark returns a new board and leaves the
/// original untouched, so every tree node keeps its own snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BoardState {
    boards: [LocalBoard; 9],
}

impl BoardState {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a board from its sub-boards.
    pub fn from_boards(boards: [LocalBoard; 9]) -> Self {
        Self { boards }
    }

    /// Returns the sub-board at the given index, if in range.
    pub fn board(&self, index: usize) -> Option<&LocalBoard> {
        self.boards.get(index)
    }

    /// Returns all sub-boards.
    pub fn boards(&self) -> &[LocalBoard; 9] {
        &self.boards
    }

    /// Gets the square targeted by a move.
    pub fn square(&self, mv: Move) -> Square {
        self.boards[mv.board()].squares[mv.cell()]
    }

    /// Winner of one sub-board; `None` for open, drawn or out-of-range boards.
    pub fn winner_of(&self, subboard: usize) -> Option<Mark> {
        self.boards.get(subboard).and_then(LocalBoard::winner)
    }

    /// Winner of every sub-board, in order.
    pub fn winners(&self) -> [Option<Mark>; 9] {
        std::array::from_fn(|i| self.boards[i].winner())
    }

    /// Sub-board the next mark is forced into after `last_move`.
    ///
    /// `None` means no constraint: either nothing has been played yet or
    /// the targeted sub-board already has a winner.
    #[instrument(level = "debug", skip(self))]
    pub fn active_subboard(&self, last_move: Option<Move>) -> Option<usize> {
        let target = last_move?.cell();
        match self.winner_of(target) {
            Some(_) => None,
            None => Some(target),
        }
    }

    /// Whether the targeted cell can still receive a mark.
    pub fn is_empty(&self, mv: Move) -> bool {
        self.square(mv) == Square::Empty
    }

    /// Whether a sub-board can be played in given the forced sub-board.
    pub fn is_playable(&self, subboard: usize, active: Option<usize>) -> bool {
        if subboard >= 9 || self.winner_of(subboard).is_some() {
            return false;
        }
        active.is_none_or(|forced| forced == subboard)
    }

    /// Returns a copy of this board with `mark` placed at `mv`.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::Occupied`] if the cell already holds a mark.
    #[instrument(level = "debug", skip(self))]
    pub fn with_mark(&self, mv: Move, mark: Mark) -> Result<Self, MoveError> {
        if !self.is_empty(mv) {
            return Err(MoveError::Occupied(mv));
        }
        let mut next = *self;
        next.boards[mv.board()].squares[mv.cell()] = Square::Occupied(mark);
        Ok(next)
    }
}
