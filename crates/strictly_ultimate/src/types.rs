//! Core domain types for ultimate tic-tac-toe.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Letters used for the two-letter move notation, one per index.
const LETTERS: [char; 9] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i'];

/// Mark placed by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// Player X (moves first).
    X,
    /// Player O (moves second).
    O,
}

impl Mark {
    /// Returns the opponent's mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Sign used to orient evaluations: +1 for X, -1 for O.
    pub fn sign(self) -> f64 {
        match self {
            Mark::X => 1.0,
            Mark::O => -1.0,
        }
    }

    /// Character used in the serialized notation.
    pub fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }

    /// Parses a notation character.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            'X' => Some(Mark::X),
            'O' => Some(Mark::O),
            _ => None,
        }
    }
}

/// A single cell of a local board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Square {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Cell holds a mark.
    Occupied(Mark),
}

impl Square {
    /// Character used in the serialized notation.
    pub fn symbol(self) -> char {
        match self {
            Square::Empty => '.',
            Square::Occupied(mark) => mark.symbol(),
        }
    }

    /// Parses a notation character (`.`, `X` or `O`).
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '.' => Some(Square::Empty),
            other => Mark::from_symbol(other).map(Square::Occupied),
        }
    }
}

/// A move: the sub-board played in and the cell inside it, both 0-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    board: usize,
    cell: usize,
}

impl Move {
    /// Creates a move, rejecting indices outside 0-8.
    #[instrument]
    pub fn new(board: usize, cell: usize) -> Result<Self, MoveError> {
        if board >= 9 {
            return Err(MoveError::BoardOutOfRange(board));
        }
        if cell >= 9 {
            return Err(MoveError::CellOutOfRange(cell));
        }
        Ok(Self { board, cell })
    }

    /// Index of the sub-board played in.
    pub fn board(&self) -> usize {
        self.board
    }

    /// Index of the cell inside the sub-board.
    pub fn cell(&self) -> usize {
        self.cell
    }

    /// Two-letter notation, sub-board letter then cell letter (`a`-`i`).
    pub fn notation(&self) -> String {
        [LETTERS[self.board], LETTERS[self.cell]].iter().collect()
    }

    /// Parses two-letter notation such as `"ae"`.
    #[instrument]
    pub fn from_notation(s: &str) -> Result<Self, MoveError> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(b), Some(c), None) => {
                let index = |ch: char| LETTERS.iter().position(|&l| l == ch);
                match (index(b), index(c)) {
                    (Some(board), Some(cell)) => Self::new(board, cell),
                    _ => Err(MoveError::BadNotation(s.to_string())),
                }
            }
            _ => Err(MoveError::BadNotation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.notation())
    }
}

/// Error building or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// Sub-board index is not 0-8.
    #[display("Sub-board index {} is out of range (must be 0-8)", _0)]
    BoardOutOfRange(usize),

    /// Cell index is not 0-8.
    #[display("Cell index {} is out of range (must be 0-8)", _0)]
    CellOutOfRange(usize),

    /// Target cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    Occupied(Move),

    /// Text is not a two-letter move.
    #[display("Invalid move notation: {:?}", _0)]
    BadNotation(String),
}

impl std::error::Error for MoveError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_rejects_out_of_range() {
        assert_eq!(Move::new(9, 0), Err(MoveError::BoardOutOfRange(9)));
        assert_eq!(Move::new(0, 12), Err(MoveError::CellOutOfRange(12)));
    }

    #[test]
    fn test_move_notation() {
        let mv = Move::new(0, 4).unwrap();
        assert_eq!(mv.notation(), "ae");
        assert_eq!(Move::from_notation("ie").unwrap(), Move::new(8, 4).unwrap());
        assert!(Move::from_notation("zz").is_err());
        assert!(Move::from_notation("abc").is_err());
    }

    #[test]
    fn test_mark_sign_and_opponent() {
        assert_eq!(Mark::X.opponent(), Mark::O);
        assert_eq!(Mark::O.sign(), -1.0);
    }
}
