//! Serialized position notation.
//!
//! The canonical text form of a position is
//! `<to-move>;<summary>;<board>` where `<summary>` has one character per
//! sub-board (`.`, `X`, `O` for its winner, `@` for the forced sub-board)
//! and `<board>` lists the nine sub-boards as nine cell characters each,
//! separated by `/`. The analysis engine reads this form and the move tree
//! uses it as the identity of a rendered move.

use super::board::{BoardState, LocalBoard};
use super::types::{Mark, Move, Square};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Marker for the forced sub-board in the summary segment.
const ACTIVE: char = '@';

/// A position in canonical form: side to move, forced sub-board and cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Notation {
    to_move: Mark,
    active: Option<usize>,
    board: BoardState,
}

impl Notation {
    /// Builds the notation for `board` after `last_move`, with `to_move` next.
    #[instrument(level = "debug", skip(board))]
    pub fn new(to_move: Mark, board: BoardState, last_move: Option<Move>) -> Self {
        Self {
            to_move,
            active: board.active_subboard(last_move),
            board,
        }
    }

    /// Side to move.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Forced sub-board, if any.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Board cells.
    pub fn board(&self) -> &BoardState {
        &self.board
    }
}

impl std::fmt::Display for Notation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{};", self.to_move.symbol())?;
        for (i, winner) in self.board.winners().iter().enumerate() {
            let c = if Some(i) == self.active {
                ACTIVE
            } else {
                winner.map_or('.', Mark::symbol)
            };
            write!(f, "{}", c)?;
        }
        write!(f, ";")?;
        for (i, local) in self.board.boards().iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            for square in local.squares() {
                write!(f, "{}", square.symbol())?;
            }
        }
        Ok(())
    }
}

/// Reasons a serialized position fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum NotationError {
    /// Not three `;`-separated segments.
    #[display("Expected 3 ';'-separated segments, found {}", _0)]
    Segments(usize),

    /// Side-to-move segment is not `X` or `O`.
    #[display("Invalid side to move: {:?}", _0)]
    ToMove(String),

    /// Summary segment is not 9 characters of `.XO@` with at most one `@`.
    #[display("Invalid sub-board summary: {:?}", _0)]
    Summary(String),

    /// Board segment is not 9 groups of 9 cells.
    #[display("Invalid board segment: {:?}", _0)]
    Board(String),

    /// Summary disagrees with the winners computed from the cells.
    #[display("Summary does not match sub-board {}", _0)]
    Inconsistent(usize),
}

impl std::error::Error for NotationError {}

impl FromStr for Notation {
    type Err = NotationError;

    #[instrument(level = "debug")]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split(';').collect();
        let [to_move, summary, cells] = segments.as_slice() else {
            return Err(NotationError::Segments(segments.len()));
        };

        let to_move = {
            let mut chars = to_move.chars();
            match (chars.next().and_then(Mark::from_symbol), chars.next()) {
                (Some(mark), None) => mark,
                _ => return Err(NotationError::ToMove(to_move.to_string())),
            }
        };

        let groups: Vec<&str> = cells.split('/').collect();
        if groups.len() != 9 {
            return Err(NotationError::Board(cells.to_string()));
        }
        let mut boards = [LocalBoard::new(); 9];
        for (slot, group) in boards.iter_mut().zip(&groups) {
            let squares: Vec<Square> = group
                .chars()
                .map(Square::from_symbol)
                .collect::<Option<_>>()
                .ok_or_else(|| NotationError::Board(cells.to_string()))?;
            let squares: [Square; 9] = squares
                .try_into()
                .map_err(|_| NotationError::Board(cells.to_string()))?;
            *slot = LocalBoard::from_squares(squares);
        }
        let board = BoardState::from_boards(boards);

        let summary_chars: Vec<char> = summary.chars().collect();
        if summary_chars.len() != 9 {
            return Err(NotationError::Summary(summary.to_string()));
        }
        let mut active = None;
        for (i, &c) in summary_chars.iter().enumerate() {
            let winner = board.winner_of(i);
            match c {
                ACTIVE if active.is_none() && winner.is_none() => active = Some(i),
                ACTIVE => return Err(NotationError::Summary(summary.to_string())),
                '.' if winner.is_none() => {}
                '.' => return Err(NotationError::Inconsistent(i)),
                other => match Mark::from_symbol(other) {
                    Some(mark) if winner == Some(mark) => {}
                    Some(_) => return Err(NotationError::Inconsistent(i)),
                    None => return Err(NotationError::Summary(summary.to_string())),
                },
            }
        }

        Ok(Self {
            to_move,
            active,
            board,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_notation() {
        let notation = Notation::new(Mark::X, BoardState::new(), None);
        let empty = vec!["........."; 9].join("/");
        assert_eq!(notation.to_string(), format!("X;.........;{}", empty));
    }

    #[test]
    fn test_active_marker_in_summary() {
        let mv = Move::new(0, 4).unwrap();
        let board = BoardState::new().with_mark(mv, Mark::X).unwrap();
        let text = Notation::new(Mark::O, board, Some(mv)).to_string();
        assert!(text.starts_with("O;....@....;....X..../"));
    }

    #[test]
    fn test_rejects_bad_segments() {
        assert_eq!(
            "X;.........".parse::<Notation>(),
            Err(NotationError::Segments(2))
        );
        let empty = vec!["........."; 9].join("/");
        assert!(matches!(
            format!("Z;.........;{}", empty).parse::<Notation>(),
            Err(NotationError::ToMove(_))
        ));
        assert!(matches!(
            format!("X;..@@.....;{}", empty).parse::<Notation>(),
            Err(NotationError::Summary(_))
        ));
        assert!(matches!(
            "X;.........;..../".parse::<Notation>(),
            Err(NotationError::Board(_))
        ));
    }

    #[test]
    fn test_rejects_inconsistent_summary() {
        let empty = vec!["........."; 9].join("/");
        assert_eq!(
            format!("X;X........;{}", empty).parse::<Notation>(),
            Err(NotationError::Inconsistent(0))
        );
    }
}
