//! Scripted lines in compass notation.
//!
//! A script is a whitespace-separated list of `<DIR>/<DIR>` tokens, the
//! first direction naming the sub-board and the second the cell, e.g.
//! `"NW/C N/N"`.

use derive_more::{Display, Error};
use std::str::FromStr;
use strictly_ultimate::{Direction, Move, MoveError};
use tracing::{debug, instrument};

/// Errors parsing a script.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ScriptError {
    /// Token has no `/` between its two directions.
    #[display("Move {:?} is not of the form <DIR>/<DIR>", token)]
    MissingSeparator {
        /// The offending token.
        #[error(not(source))]
        token: String,
    },

    /// Token names a direction outside NW, N, NE, W, C, E, SW, S, SE.
    #[display("Unknown direction {:?} in move {:?}", label, token)]
    UnknownDirection {
        /// The unrecognised label.
        label: String,
        /// The offending token.
        token: String,
    },

    /// Directions did not form a valid move.
    #[display("Invalid move: {}", source)]
    Move {
        /// Underlying move error.
        source: MoveError,
    },
}

fn direction(label: &str, token: &str) -> Result<Direction, ScriptError> {
    Direction::from_str(label).map_err(|_| ScriptError::UnknownDirection {
        label: label.to_string(),
        token: token.to_string(),
    })
}

/// Parses one `<DIR>/<DIR>` token.
#[instrument(level = "debug")]
pub fn parse_move(token: &str) -> Result<Move, ScriptError> {
    let (board, cell) = token
        .split_once('/')
        .ok_or_else(|| ScriptError::MissingSeparator {
            token: token.to_string(),
        })?;
    let board = direction(board, token)?;
    let cell = direction(cell, token)?;
    Move::new(board.to_index(), cell.to_index()).map_err(|source| ScriptError::Move { source })
}

/// Parses a whole script into moves, in order.
#[instrument]
pub fn parse_script(script: &str) -> Result<Vec<Move>, ScriptError> {
    let moves = script
        .split_whitespace()
        .map(parse_move)
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = moves.len(), "Parsed script");
    Ok(moves)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script_row_major() {
        let moves = parse_script("NW/C N/N  SE/SW").unwrap();
        assert_eq!(
            moves,
            vec![
                Move::new(0, 4).unwrap(),
                Move::new(1, 1).unwrap(),
                Move::new(8, 6).unwrap(),
            ]
        );
    }

    #[test]
    fn test_empty_script() {
        assert_eq!(parse_script("   ").unwrap(), Vec::new());
    }

    #[test]
    fn test_rejects_bad_tokens() {
        assert!(matches!(
            parse_script("NW/C NWC"),
            Err(ScriptError::MissingSeparator { .. })
        ));
        assert_eq!(
            parse_move("NW/X"),
            Err(ScriptError::UnknownDirection {
                label: "X".to_string(),
                token: "NW/X".to_string(),
            })
        );
    }
}
