//! Compass directions naming sub-boards and cells in script notation.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A compass label for one of the nine slots of a 3x3 grid.
///
/// The same labels name both a sub-board of the full board and a cell
/// inside a sub-board, so a move is written as `<DIR>/<DIR>`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::EnumString,
    strum::Display,
)]
pub enum Direction {
    /// Top-left (index 0)
    #[strum(to_string = "NW")]
    NorthWest,
    /// Top-center (index 1)
    #[strum(to_string = "N")]
    North,
    /// Top-right (index 2)
    #[strum(to_string = "NE")]
    NorthEast,
    /// Middle-left (index 3)
    #[strum(to_string = "W")]
    West,
    /// Center (index 4)
    #[strum(to_string = "C")]
    Center,
    /// Middle-right (index 5)
    #[strum(to_string = "E")]
    East,
    /// Bottom-left (index 6)
    #[strum(to_string = "SW")]
    SouthWest,
    /// Bottom-center (index 7)
    #[strum(to_string = "S")]
    South,
    /// Bottom-right (index 8)
    #[strum(to_string = "SE")]
    SouthEast,
}

impl Direction {
    /// All 9 directions in row-major order.
    pub const ALL: [Direction; 9] = [
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
        Direction::West,
        Direction::Center,
        Direction::East,
        Direction::SouthWest,
        Direction::South,
        Direction::SouthEast,
    ];

    /// Converts the direction to a grid index (0-8).
    #[instrument]
    pub fn to_index(self) -> usize {
        match self {
            Direction::NorthWest => 0,
            Direction::North => 1,
            Direction::NorthEast => 2,
            Direction::West => 3,
            Direction::Center => 4,
            Direction::East => 5,
            Direction::SouthWest => 6,
            Direction::South => 7,
            Direction::SouthEast => 8,
        }
    }

    /// Creates a direction from a grid index.
    #[instrument]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_index_matches_row_major_order() {
        for (i, dir) in Direction::iter().enumerate() {
            assert_eq!(dir.to_index(), i);
            assert_eq!(Direction::from_index(i), Some(dir));
        }
        assert_eq!(Direction::from_index(9), None);
    }

    #[test]
    fn test_labels_parse() {
        assert_eq!(Direction::from_str("NW").unwrap(), Direction::NorthWest);
        assert_eq!(Direction::from_str("C").unwrap(), Direction::Center);
        assert_eq!(Direction::SouthEast.to_string(), "SE");
        assert!(Direction::from_str("NNE").is_err());
    }
}
