//! Positions in a document.

use std::fmt::{self, Display, Formatter};

/// Represents a logical position in a document denoted by _row_ and _col_, both of
/// which are `0`-based. The column counts characters.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

/// Directions of cursor movement.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Position {
    /// A position of (`0`, `0`).
    pub const TOP: Position = Position::new(0, 0);

    /// Creates a new position with `row` and `col`.
    pub const fn new(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    /// Parses a user-supplied position in `value` of the form _line_ \[ (`,` | `:`)
    /// _col_ \], where both values are `1`-based.
    ///
    /// Returns `None` if `value` is malformed.
    pub fn parse(value: &str) -> Option<Position> {
        let vs = value
            .split([',', ':'])
            .map(|v| v.trim())
            .filter(|v| v.len() > 0)
            .collect::<Vec<_>>();

        match &vs[..] {
            [row] => row
                .parse::<usize>()
                .ok()
                .map(|r| Position::new(r.saturating_sub(1), 0)),
            [row, col] => match (row.parse::<usize>(), col.parse::<usize>()) {
                (Ok(r), Ok(c)) => Some(Position::new(r.saturating_sub(1), c.saturating_sub(1))),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Display for Position {
    /// Formats the position in `1`-based form, which is how users see it.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.col + 1)
    }
}
