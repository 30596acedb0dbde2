use std::fmt::{Display, Formatter};

use crate::Coord;

impl Coord {
    /// Coordinate at the very start of the input.
    pub fn origin() -> Self {
        Self {
            row: 0,
            column: 0,
            offset: 0,
        }
    }

    pub fn new(row: usize, column: usize, offset: usize) -> Self {
        Self { row, column, offset }
    }

    /// Coordinate obtained by consuming `text` starting from `self`, staying on the same row.
    pub(crate) fn advance(&self, text: &str) -> Self {
        Self {
            row: self.row,
            column: self.column + text.chars().count(),
            offset: self.offset + text.len(),
        }
    }

    /// Coordinate at the start of the next row, `offset` carried over from the row break.
    pub(crate) fn next_row(&self) -> Self {
        Self {
            row: self.row + 1,
            column: 0,
            offset: self.offset,
        }
    }
}

impl Display for Coord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("")
            .field("row", &self.row)
            .field("column", &self.column)
            .field("offset", &self.offset)
            .finish()
    }
}
