//! Grid drawing model.
//!
//! The engines never talk to a concrete spreadsheet. They emit operations
//! against the [`Surface`] capability: place a value in a cell, merge a
//! vertical run of cells, draw a vertical connector, or link a cell to
//! another sheet. Coordinates are 1-based rows and columns.
//!
//! [`InstructionLog`] is a `Surface` that simply records what it was asked
//! to draw, in order.

mod instruction;
mod style;

pub use instruction::{DrawInstruction, InstructionLog};
pub use style::StyleTag;

use std::fmt;

/// An inclusive, 1-based range of rows within one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowSpan {
    first: u32,
    last: u32,
}

impl RowSpan {
    /// Creates a span covering `first..=last`. The bounds are swapped if given in reverse.
    pub fn new(first: u32, last: u32) -> Self {
        if last < first {
            Self {
                first: last,
                last: first,
            }
        } else {
            Self { first, last }
        }
    }

    /// Creates a span of `len` rows starting at `first`. `len` of zero yields `None`.
    pub fn with_len(first: u32, len: u32) -> Option<Self> {
        (len > 0).then(|| Self::new(first, first + len - 1))
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn last(&self) -> u32 {
        self.last
    }

    pub fn len(&self) -> u32 {
        self.last - self.first + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, row: u32) -> bool {
        (self.first..=self.last).contains(&row)
    }

    /// Returns `true` if the two spans share at least one row.
    pub fn overlaps(&self, other: &RowSpan) -> bool {
        self.first <= other.last && other.first <= self.last
    }

    pub fn rows(&self) -> impl Iterator<Item = u32> {
        self.first..=self.last
    }
}

impl fmt::Display for RowSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.first, self.last)
    }
}

/// A 2-D addressable drawing surface.
///
/// Implementations decide how a [`StyleTag`] looks. Rows and columns are
/// 1-based.
pub trait Surface {
    /// Writes `value` into a single cell.
    fn place(&mut self, row: u32, column: u32, value: &str, style: StyleTag);

    /// Merges `rows` of one column into a single cell holding `value`.
    fn merge(&mut self, rows: RowSpan, column: u32, value: &str, style: StyleTag);

    /// Draws a vertical connector along `rows` of `column`.
    fn connect(&mut self, rows: RowSpan, column: u32, style: StyleTag);

    /// Links a cell to another sheet.
    fn link(&mut self, row: u32, column: u32, target_sheet: &str);
}
