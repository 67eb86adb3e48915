//! Recorded draw instructions.

use crate::draw::{RowSpan, StyleTag, Surface};

/// One operation issued against a [`Surface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawInstruction {
    Place {
        row: u32,
        column: u32,
        value: String,
        style: StyleTag,
    },
    Merge {
        rows: RowSpan,
        column: u32,
        value: String,
        style: StyleTag,
    },
    Connect {
        rows: RowSpan,
        column: u32,
        style: StyleTag,
    },
    Link {
        row: u32,
        column: u32,
        target: String,
    },
}

impl DrawInstruction {
    /// Returns the rows touched by this instruction.
    pub fn rows(&self) -> RowSpan {
        match self {
            Self::Place { row, .. } | Self::Link { row, .. } => RowSpan::new(*row, *row),
            Self::Merge { rows, .. } | Self::Connect { rows, .. } => *rows,
        }
    }

    /// Returns the column touched by this instruction.
    pub fn column(&self) -> u32 {
        match self {
            Self::Place { column, .. }
            | Self::Merge { column, .. }
            | Self::Connect { column, .. }
            | Self::Link { column, .. } => *column,
        }
    }
}

/// A [`Surface`] that records every instruction in issue order.
///
/// # Example
///
/// ```
/// # use fibermap_core::draw::{InstructionLog, RowSpan, StyleTag, Surface};
/// let mut log = InstructionLog::new();
/// log.place(2, 1, "SRO", StyleTag::BoxHeader);
/// log.connect(RowSpan::new(10, 17), 1, StyleTag::Route);
///
/// assert_eq!(log.len(), 2);
/// assert_eq!(log.connectors().count(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InstructionLog {
    items: Vec<DrawInstruction>,
}

impl InstructionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawInstruction> {
        self.items.iter()
    }

    /// Returns only the connector instructions as `(rows, column)` pairs.
    pub fn connectors(&self) -> impl Iterator<Item = (RowSpan, u32)> + '_ {
        self.items.iter().filter_map(|item| match item {
            DrawInstruction::Connect { rows, column, .. } => Some((*rows, *column)),
            _ => None,
        })
    }

    /// Returns the value placed at `(row, column)` by the most recent `Place`, if any.
    pub fn value_at(&self, row: u32, column: u32) -> Option<&str> {
        self.items.iter().rev().find_map(|item| match item {
            DrawInstruction::Place {
                row: r,
                column: c,
                value,
                ..
            } if *r == row && *c == column => Some(value.as_str()),
            DrawInstruction::Merge {
                rows,
                column: c,
                value,
                ..
            } if rows.first() == row && *c == column => Some(value.as_str()),
            _ => None,
        })
    }

    /// Replays the recorded instructions onto another surface.
    pub fn replay(&self, surface: &mut dyn Surface) {
        for item in &self.items {
            match item {
                DrawInstruction::Place {
                    row,
                    column,
                    value,
                    style,
                } => surface.place(*row, *column, value, *style),
                DrawInstruction::Merge {
                    rows,
                    column,
                    value,
                    style,
                } => surface.merge(*rows, *column, value, *style),
                DrawInstruction::Connect { rows, column, style } => {
                    surface.connect(*rows, *column, *style)
                }
                DrawInstruction::Link {
                    row,
                    column,
                    target,
                } => surface.link(*row, *column, target),
            }
        }
    }
}

impl Surface for InstructionLog {
    fn place(&mut self, row: u32, column: u32, value: &str, style: StyleTag) {
        self.items.push(DrawInstruction::Place {
            row,
            column,
            value: value.to_string(),
            style,
        });
    }

    fn merge(&mut self, rows: RowSpan, column: u32, value: &str, style: StyleTag) {
        self.items.push(DrawInstruction::Merge {
            rows,
            column,
            value: value.to_string(),
            style,
        });
    }

    fn connect(&mut self, rows: RowSpan, column: u32, style: StyleTag) {
        self.items
            .push(DrawInstruction::Connect { rows, column, style });
    }

    fn link(&mut self, row: u32, column: u32, target_sheet: &str) {
        self.items.push(DrawInstruction::Link {
            row,
            column,
            target: target_sheet.to_string(),
        });
    }
}

impl<'a> IntoIterator for &'a InstructionLog {
    type Item = &'a DrawInstruction;
    type IntoIter = std::slice::Iter<'a, DrawInstruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut log = InstructionLog::new();
        log.place(2, 1, "SRO", StyleTag::BoxHeader);
        log.link(3, 1, "SRO-01");
        log.merge(RowSpan::new(2, 3), 4, "Tube", StyleTag::Header);

        let columns: Vec<u32> = log.iter().map(DrawInstruction::column).collect();
        assert_eq!(columns, vec![1, 1, 4]);
        assert_eq!(log.value_at(2, 4), Some("Tube"));
        assert_eq!(log.value_at(2, 1), Some("SRO"));
        assert_eq!(log.value_at(5, 1), None);
    }

    #[test]
    fn test_replay_reproduces_stream() {
        let mut log = InstructionLog::new();
        log.place(2, 1, "A", StyleTag::Plain);
        log.connect(RowSpan::new(4, 6), 2, StyleTag::Route);

        let mut copy = InstructionLog::new();
        log.replay(&mut copy);

        let original: Vec<_> = log.iter().cloned().collect();
        let replayed: Vec<_> = copy.iter().cloned().collect();
        assert_eq!(original, replayed);
    }
}
