//! In-memory sheets and workbooks.
//!
//! [`GridSurface`] is the concrete [`Surface`] the engines draw on. It keeps
//! the last value written to every cell together with merges, connectors
//! and links, so that exporters can walk a finished sheet in row order.

use indexmap::IndexMap;
use log::trace;

use fibermap_core::{
    draw::{RowSpan, StyleTag, Surface},
    identifier::Id,
};

/// Name of the topology overview sheet.
pub const OVERVIEW_SHEET: &str = "Topology";

/// Content of one grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub value: String,
    pub style: StyleTag,
}

/// A vertical run of cells rendered as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    pub rows: RowSpan,
    pub column: u32,
}

/// A vertical connector line along a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub rows: RowSpan,
    pub column: u32,
    pub style: StyleTag,
}

/// One sheet of a workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridSurface {
    cells: IndexMap<(u32, u32), Cell>,
    merges: Vec<Merge>,
    connectors: Vec<Connector>,
    links: IndexMap<(u32, u32), String>,
}

impl GridSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, row: u32, column: u32) -> Option<&Cell> {
        self.cells.get(&(row, column))
    }

    /// Value at `(row, column)`, if a cell was written there.
    pub fn value(&self, row: u32, column: u32) -> Option<&str> {
        self.cell(row, column).map(|cell| cell.value.as_str())
    }

    /// Cells sorted by row then column.
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u32), &Cell)> {
        let mut keys: Vec<_> = self.cells.keys().copied().collect();
        keys.sort_unstable();
        keys.into_iter()
            .filter_map(|key| self.cells.get(&key).map(|cell| (key, cell)))
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Target sheet of the link at `(row, column)`.
    pub fn link_at(&self, row: u32, column: u32) -> Option<&str> {
        self.links.get(&(row, column)).map(String::as_str)
    }

    pub fn links(&self) -> impl Iterator<Item = ((u32, u32), &str)> {
        self.links.iter().map(|(key, target)| (*key, target.as_str()))
    }

    /// Highest row touched by any cell, merge or connector.
    pub fn max_row(&self) -> u32 {
        let cells = self.cells.keys().map(|(row, _)| *row);
        let merges = self.merges.iter().map(|merge| merge.rows.last());
        let connectors = self.connectors.iter().map(|line| line.rows.last());
        cells.chain(merges).chain(connectors).max().unwrap_or(0)
    }

    /// Highest column touched by any cell, merge or connector.
    pub fn max_column(&self) -> u32 {
        let cells = self.cells.keys().map(|(_, column)| *column);
        let merges = self.merges.iter().map(|merge| merge.column);
        let connectors = self.connectors.iter().map(|line| line.column);
        cells.chain(merges).chain(connectors).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.connectors.is_empty()
    }
}

impl Surface for GridSurface {
    fn place(&mut self, row: u32, column: u32, value: &str, style: StyleTag) {
        self.cells.insert(
            (row, column),
            Cell {
                value: value.to_string(),
                style,
            },
        );
    }

    fn merge(&mut self, rows: RowSpan, column: u32, value: &str, style: StyleTag) {
        self.place(rows.first(), column, value, style);
        self.merges.push(Merge { rows, column });
    }

    fn connect(&mut self, rows: RowSpan, column: u32, style: StyleTag) {
        trace!(column, first = rows.first(), last = rows.last(); "Grid connector");
        self.connectors.push(Connector {
            rows,
            column,
            style,
        });
    }

    fn link(&mut self, row: u32, column: u32, target_sheet: &str) {
        self.links.insert((row, column), target_sheet.to_string());
    }
}

/// Ordered named sheets: the overview first, then one table per origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workbook {
    sheets: IndexMap<String, GridSurface>,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// Creates a workbook holding an empty overview sheet.
    pub fn new() -> Self {
        let mut sheets = IndexMap::new();
        sheets.insert(OVERVIEW_SHEET.to_string(), GridSurface::new());
        Self { sheets }
    }

    pub fn overview(&self) -> &GridSurface {
        &self.sheets[0]
    }

    pub fn overview_mut(&mut self) -> &mut GridSurface {
        &mut self.sheets[0]
    }

    /// Returns the table sheet of `origin`, creating it if needed.
    pub fn table_sheet_mut(&mut self, origin: Id) -> &mut GridSurface {
        self.sheets.entry(origin.to_string()).or_default()
    }

    pub fn sheet(&self, name: &str) -> Option<&GridSurface> {
        self.sheets.get(name)
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn sheets(&self) -> impl Iterator<Item = (&str, &GridSurface)> {
        self.sheets.iter().map(|(name, sheet)| (name.as_str(), sheet))
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
