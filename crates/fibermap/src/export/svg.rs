//! SVG rendering of grid sheets.
//!
//! Each sheet becomes one `<name>.svg` file. Cells are laid on a fixed grid
//! whose column widths come from [`StyleConfig`]; connectors are drawn as a
//! thick line along the right border of their column, and sheet links
//! become anchors to the target sheet's file.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, error, info};
use svg::{
    Document, Node,
    node::element::{Anchor, Line, Rectangle, Text},
};

use fibermap_core::draw::StyleTag;

use super::Exporter;
use crate::{
    config::StyleConfig,
    error::FibermapError,
    grid::{GridSurface, OVERVIEW_SHEET, Workbook},
};

const MARGIN: f32 = 10.0;
const CONNECTOR_WIDTH: f32 = 3.0;
const BORDER_WIDTH: f32 = 2.0;
const FONT_FAMILY: &str = "Arial, sans-serif";

/// Column geometry of one sheet.
#[derive(Debug, Clone)]
struct ColumnGrid {
    /// Left edge of every column, index 0 is column 1.
    edges: Vec<f32>,
    row_height: f32,
}

impl ColumnGrid {
    fn new(widths: impl Iterator<Item = f32>, columns: u32, row_height: f32) -> Self {
        let mut edges = Vec::with_capacity(columns as usize + 1);
        let mut x = MARGIN;
        edges.push(x);
        for width in widths.take(columns as usize) {
            x += width;
            edges.push(x);
        }
        Self { edges, row_height }
    }

    fn left(&self, column: u32) -> f32 {
        self.edge(column.saturating_sub(1))
    }

    fn right(&self, column: u32) -> f32 {
        self.edge(column)
    }

    fn edge(&self, index: u32) -> f32 {
        self.edges
            .get(index as usize)
            .or_else(|| self.edges.last())
            .copied()
            .unwrap_or(MARGIN)
    }

    fn top(&self, row: u32) -> f32 {
        MARGIN + row.saturating_sub(1) as f32 * self.row_height
    }

    fn width(&self) -> f32 {
        self.edges.last().copied().unwrap_or(MARGIN) + MARGIN
    }
}

/// Exports workbooks as one SVG file per sheet.
pub struct SvgExporter {
    output_dir: PathBuf,
    style: StyleConfig,
}

impl SvgExporter {
    pub fn new(output_dir: impl Into<PathBuf>, style: &StyleConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            style: style.clone(),
        }
    }

    /// File name of the sheet called `name`.
    pub fn file_name(name: &str) -> String {
        let safe: String = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("{safe}.svg")
    }

    fn column_grid(&self, name: &str, sheet: &GridSurface) -> ColumnGrid {
        let columns = sheet.max_column().max(1);
        let default = self.style.default_column_width();
        let widths: Vec<f32> = if name == OVERVIEW_SHEET {
            self.style.topology_columns().to_vec()
        } else {
            self.style.table_columns().to_vec()
        };

        let cycle = name != OVERVIEW_SHEET && !widths.is_empty();
        let width_of = move |index: usize| -> f32 {
            if cycle {
                widths[index % widths.len()]
            } else {
                widths.get(index).copied().unwrap_or(default)
            }
        };

        ColumnGrid::new(
            (0..columns as usize).map(width_of),
            columns,
            self.style.row_height(),
        )
    }

    /// Renders one sheet to an SVG document.
    pub fn render_sheet(&self, name: &str, sheet: &GridSurface) -> Document {
        let grid = self.column_grid(name, sheet);
        let height = grid.top(sheet.max_row() + 1) + MARGIN;
        let width = grid.width();
        debug!(sheet = name, width, height; "Rendering sheet");

        let mut doc = Document::new()
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("width", width)
            .set("height", height);

        if let Some(color) = self.style.background_color() {
            doc.append(
                Rectangle::new()
                    .set("width", "100%")
                    .set("height", "100%")
                    .set("fill", color),
            );
        }

        for merge in sheet.merges() {
            doc.append(
                Rectangle::new()
                    .set("x", grid.left(merge.column))
                    .set("y", grid.top(merge.rows.first()))
                    .set("width", grid.right(merge.column) - grid.left(merge.column))
                    .set("height", merge.rows.len() as f32 * grid.row_height)
                    .set("fill", "none")
                    .set("stroke", "black")
                    .set("stroke-width", 1.0),
            );
        }

        for ((row, column), cell) in sheet.cells() {
            let rect = self.cell_rectangle(&grid, row, column, cell.style);
            doc.append(rect);
            if let Some(line) = box_border(&grid, row, column, cell.style) {
                doc.append(line);
            }

            if cell.value.is_empty() {
                continue;
            }
            let text = self.cell_text(&grid, row, column, &cell.value, cell.style);
            match sheet.link_at(row, column) {
                Some(target) => doc.append(
                    Anchor::new()
                        .set("href", Self::file_name(target))
                        .add(text),
                ),
                None => doc.append(text),
            }
        }

        for connector in sheet.connectors() {
            let x = grid.right(connector.column);
            doc.append(
                Line::new()
                    .set("x1", x)
                    .set("y1", grid.top(connector.rows.first()))
                    .set("x2", x)
                    .set("y2", grid.top(connector.rows.last() + 1))
                    .set("stroke", "black")
                    .set("stroke-width", CONNECTOR_WIDTH),
            );
        }

        doc
    }

    fn cell_rectangle(&self, grid: &ColumnGrid, row: u32, column: u32, style: StyleTag) -> Rectangle {
        let fill = style
            .fill()
            .map_or_else(|| "none".to_string(), |color| color.to_string());
        let stroke = match style {
            StyleTag::Plain | StyleTag::Title | StyleTag::Route => "none",
            StyleTag::BoxHeader | StyleTag::BoxBody | StyleTag::BoxFooter => "black",
            _ => "#808080",
        };

        Rectangle::new()
            .set("x", grid.left(column))
            .set("y", grid.top(row))
            .set("width", grid.right(column) - grid.left(column))
            .set("height", grid.row_height)
            .set("fill", fill)
            .set("stroke", stroke)
            .set("stroke-width", 0.5)
    }

    fn cell_text(&self, grid: &ColumnGrid, row: u32, column: u32, value: &str, style: StyleTag) -> Text {
        let mut text = Text::new(value)
            .set("x", grid.left(column) + 3.0)
            .set("y", grid.top(row) + grid.row_height / 2.0)
            .set("dominant-baseline", "middle")
            .set("font-family", FONT_FAMILY)
            .set("font-size", self.style.font_size());
        if style.is_bold() {
            text = text.set("font-weight", "bold");
        }
        if matches!(style, StyleTag::Title) {
            text = text.set("fill", "#0563C1").set("text-decoration", "underline");
        }
        text
    }

    /// Writes an SVG document to `path`.
    fn write_document(&self, path: &Path, doc: &Document) -> Result<(), FibermapError> {
        info!(path:? = path; "Creating SVG file");
        let mut file = File::create(path).map_err(|err| {
            error!(path:? = path, err:%; "Failed to create SVG file");
            FibermapError::Io(err)
        })?;

        if let Err(err) = write!(file, "{doc}") {
            error!(path:? = path, err:%; "Failed to write SVG content");
            return Err(FibermapError::Io(err));
        }
        Ok(())
    }
}

/// Thick outline for the top of header rows and the bottom of footer rows.
fn box_border(grid: &ColumnGrid, row: u32, column: u32, style: StyleTag) -> Option<Line> {
    let y = match style {
        StyleTag::BoxHeader | StyleTag::CableHeader => grid.top(row),
        StyleTag::BoxFooter => grid.top(row + 1),
        _ => return None,
    };
    Some(
        Line::new()
            .set("x1", grid.left(column))
            .set("y1", y)
            .set("x2", grid.right(column))
            .set("y2", y)
            .set("stroke", "black")
            .set("stroke-width", BORDER_WIDTH),
    )
}

impl Exporter for SvgExporter {
    fn export_workbook(&self, workbook: &Workbook) -> Result<usize, FibermapError> {
        if !self.output_dir.is_dir() {
            return Err(FibermapError::Export(format!(
                "output directory `{}` does not exist",
                self.output_dir.display()
            )));
        }

        for (name, sheet) in workbook.sheets() {
            let doc = self.render_sheet(name, sheet);
            let path = self.output_dir.join(Self::file_name(name));
            self.write_document(&path, &doc)?;
        }

        info!(sheets = workbook.len(), dir:? = self.output_dir; "SVG export finished");
        Ok(workbook.len())
    }
}
