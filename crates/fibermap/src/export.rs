pub mod svg;

use crate::{error::FibermapError, grid::Workbook};

/// Writes a finished workbook to some output format.
pub trait Exporter {
    /// Exports every sheet of `workbook` and returns the number of files written.
    fn export_workbook(&self, workbook: &Workbook) -> Result<usize, FibermapError>;
}
