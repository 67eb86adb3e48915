//! Fibermap - numbering, topology diagrams and wiring tables for fibre
//! distribution networks.
//!
//! A network is a forest of origins (splitting points) feeding cables and
//! distribution boxes over three tiers. Fibermap:
//!
//! 1. propagates a global port offset to every cable and box
//!    ([`propagate`]);
//! 2. lays the trees out on an overview sheet ([`layout`]);
//! 3. fills a wiring table per origin ([`table`]);
//! 4. exports the resulting [`grid::Workbook`] as SVG.

pub mod config;
pub mod grid;
pub mod layout;
pub mod propagate;
pub mod report;
pub mod table;

mod error;
mod export;

pub use fibermap_core::{draw, fiber, identifier, network, repository};

pub use error::FibermapError;

use std::{fs, path::Path};

use log::{debug, info, warn};

use fibermap_core::repository::Repository;
use fibermap_store::{FileRepository, NetworkDocument, StoreError};

use config::AppConfig;
use export::{Exporter, svg::SvgExporter};
use grid::{OVERVIEW_SHEET, Workbook};
use layout::TopologyLayout;
use report::{GenerationReport, Issue};
use table::{WiringTableBuilder, render_table};

/// Builder running the full generation pipeline over a repository.
///
/// # Examples
///
/// ```rust
/// use fibermap::{TopologyBuilder, config::AppConfig, report::Status};
/// use fibermap::network::{CableSegment, DistributionBox, Level, OriginPoint, PortRange};
/// use fibermap_store::MemoryRepository;
///
/// let mut repo = MemoryRepository::new()
///     .with_origin(OriginPoint::new("SRO-01"))
///     .with_segment(
///         CableSegment::first("C-1", "S-1", "SRO-01", Level::One, PortRange::new(1, 24))
///             .with_extremity("B-1"),
///     )
///     .with_box(DistributionBox::new("B-1", "S-1", PortRange::new(1, 24)));
///
/// let builder = TopologyBuilder::new(AppConfig::default());
/// let (workbook, report) = builder.generate(&mut repo).expect("generation");
///
/// assert_eq!(report.status(), Status::Success);
/// assert_eq!(workbook.len(), 2);
/// ```
#[derive(Default)]
pub struct TopologyBuilder {
    config: AppConfig,
    skip_propagation: bool,
}

impl TopologyBuilder {
    /// Create a new builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Layout, table and style settings
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            skip_propagation: false,
        }
    }

    /// Use the offsets already stored in the repository instead of
    /// recomputing them.
    pub fn without_propagation(mut self) -> Self {
        self.skip_propagation = true;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs propagation, layout and table filling over `repository`.
    ///
    /// Data problems confined to one branch do not fail the run; they are
    /// listed in the returned [`GenerationReport`]. A network without origins
    /// yields a report with [`Status::Failure`](report::Status::Failure).
    ///
    /// # Errors
    ///
    /// Returns [`FibermapError::Config`] for an invalid configuration,
    /// [`FibermapError::Repository`] when a read fails and
    /// [`FibermapError::RepositoryWrite`] when offsets cannot be written.
    pub fn generate<R>(&self, repository: &mut R) -> Result<(Workbook, GenerationReport), FibermapError>
    where
        R: Repository + ?Sized,
    {
        self.config.validate()?;

        let mut workbook = Workbook::new();
        let roots = repository.get_root_nodes()?;
        if roots.is_empty() {
            warn!("Network has no origin points");
            let report = GenerationReport::new(Vec::new(), vec![Issue::NoRoots]);
            return Ok((workbook, report));
        }
        info!(roots = roots.len(); "Generating topology");

        let mut issues = Vec::new();
        if self.skip_propagation {
            debug!("Propagation skipped, using stored offsets");
        } else {
            let outcome = propagate::propagate_all(repository)?;
            merge_issues(&mut issues, outcome.issues);
        }

        let layout = TopologyLayout::new(&*repository, self.config.layout());
        layout.layout_all(workbook.overview_mut())?;

        let tables = WiringTableBuilder::new(&*repository, self.config.table());
        for root in &roots {
            let (table, table_issues) = tables.build(root)?;
            merge_issues(&mut issues, table_issues);

            let sheet = workbook.table_sheet_mut(root.code);
            render_table(&table, self.config.table(), OVERVIEW_SHEET, sheet);
        }

        let sheets = workbook.sheet_names().map(str::to_string).collect();
        let report = GenerationReport::new(sheets, issues);
        info!(
            status:% = report.status(),
            sheets = workbook.len(),
            issues = report.issues().len();
            "Generation finished"
        );
        Ok((workbook, report))
    }

    /// Writes every sheet of `workbook` as `<sheet>.svg` into `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`FibermapError::Export`] if `output_dir` is missing and
    /// [`FibermapError::Io`] if a file cannot be written.
    pub fn export_svg(&self, workbook: &Workbook, output_dir: &Path) -> Result<usize, FibermapError> {
        SvgExporter::new(output_dir, self.config.style()).export_workbook(workbook)
    }
}

/// Loads the TOML network document at `path` into a [`FileRepository`]
/// that persists back to the same file.
///
/// # Errors
///
/// Returns [`FibermapError::Load`] carrying the document text, so that
/// parse errors can be shown against their source.
pub fn open_network(path: impl AsRef<Path>) -> Result<FileRepository, FibermapError> {
    let path = path.as_ref();
    info!(path:? = path; "Opening network");

    let src = fs::read_to_string(path).map_err(|source| {
        let err = StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        FibermapError::new_load_error(path, String::new(), err)
    })?;

    match NetworkDocument::from_toml(&src) {
        Ok(document) => Ok(FileRepository::from_document(path, document)),
        Err(err) => Err(FibermapError::new_load_error(path, src, err)),
    }
}

/// Appends `found` to `issues`, skipping issues already recorded.
fn merge_issues(issues: &mut Vec<Issue>, found: Vec<Issue>) {
    for issue in found {
        if !issues.contains(&issue) {
            issues.push(issue);
        }
    }
}
