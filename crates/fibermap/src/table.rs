//! Per-origin wiring tables.
//!
//! A wiring table lists one row per physical fibre of an origin's tree. Row
//! `first_data_row + offset + i` carries local fibre `i` of a cable whose
//! propagated offset is `offset`, so the fibres of every tier line up with
//! the origin port they are spliced to.
//!
//! The table is split in three tier groups of columns plus a termination
//! column:
//!
//! | tier | fibre rows | box ports |
//! |---|---|---|
//! | 1 | trunk: origin port, ODF, fibre | boxes on tier 1 sections |
//! | 2 | fibre per local port | boxes on tier 2 sections |
//! | 3 | chain of segments, one row per extremity box port | termination label |
//!
//! [`WiringTableBuilder`] fills the typed model, [`render_table`] draws it.

mod fill;
mod render;

pub use fill::WiringTableBuilder;
pub use render::render_table;

use fibermap_core::{identifier::Id, network::Level};

/// One fibre of a cable in a tier group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiberRow {
    pub row: u32,
    pub tier: Level,
    pub section: Id,
    pub cable_type: String,
    /// 1-based fibre number within the cable.
    pub number: u32,
    pub tube: u32,
    pub fiber: u32,
    /// `BOX-ff` label of the terminating port, for chained tier 3 cables.
    pub termination: Option<String>,
}

/// Origin side numbering of a tier 1 fibre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrunkRow {
    pub row: u32,
    /// Running port number across all tier 1 cables of the origin.
    pub origin_port: u32,
    /// 1-based ODF index.
    pub odf: u32,
    pub odf_port: u32,
}

impl TrunkRow {
    pub fn odf_code(&self) -> String {
        format!("ODF{:02}", self.odf)
    }
}

/// One input port of a box hosted on a tier 1 or tier 2 section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxPortRow {
    pub row: u32,
    /// Tier of the section the box sits on.
    pub tier: Level,
    pub code: Id,
    pub box_type: String,
    /// 1-based port number within the box.
    pub number: u32,
}

/// The wiring table of one origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiringTable {
    origin: Id,
    class: String,
    trunk: Vec<TrunkRow>,
    fibers: Vec<FiberRow>,
    box_ports: Vec<BoxPortRow>,
}

impl WiringTable {
    fn new(origin: Id, class: impl Into<String>) -> Self {
        Self {
            origin,
            class: class.into(),
            trunk: Vec::new(),
            fibers: Vec::new(),
            box_ports: Vec::new(),
        }
    }

    pub fn origin(&self) -> Id {
        self.origin
    }

    /// Class label of the origin, used as the first group title.
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn trunk(&self) -> &[TrunkRow] {
        &self.trunk
    }

    pub fn fibers(&self) -> &[FiberRow] {
        &self.fibers
    }

    pub fn box_ports(&self) -> &[BoxPortRow] {
        &self.box_ports
    }

    /// Fibre rows of one tier, in fill order.
    pub fn fibers_of(&self, tier: Level) -> impl Iterator<Item = &FiberRow> {
        self.fibers.iter().filter(move |row| row.tier == tier)
    }

    /// Last row holding data, if any.
    pub fn last_row(&self) -> Option<u32> {
        let fibers = self.fibers.iter().map(|row| row.row);
        let ports = self.box_ports.iter().map(|row| row.row);
        fibers.chain(ports).max()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty() && self.box_ports.is_empty()
    }
}
