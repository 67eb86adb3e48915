//! Column map of the topology overview.
//!
//! Column 1 holds origins. A level `L` cable block sits in column `2L` and
//! the boxes hanging off it sit one column to its right.

use fibermap_core::network::Level;

/// Column of every origin block.
pub const ORIGIN_COLUMN: u32 = 1;

/// Column of the cable blocks of `level`.
pub fn segment_column(level: Level) -> u32 {
    2 * u32::from(level.number())
}

/// Column of a node reached through a cable of level `upper`; `None` for origins.
pub fn node_column(upper: Option<Level>) -> u32 {
    upper.map_or(ORIGIN_COLUMN, |level| segment_column(level) + 1)
}

/// Returns `true` when a cable of `level` skips at least one tier below `upper`.
pub fn skips_level(upper: Option<Level>, level: Level) -> bool {
    let upper = upper.map_or(0, |upper| upper.number());
    level.number() > upper + 1
}
