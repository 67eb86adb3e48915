//! Drawing of a filled wiring table.

use fibermap_core::{
    draw::{RowSpan, StyleTag, Surface},
    fiber::FiberColor,
    network::Level,
};

use super::{BoxPortRow, FiberRow, TrunkRow, WiringTable};
use crate::config::TableConfig;

/// Column offsets inside one tier group.
const BOX_COLUMNS: u32 = 0;
const SPLICE_COLUMN: u32 = 3;
const FIBER_COLUMNS: u32 = 5;

const TRUNK_HEADERS: [&str; 3] = ["SRO Port", "ODF Code", "ODF Port"];
const BOX_HEADERS: [&str; 3] = ["Code", "Type", "NO."];
const FIBER_HEADERS: [&str; 5] = ["Code", "Type", "NO.", "T", "F"];
const TERMINATION_HEADERS: [&str; 3] = ["PBO/Port", "S:/R:", "Splice/Reserve"];

/// Splice state written next to every used port.
const SPLICED: &str = "S";

/// First column of tier group `tier`.
fn group_start(config: &TableConfig, tier: Level) -> u32 {
    1 + config.group_width() * (u32::from(tier.number()) - 1)
}

fn termination_start(config: &TableConfig) -> u32 {
    1 + config.group_width() * 3
}

/// Draws `table` onto `surface`. Row 1 links back to `overview_sheet`.
pub fn render_table(
    table: &WiringTable,
    config: &TableConfig,
    overview_sheet: &str,
    surface: &mut dyn Surface,
) {
    surface.place(1, 1, "Return to overview", StyleTag::Title);
    surface.link(1, 1, overview_sheet);

    draw_headers(table, config, surface);

    for trunk in table.trunk() {
        draw_trunk(trunk, surface);
    }
    for row in table.box_ports() {
        draw_box_port(config, row, surface);
    }
    for row in table.fibers() {
        draw_fiber(config, row, surface);
    }
}

fn draw_headers(table: &WiringTable, config: &TableConfig, surface: &mut dyn Surface) {
    let title = config.first_data_row() - 2;
    let sub = title + 1;

    for tier in Level::ALL {
        let start = group_start(config, tier);
        let (label, subheaders) = match tier {
            Level::One => (table.class().to_string(), TRUNK_HEADERS),
            _ => ("Closure".to_string(), BOX_HEADERS),
        };

        surface.place(title, start + BOX_COLUMNS, &label, StyleTag::Header);
        for (i, header) in subheaders.iter().enumerate() {
            surface.place(sub, start + BOX_COLUMNS + i as u32, header, StyleTag::Header);
        }
        surface.merge(
            RowSpan::new(title, sub),
            start + SPLICE_COLUMN,
            "Splice State",
            StyleTag::Header,
        );

        let fibers = start + FIBER_COLUMNS;
        surface.place(title, fibers, tier.label(), StyleTag::Header);
        for (i, header) in FIBER_HEADERS.iter().enumerate() {
            surface.place(sub, fibers + i as u32, header, StyleTag::Header);
        }
    }

    let end = termination_start(config);
    for (i, header) in TERMINATION_HEADERS.iter().enumerate() {
        surface.place(sub, end + i as u32, header, StyleTag::Header);
    }
}

fn draw_trunk(trunk: &TrunkRow, surface: &mut dyn Surface) {
    surface.place(trunk.row, 1, &trunk.origin_port.to_string(), StyleTag::Cell);
    surface.place(trunk.row, 2, &trunk.odf_code(), StyleTag::Cell);
    surface.place(trunk.row, 3, &trunk.odf_port.to_string(), StyleTag::Cell);
    surface.place(trunk.row, 1 + SPLICE_COLUMN, SPLICED, StyleTag::Cell);
}

/// Box ports sit in the box columns of the group after the hosting tier.
fn draw_box_port(config: &TableConfig, port: &BoxPortRow, surface: &mut dyn Surface) {
    let start = group_start(config, port.tier) + config.group_width();
    surface.place(port.row, start, &port.code.to_string(), StyleTag::Cell);
    surface.place(port.row, start + 1, &port.box_type, StyleTag::Cell);
    surface.place(port.row, start + 2, &port.number.to_string(), StyleTag::Cell);
    surface.place(port.row, start + SPLICE_COLUMN, SPLICED, StyleTag::Cell);
}

fn draw_fiber(config: &TableConfig, fiber: &FiberRow, surface: &mut dyn Surface) {
    let start = group_start(config, fiber.tier) + FIBER_COLUMNS;
    let row = fiber.row;
    surface.place(row, start, &fiber.section.to_string(), StyleTag::Cell);
    surface.place(row, start + 1, &fiber.cable_type, StyleTag::Cell);
    surface.place(row, start + 2, &fiber.number.to_string(), StyleTag::Cell);
    surface.place(
        row,
        start + 3,
        &fiber.tube.to_string(),
        StyleTag::Fiber(FiberColor::for_position(fiber.tube)),
    );
    surface.place(
        row,
        start + 4,
        &fiber.fiber.to_string(),
        StyleTag::Fiber(FiberColor::for_position(fiber.fiber)),
    );

    if let Some(label) = &fiber.termination {
        surface.place(row, termination_start(config), label, StyleTag::Cell);
    }
}

#[cfg(test)]
mod tests {
    use fibermap_core::{
        draw::{DrawInstruction, InstructionLog},
        identifier::Id,
    };

    use super::*;

    fn sample() -> WiringTable {
        let mut table = WiringTable::new(Id::new("SRO-01"), "SRO");
        table.trunk.push(TrunkRow {
            row: 4,
            origin_port: 1,
            odf: 1,
            odf_port: 1,
        });
        table.fibers.push(FiberRow {
            row: 4,
            tier: Level::One,
            section: Id::new("S-1"),
            cable_type: "CABLE 24FO".to_string(),
            number: 1,
            tube: 1,
            fiber: 1,
            termination: None,
        });
        table.box_ports.push(BoxPortRow {
            row: 4,
            tier: Level::One,
            code: Id::new("B-1"),
            box_type: "BPE".to_string(),
            number: 1,
        });
        table.fibers.push(FiberRow {
            row: 4,
            tier: Level::Three,
            section: Id::new("S-9"),
            cable_type: String::new(),
            number: 13,
            tube: 2,
            fiber: 1,
            termination: Some("PBO-1-01".to_string()),
        });
        table
    }

    #[test]
    fn test_headers_and_link() {
        let mut log = InstructionLog::new();
        render_table(&sample(), &TableConfig::default(), "Topology", &mut log);

        assert_eq!(log.value_at(1, 1), Some("Return to overview"));
        assert!(log.iter().any(|item| matches!(
            item,
            DrawInstruction::Link { row: 1, column: 1, target } if target == "Topology"
        )));
        assert_eq!(log.value_at(2, 1), Some("SRO"));
        assert_eq!(log.value_at(3, 1), Some("SRO Port"));
        assert_eq!(log.value_at(2, 4), Some("Splice State"));
        assert_eq!(log.value_at(2, 6), Some("Distribution 01"));
        assert_eq!(log.value_at(3, 10), Some("F"));
        assert_eq!(log.value_at(2, 11), Some("Closure"));
        assert_eq!(log.value_at(3, 11), Some("Code"));
        assert_eq!(log.value_at(2, 26), Some("Distribution 03"));
        assert_eq!(log.value_at(3, 31), Some("PBO/Port"));
    }

    #[test]
    fn test_data_columns() {
        let mut log = InstructionLog::new();
        render_table(&sample(), &TableConfig::default(), "Topology", &mut log);

        assert_eq!(log.value_at(4, 1), Some("1"));
        assert_eq!(log.value_at(4, 2), Some("ODF01"));
        assert_eq!(log.value_at(4, 4), Some("S"));
        assert_eq!(log.value_at(4, 6), Some("S-1"));
        assert_eq!(log.value_at(4, 7), Some("CABLE 24FO"));
        assert_eq!(log.value_at(4, 11), Some("B-1"));
        assert_eq!(log.value_at(4, 14), Some("S"));
        assert_eq!(log.value_at(4, 28), Some("13"));
        assert_eq!(log.value_at(4, 29), Some("2"));
        assert_eq!(log.value_at(4, 31), Some("PBO-1-01"));

        let tube_style = log.iter().find_map(|item| match item {
            DrawInstruction::Place {
                row: 4,
                column: 29,
                style,
                ..
            } => Some(*style),
            _ => None,
        });
        assert_eq!(tube_style, Some(StyleTag::Fiber(FiberColor::Blue)));
    }
}
