//! Drawing of single node and cable blocks.

use fibermap_core::{
    draw::{RowSpan, StyleTag, Surface},
    identifier::Id,
    network::{CableSegment, DistributionBox, Level, OriginPoint},
};

use super::columns;
use crate::config::LayoutConfig;

/// A node of the distribution tree: an origin or a box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutNode {
    Origin(OriginPoint),
    Box(DistributionBox),
}

impl LayoutNode {
    pub fn code(&self) -> Id {
        match self {
            Self::Origin(origin) => origin.code,
            Self::Box(b) => b.code,
        }
    }

    pub fn is_origin(&self) -> bool {
        matches!(self, Self::Origin(_))
    }
}

/// Text of the four block rows of a node.
fn node_lines(node: &LayoutNode) -> [String; 4] {
    match node {
        LayoutNode::Origin(origin) => [
            origin.class.clone(),
            origin.code.to_string(),
            String::new(),
            String::new(),
        ],
        LayoutNode::Box(b) => [
            b.class.to_string(),
            code_and_type(&b.code.to_string(), &b.box_type),
            format!("On:{}", b.cable_in),
            format!("InRange:{}", b.ports),
        ],
    }
}

fn code_and_type(code: &str, kind: &str) -> String {
    if kind.is_empty() {
        code.to_string()
    } else {
        format!("{code}    {kind}")
    }
}

/// Draws a node block at `row`. When the node branches, the spacer rows of
/// the block carry the start of the branch connector.
pub fn draw_node(
    surface: &mut dyn Surface,
    config: &LayoutConfig,
    node: &LayoutNode,
    row: u32,
    column: u32,
    branching: bool,
) {
    let [class, code, second, third] = node_lines(node);
    surface.place(row, column, &class, StyleTag::BoxHeader);
    surface.place(row + 1, column, &code, StyleTag::BoxBody);
    surface.place(row + 2, column, &second, StyleTag::BoxBody);
    surface.place(row + 3, column, &third, StyleTag::BoxFooter);

    if let LayoutNode::Origin(origin) = node {
        surface.link(row + 1, column, &origin.code.to_string());
    }

    if branching {
        let spacer = RowSpan::new(
            row + LayoutConfig::BLOCK_ROWS,
            row + config.group_rows() - 1,
        );
        surface.connect(spacer, column, StyleTag::Route);
    }
}

/// Draws a cable block at `row`. When the section routes to several boxes,
/// the rows below the header carry the start of the route connector.
pub fn draw_segment(
    surface: &mut dyn Surface,
    config: &LayoutConfig,
    segment: &CableSegment,
    upper: Option<Level>,
    row: u32,
    routing: bool,
) {
    let column = columns::segment_column(segment.level);

    if columns::skips_level(upper, segment.level) {
        surface.place(row, column - 1, "", StyleTag::CableHeader);
        surface.place(row, column - 2, "", StyleTag::CableHeader);
    }

    surface.place(row, column, segment.level.label(), StyleTag::CableHeader);
    surface.place(
        row + 1,
        column,
        &code_and_type(&segment.code.to_string(), &segment.cable_type),
        StyleTag::CableBody,
    );
    surface.place(
        row + 2,
        column,
        &format!("From: {}    RNodes:{}", segment.origin_box, segment.r_nodes),
        StyleTag::CableBody,
    );
    surface.place(
        row + 3,
        column,
        &format!("PortRange:{}", segment.ports),
        StyleTag::CableBody,
    );

    if routing {
        let body = RowSpan::new(row + 1, row + config.group_rows() - 1);
        surface.connect(body, column, StyleTag::Route);
    }
}

#[cfg(test)]
mod tests {
    use fibermap_core::{
        draw::{DrawInstruction, InstructionLog},
        network::{BoxClass, PortRange},
    };

    use super::*;

    #[test]
    fn test_origin_block() {
        let mut log = InstructionLog::new();
        let node = LayoutNode::Origin(OriginPoint::new("SRO-01"));
        draw_node(&mut log, &LayoutConfig::default(), &node, 2, 1, false);

        assert_eq!(log.value_at(2, 1), Some("SRO"));
        assert_eq!(log.value_at(3, 1), Some("SRO-01"));
        assert_eq!(log.value_at(4, 1), Some(""));
        assert_eq!(log.connectors().count(), 0);
        assert!(log.iter().any(|item| matches!(
            item,
            DrawInstruction::Link { target, .. } if target == "SRO-01"
        )));
    }

    #[test]
    fn test_box_block_with_branch() {
        let mut log = InstructionLog::new();
        let b = DistributionBox::new("B-1", "S-1", PortRange::new(1, 24))
            .with_class(BoxClass::Terminal)
            .with_type("PBO-6");
        draw_node(&mut log, &LayoutConfig::default(), &LayoutNode::Box(b), 10, 3, true);

        assert_eq!(log.value_at(10, 3), Some("Terminal"));
        assert_eq!(log.value_at(11, 3), Some("B-1    PBO-6"));
        assert_eq!(log.value_at(12, 3), Some("On:S-1"));
        assert_eq!(log.value_at(13, 3), Some("InRange:1-24"));
        let connectors: Vec<_> = log.connectors().collect();
        assert_eq!(connectors, vec![(RowSpan::new(14, 17), 3)]);
    }

    #[test]
    fn test_segment_block_with_gap() {
        let mut log = InstructionLog::new();
        let segment = CableSegment::first("C-7", "S-7", "SRO", Level::Two, PortRange::new(1, 12))
            .with_type("CABLE 12FO")
            .with_r_nodes("3");
        draw_segment(&mut log, &LayoutConfig::default(), &segment, None, 2, true);

        assert_eq!(log.value_at(2, 4), Some("Distribution 02"));
        assert_eq!(log.value_at(3, 4), Some("C-7    CABLE 12FO"));
        assert_eq!(log.value_at(4, 4), Some("From: SRO    RNodes:3"));
        assert_eq!(log.value_at(5, 4), Some("PortRange:1-12"));
        assert_eq!(log.value_at(2, 3), Some(""));
        assert_eq!(log.value_at(2, 2), Some(""));
        let connectors: Vec<_> = log.connectors().collect();
        assert_eq!(connectors, vec![(RowSpan::new(3, 9), 4)]);
    }
}
