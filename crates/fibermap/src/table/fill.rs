//! Filling of the wiring table model.

use std::collections::HashSet;

use log::{debug, trace, warn};

use fibermap_core::{
    fiber,
    identifier::Id,
    network::{CableSegment, DistributionBox, Level, OriginPoint},
    repository::Repository,
};

use super::{BoxPortRow, FiberRow, TrunkRow, WiringTable};
use crate::{config::TableConfig, error::FibermapError, report::Issue};

/// Running ODF numbering of tier 1 fibres.
#[derive(Debug, Clone, Copy)]
struct OdfCursor {
    origin_port: u32,
    odf: u32,
    odf_port: u32,
    max_port: u32,
}

impl OdfCursor {
    fn new(max_port: u32) -> Self {
        Self {
            origin_port: 1,
            odf: 1,
            odf_port: 1,
            max_port,
        }
    }

    fn next(&mut self, row: u32) -> TrunkRow {
        let trunk = TrunkRow {
            row,
            origin_port: self.origin_port,
            odf: self.odf,
            odf_port: self.odf_port,
        };
        self.origin_port += 1;
        if self.odf_port < self.max_port {
            self.odf_port += 1;
        } else {
            self.odf += 1;
            self.odf_port = 1;
        }
        trunk
    }
}

/// Expands the tree of an origin into a [`WiringTable`].
///
/// Only segments reachable from the origin are listed. Each tier is ordered
/// by propagated offset; cables without an offset are appended in code order
/// after the last used row and reported as [`Issue::InconsistentOrdering`].
pub struct WiringTableBuilder<'a, R: ?Sized> {
    repository: &'a R,
    config: &'a TableConfig,
}

impl<'a, R> WiringTableBuilder<'a, R>
where
    R: Repository + ?Sized,
{
    pub fn new(repository: &'a R, config: &'a TableConfig) -> Self {
        Self { repository, config }
    }

    /// Builds the table of `origin` and the issues found on the way.
    ///
    /// # Errors
    ///
    /// Propagates repository read failures. Data problems are returned as issues.
    pub fn build(&self, origin: &OriginPoint) -> Result<(WiringTable, Vec<Issue>), FibermapError> {
        let root = origin.code;
        debug!(root:%; "Filling wiring table");

        let mut issues = Vec::new();
        let mut table = WiringTable::new(root, origin.class.as_str());
        let tiers = self.collect_first_segments(root)?;

        for tier in Level::ALL {
            let segments = order_by_offset(root, tiers_of(&tiers, tier), &mut issues);
            match tier {
                Level::One | Level::Two => {
                    self.fill_spans(root, tier, &segments, &mut table, &mut issues)?
                }
                Level::Three => self.fill_chains(root, &segments, &mut table, &mut issues)?,
            }
        }

        debug!(
            root:%,
            fibers = table.fibers.len(),
            box_ports = table.box_ports.len(),
            issues = issues.len();
            "Wiring table filled"
        );
        Ok((table, issues))
    }

    fn data_row(&self, offset: u32) -> u32 {
        self.config.first_data_row().saturating_add(offset)
    }

    /// First segments of every section reachable from `root`, in walk order.
    fn collect_first_segments(&self, root: Id) -> Result<Vec<CableSegment>, FibermapError> {
        let mut found = Vec::new();
        let mut visited = HashSet::from([root]);
        let mut stack: Vec<(Id, Option<Id>)> = vec![(root, None)];

        while let Some((node, via)) = stack.pop() {
            for segment in self.repository.get_first_segments(node, via)? {
                for b in self.repository.get_boxes_on_section(segment.section)? {
                    if visited.insert(b.code) {
                        stack.push((b.code, Some(segment.section)));
                    }
                }
                found.push(segment);
            }
        }

        Ok(found)
    }

    /// Tier 1 and 2: one row per local fibre plus the ports of hosted boxes.
    fn fill_spans(
        &self,
        root: Id,
        tier: Level,
        segments: &[CableSegment],
        table: &mut WiringTable,
        issues: &mut Vec<Issue>,
    ) -> Result<(), FibermapError> {
        let mut odf = OdfCursor::new(self.config.odf_max_port());
        let mut next_free = self.config.first_data_row();

        for segment in segments {
            let count = match segment.ports.count() {
                Ok(count) => count,
                Err(err) => {
                    warn!(root:%, segment:% = segment.code, err:%; "Cable rows skipped");
                    issues.push(Issue::MalformedRange {
                        root,
                        entity: segment.code,
                        range: segment.ports,
                    });
                    continue;
                }
            };

            let base = segment.offset.map_or(next_free, |offset| self.data_row(offset));
            let Some(end) = end_row(base, count) else {
                warn!(root:%, segment:% = segment.code, base; "Cable rows past sheet end");
                issues.push(Issue::MalformedRange {
                    root,
                    entity: segment.code,
                    range: segment.ports,
                });
                continue;
            };
            trace!(section:% = segment.section, tier:%, base, count; "Cable rows");
            for i in 0..count {
                let row = base + i;
                if tier == Level::One {
                    table.trunk.push(odf.next(row));
                }
                table.fibers.push(FiberRow {
                    row,
                    tier,
                    section: segment.section,
                    cable_type: segment.cable_type.clone(),
                    number: i + 1,
                    tube: fiber::tube(i),
                    fiber: fiber::fiber_in_tube(i),
                    termination: None,
                });
            }
            next_free = next_free.max(end);

            for b in self.repository.get_boxes_on_section(segment.section)? {
                self.fill_box_ports(root, tier, base, &b, table, issues);
            }
        }

        Ok(())
    }

    fn fill_box_ports(
        &self,
        root: Id,
        tier: Level,
        segment_base: u32,
        b: &DistributionBox,
        table: &mut WiringTable,
        issues: &mut Vec<Issue>,
    ) {
        let Ok(count) = b.ports.count() else {
            issues.push(Issue::MalformedRange {
                root,
                entity: b.code,
                range: b.ports,
            });
            return;
        };

        let base = b.offset.map_or_else(
            || segment_base.saturating_add(b.ports.start - 1),
            |offset| self.data_row(offset),
        );
        if end_row(base, count).is_none() {
            issues.push(Issue::MalformedRange {
                root,
                entity: b.code,
                range: b.ports,
            });
            return;
        }
        table.box_ports.extend((0..count).map(|i| BoxPortRow {
            row: base + i,
            tier,
            code: b.code,
            box_type: b.box_type.clone(),
            number: i + 1,
        }));
    }

    /// Tier 3: follow each section from segment to segment, one row per
    /// input port of every extremity box, without gaps between segments.
    fn fill_chains(
        &self,
        root: Id,
        segments: &[CableSegment],
        table: &mut WiringTable,
        issues: &mut Vec<Issue>,
    ) -> Result<(), FibermapError> {
        let mut next_free = self.config.first_data_row();

        for first in segments {
            let base = first.offset.map_or(next_free, |offset| self.data_row(offset));
            let end = self.fill_chain(root, first.clone(), base, table, issues)?;
            next_free = next_free.max(end);
        }

        Ok(())
    }

    /// Fills one chain starting at `row` and returns the row after it.
    fn fill_chain(
        &self,
        root: Id,
        first: CableSegment,
        mut row: u32,
        table: &mut WiringTable,
        issues: &mut Vec<Issue>,
    ) -> Result<u32, FibermapError> {
        let mut visited = HashSet::new();
        let mut current = Some(first);

        while let Some(segment) = current.take() {
            if !visited.insert(segment.code) {
                warn!(root:%, segment:% = segment.code; "Cable chain loops, truncated");
                break;
            }

            let Some(extremity) = segment.extremity else {
                warn!(root:%, section:% = segment.section; "Chain truncated, no extremity");
                issues.push(Issue::MissingExtremity {
                    root,
                    section: segment.section,
                });
                break;
            };
            let Some(end) = self.repository.get_box(extremity)? else {
                warn!(root:%, section:% = segment.section, extremity:%; "Chain truncated");
                issues.push(Issue::MissingBoxReference {
                    root,
                    section: segment.section,
                    code: extremity,
                });
                break;
            };
            let Ok(count) = end.ports.count() else {
                issues.push(Issue::MalformedRange {
                    root,
                    entity: end.code,
                    range: end.ports,
                });
                break;
            };
            let Some(next_row) = end_row(row, count) else {
                warn!(root:%, node:% = end.code, row; "Chain rows past sheet end");
                issues.push(Issue::MalformedRange {
                    root,
                    entity: end.code,
                    range: end.ports,
                });
                break;
            };

            for i in 0..count {
                let number = end.ports.start + i;
                let fiber = fiber::fiber_in_tube(number - 1);
                table.fibers.push(FiberRow {
                    row: row + i,
                    tier: Level::Three,
                    section: segment.section,
                    cable_type: segment.cable_type.clone(),
                    number,
                    tube: fiber::tube(number - 1),
                    fiber,
                    termination: Some(format!("{}-{fiber:02}", end.code)),
                });
            }
            row = next_row;

            current = self.repository.get_next_segment(segment.section, end.code)?;
        }

        Ok(row)
    }

}

/// Row after a block of `count` rows starting at `base`, if it fits in `u32`.
fn end_row(base: u32, count: u32) -> Option<u32> {
    base.checked_add(count)
}

fn tiers_of(segments: &[CableSegment], tier: Level) -> Vec<CableSegment> {
    segments
        .iter()
        .filter(|segment| segment.level == tier)
        .cloned()
        .collect()
}

/// Orders segments by offset; segments without one follow in code order.
fn order_by_offset(
    root: Id,
    segments: Vec<CableSegment>,
    issues: &mut Vec<Issue>,
) -> Vec<CableSegment> {
    let (mut placed, mut unplaced): (Vec<_>, Vec<_>) =
        segments.into_iter().partition(|segment| segment.offset.is_some());

    placed.sort_by(|a, b| a.offset.cmp(&b.offset).then_with(|| a.code.cmp(&b.code)));
    unplaced.sort_by(|a, b| a.code.cmp(&b.code));

    for segment in &unplaced {
        warn!(root:%, section:% = segment.section; "Cable has no offset, ordered by code");
        issues.push(Issue::InconsistentOrdering {
            root,
            section: segment.section,
        });
    }

    placed.extend(unplaced);
    placed
}

#[cfg(test)]
mod tests {
    use fibermap_core::network::PortRange;
    use fibermap_store::MemoryRepository;

    use super::*;

    fn build(repo: &MemoryRepository) -> (WiringTable, Vec<Issue>) {
        let config = TableConfig::default();
        let origin = OriginPoint::new("SRO");
        WiringTableBuilder::new(repo, &config)
            .build(&origin)
            .expect("table")
    }

    #[test]
    fn test_odf_wraps() {
        let mut cursor = OdfCursor::new(2);
        let rows: Vec<_> = (0..5).map(|row| cursor.next(row)).collect();
        let odf: Vec<(u32, u32)> = rows.iter().map(|row| (row.odf, row.odf_port)).collect();

        assert_eq!(odf, vec![(1, 1), (1, 2), (2, 1), (2, 2), (3, 1)]);
        assert_eq!(rows[4].origin_port, 5);
        assert_eq!(rows[4].odf_code(), "ODF03");
    }

    #[test]
    fn test_missing_offset_falls_back_to_code_order() {
        let mut first = CableSegment::first("C-2", "S-2", "SRO", Level::One, PortRange::new(1, 2));
        first.offset = Some(0);
        let unplaced = CableSegment::first("C-1", "S-1", "SRO", Level::One, PortRange::new(3, 4));
        let repo = MemoryRepository::new()
            .with_origin(OriginPoint::new("SRO"))
            .with_segment(first)
            .with_segment(unplaced);

        let (table, issues) = build(&repo);

        assert_eq!(
            issues,
            vec![Issue::InconsistentOrdering {
                root: Id::new("SRO"),
                section: Id::new("S-1"),
            }]
        );
        let rows: Vec<(u32, Id)> = table.fibers().iter().map(|f| (f.row, f.section)).collect();
        assert_eq!(
            rows,
            vec![
                (4, Id::new("S-2")),
                (5, Id::new("S-2")),
                (6, Id::new("S-1")),
                (7, Id::new("S-1")),
            ]
        );
    }

    #[test]
    fn test_chain_truncated_at_missing_box() {
        let mut first =
            CableSegment::first("N-1", "S-9", "SRO", Level::Three, PortRange::new(1, 4))
                .with_extremity("X");
        first.offset = Some(0);
        let second = CableSegment::continuation(&first, "N-2", "X").with_extremity("Y-missing");
        let repo = MemoryRepository::new()
            .with_origin(OriginPoint::new("SRO"))
            .with_segment(first)
            .with_segment(second)
            .with_box(DistributionBox::new("X", "S-9", PortRange::new(1, 2)));

        let (table, issues) = build(&repo);

        let tier3: Vec<_> = table.fibers_of(Level::Three).collect();
        assert_eq!(tier3.len(), 2);
        assert_eq!(tier3[1].termination.as_deref(), Some("X-02"));
        assert!(matches!(
            issues.as_slice(),
            [Issue::MissingBoxReference { code, .. }] if *code == "Y-missing"
        ));
    }

    #[test]
    fn test_box_ports_follow_box_offset() {
        let mut segment =
            CableSegment::first("C-1", "S-1", "SRO", Level::One, PortRange::new(1, 24));
        segment.offset = Some(0);
        let mut b = DistributionBox::new("B-1", "S-1", PortRange::new(13, 18)).with_type("PBO-6");
        b.offset = Some(12);
        let repo = MemoryRepository::new()
            .with_origin(OriginPoint::new("SRO"))
            .with_segment(segment)
            .with_box(b);

        let (table, issues) = build(&repo);

        assert!(issues.is_empty());
        let rows: Vec<(u32, u32)> = table.box_ports().iter().map(|p| (p.row, p.number)).collect();
        assert_eq!(rows.first(), Some(&(16, 1)));
        assert_eq!(rows.last(), Some(&(21, 6)));
        assert!(table.box_ports().iter().all(|p| p.tier == Level::One));
    }

    #[test]
    fn test_chain_without_extremity() {
        let mut first =
            CableSegment::first("N-1", "S-9", "SRO", Level::Three, PortRange::new(1, 4));
        first.offset = Some(0);
        let repo = MemoryRepository::new()
            .with_origin(OriginPoint::new("SRO"))
            .with_segment(first);

        let (table, issues) = build(&repo);

        assert_eq!(table.fibers_of(Level::Three).count(), 0);
        assert_eq!(
            issues,
            vec![Issue::MissingExtremity {
                root: Id::new("SRO"),
                section: Id::new("S-9"),
            }]
        );
    }

    #[test]
    fn test_rows_past_sheet_end_are_reported() {
        let mut segment =
            CableSegment::first("C-1", "S-1", "SRO", Level::One, PortRange::new(1, 12));
        segment.offset = Some(u32::MAX - 2);
        let repo = MemoryRepository::new()
            .with_origin(OriginPoint::new("SRO"))
            .with_segment(segment);

        let (table, issues) = build(&repo);

        assert!(table.fibers().is_empty());
        assert!(matches!(
            issues.as_slice(),
            [Issue::MalformedRange { entity, .. }] if *entity == "C-1"
        ));
    }
}
