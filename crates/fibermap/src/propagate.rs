//! Offset propagation.
//!
//! Every origin starts at offset 0. A first segment leaving a node with
//! offset `O` gets `O + ports.start - 1`, and every box hosted on that
//! segment's section gets `segment offset + in.start - 1`. The walk then
//! continues from each box with its own offset.
//!
//! The tree is walked depth-first with an explicit work stack, so long
//! closure chains do not grow the call stack. Offsets are recomputed from
//! scratch on every run and written back through the [`Repository`]; each
//! origin's tree is persisted before the next one is started.

use std::collections::HashSet;

use log::{debug, info, trace, warn};

use fibermap_core::{
    identifier::Id,
    network::{CableSegment, DistributionBox, OriginPoint},
    repository::{OffsetExpression, OffsetTarget, Repository},
};

use crate::{error::FibermapError, report::Issue};

/// Counters and issues collected by a propagation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationOutcome {
    pub roots: usize,
    pub segments: usize,
    pub boxes: usize,
    pub issues: Vec<Issue>,
}

impl PropagationOutcome {
    fn absorb(&mut self, other: PropagationOutcome) {
        self.roots += other.roots;
        self.segments += other.segments;
        self.boxes += other.boxes;
        self.issues.extend(other.issues);
    }
}

/// A node waiting to have its outbound sections processed.
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: Id,
    offset: u32,
    /// Section the node was reached through; excluded from its outbound segments.
    via: Option<Id>,
    /// Number of ports allocated to the node, if known.
    span: Option<u32>,
}

/// Propagates offsets through the trees of all origins, ascending by code.
///
/// # Errors
///
/// Returns [`FibermapError::Repository`] if a read fails and
/// [`FibermapError::RepositoryWrite`] if an update or persist fails. In the
/// latter case, origins persisted before the failing one keep their offsets.
pub fn propagate_all<R>(repository: &mut R) -> Result<PropagationOutcome, FibermapError>
where
    R: Repository + ?Sized,
{
    let roots = repository.get_root_nodes()?;
    info!(roots = roots.len(); "Propagating offsets");

    let mut outcome = PropagationOutcome::default();
    for root in &roots {
        outcome.absorb(propagate_root(repository, root)?);
    }

    info!(
        roots = outcome.roots,
        segments = outcome.segments,
        boxes = outcome.boxes,
        issues = outcome.issues.len();
        "Offsets propagated"
    );
    Ok(outcome)
}

/// Propagates offsets through the tree of one origin and persists them.
///
/// # Errors
///
/// See [`propagate_all`].
pub fn propagate_root<R>(
    repository: &mut R,
    root: &OriginPoint,
) -> Result<PropagationOutcome, FibermapError>
where
    R: Repository + ?Sized,
{
    debug!(root:% = root.code; "Propagating origin");

    let mut outcome = PropagationOutcome {
        roots: 1,
        ..PropagationOutcome::default()
    };
    repository
        .update_offsets(&[root.code], OffsetTarget::Origin, OffsetExpression::Constant(0))
        .map_err(|err| FibermapError::write_failure(root.code, err))?;

    let mut visited = HashSet::from([root.code]);
    let mut stack = vec![Frame {
        node: root.code,
        offset: 0,
        via: None,
        span: None,
    }];

    while let Some(frame) = stack.pop() {
        let segments = repository.get_first_segments(frame.node, frame.via)?;
        check_coverage(&frame, &segments);

        let mut children = Vec::new();
        for segment in &segments {
            let Some(hosted) = propagate_segment(repository, root.code, &frame, segment, &mut outcome)?
            else {
                continue;
            };

            for b in hosted {
                if !visited.insert(b.code) {
                    warn!(root:% = root.code, node:% = b.code; "Box reached twice, skipping");
                    continue;
                }
                match b.ports.count() {
                    Ok(count) => children.push(Frame {
                        node: b.code,
                        offset: b.ports.absolute_offset(segment_offset(&frame, segment)),
                        via: Some(segment.section),
                        span: Some(count),
                    }),
                    Err(err) => {
                        warn!(root:% = root.code, node:% = b.code, err:%; "Box not descended");
                        outcome.issues.push(Issue::MalformedRange {
                            root: root.code,
                            entity: b.code,
                            range: b.ports,
                        });
                    }
                }
            }
        }

        // Reverse so that the first child is popped first.
        stack.extend(children.into_iter().rev());
    }

    repository
        .persist()
        .map_err(|err| FibermapError::write_failure(root.code, err))?;
    debug!(
        root:% = root.code,
        segments = outcome.segments,
        boxes = outcome.boxes;
        "Origin persisted"
    );
    Ok(outcome)
}

fn segment_offset(frame: &Frame, segment: &CableSegment) -> u32 {
    segment.ports.absolute_offset(frame.offset)
}

/// Writes the offset of `segment` and of every box on its section.
///
/// Returns the boxes to descend into, or `None` if the branch below the
/// section is skipped. Offsets are written before the branch is checked so
/// that a skipped branch never keeps the offsets of an earlier run.
fn propagate_segment<R>(
    repository: &mut R,
    root: Id,
    frame: &Frame,
    segment: &CableSegment,
    outcome: &mut PropagationOutcome,
) -> Result<Option<Vec<DistributionBox>>, FibermapError>
where
    R: Repository + ?Sized,
{
    let Some(offset) = segment.ports.checked_absolute_offset(frame.offset) else {
        warn!(root:%, segment:% = segment.code, parent = frame.offset; "Segment offset overflows");
        outcome.issues.push(Issue::MalformedRange {
            root,
            entity: segment.code,
            range: segment.ports,
        });
        return Ok(None);
    };

    let base = OffsetExpression::StartRelative { base: frame.offset };
    repository
        .update_offsets(&[segment.code], OffsetTarget::Segment, base)
        .map_err(|err| FibermapError::write_failure(root, err))?;
    outcome.segments += 1;
    trace!(segment:% = segment.code, offset; "Segment offset");

    let mut hosted = repository.get_boxes_on_section(segment.section)?;
    hosted.retain(|b| {
        let fits = b.ports.checked_absolute_offset(offset).is_some();
        if !fits {
            warn!(root:%, node:% = b.code, parent = offset; "Box offset overflows");
            outcome.issues.push(Issue::MalformedRange {
                root,
                entity: b.code,
                range: b.ports,
            });
        }
        fits
    });
    if !hosted.is_empty() {
        let codes: Vec<Id> = hosted.iter().map(|b| b.code).collect();
        outcome.boxes += repository
            .update_offsets(
                &codes,
                OffsetTarget::Box,
                OffsetExpression::StartRelative { base: offset },
            )
            .map_err(|err| FibermapError::write_failure(root, err))?;
    }

    if let Err(err) = segment.ports.count() {
        warn!(root:%, segment:% = segment.code, err:%; "Branch skipped");
        outcome.issues.push(Issue::MalformedRange {
            root,
            entity: segment.code,
            range: segment.ports,
        });
        return Ok(None);
    }

    let missing = match segment.extremity {
        Some(extremity) if repository.get_box(extremity)?.is_none() => Some(extremity),
        _ => None,
    };
    if let Some(extremity) = missing {
        warn!(root:%, section:% = segment.section, extremity:%; "Extremity box not found");
        outcome.issues.push(Issue::MissingBoxReference {
            root,
            section: segment.section,
            code: extremity,
        });
        return Ok(None);
    }

    Ok(Some(hosted))
}

/// Warns when the first segments of a node claim more ports than the node has.
fn check_coverage(frame: &Frame, segments: &[CableSegment]) {
    let Some(span) = frame.span else {
        return;
    };
    let claimed: u32 = segments
        .iter()
        .filter_map(|segment| segment.ports.count().ok())
        .sum();
    if claimed > span {
        warn!(node:% = frame.node, span, claimed; "Outbound segments exceed node span");
    }
}

#[cfg(test)]
mod tests {
    use fibermap_core::{
        network::{Level, PortRange},
        repository::RepositoryError,
    };
    use fibermap_store::MemoryRepository;

    use super::*;
    use crate::{config::TableConfig, table::WiringTableBuilder};

    fn two_siblings() -> MemoryRepository {
        MemoryRepository::new()
            .with_origin(OriginPoint::new("SRO"))
            .with_segment(CableSegment::first(
                "C-2",
                "S-2",
                "SRO",
                Level::One,
                PortRange::new(13, 24),
            ))
            .with_segment(CableSegment::first(
                "C-1",
                "S-1",
                "SRO",
                Level::One,
                PortRange::new(1, 12),
            ))
            .with_box(DistributionBox::new("B-1", "S-1", PortRange::new(1, 12)))
            .with_box(DistributionBox::new("B-2", "S-2", PortRange::new(1, 6)))
            .with_box(DistributionBox::new("B-3", "S-2", PortRange::new(7, 12)))
    }

    #[test]
    fn test_sibling_offsets() {
        let mut repo = two_siblings();
        let outcome = propagate_all(&mut repo).expect("propagation");

        assert_eq!(outcome.roots, 1);
        assert_eq!(outcome.segments, 2);
        assert_eq!(outcome.boxes, 3);
        assert!(outcome.issues.is_empty());

        let offset = |code: &str| repo.segment(Id::new(code)).and_then(|s| s.offset);
        assert_eq!(offset("C-1"), Some(0));
        assert_eq!(offset("C-2"), Some(12));

        let box_offset = |code: &str| repo.distribution_box(Id::new(code)).and_then(|b| b.offset);
        assert_eq!(box_offset("B-1"), Some(0));
        assert_eq!(box_offset("B-2"), Some(12));
        assert_eq!(box_offset("B-3"), Some(18));
        assert_eq!(repo.origin(Id::new("SRO")).and_then(|o| o.offset), Some(0));
        assert_eq!(repo.persist_count(), 1);
    }

    #[test]
    fn test_nested_box_offsets() {
        let mut repo = two_siblings()
            .with_segment(CableSegment::first(
                "C-3",
                "S-3",
                "B-3",
                Level::Two,
                PortRange::new(3, 4),
            ))
            .with_box(DistributionBox::new("B-4", "S-3", PortRange::new(2, 2)));
        propagate_all(&mut repo).expect("propagation");

        // B-3 sits at 18, C-3 starts at local port 3, B-4 at local port 2.
        assert_eq!(repo.segment(Id::new("C-3")).and_then(|s| s.offset), Some(20));
        assert_eq!(
            repo.distribution_box(Id::new("B-4")).and_then(|b| b.offset),
            Some(21)
        );
    }

    #[test]
    fn test_missing_extremity_isolated_to_branch() {
        let mut repo = two_siblings();
        let broken = repo
            .segment(Id::new("C-1"))
            .cloned()
            .map(|s| s.with_extremity("B-404"));
        if let Some(broken) = broken {
            repo.insert_segment(broken);
        }

        let outcome = propagate_all(&mut repo).expect("propagation");

        assert_eq!(
            outcome.issues,
            vec![Issue::MissingBoxReference {
                root: Id::new("SRO"),
                section: Id::new("S-1"),
                code: Id::new("B-404"),
            }]
        );
        assert_eq!(repo.segment(Id::new("C-1")).and_then(|s| s.offset), Some(0));
        assert_eq!(repo.segment(Id::new("C-2")).and_then(|s| s.offset), Some(12));
    }

    #[test]
    fn test_skipped_branch_drops_previous_offsets() {
        let mut repo = two_siblings().with_segment(CableSegment::first(
            "C-5",
            "S-5",
            "B-1",
            Level::Two,
            PortRange::new(1, 4),
        ));
        let broken = repo
            .segment(Id::new("C-1"))
            .cloned()
            .map(|s| s.with_extremity("B-404"));
        if let Some(broken) = broken {
            repo.insert_segment(broken);
        }
        repo.update_offsets(
            &[Id::new("C-1"), Id::new("C-5")],
            OffsetTarget::Segment,
            OffsetExpression::Constant(500),
        )
        .expect("seed");
        repo.update_offsets(&[Id::new("B-1")], OffsetTarget::Box, OffsetExpression::Constant(500))
            .expect("seed");

        let outcome = propagate_all(&mut repo).expect("propagation");

        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(repo.segment(Id::new("C-1")).and_then(|s| s.offset), Some(0));
        assert_eq!(
            repo.distribution_box(Id::new("B-1")).and_then(|b| b.offset),
            Some(0)
        );
        // Nothing below the skipped section is descended into.
        assert_eq!(repo.segment(Id::new("C-5")).and_then(|s| s.offset), Some(500));

        let config = TableConfig::default();
        let (table, _) = WiringTableBuilder::new(&repo, &config)
            .build(&OriginPoint::new("SRO"))
            .expect("table");
        let first_row = table
            .fibers_of(Level::One)
            .find(|f| f.section == "S-1")
            .map(|f| f.row);
        assert_eq!(first_row, Some(config.first_data_row()));
    }

    #[test]
    fn test_offset_overflow_is_reported() {
        let mut repo = MemoryRepository::new()
            .with_origin(OriginPoint::new("SRO"))
            .with_segment(CableSegment::first(
                "C-1",
                "S-1",
                "SRO",
                Level::One,
                PortRange::new(1, 2),
            ))
            .with_box(DistributionBox::new("B-1", "S-1", PortRange::new(1, 2)))
            .with_segment(CableSegment::first(
                "C-2",
                "S-2",
                "B-1",
                Level::Two,
                PortRange::new(u32::MAX, u32::MAX),
            ))
            .with_box(DistributionBox::new("B-2", "S-2", PortRange::new(u32::MAX, u32::MAX)));

        let outcome = propagate_all(&mut repo).expect("propagation");

        assert_eq!(repo.segment(Id::new("C-2")).and_then(|s| s.offset), Some(u32::MAX - 1));
        assert!(outcome.issues.iter().any(|issue| matches!(
            issue,
            Issue::MalformedRange { entity, .. } if *entity == "B-2"
        )));
        assert_eq!(repo.distribution_box(Id::new("B-2")).and_then(|b| b.offset), None);
    }

    #[test]
    fn test_malformed_box_not_descended() {
        let mut repo = two_siblings()
            .with_box(DistributionBox::new("B-bad", "S-1", PortRange::new(9, 3)))
            .with_segment(CableSegment::first(
                "C-9",
                "S-9",
                "B-bad",
                Level::Two,
                PortRange::new(1, 2),
            ));

        let outcome = propagate_all(&mut repo).expect("propagation");

        assert!(outcome.issues.iter().any(|issue| matches!(
            issue,
            Issue::MalformedRange { entity, .. } if *entity == "B-bad"
        )));
        assert!(repo.distribution_box(Id::new("B-bad")).and_then(|b| b.offset).is_some());
        assert_eq!(repo.segment(Id::new("C-9")).and_then(|s| s.offset), None);
    }

    #[test]
    fn test_persist_failure_aborts() {
        let mut repo = two_siblings().fail_on_persist();
        let result = propagate_all(&mut repo);

        match result {
            Err(FibermapError::RepositoryWrite { root, source }) => {
                assert_eq!(root, "SRO");
                assert!(matches!(source, RepositoryError::Write(_)));
            }
            other => panic!("expected write failure, got {other:?}"),
        }
    }

    #[test]
    fn test_long_chain_uses_no_recursion() {
        let mut repo = MemoryRepository::new().with_origin(OriginPoint::new("SRO"));
        let mut node = "SRO".to_string();
        for i in 0..1_000 {
            let section = format!("S-{i}");
            let b = format!("B-{i}");
            repo.insert_segment(CableSegment::first(
                format!("C-{i}").as_str(),
                section.as_str(),
                node.as_str(),
                Level::Three,
                PortRange::new(1, 1),
            ));
            repo.insert_box(DistributionBox::new(b.as_str(), section.as_str(), PortRange::new(1, 1)));
            node = b;
        }

        let outcome = propagate_all(&mut repo).expect("propagation");
        assert_eq!(outcome.segments, 1_000);
        assert_eq!(
            repo.distribution_box(Id::new("B-999")).and_then(|b| b.offset),
            Some(0)
        );
    }
}
