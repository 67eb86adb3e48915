//! Ordered in-memory repository.

use indexmap::IndexMap;
use log::{debug, trace, warn};

use fibermap_core::{
    identifier::Id,
    network::{CableSegment, DistributionBox, OriginPoint},
    repository::{OffsetExpression, OffsetTarget, Repository, RepositoryError},
};

use crate::{
    document::NetworkDocument,
    filter::{Field, Filter, Record},
};

/// In-memory [`Repository`].
///
/// Collections keep document order. Queries go through [`Filter`] and then
/// sort by the key the [`Repository`] contract names.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    origins: IndexMap<Id, OriginPoint>,
    boxes: IndexMap<Id, DistributionBox>,
    segments: IndexMap<Id, CableSegment>,
    fail_persist: bool,
    persist_count: usize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository from a parsed document.
    pub fn from_document(document: NetworkDocument) -> Self {
        let mut repository = Self::new();
        for origin in document.origins {
            repository.insert_origin(origin);
        }
        for b in document.boxes {
            repository.insert_box(b);
        }
        for segment in document.segments {
            repository.insert_segment(segment);
        }
        repository
    }

    /// Snapshot of the current state as a document.
    pub fn to_document(&self) -> NetworkDocument {
        NetworkDocument {
            origins: self.origins.values().cloned().collect(),
            boxes: self.boxes.values().cloned().collect(),
            segments: self.segments.values().cloned().collect(),
        }
    }

    pub fn insert_origin(&mut self, origin: OriginPoint) {
        self.origins.insert(origin.code, origin);
    }

    pub fn insert_box(&mut self, b: DistributionBox) {
        self.boxes.insert(b.code, b);
    }

    pub fn insert_segment(&mut self, segment: CableSegment) {
        self.segments.insert(segment.code, segment);
    }

    pub fn with_origin(mut self, origin: OriginPoint) -> Self {
        self.insert_origin(origin);
        self
    }

    pub fn with_box(mut self, b: DistributionBox) -> Self {
        self.insert_box(b);
        self
    }

    pub fn with_segment(mut self, segment: CableSegment) -> Self {
        self.insert_segment(segment);
        self
    }

    /// Makes every subsequent [`Repository::persist`] call fail.
    pub fn fail_on_persist(mut self) -> Self {
        self.fail_persist = true;
        self
    }

    /// Number of successful [`Repository::persist`] calls.
    pub fn persist_count(&self) -> usize {
        self.persist_count
    }

    pub fn origin(&self, code: Id) -> Option<&OriginPoint> {
        self.origins.get(&code)
    }

    pub fn distribution_box(&self, code: Id) -> Option<&DistributionBox> {
        self.boxes.get(&code)
    }

    pub fn segment(&self, code: Id) -> Option<&CableSegment> {
        self.segments.get(&code)
    }

    pub fn boxes(&self) -> impl Iterator<Item = &DistributionBox> {
        self.boxes.values()
    }

    pub fn segments(&self) -> impl Iterator<Item = &CableSegment> {
        self.segments.values()
    }

    /// Segments matching `filter`, in document order.
    pub fn find_segments(&self, filter: &Filter) -> Vec<CableSegment> {
        select(self.segments.values(), filter)
    }

    /// Boxes matching `filter`, in document order.
    pub fn find_boxes(&self, filter: &Filter) -> Vec<DistributionBox> {
        select(self.boxes.values(), filter)
    }

    /// Fills in missing segment extremities.
    ///
    /// For every segment without an extremity, the box that ends its section
    /// is used: the box flagged with the end-of-section pass sequence, or
    /// failing that, the box with the highest input range end. Returns the
    /// number of segments updated.
    pub fn resolve_extremities(&mut self) -> usize {
        let mut resolved = 0;
        let pending: Vec<(Id, Id)> = self
            .segments
            .values()
            .filter(|segment| segment.extremity.is_none())
            .map(|segment| (segment.code, segment.section))
            .collect();

        for (code, section) in pending {
            let hosted = self.find_boxes(&Filter::equals(Field::CableIn, section));
            let end = hosted
                .iter()
                .find(|b| b.ends_section())
                .or_else(|| hosted.iter().max_by_key(|b| b.ports.end));

            match (end, self.segments.get_mut(&code)) {
                (Some(end), Some(segment)) => {
                    trace!(segment:% = code, extremity:% = end.code; "Resolved extremity");
                    segment.extremity = Some(end.code);
                    resolved += 1;
                }
                _ => debug!(segment:% = code, section:% = section; "No box ends section"),
            }
        }

        resolved
    }

    fn write_offsets<R: Record>(
        collection: &mut IndexMap<Id, R>,
        ids: &[Id],
        target: OffsetTarget,
        expression: OffsetExpression,
        apply: impl Fn(&mut R, OffsetExpression),
    ) -> Result<usize, RepositoryError> {
        for code in ids {
            if !collection.contains_key(code) {
                return Err(RepositoryError::UnknownEntity {
                    kind: target,
                    code: *code,
                });
            }
        }
        for code in ids {
            if let Some(record) = collection.get_mut(code) {
                apply(record, expression);
            }
        }
        Ok(ids.len())
    }
}

fn select<'a, R: Record + Clone + 'a>(
    records: impl Iterator<Item = &'a R>,
    filter: &Filter,
) -> Vec<R> {
    records
        .filter(|record| filter.matches(*record))
        .cloned()
        .collect()
}

impl Repository for MemoryRepository {
    fn get_root_nodes(&self) -> Result<Vec<OriginPoint>, RepositoryError> {
        let mut roots: Vec<OriginPoint> = self.origins.values().cloned().collect();
        roots.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(roots)
    }

    fn get_first_segments(
        &self,
        origin: Id,
        exclude_section: Option<Id>,
    ) -> Result<Vec<CableSegment>, RepositoryError> {
        let mut filter =
            Filter::equals(Field::Origin, origin).and(Filter::equals(Field::OriginBox, origin));
        if let Some(section) = exclude_section {
            filter = filter.and(Filter::equals(Field::Section, section).negate());
        }

        let mut segments = self.find_segments(&filter);
        segments.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(segments)
    }

    fn get_boxes_on_section(&self, section: Id) -> Result<Vec<DistributionBox>, RepositoryError> {
        let mut boxes = self.find_boxes(&Filter::equals(Field::CableIn, section));
        // Stable sort keeps document order between equal starts.
        boxes.sort_by_key(|b| b.ports.start);
        Ok(boxes)
    }

    fn get_box(&self, code: Id) -> Result<Option<DistributionBox>, RepositoryError> {
        Ok(self.boxes.get(&code).cloned())
    }

    fn get_segment(&self, code: Id) -> Result<Option<CableSegment>, RepositoryError> {
        Ok(self.segments.get(&code).cloned())
    }

    fn get_next_segment(
        &self,
        section: Id,
        new_origin: Id,
    ) -> Result<Option<CableSegment>, RepositoryError> {
        let filter =
            Filter::equals(Field::Section, section).and(Filter::equals(Field::Origin, new_origin));
        Ok(self
            .segments
            .values()
            .find(|segment| filter.matches(*segment))
            .cloned())
    }

    fn update_offsets(
        &mut self,
        ids: &[Id],
        target: OffsetTarget,
        expression: OffsetExpression,
    ) -> Result<usize, RepositoryError> {
        trace!(collection:% = target, count = ids.len(), expression:?; "Updating offsets");
        match target {
            OffsetTarget::Origin => {
                Self::write_offsets(&mut self.origins, ids, target, expression, |o, e| {
                    o.offset = Some(e.evaluate(1));
                })
            }
            OffsetTarget::Box => {
                Self::write_offsets(&mut self.boxes, ids, target, expression, |b, e| {
                    b.offset = Some(e.evaluate(b.ports.start));
                })
            }
            OffsetTarget::Segment => {
                Self::write_offsets(&mut self.segments, ids, target, expression, |s, e| {
                    s.offset = Some(e.evaluate(s.ports.start));
                })
            }
        }
    }

    fn persist(&mut self) -> Result<(), RepositoryError> {
        if self.fail_persist {
            warn!("In-memory repository configured to reject persist");
            return Err(RepositoryError::Write(
                "in-memory repository rejected persist".to_string(),
            ));
        }
        self.persist_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fibermap_core::network::{Level, PortRange};

    use super::*;

    fn sample() -> MemoryRepository {
        MemoryRepository::new()
            .with_origin(OriginPoint::new("SRO-02"))
            .with_origin(OriginPoint::new("SRO-01"))
            .with_segment(CableSegment::first(
                "C-2",
                "S-2",
                "SRO-01",
                Level::One,
                PortRange::new(13, 24),
            ))
            .with_segment(
                CableSegment::first("C-1", "S-1", "SRO-01", Level::One, PortRange::new(1, 12))
                    .with_extremity("B-2"),
            )
            .with_box(DistributionBox::new("B-2", "S-1", PortRange::new(7, 12)))
            .with_box(DistributionBox::new("B-1", "S-1", PortRange::new(1, 6)))
    }

    #[test]
    fn test_roots_sorted_by_code() {
        let repo = sample();
        let roots = repo.get_root_nodes().expect("roots");
        let codes: Vec<String> = roots.iter().map(|r| r.code.to_string()).collect();
        assert_eq!(codes, vec!["SRO-01", "SRO-02"]);
    }

    #[test]
    fn test_first_segments_sorted_and_excluded() {
        let repo = sample();
        let origin = Id::new("SRO-01");

        let all = repo.get_first_segments(origin, None).expect("segments");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].code, "C-1");
        assert_eq!(all[1].code, "C-2");

        let without = repo
            .get_first_segments(origin, Some(Id::new("S-1")))
            .expect("segments");
        assert_eq!(without.len(), 1);
        assert_eq!(without[0].code, "C-2");
    }

    #[test]
    fn test_boxes_sorted_by_start() {
        let repo = sample();
        let boxes = repo.get_boxes_on_section(Id::new("S-1")).expect("boxes");
        assert_eq!(boxes[0].code, "B-1");
        assert_eq!(boxes[1].code, "B-2");
    }

    #[test]
    fn test_next_segment() {
        let first = CableSegment::first("N-1", "S-9", "SRO-01", Level::Three, PortRange::new(1, 8))
            .with_extremity("X");
        let second = CableSegment::continuation(&first, "N-2", "X");
        let repo = MemoryRepository::new()
            .with_segment(first)
            .with_segment(second);

        let next = repo
            .get_next_segment(Id::new("S-9"), Id::new("X"))
            .expect("query");
        assert_eq!(next.map(|s| s.code), Some(Id::new("N-2")));
        assert!(repo
            .get_next_segment(Id::new("S-9"), Id::new("Y"))
            .expect("query")
            .is_none());
    }

    #[test]
    fn test_update_offsets_start_relative() {
        let mut repo = sample();
        let ids = [Id::new("C-1"), Id::new("C-2")];
        let updated = repo
            .update_offsets(&ids, OffsetTarget::Segment, OffsetExpression::StartRelative { base: 0 })
            .expect("update");

        assert_eq!(updated, 2);
        assert_eq!(repo.segment(Id::new("C-1")).and_then(|s| s.offset), Some(0));
        assert_eq!(repo.segment(Id::new("C-2")).and_then(|s| s.offset), Some(12));
    }

    #[test]
    fn test_update_offsets_unknown_is_rejected_atomically() {
        let mut repo = sample();
        let ids = [Id::new("B-1"), Id::new("B-missing")];
        let result =
            repo.update_offsets(&ids, OffsetTarget::Box, OffsetExpression::Constant(3));

        assert!(matches!(
            result,
            Err(RepositoryError::UnknownEntity {
                kind: OffsetTarget::Box,
                ..
            })
        ));
        assert_eq!(repo.distribution_box(Id::new("B-1")).and_then(|b| b.offset), None);
    }

    #[test]
    fn test_persist_failure() {
        let mut repo = sample().fail_on_persist();
        assert!(matches!(repo.persist(), Err(RepositoryError::Write(_))));
        assert_eq!(repo.persist_count(), 0);
    }

    #[test]
    fn test_resolve_extremities() {
        let mut repo = sample();
        // C-2 has no extremity and S-2 hosts no box; C-1 is already set.
        assert_eq!(repo.resolve_extremities(), 0);

        repo.insert_box(DistributionBox::new("B-9", "S-2", PortRange::new(1, 4)));
        repo.insert_box(DistributionBox::new("B-8", "S-2", PortRange::new(5, 12)));
        assert_eq!(repo.resolve_extremities(), 1);
        assert_eq!(
            repo.segment(Id::new("C-2")).and_then(|s| s.extremity),
            Some(Id::new("B-8"))
        );
    }
}
