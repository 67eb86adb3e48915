//! The topology repository capability.
//!
//! The engines read the distribution tree and write derived offsets through
//! the [`Repository`] trait. Implementations live in `fibermap-store`; the
//! engines receive one explicitly and never cache a global handle.

use thiserror::Error;

use crate::{
    identifier::Id,
    network::{CableSegment, DistributionBox, OriginPoint},
};

/// Errors raised by a repository implementation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("unknown {kind} `{code}`")]
    UnknownEntity { kind: OffsetTarget, code: Id },

    #[error("failed to write repository: {0}")]
    Write(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Entity collection an offset update applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OffsetTarget {
    Origin,
    Box,
    Segment,
}

impl std::fmt::Display for OffsetTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Origin => write!(f, "origin point"),
            Self::Box => write!(f, "distribution box"),
            Self::Segment => write!(f, "cable segment"),
        }
    }
}

/// Offset value written by [`Repository::update_offsets`], evaluated per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetExpression {
    /// Every entity receives the same value.
    Constant(u32),
    /// `base + local_start - 1`, where `local_start` is the entity's own
    /// first local port (segment ports, box input range).
    StartRelative { base: u32 },
}

impl OffsetExpression {
    /// Evaluates the expression for an entity whose first local port is `local_start`.
    ///
    /// `StartRelative` saturates at `u32::MAX`.
    pub fn evaluate(&self, local_start: u32) -> u32 {
        match self {
            Self::Constant(value) => *value,
            Self::StartRelative { base } => {
                let offset = (u64::from(*base) + u64::from(local_start)).saturating_sub(1);
                u32::try_from(offset).unwrap_or(u32::MAX)
            }
        }
    }
}

/// Read and offset-write access to a distribution network.
///
/// All list operations return entities in a stable order so that
/// propagation is deterministic.
pub trait Repository {
    /// All origin points, ascending by code.
    fn get_root_nodes(&self) -> Result<Vec<OriginPoint>, RepositoryError>;

    /// Segments that begin a section at `origin`, ascending by code.
    ///
    /// A segment qualifies when both its `origin` and its section's
    /// `origin_box` equal `origin`. `exclude_section` drops the section the
    /// node was reached through.
    fn get_first_segments(
        &self,
        origin: Id,
        exclude_section: Option<Id>,
    ) -> Result<Vec<CableSegment>, RepositoryError>;

    /// Boxes hosted on `section`, ascending by local start position.
    fn get_boxes_on_section(&self, section: Id) -> Result<Vec<DistributionBox>, RepositoryError>;

    /// A single box by code.
    fn get_box(&self, code: Id) -> Result<Option<DistributionBox>, RepositoryError>;

    /// A single segment by code.
    fn get_segment(&self, code: Id) -> Result<Option<CableSegment>, RepositoryError>;

    /// The segment of `section` that starts at `new_origin`, if any.
    fn get_next_segment(
        &self,
        section: Id,
        new_origin: Id,
    ) -> Result<Option<CableSegment>, RepositoryError>;

    /// Writes `expression` into the offset field of every listed entity.
    ///
    /// Returns the number of entities updated.
    fn update_offsets(
        &mut self,
        ids: &[Id],
        target: OffsetTarget,
        expression: OffsetExpression,
    ) -> Result<usize, RepositoryError>;

    /// Makes all updates so far durable.
    fn persist(&mut self) -> Result<(), RepositoryError>;
}
