//! Generation results.
//!
//! A generation run degrades per branch: a missing box or a malformed range
//! drops the affected branch and is recorded as an [`Issue`], while sibling
//! branches are still processed. The [`GenerationReport`] summarises the
//! outcome so callers never receive a silent empty result.

use std::fmt;

use thiserror::Error;

use fibermap_core::{identifier::Id, network::PortRange};

/// A per-branch data problem found during generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Issue {
    #[error("no origin points found in the network")]
    NoRoots,

    #[error("origin `{root}`: section `{section}` references missing box `{code}`")]
    MissingBoxReference { root: Id, section: Id, code: Id },

    #[error("origin `{root}`: section `{section}` has no extremity box")]
    MissingExtremity { root: Id, section: Id },

    #[error("origin `{root}`: `{entity}` has malformed port range {range}")]
    MalformedRange {
        root: Id,
        entity: Id,
        range: PortRange,
    },

    #[error("origin `{root}`: section `{section}` has no offset, ordered by code instead")]
    InconsistentOrdering { root: Id, section: Id },
}

impl Issue {
    /// The origin whose tree the issue was found in.
    pub fn root(&self) -> Option<Id> {
        match self {
            Self::NoRoots => None,
            Self::MissingBoxReference { root, .. }
            | Self::MissingExtremity { root, .. }
            | Self::MalformedRange { root, .. }
            | Self::InconsistentOrdering { root, .. } => Some(*root),
        }
    }
}

/// Overall outcome of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Every branch was processed.
    Success,
    /// Output was produced but some branches were skipped or truncated.
    Partial,
    /// Nothing could be generated.
    Failure,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Partial => write!(f, "partial"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// Structured result of [`TopologyBuilder::generate`](crate::TopologyBuilder::generate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    status: Status,
    issues: Vec<Issue>,
    sheets: Vec<String>,
}

impl GenerationReport {
    /// Builds a report, deriving the status from the issues.
    ///
    /// [`Issue::NoRoots`] makes the run a failure; any other issue makes it partial.
    pub fn new(sheets: Vec<String>, issues: Vec<Issue>) -> Self {
        let status = if issues.contains(&Issue::NoRoots) {
            Status::Failure
        } else if issues.is_empty() {
            Status::Success
        } else {
            Status::Partial
        };

        Self {
            status,
            issues,
            sheets,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Names of the sheets produced, overview first.
    pub fn sheets(&self) -> &[String] {
        &self.sheets
    }

    /// Issues found in the tree of `root`.
    pub fn issues_for(&self, root: Id) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.root() == Some(root))
    }
}
