//! Typed query filters.
//!
//! Lookups against the store are expressed with a small closed set of
//! operations over a fixed set of [`Field`]s instead of arbitrary predicates.

use std::ops::RangeInclusive;

use fibermap_core::{
    identifier::Id,
    network::{CableSegment, DistributionBox, OriginPoint},
};

/// Attribute of a stored entity that can be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Code,
    Section,
    Origin,
    OriginBox,
    Extremity,
    CableIn,
    Level,
    LocalStart,
    PassSeq,
}

/// A queried value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Code(Id),
    Number(u32),
}

impl From<Id> for Value {
    fn from(id: Id) -> Self {
        Self::Code(id)
    }
}

impl From<u32> for Value {
    fn from(number: u32) -> Self {
        Self::Number(number)
    }
}

/// A query over one entity collection.
///
/// # Example
///
/// ```
/// # use fibermap_core::identifier::Id;
/// # use fibermap_store::{Field, Filter};
/// let node = Id::new("SRO-01");
/// let upper = Id::new("S-1");
///
/// let first_segments = Filter::equals(Field::Origin, node)
///     .and(Filter::equals(Field::OriginBox, node))
///     .and(Filter::equals(Field::Section, upper).negate());
/// # let _ = first_segments;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Field equals the value.
    Equals(Field, Value),
    /// Field equals one of the values.
    InSet(Field, Vec<Value>),
    /// Numeric field lies within the inclusive range.
    Range(Field, RangeInclusive<u32>),
    /// All filters match.
    All(Vec<Filter>),
    /// The filter does not match.
    Not(Box<Filter>),
}

impl Filter {
    pub fn equals(field: Field, value: impl Into<Value>) -> Self {
        Self::Equals(field, value.into())
    }

    pub fn in_set(field: Field, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::InSet(field, values.into_iter().map(Into::into).collect())
    }

    pub fn range(field: Field, range: RangeInclusive<u32>) -> Self {
        Self::Range(field, range)
    }

    /// Combines `self` and `other` so that both must match.
    pub fn and(self, other: Filter) -> Self {
        match self {
            Self::All(mut filters) => {
                filters.push(other);
                Self::All(filters)
            }
            single => Self::All(vec![single, other]),
        }
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluates the filter against a record.
    pub fn matches(&self, record: &impl Record) -> bool {
        match self {
            Self::Equals(field, value) => record.field(*field) == Some(*value),
            Self::InSet(field, values) => record
                .field(*field)
                .is_some_and(|actual| values.contains(&actual)),
            Self::Range(field, range) => match record.field(*field) {
                Some(Value::Number(n)) => range.contains(&n),
                _ => false,
            },
            Self::All(filters) => filters.iter().all(|filter| filter.matches(record)),
            Self::Not(filter) => !filter.matches(record),
        }
    }
}

/// An entity whose fields can be read by a [`Filter`].
pub trait Record {
    fn code(&self) -> Id;

    /// Returns the value of `field`, or `None` if the entity has no such field
    /// or the field is unset.
    fn field(&self, field: Field) -> Option<Value>;
}

impl Record for OriginPoint {
    fn code(&self) -> Id {
        self.code
    }

    fn field(&self, field: Field) -> Option<Value> {
        match field {
            Field::Code => Some(self.code.into()),
            _ => None,
        }
    }
}

impl Record for DistributionBox {
    fn code(&self) -> Id {
        self.code
    }

    fn field(&self, field: Field) -> Option<Value> {
        match field {
            Field::Code => Some(self.code.into()),
            Field::CableIn => Some(self.cable_in.into()),
            Field::LocalStart => Some(self.ports.start.into()),
            Field::PassSeq => self.pass_seq.map(Value::from),
            _ => None,
        }
    }
}

impl Record for CableSegment {
    fn code(&self) -> Id {
        self.code
    }

    fn field(&self, field: Field) -> Option<Value> {
        match field {
            Field::Code => Some(self.code.into()),
            Field::Section => Some(self.section.into()),
            Field::Origin => Some(self.origin.into()),
            Field::OriginBox => Some(self.origin_box.into()),
            Field::Extremity => self.extremity.map(Value::from),
            Field::Level => Some(u32::from(self.level.number()).into()),
            Field::LocalStart => Some(self.ports.start.into()),
            Field::CableIn | Field::PassSeq => None,
        }
    }
}
