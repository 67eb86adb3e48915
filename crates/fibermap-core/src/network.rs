//! Network data model for fibre distribution trees.
//!
//! A distribution tree is rooted at an [`OriginPoint`] (one per physical
//! site). Cable [`CableSegment`]s leave a node and group into sections; every
//! section hosts zero or more [`DistributionBox`]es, which in turn start new
//! sections.
//!
//! All port positions are 1-based and inclusive. Offsets are 0-based and are
//! `None` until the offset propagation pass has written them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identifier::Id;

/// Errors produced when a local port range is not well formed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("port range {start}-{end} ends before it starts")]
    Inverted { start: u32, end: u32 },

    #[error("port range {start}-{end} does not start at a positive position")]
    ZeroStart { start: u32, end: u32 },
}

/// A contiguous, 1-based, inclusive range of local ports or fibres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRange {
    pub start: u32,
    pub end: u32,
}

impl PortRange {
    /// Creates a new port range. No validation happens here; see [`PortRange::count`].
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Returns the number of ports covered by this range.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError`] when `end < start` or the range starts at 0.
    pub fn count(&self) -> Result<u32, RangeError> {
        if self.start == 0 {
            return Err(RangeError::ZeroStart {
                start: self.start,
                end: self.end,
            });
        }
        if self.end < self.start {
            return Err(RangeError::Inverted {
                start: self.start,
                end: self.end,
            });
        }
        Ok(self.end - self.start + 1)
    }

    /// Returns the absolute offset of this range when placed inside a parent
    /// allocation starting at `parent_offset`, saturating at `u32::MAX`.
    pub fn absolute_offset(&self, parent_offset: u32) -> u32 {
        self.checked_absolute_offset(parent_offset)
            .unwrap_or(u32::MAX)
    }

    /// Like [`PortRange::absolute_offset`], but `None` when the offset does not fit in `u32`.
    pub fn checked_absolute_offset(&self, parent_offset: u32) -> Option<u32> {
        let offset = (u64::from(parent_offset) + u64::from(self.start)).saturating_sub(1);
        u32::try_from(offset).ok()
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Distribution tier of a cable segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    One,
    Two,
    Three,
}

impl Level {
    /// All tiers, in ascending order.
    pub const ALL: [Level; 3] = [Level::One, Level::Two, Level::Three];

    /// Returns the tier number (1, 2 or 3).
    pub fn number(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Returns the human readable label used in diagrams.
    pub fn label(&self) -> &'static str {
        match self {
            Self::One => "Distribution 01",
            Self::Two => "Distribution 02",
            Self::Three => "Distribution 03",
        }
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(format!("unknown distribution level {other}, expected 1, 2 or 3")),
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.number()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Root of one distribution tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginPoint {
    pub code: Id,
    #[serde(default = "OriginPoint::default_class")]
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl OriginPoint {
    pub fn new(code: impl Into<Id>) -> Self {
        Self {
            code: code.into(),
            class: Self::default_class(),
            offset: None,
        }
    }

    fn default_class() -> String {
        "SRO".to_string()
    }
}

/// Functional class of a distribution box.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BoxClass {
    /// Pass-through splice closure.
    Closure,
    /// Terminal access point.
    Terminal,
    /// Any other class tag, preserved verbatim.
    Other(String),
}

impl From<String> for BoxClass {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "closure" | "bpe" => Self::Closure,
            "terminal" | "pbo" => Self::Terminal,
            _ => Self::Other(value),
        }
    }
}

impl From<BoxClass> for String {
    fn from(value: BoxClass) -> Self {
        value.to_string()
    }
}

impl fmt::Display for BoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closure => write!(f, "Closure"),
            Self::Terminal => write!(f, "Terminal"),
            Self::Other(class) => write!(f, "{class}"),
        }
    }
}

/// Pass sequence value marking the box that ends a section.
pub const END_OF_SECTION_PASS_SEQ: u32 = 100;

/// A non-root node: a closure or a terminal access point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionBox {
    pub code: Id,
    #[serde(default = "DistributionBox::default_class")]
    pub class: BoxClass,
    #[serde(rename = "type", default)]
    pub box_type: String,
    /// Section the box sits on.
    pub cable_in: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_seq: Option<u32>,
    /// Local input port range within the hosting section.
    #[serde(rename = "in")]
    pub ports: PortRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl DistributionBox {
    pub fn new(code: impl Into<Id>, cable_in: impl Into<Id>, ports: PortRange) -> Self {
        Self {
            code: code.into(),
            class: Self::default_class(),
            box_type: String::new(),
            cable_in: cable_in.into(),
            pass_seq: None,
            ports,
            offset: None,
        }
    }

    fn default_class() -> BoxClass {
        BoxClass::Closure
    }

    pub fn with_class(mut self, class: BoxClass) -> Self {
        self.class = class;
        self
    }

    pub fn with_type(mut self, box_type: impl Into<String>) -> Self {
        self.box_type = box_type.into();
        self
    }

    pub fn with_pass_seq(mut self, pass_seq: u32) -> Self {
        self.pass_seq = Some(pass_seq);
        self
    }

    /// Returns `true` when the box is flagged as the end of its section.
    pub fn ends_section(&self) -> bool {
        self.pass_seq == Some(END_OF_SECTION_PASS_SEQ)
    }
}

/// A directed cable edge from `origin` to `extremity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CableSegment {
    pub code: Id,
    pub section: Id,
    /// Node this particular segment leaves from.
    pub origin: Id,
    /// Node the whole section leaves from.
    pub origin_box: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extremity: Option<Id>,
    pub level: Level,
    #[serde(rename = "type", default)]
    pub cable_type: String,
    #[serde(default)]
    pub r_nodes: String,
    pub ports: PortRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl CableSegment {
    /// Creates the first segment of a section: `origin` and `origin_box` coincide.
    pub fn first(
        code: impl Into<Id>,
        section: impl Into<Id>,
        origin: impl Into<Id>,
        level: Level,
        ports: PortRange,
    ) -> Self {
        let origin = origin.into();
        Self {
            code: code.into(),
            section: section.into(),
            origin,
            origin_box: origin,
            extremity: None,
            level,
            cable_type: String::new(),
            r_nodes: String::new(),
            ports,
            offset: None,
        }
    }

    /// Creates a continuation of an existing section starting at `origin`.
    pub fn continuation(previous: &CableSegment, code: impl Into<Id>, origin: impl Into<Id>) -> Self {
        Self {
            code: code.into(),
            origin: origin.into(),
            extremity: None,
            offset: None,
            ..previous.clone()
        }
    }

    pub fn with_extremity(mut self, extremity: impl Into<Id>) -> Self {
        self.extremity = Some(extremity.into());
        self
    }

    pub fn with_type(mut self, cable_type: impl Into<String>) -> Self {
        self.cable_type = cable_type.into();
        self
    }

    pub fn with_r_nodes(mut self, r_nodes: impl Into<String>) -> Self {
        self.r_nodes = r_nodes.into();
        self
    }

    /// Returns `true` if this segment begins its section.
    pub fn is_first(&self) -> bool {
        self.origin == self.origin_box
    }
}
