//! Logical style tags.
//!
//! The core decides *what* a cell is, never how it looks. A [`StyleTag`]
//! names the role of a cell and the rendering surface maps it to borders,
//! fonts and fills.

use crate::fiber::FiberColor;

/// Role of a drawn cell or connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleTag {
    /// First row of a box block (class label, thick top border).
    BoxHeader,
    /// Middle rows of a box block.
    BoxBody,
    /// Last row of a box block (thick bottom border).
    BoxFooter,
    /// First row of a cable block, also used for level-gap boundaries.
    CableHeader,
    /// Remaining rows of a cable block.
    CableBody,
    /// Vertical branch or route connector.
    Route,
    /// Sheet title or navigation cell.
    Title,
    /// Table column header.
    Header,
    /// Ordinary table cell.
    Cell,
    /// Table cell filled with a fibre colour.
    Fiber(FiberColor),
    /// Plain cell without decoration.
    Plain,
}

impl StyleTag {
    /// Returns `true` for the tags making up a box outline.
    pub fn is_box(&self) -> bool {
        matches!(self, Self::BoxHeader | Self::BoxBody | Self::BoxFooter)
    }

    /// Returns `true` for tags rendered with a bold font.
    pub fn is_bold(&self) -> bool {
        matches!(
            self,
            Self::BoxHeader | Self::CableHeader | Self::Title | Self::Header
        )
    }

    /// Returns the fill colour, if the tag carries one.
    pub fn fill(&self) -> Option<FiberColor> {
        match self {
            Self::Fiber(color) => Some(*color),
            _ => None,
        }
    }
}
