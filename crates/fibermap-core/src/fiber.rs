//! Fibre numbering and colour code.
//!
//! Fibres are bundled in tubes of [`FIBERS_PER_TUBE`]. Both the tube number
//! and the fibre-within-tube number cycle through the same 12-colour code.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical packaging constant: fibres per tube.
pub const FIBERS_PER_TUBE: u32 = 12;

/// Tube number (1-based) of the 0-based local fibre index `index`.
pub fn tube(index: u32) -> u32 {
    index / FIBERS_PER_TUBE + 1
}

/// Fibre-within-tube number (1-based) of the 0-based local fibre index `index`.
pub fn fiber_in_tube(index: u32) -> u32 {
    index % FIBERS_PER_TUBE + 1
}

/// The standard 12-colour fibre and tube colour code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiberColor {
    Red,
    Blue,
    Green,
    Yellow,
    Violet,
    White,
    Orange,
    Grey,
    Brown,
    Beige,
    Cyan,
    Pink,
}

impl FiberColor {
    /// Colours in code order.
    pub const ALL: [FiberColor; 12] = [
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Violet,
        Self::White,
        Self::Orange,
        Self::Grey,
        Self::Brown,
        Self::Beige,
        Self::Cyan,
        Self::Pink,
    ];

    /// Colour of the 1-based tube or fibre number `position`, cycling every 12.
    ///
    /// # Examples
    ///
    /// ```
    /// use fibermap_core::fiber::FiberColor;
    ///
    /// assert_eq!(FiberColor::for_position(1), FiberColor::Red);
    /// assert_eq!(FiberColor::for_position(13), FiberColor::Red);
    /// assert_eq!(FiberColor::for_position(12), FiberColor::Pink);
    /// ```
    pub fn for_position(position: u32) -> Self {
        let idx = (position.max(1) - 1) % FIBERS_PER_TUBE;
        Self::ALL
            .get(idx as usize)
            .copied()
            .unwrap_or(Self::Red)
    }

    /// RGB hex code without the leading `#`.
    pub fn hex(&self) -> &'static str {
        match self {
            Self::Red => "FF0000",
            Self::Blue => "0066FF",
            Self::Green => "00B050",
            Self::Yellow => "FFFF00",
            Self::Violet => "7030A0",
            Self::White => "FFFFFF",
            Self::Orange => "FFCC00",
            Self::Grey => "D9D9D9",
            Self::Brown => "963634",
            Self::Beige => "FDE9D9",
            Self::Cyan => "66FFFF",
            Self::Pink => "FFCCFF",
        }
    }
}

impl fmt::Display for FiberColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_first_two_tubes() {
        for i in 0..12 {
            assert_eq!(tube(i), 1);
        }
        for i in 12..24 {
            assert_eq!(tube(i), 2);
        }
        assert_eq!(fiber_in_tube(0), 1);
        assert_eq!(fiber_in_tube(11), 12);
        assert_eq!(fiber_in_tube(12), 1);
    }

    #[test]
    fn test_144_fibres_cover_twelve_full_tubes() {
        let mut per_tube = [0u32; 12];
        for i in 0..144 {
            let t = tube(i);
            assert!((1..=12).contains(&t));
            per_tube[(t - 1) as usize] += 1;
        }
        assert!(per_tube.iter().all(|&count| count == 12));

        let fibre_one_count = (0..144).filter(|&i| fiber_in_tube(i) == 1).count();
        assert_eq!(fibre_one_count, 12);
    }

    #[test]
    fn test_color_cycle() {
        assert_eq!(FiberColor::for_position(0), FiberColor::Red);
        assert_eq!(FiberColor::for_position(6).hex(), "FFFFFF");
        assert_eq!(FiberColor::for_position(24), FiberColor::Pink);
        assert_eq!(FiberColor::Blue.to_string(), "#0066FF");
    }

    proptest! {
        #[test]
        fn prop_tube_and_fibre_reconstruct_index(i in 0u32..100_000) {
            let t = tube(i);
            let f = fiber_in_tube(i);
            prop_assert!((1..=12).contains(&f));
            prop_assert_eq!((t - 1) * FIBERS_PER_TUBE + (f - 1), i);
        }
    }
}
