//! On-disk network document.
//!
//! A network is stored as TOML with one array of tables per collection:
//!
//! ```toml
//! [[origins]]
//! code = "SRO-01"
//!
//! [[segments]]
//! code = "C-1"
//! section = "S-1"
//! origin = "SRO-01"
//! origin_box = "SRO-01"
//! extremity = "B-1"
//! level = 1
//! ports = { start = 1, end = 24 }
//!
//! [[boxes]]
//! code = "B-1"
//! class = "Terminal"
//! cable_in = "S-1"
//! in = { start = 1, end = 24 }
//! ```
//!
//! Only codes, section links, levels and port ranges are required. A box
//! without `class` is a closure and an origin without `class` is an `SRO`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use fibermap_core::{
    identifier::Id,
    network::{CableSegment, DistributionBox, OriginPoint},
};

use crate::error::StoreError;

/// Serialized form of a distribution network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDocument {
    #[serde(default)]
    pub origins: Vec<OriginPoint>,
    #[serde(default)]
    pub boxes: Vec<DistributionBox>,
    #[serde(default)]
    pub segments: Vec<CableSegment>,
}

impl NetworkDocument {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] for invalid TOML and
    /// [`StoreError::DuplicateCode`] if two entities of one collection share a code.
    pub fn from_toml(source: &str) -> Result<Self, StoreError> {
        let document: Self = toml::from_str(source)?;
        document.check_unique_codes()?;
        Ok(document)
    }

    /// Serializes the document back to TOML.
    pub fn to_toml(&self) -> Result<String, StoreError> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn check_unique_codes(&self) -> Result<(), StoreError> {
        check_unique("origin", self.origins.iter().map(|o| o.code))?;
        check_unique("box", self.boxes.iter().map(|b| b.code))?;
        check_unique("segment", self.segments.iter().map(|s| s.code))
    }
}

fn check_unique(kind: &'static str, codes: impl Iterator<Item = Id>) -> Result<(), StoreError> {
    let mut seen = HashSet::new();
    for code in codes {
        if !seen.insert(code) {
            return Err(StoreError::DuplicateCode { kind, code });
        }
    }
    Ok(())
}
