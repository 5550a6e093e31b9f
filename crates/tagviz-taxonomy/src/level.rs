//! Level normalization
//!
//! The parser records a structural `raw_level` per node. Each domain maps it
//! to a display level in `1..=3` with its own offset:
//!
//! ```text
//! Flat   (platform):          root = raw 0 (hidden), display = raw
//! Rooted (content / method):  root = raw 1 (hidden), display = raw - 1
//! ```
//!
//! Anything outside `1..=3` is hidden from the published taxonomy.

use crate::error::TaxonomyError;
use crate::node::{RawNode, TagNode};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Display level of a published tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TagLevel {
    /// Top visible category
    L1,
    /// Middle category
    L2,
    /// Leaf tag
    L3,
}

impl TagLevel {
    /// All levels, shallowest first
    pub const ALL: [Self; 3] = [Self::L1, Self::L2, Self::L3];

    /// Level from its 1-based number
    #[inline]
    #[must_use]
    pub fn from_number(number: i32) -> Option<Self> {
        match number {
            1 => Some(Self::L1),
            2 => Some(Self::L2),
            3 => Some(Self::L3),
            _ => None,
        }
    }

    /// 1-based level number
    #[inline]
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::L1 => 1,
            Self::L2 => 2,
            Self::L3 => 3,
        }
    }

    /// Zero-based position, for array indexing
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.number() - 1)
    }

    /// Token used in artifact keys (`L1`, `L2`, `L3`)
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
        }
    }

    /// Next deeper level, if any
    #[inline]
    #[must_use]
    pub fn deeper(self) -> Option<Self> {
        Self::from_number(i32::from(self.number()) + 1)
    }
}

impl Display for TagLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagLevel {
    type Err = TaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L1" => Ok(Self::L1),
            "L2" => Ok(Self::L2),
            "L3" => Ok(Self::L3),
            _ => Err(TaxonomyError::InvalidLevel(s.to_string())),
        }
    }
}

/// Per-domain mapping from raw parse level to display level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelScheme {
    /// Root is raw level 0; display level equals raw level
    Flat,
    /// Root is raw level 1 (conceptual); display level is raw level minus one
    Rooted,
}

impl LevelScheme {
    /// Raw level assigned to the (hidden) root of a tree under this scheme
    #[inline]
    #[must_use]
    pub fn root_raw_level(self) -> u8 {
        match self {
            Self::Flat => 0,
            Self::Rooted => 1,
        }
    }

    /// Display level for a raw level, `None` when it falls outside `1..=3`
    #[inline]
    #[must_use]
    pub fn display_level(self, raw_level: u8) -> Option<TagLevel> {
        let raw = i32::from(raw_level);
        match self {
            Self::Flat => TagLevel::from_number(raw),
            Self::Rooted => TagLevel::from_number(raw - 1),
        }
    }
}

/// Attach display levels to parsed nodes
///
/// Order and links are preserved; hidden nodes are kept so deeper chains
/// still resolve.
#[must_use]
pub fn normalize(nodes: Vec<RawNode>) -> Vec<TagNode> {
    let nodes: Vec<TagNode> = nodes
        .into_iter()
        .map(|raw| {
            let display_level = raw.domain.scheme().display_level(raw.raw_level);
            TagNode::from_raw(raw, display_level)
        })
        .collect();

    let hidden = nodes.iter().filter(|n| n.display_level.is_none()).count();
    tracing::debug!(total = nodes.len(), hidden, "normalized tag levels");

    nodes
}
