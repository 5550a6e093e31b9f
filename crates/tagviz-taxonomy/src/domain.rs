//! Tag domains and outline sections
//!
//! A taxonomy document is split into sections by heading lines. Research
//! sections map to one domain each; the platform section is split again by
//! its first-level bullets into two parallel sub-mode trees.

use crate::error::TaxonomyError;
use crate::level::LevelScheme;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One of the four independent tag namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Domain {
    /// Platforms grouped by the form of their content
    PlatformContentForm,
    /// Platforms grouped by platform attributes
    PlatformAttribute,
    /// What a paper studies
    ResearchContent,
    /// How a paper studies it
    ResearchMethod,
}

impl Domain {
    /// All domains, in output order
    pub const ALL: [Self; 4] = [
        Self::PlatformContentForm,
        Self::PlatformAttribute,
        Self::ResearchContent,
        Self::ResearchMethod,
    ];

    /// Canonical name used in artifact keys
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlatformContentForm => "PlatformContentForm",
            Self::PlatformAttribute => "PlatformAttribute",
            Self::ResearchContent => "ResearchContent",
            Self::ResearchMethod => "ResearchMethod",
        }
    }

    /// Whether this is one of the two platform sub-mode domains
    #[inline]
    #[must_use]
    pub fn is_platform(&self) -> bool {
        matches!(self, Self::PlatformContentForm | Self::PlatformAttribute)
    }

    /// Level numbering scheme of this domain's tree
    #[inline]
    #[must_use]
    pub fn scheme(&self) -> LevelScheme {
        if self.is_platform() {
            LevelScheme::Flat
        } else {
            LevelScheme::Rooted
        }
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = TaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|domain| domain.as_str() == s.trim())
            .ok_or_else(|| TaxonomyError::UnknownDomain(s.to_string()))
    }
}

/// Sub-mode selected by a first-level bullet of the platform section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformMode {
    /// Route into [`Domain::PlatformContentForm`]
    ContentForm,
    /// Route into [`Domain::PlatformAttribute`]
    Attribute,
}

impl PlatformMode {
    /// Both sub-modes, content form first
    pub const ALL: [Self; 2] = [Self::ContentForm, Self::Attribute];

    /// Output domain this sub-mode routes into
    #[inline]
    #[must_use]
    pub fn domain(self) -> Domain {
        match self {
            Self::ContentForm => Domain::PlatformContentForm,
            Self::Attribute => Domain::PlatformAttribute,
        }
    }

    /// Canonical name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContentForm => "ContentForm",
            Self::Attribute => "Attribute",
        }
    }

    /// The other sub-mode
    #[inline]
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::ContentForm => Self::Attribute,
            Self::Attribute => Self::ContentForm,
        }
    }
}

impl FromStr for PlatformMode {
    type Err = TaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.trim())
            .ok_or_else(|| TaxonomyError::UnknownPlatformMode(s.to_string()))
    }
}

/// What a heading line opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Platform section; first-level bullets select a [`PlatformMode`]
    Platform,
    /// Research section feeding a single non-platform domain
    Research(Domain),
}

impl SectionKind {
    /// Canonical name, as accepted by [`FromStr`]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Platform => "Platform",
            Self::Research(domain) => domain.as_str(),
        }
    }
}

impl FromStr for SectionKind {
    type Err = TaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Platform" => Ok(Self::Platform),
            other => match other.parse::<Domain>() {
                Ok(domain) if !domain.is_platform() => Ok(Self::Research(domain)),
                _ => Err(TaxonomyError::UnknownSection(s.to_string())),
            },
        }
    }
}
