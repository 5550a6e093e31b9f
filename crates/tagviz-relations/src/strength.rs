//! Connection strength classification

use crate::error::{RelationsError, RelationsResult};
use serde::{Deserialize, Serialize};

/// Strength tier of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStrength {
    /// Below the medium threshold
    Weak,
    /// At least the medium threshold
    Medium,
    /// At least the strong threshold
    Strong,
}

/// Paper-count thresholds; `strong > medium > 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrengthThresholds {
    strong: usize,
    medium: usize,
}

impl StrengthThresholds {
    /// Default strong threshold
    pub const DEFAULT_STRONG: usize = 20;
    /// Default medium threshold
    pub const DEFAULT_MEDIUM: usize = 10;

    /// Create validated thresholds
    ///
    /// # Errors
    /// Returns error unless `strong > medium > 0`
    pub fn new(strong: usize, medium: usize) -> RelationsResult<Self> {
        if medium == 0 || strong <= medium {
            return Err(RelationsError::InvalidThresholds { strong, medium });
        }
        Ok(Self { strong, medium })
    }

    /// Strong threshold
    #[inline]
    #[must_use]
    pub fn strong(&self) -> usize {
        self.strong
    }

    /// Medium threshold
    #[inline]
    #[must_use]
    pub fn medium(&self) -> usize {
        self.medium
    }

    /// Tier for a paper count
    #[inline]
    #[must_use]
    pub fn classify(&self, paper_count: usize) -> ConnectionStrength {
        if paper_count >= self.strong {
            ConnectionStrength::Strong
        } else if paper_count >= self.medium {
            ConnectionStrength::Medium
        } else {
            ConnectionStrength::Weak
        }
    }
}

impl Default for StrengthThresholds {
    fn default() -> Self {
        Self {
            strong: Self::DEFAULT_STRONG,
            medium: Self::DEFAULT_MEDIUM,
        }
    }
}
