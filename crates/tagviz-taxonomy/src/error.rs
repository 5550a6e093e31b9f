//! Error types for the taxonomy crate
//!
//! Parsing itself is lenient and never fails; errors only arise from
//! name lookups (domain / section aliases) and invalid parser options.

/// Errors produced while interpreting taxonomy names and options
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxonomyError {
    /// Name does not denote one of the four tag domains
    #[error("unknown tag domain: '{0}'")]
    UnknownDomain(String),

    /// Alias target is not a known outline section
    #[error("unknown outline section: '{0}'")]
    UnknownSection(String),

    /// Alias target is not a known platform sub-mode
    #[error("unknown platform sub-mode: '{0}'")]
    UnknownPlatformMode(String),

    /// Level token is not one of L1, L2, L3
    #[error("invalid tag level: '{0}'")]
    InvalidLevel(String),

    /// Parser options are unusable
    #[error("invalid outline options: {0}")]
    InvalidOptions(String),
}

impl TaxonomyError {
    /// Create invalid options error
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions(message.into())
    }
}

/// Result type alias for taxonomy operations
pub type TaxonomyResult<T> = Result<T, TaxonomyError>;
