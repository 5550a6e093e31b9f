//! Error types for paper resolution and aggregation
//!
//! Unknown tags and malformed individual records are not errors; they are
//! dropped and counted. What remains here aborts a run.

use tagviz_taxonomy::TaxonomyError;

/// Main relations error type
#[derive(Debug, thiserror::Error)]
pub enum RelationsError {
    /// Strength thresholds violate `strong > medium > 0`
    #[error("invalid strength thresholds: strong={strong}, medium={medium}")]
    InvalidThresholds {
        /// Strong threshold
        strong: usize,
        /// Medium threshold
        medium: usize,
    },

    /// Name is not one of the five domain pairs
    #[error("unknown domain pair: '{0}'")]
    UnknownPair(String),

    /// Corpus document is not JSON or has no paper list
    #[error("malformed paper corpus: {0}")]
    MalformedCorpus(String),

    /// Artifact could not be serialized
    #[error("failed to serialize {artifact}: {source}")]
    Serialize {
        /// Artifact name
        artifact: &'static str,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Taxonomy lookup or option error
    #[error("taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),
}

impl RelationsError {
    /// Create malformed corpus error
    pub fn malformed_corpus(message: impl Into<String>) -> Self {
        Self::MalformedCorpus(message.into())
    }

    /// Create serialization error for a named artifact
    #[must_use]
    pub fn serialize(artifact: &'static str, source: serde_json::Error) -> Self {
        Self::Serialize { artifact, source }
    }
}

/// Result type alias for relations operations
pub type RelationsResult<T> = Result<T, RelationsError>;
