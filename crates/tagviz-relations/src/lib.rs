//! Tagviz Relations - papers against the taxonomy
//!
//! Consumes a [`tagviz_taxonomy::Taxonomy`] and a paper corpus:
//! - [`Corpus`] reads paper records leniently, skipping malformed ones
//! - [`TagResolver`] recovers level 1..=3 labels from authored leaf names
//! - [`CrossDomainAggregator`] counts co-occurrences across five domain pairs
//! - [`level_combinations`] lists the 27 level combinations
//! - [`artifacts`] builds every derived JSON document
//!
//! # Example
//!
//! ```rust
//! use tagviz_relations::prelude::*;
//! use tagviz_taxonomy::{Domain, OutlineOptions, TagLevel, Taxonomy};
//!
//! let outline = "# **ResearchContent**\n- A\n    - B\n        - C\n\
//!                # **ResearchMethod**\n- X\n";
//! let taxonomy = Taxonomy::from_outline(outline, &OutlineOptions::default()).unwrap();
//!
//! let papers = vec![Paper::new("p1")
//!     .with_tags(Domain::ResearchContent, ["C"])
//!     .with_tags(Domain::ResearchMethod, ["X"])];
//! let (resolved, _) = TagResolver::new(&taxonomy).resolve_all(&papers);
//! let table = CrossDomainAggregator::default().aggregate(&resolved);
//!
//! let key = BucketKey::new(PairType::ContentMethod, TagLevel::L1, TagLevel::L1);
//! assert_eq!(table.get(&key, "A", "X").unwrap().paper_count, 1);
//! ```

pub mod aggregate;
pub mod artifacts;
pub mod combos;
pub mod error;
pub mod paper;
pub mod resolve;
pub mod strength;

pub use aggregate::{
    label_key, BucketKey, Connection, ConnectionAccumulator, ConnectionTable,
    CrossDomainAggregator, PairPolicy, PairType, PlatformLevels,
};
pub use artifacts::{
    Artifact, CrossLevelConnections, HierarchyMapping, NodeMetadata, PlatformConfiguration,
    ProcessedPapers,
};
pub use combos::{level_combinations, LEVEL_COMBINATION_COUNT};
pub use error::{RelationsError, RelationsResult};
pub use paper::{Corpus, Paper, PaperMetadata, TagField};
pub use resolve::{ResolveStats, ResolvedPaper, ResolvedPaperTags, TagResolver};
pub use strength::{ConnectionStrength, StrengthThresholds};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for resolving and aggregating papers
    pub use crate::{
        Artifact, BucketKey, ConnectionStrength, ConnectionTable, Corpus, CrossDomainAggregator,
        PairPolicy, PairType, Paper, RelationsError, RelationsResult, StrengthThresholds,
        TagResolver,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
