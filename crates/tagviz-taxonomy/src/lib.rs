//! Tagviz Taxonomy - research-tag hierarchy
//!
//! Parses a hand-authored, indentation-structured outline of research tags
//! into four independent domain trees and indexes them:
//! - [`OutlineParser`] turns text into a flat node table with parent/child links
//! - [`normalize`] maps each domain's raw parse level to display levels 1..=3
//! - [`Taxonomy`] answers id, display-name, level and ancestor lookups
//! - [`TaxonomyExport`] is the published view written to `taxonomy.json`
//!
//! # Example
//!
//! ```rust
//! use tagviz_taxonomy::prelude::*;
//!
//! let outline = "# **ResearchContent**\n- Users\n    - Groups\n        - Teens\n";
//! let taxonomy = Taxonomy::from_outline(outline, &OutlineOptions::default()).unwrap();
//!
//! let teens = taxonomy
//!     .lookup_by_display_name(Domain::ResearchContent, "Teens")
//!     .unwrap();
//! assert_eq!(teens.display_level, Some(TagLevel::L3));
//! assert_eq!(taxonomy.ancestors_of(teens.id.as_str()).len(), 2);
//! ```

pub mod domain;
pub mod error;
pub mod export;
pub mod index;
pub mod level;
pub mod node;
pub mod outline;

pub use domain::{Domain, PlatformMode, SectionKind};
pub use error::{TaxonomyError, TaxonomyResult};
pub use export::{PublishedNode, TaxonomyExport};
pub use index::Taxonomy;
pub use level::{normalize, LevelScheme, TagLevel};
pub use node::{sanitize_segment, RawNode, TagId, TagNode};
pub use outline::{parse_outline, OutlineDiagnostics, OutlineOptions, OutlineParser, ParsedOutline};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with taxonomies
    pub use crate::{
        Domain, OutlineOptions, OutlineParser, PlatformMode, TagId, TagLevel, TagNode, Taxonomy,
        TaxonomyError, TaxonomyResult,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
