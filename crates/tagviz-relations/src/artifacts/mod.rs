//! Derived JSON artifacts
//!
//! Every document the visualization reads is built in memory from the
//! taxonomy and the resolved corpus:
//! - [`CrossLevelConnections`] (`crossLevelConnections.json`)
//! - [`ProcessedPapers`] (`processedPapers.json`)
//! - [`HierarchyMapping`] (`hierarchyMapping.json`)
//! - [`NodeMetadata`] (`nodeMetadata.json`)
//! - [`PlatformConfiguration`] (`platformConfiguration.json`)
//!
//! The published taxonomy itself is `tagviz_taxonomy::TaxonomyExport`.

use crate::error::{RelationsError, RelationsResult};
use serde::Serialize;
use tagviz_taxonomy::TaxonomyExport;

mod connections;
mod hierarchy;
mod metadata;
mod platform;
mod processed;

pub use connections::CrossLevelConnections;
pub use hierarchy::{DomainHierarchy, HierarchyMapping};
pub use metadata::{NodeMetadata, NodeMetadataEntry};
pub use platform::{PlatformConfiguration, PlatformEntry, PlatformHierarchy, PlatformType};
pub use processed::{ProcessedPaper, ProcessedPapers};

/// A serializable output document
pub trait Artifact: Serialize {
    /// Short name used in logs and errors
    const NAME: &'static str;

    /// File name written when none is configured
    const FILE_NAME: &'static str;

    /// Serialize to JSON text
    ///
    /// # Errors
    /// Returns error if serialization fails
    fn to_json(&self, pretty: bool) -> RelationsResult<String> {
        let result = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        result.map_err(|e| RelationsError::serialize(Self::NAME, e))
    }
}

impl Artifact for TaxonomyExport {
    const NAME: &'static str = "taxonomy";
    const FILE_NAME: &'static str = "taxonomy.json";
}
