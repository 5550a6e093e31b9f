use super::Artifact;
use crate::paper::{Paper, PaperMetadata};
use crate::resolve::{ResolvedPaper, ResolvedPaperTags};
use indexmap::IndexMap;
use serde::Serialize;
use tagviz_taxonomy::Domain;

/// One paper as the visualization sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedPaper {
    /// Paper id
    pub id: String,
    /// Pass-through bibliographic fields
    #[serde(flatten)]
    pub metadata: PaperMetadata,
    /// Award flag; never set by this pipeline
    pub is_awarded: bool,
    /// Domains with at least one matched tag
    pub tags: IndexMap<Domain, ResolvedPaperTags>,
}

/// `processedPapers.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessedPapers {
    /// Papers in corpus order
    pub papers: Vec<ProcessedPaper>,
}

impl ProcessedPapers {
    /// Join papers with their resolution, position by position
    #[must_use]
    pub fn new(papers: &[Paper], resolved: &[ResolvedPaper]) -> Self {
        let papers = papers
            .iter()
            .zip(resolved)
            .map(|(paper, resolved)| ProcessedPaper {
                id: paper.id.clone(),
                metadata: paper.metadata.clone(),
                is_awarded: false,
                tags: resolved.tags.clone(),
            })
            .collect();
        Self { papers }
    }

    /// Level-3 occurrences per display name in one domain, duplicates
    /// counted
    #[must_use]
    pub fn level3_counts(&self, domain: Domain) -> IndexMap<&str, usize> {
        let mut counts = IndexMap::new();
        for tags in self.papers.iter().filter_map(|p| p.tags.get(&domain)) {
            for name in &tags.level3 {
                *counts.entry(name.as_str()).or_default() += 1;
            }
        }
        counts
    }
}

impl Artifact for ProcessedPapers {
    const NAME: &'static str = "processed papers";
    const FILE_NAME: &'static str = "processedPapers.json";
}
