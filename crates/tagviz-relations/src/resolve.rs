//! Paper tag resolution
//!
//! Papers carry leaf names only; the resolver recovers the level-1 and
//! level-2 labels by walking the taxonomy upward from each matched name.

use crate::paper::Paper;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tagviz_taxonomy::{Domain, TagLevel, Taxonomy};

/// One paper's labels in one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPaperTags {
    /// Owning paper
    #[serde(skip)]
    pub paper_id: String,
    /// Domain the labels belong to
    #[serde(skip)]
    pub domain: Domain,
    /// Level-1 labels, first-seen order
    #[serde(rename = "l1")]
    pub level1: IndexSet<String>,
    /// Level-2 labels, first-seen order
    #[serde(rename = "l2")]
    pub level2: IndexSet<String>,
    /// Level-3 labels in authoring order, duplicates kept
    #[serde(rename = "l3")]
    pub level3: Vec<String>,
    /// Authored names that matched a published node, in authoring order
    #[serde(skip)]
    pub matched: Vec<String>,
}

impl ResolvedPaperTags {
    /// Empty labels for a paper and domain
    #[must_use]
    pub fn new(paper_id: impl Into<String>, domain: Domain) -> Self {
        Self {
            paper_id: paper_id.into(),
            domain,
            level1: IndexSet::new(),
            level2: IndexSet::new(),
            level3: Vec::new(),
            matched: Vec::new(),
        }
    }

    /// Labels at one level, in their stored order
    #[must_use]
    pub fn labels_at(&self, level: TagLevel) -> Vec<&str> {
        match level {
            TagLevel::L1 => self.level1.iter().map(String::as_str).collect(),
            TagLevel::L2 => self.level2.iter().map(String::as_str).collect(),
            TagLevel::L3 => self.level3.iter().map(String::as_str).collect(),
        }
    }

    /// Whether no authored name matched
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }

    fn insert(&mut self, level: TagLevel, label: &str) {
        match level {
            TagLevel::L1 => {
                self.level1.insert(label.to_string());
            }
            TagLevel::L2 => {
                self.level2.insert(label.to_string());
            }
            TagLevel::L3 => self.level3.push(label.to_string()),
        }
    }
}

/// A paper with labels for every domain where at least one name matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaper {
    /// Paper id
    pub id: String,
    /// Domain -> labels, in [`Domain::ALL`] order
    pub tags: IndexMap<Domain, ResolvedPaperTags>,
    /// Authored names with no match, per domain
    pub dropped: IndexMap<Domain, usize>,
}

impl ResolvedPaper {
    /// Labels of a domain, if any matched
    #[inline]
    #[must_use]
    pub fn domain(&self, domain: Domain) -> Option<&ResolvedPaperTags> {
        self.tags.get(&domain)
    }
}

/// Totals over a resolved corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveStats {
    /// Papers resolved
    pub papers: usize,
    /// Authored names that matched
    pub matched: usize,
    /// Authored names dropped, per domain
    pub dropped: IndexMap<Domain, usize>,
}

impl ResolveStats {
    /// Dropped names across all domains
    #[must_use]
    pub fn total_dropped(&self) -> usize {
        self.dropped.values().sum()
    }
}

/// Resolves authored leaf names against a taxonomy
#[derive(Debug, Clone, Copy)]
pub struct TagResolver<'t> {
    taxonomy: &'t Taxonomy,
}

impl<'t> TagResolver<'t> {
    /// Create resolver over a taxonomy
    #[inline]
    #[must_use]
    pub fn new(taxonomy: &'t Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// Resolve names for one domain; returns labels and the number dropped
    ///
    /// A name matching a level-1 or level-2 node contributes that node and
    /// its ancestors at their own levels, never to level 3.
    #[must_use]
    pub fn resolve_domain(
        &self,
        paper_id: &str,
        domain: Domain,
        names: &[&str],
    ) -> (ResolvedPaperTags, usize) {
        let mut resolved = ResolvedPaperTags::new(paper_id, domain);
        let mut dropped = 0;

        for &name in names {
            let Some(node) = self.taxonomy.lookup_by_display_name(domain, name) else {
                tracing::debug!(paper = paper_id, %domain, name, "dropping unmatched tag");
                dropped += 1;
                continue;
            };
            let Some(level) = node.display_level else {
                dropped += 1;
                continue;
            };

            for ancestor in self.taxonomy.ancestors_of(node.id.as_str()) {
                if let Some(ancestor_level) = ancestor.display_level {
                    resolved.insert(ancestor_level, &ancestor.display_name);
                }
            }
            resolved.insert(level, &node.display_name);
            resolved.matched.push(node.display_name.clone());
        }

        (resolved, dropped)
    }

    /// Resolve every domain of a paper
    #[must_use]
    pub fn resolve(&self, paper: &Paper) -> ResolvedPaper {
        let mut tags = IndexMap::new();
        let mut dropped = IndexMap::new();

        for domain in Domain::ALL {
            let names = paper.tags_for(domain);
            if names.is_empty() {
                continue;
            }

            let (resolved, missing) = self.resolve_domain(&paper.id, domain, &names);
            if missing > 0 {
                dropped.insert(domain, missing);
            }
            if !resolved.is_empty() {
                tags.insert(domain, resolved);
            }
        }

        ResolvedPaper {
            id: paper.id.clone(),
            tags,
            dropped,
        }
    }

    /// Resolve a corpus in order
    #[must_use]
    pub fn resolve_all(&self, papers: &[Paper]) -> (Vec<ResolvedPaper>, ResolveStats) {
        let mut stats = ResolveStats::default();
        let resolved: Vec<ResolvedPaper> = papers
            .iter()
            .map(|paper| {
                let resolved = self.resolve(paper);
                stats.papers += 1;
                stats.matched += resolved.tags.values().map(|t| t.matched.len()).sum::<usize>();
                for (&domain, &count) in &resolved.dropped {
                    *stats.dropped.entry(domain).or_default() += count;
                }
                resolved
            })
            .collect();

        tracing::info!(
            papers = stats.papers,
            matched = stats.matched,
            dropped = stats.total_dropped(),
            "resolved paper tags"
        );
        (resolved, stats)
    }
}
