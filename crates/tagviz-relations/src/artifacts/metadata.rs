use super::{Artifact, ProcessedPapers};
use indexmap::IndexMap;
use serde::Serialize;
use tagviz_taxonomy::{Domain, TagId, TagLevel, Taxonomy};

/// Display metadata of one published node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadataEntry {
    /// Display level, 1..=3
    pub level: u8,
    /// Display name
    pub display_name: String,
    /// Human-readable origin of the node
    pub description: String,
    /// Published children; levels 1 and 2 only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TagId>,
    /// Parent id; absent at level 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<TagId>,
    /// Papers under this node, rolled up from level 3
    pub total_papers: usize,
}

/// `nodeMetadata.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NodeMetadata {
    domains: IndexMap<Domain, IndexMap<TagId, NodeMetadataEntry>>,
}

impl NodeMetadata {
    /// Describe every published node and roll paper totals up the tree
    ///
    /// A level-3 total counts level-3 occurrences of the node's display
    /// name across processed papers; level 2 and level 1 sum their
    /// children.
    #[must_use]
    pub fn build(taxonomy: &Taxonomy, processed: &ProcessedPapers) -> Self {
        let domains = Domain::ALL
            .into_iter()
            .map(|domain| {
                let counts = processed.level3_counts(domain);
                let mut entries: IndexMap<TagId, NodeMetadataEntry> = taxonomy
                    .published_in(domain)
                    .filter_map(|node| {
                        let level = node.display_level?;
                        let children = if level == TagLevel::L3 {
                            Vec::new()
                        } else {
                            taxonomy
                                .children_of(node.id.as_str())
                                .into_iter()
                                .map(|child| child.id.clone())
                                .collect()
                        };
                        let total_papers = if level == TagLevel::L3 {
                            counts.get(node.display_name.as_str()).copied().unwrap_or(0)
                        } else {
                            0
                        };

                        let entry = NodeMetadataEntry {
                            level: level.number(),
                            display_name: node.display_name.clone(),
                            description: format!("{domain} level {} ({})", level.number(), node.id),
                            children,
                            parent: (level != TagLevel::L1).then(|| node.parent.clone()).flatten(),
                            total_papers,
                        };
                        Some((node.id.clone(), entry))
                    })
                    .collect();

                roll_up(&mut entries);
                (domain, entries)
            })
            .collect();

        Self { domains }
    }

    /// Entry of a node
    #[must_use]
    pub fn get(&self, domain: Domain, id: &str) -> Option<&NodeMetadataEntry> {
        self.domains.get(&domain).and_then(|entries| entries.get(id))
    }
}

/// Fill level-2 then level-1 totals from their children
fn roll_up(entries: &mut IndexMap<TagId, NodeMetadataEntry>) {
    for level in [2u8, 1] {
        let totals: Vec<(usize, usize)> = entries
            .values()
            .enumerate()
            .filter(|(_, entry)| entry.level == level)
            .map(|(position, entry)| {
                let total = entry
                    .children
                    .iter()
                    .filter_map(|child| entries.get(child))
                    .filter(|child| child.level == level + 1)
                    .map(|child| child.total_papers)
                    .sum();
                (position, total)
            })
            .collect();

        for (position, total) in totals {
            if let Some((_, entry)) = entries.get_index_mut(position) {
                entry.total_papers = total;
            }
        }
    }
}

impl Artifact for NodeMetadata {
    const NAME: &'static str = "node metadata";
    const FILE_NAME: &'static str = "nodeMetadata.json";
}
