use super::Artifact;
use indexmap::IndexMap;
use serde::Serialize;
use tagviz_taxonomy::{Domain, TagId, TagLevel, Taxonomy};

/// Level links of one domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainHierarchy {
    /// Level-1 id -> level-2 child ids (only non-empty)
    pub l1_to_l2: IndexMap<TagId, Vec<TagId>>,
    /// Level-2 id -> level-3 child display names (only non-empty)
    pub l2_to_l3: IndexMap<TagId, Vec<String>>,
    /// Level-3 display name -> level-2 parent id
    pub l3_to_l2: IndexMap<String, TagId>,
    /// Level-2 id -> level-1 parent id
    pub l2_to_l1: IndexMap<TagId, TagId>,
}

/// `hierarchyMapping.json`: every domain, present even when empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HierarchyMapping {
    domains: IndexMap<Domain, DomainHierarchy>,
}

impl HierarchyMapping {
    /// Walk each domain's published tree top-down
    #[must_use]
    pub fn from_taxonomy(taxonomy: &Taxonomy) -> Self {
        let domains = Domain::ALL
            .into_iter()
            .map(|domain| (domain, Self::domain(taxonomy, domain)))
            .collect();
        Self { domains }
    }

    /// Links of one domain
    #[must_use]
    pub fn get(&self, domain: Domain) -> Option<&DomainHierarchy> {
        self.domains.get(&domain)
    }

    fn domain(taxonomy: &Taxonomy, domain: Domain) -> DomainHierarchy {
        let mut hierarchy = DomainHierarchy::default();

        for l1 in taxonomy.nodes_at(domain, TagLevel::L1) {
            let l2_children = taxonomy.children_of(l1.id.as_str());
            if !l2_children.is_empty() {
                hierarchy
                    .l1_to_l2
                    .insert(l1.id.clone(), l2_children.iter().map(|n| n.id.clone()).collect());
            }

            for l2 in l2_children {
                hierarchy.l2_to_l1.insert(l2.id.clone(), l1.id.clone());

                let mut names = Vec::new();
                for l3 in taxonomy.children_of(l2.id.as_str()) {
                    hierarchy
                        .l3_to_l2
                        .insert(l3.display_name.clone(), l2.id.clone());
                    names.push(l3.display_name.clone());
                }
                if !names.is_empty() {
                    hierarchy.l2_to_l3.insert(l2.id.clone(), names);
                }
            }
        }

        hierarchy
    }
}

impl Artifact for HierarchyMapping {
    const NAME: &'static str = "hierarchy mapping";
    const FILE_NAME: &'static str = "hierarchyMapping.json";
}
