use super::Artifact;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tagviz_taxonomy::{PlatformMode, TagLevel, Taxonomy};

/// A level-2 platform group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformEntry {
    /// Group id (its display name)
    pub id: String,
    /// Group display name
    pub name: String,
}

/// Two-level display hierarchy of one sub-mode: groups and their platforms
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformHierarchy {
    /// Level-2 groups sorted by name
    pub l1: Vec<PlatformEntry>,
    /// Group name -> sorted level-3 platform names (only non-empty)
    pub l2: IndexMap<String, Vec<String>>,
}

/// One platform sub-mode as offered by the visualization's switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformType {
    /// Stable id
    pub id: &'static str,
    /// Label of the switch option
    pub display_name: &'static str,
    /// Whether this sub-mode is shown first
    pub active: bool,
    /// Groups and platforms
    pub hierarchy: PlatformHierarchy,
}

/// `platformConfiguration.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfiguration {
    /// Sub-mode name -> type; only sub-modes with published nodes
    pub platform_types: IndexMap<String, PlatformType>,
    /// `A_to_B` -> group in A -> groups in B sharing a platform
    pub switch_mapping: IndexMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl PlatformConfiguration {
    /// Build both sub-mode hierarchies and the switch mapping between them
    #[must_use]
    pub fn from_taxonomy(taxonomy: &Taxonomy) -> Self {
        let mut config = Self::default();
        let mut parents: HashMap<PlatformMode, HashMap<String, String>> = HashMap::new();

        for mode in PlatformMode::ALL {
            let domain = mode.domain();
            if taxonomy.published_in(domain).next().is_none() {
                tracing::debug!(%domain, "no platform tree for sub-mode");
                continue;
            }

            let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
            let leaf_parents = parents.entry(mode).or_default();
            for group in taxonomy.nodes_at(domain, TagLevel::L2) {
                let platforms = groups.entry(group.display_name.clone()).or_default();
                for platform in taxonomy.children_of(group.id.as_str()) {
                    platforms.insert(platform.display_name.clone());
                    leaf_parents.insert(platform.display_name.clone(), group.display_name.clone());
                }
            }

            let hierarchy = PlatformHierarchy {
                l1: groups
                    .keys()
                    .map(|name| PlatformEntry {
                        id: name.clone(),
                        name: name.clone(),
                    })
                    .collect(),
                l2: groups
                    .into_iter()
                    .filter(|(_, platforms)| !platforms.is_empty())
                    .map(|(name, platforms)| (name, platforms.into_iter().collect()))
                    .collect(),
            };

            let (id, display_name) = match mode {
                PlatformMode::ContentForm => ("content-form", "By content form"),
                PlatformMode::Attribute => ("platform-attribute", "By platform attribute"),
            };
            config.platform_types.insert(
                mode.as_str().to_string(),
                PlatformType {
                    id,
                    display_name,
                    active: mode == PlatformMode::ContentForm,
                    hierarchy,
                },
            );
        }

        for mode in PlatformMode::ALL {
            let other = mode.other();
            let mut mapping: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
            if let (Some(from), Some(to)) = (parents.get(&mode), parents.get(&other)) {
                for (platform, group) in from {
                    if let Some(other_group) = to.get(platform) {
                        mapping
                            .entry(group.clone())
                            .or_default()
                            .insert(other_group.clone());
                    }
                }
            }
            config
                .switch_mapping
                .insert(format!("{}_to_{}", mode.as_str(), other.as_str()), mapping);
        }

        config
    }
}

impl Artifact for PlatformConfiguration {
    const NAME: &'static str = "platform configuration";
    const FILE_NAME: &'static str = "platformConfiguration.json";
}
