//! Serializable view of the published taxonomy (`taxonomy.json`)

use crate::domain::Domain;
use crate::index::Taxonomy;
use crate::level::TagLevel;
use crate::node::{TagId, TagNode};
use indexmap::IndexMap;
use serde::Serialize;

/// Published node as emitted to the visualization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedNode {
    /// Unique identifier
    pub id: TagId,
    /// Display name
    pub name: String,
    /// Display level, 1..=3
    pub level: u8,
    /// Owning domain
    pub category: Domain,
    /// Parent id; `null` at level 1
    pub parent_id: Option<TagId>,
    /// Published children in authoring order
    pub children_ids: Vec<TagId>,
}

impl PublishedNode {
    /// View of a published node; `None` for hidden nodes
    #[must_use]
    pub fn from_node(taxonomy: &Taxonomy, node: &TagNode) -> Option<Self> {
        let level = node.display_level?;
        let parent_id = match level {
            TagLevel::L1 => None,
            TagLevel::L2 | TagLevel::L3 => node.parent.clone(),
        };

        Some(Self {
            id: node.id.clone(),
            name: node.display_name.clone(),
            level: level.number(),
            category: node.domain,
            parent_id,
            children_ids: taxonomy
                .children_of(node.id.as_str())
                .into_iter()
                .map(|child| child.id.clone())
                .collect(),
        })
    }
}

/// Document written to `taxonomy.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyExport {
    /// Published nodes in document order
    pub nodes: Vec<PublishedNode>,
    /// Per domain: level-3 display name -> id
    #[serde(rename = "l3TagToIdMap")]
    pub l3_tag_to_id_map: IndexMap<Domain, IndexMap<String, TagId>>,
    /// id -> node
    pub all_tags_by_id: IndexMap<TagId, PublishedNode>,
}

impl TaxonomyExport {
    /// Collect the published view of a taxonomy
    #[must_use]
    pub fn from_taxonomy(taxonomy: &Taxonomy) -> Self {
        let nodes: Vec<PublishedNode> = taxonomy
            .published()
            .filter_map(|node| PublishedNode::from_node(taxonomy, node))
            .collect();

        let l3_tag_to_id_map = Domain::ALL
            .into_iter()
            .filter_map(|domain| {
                let leaves: IndexMap<String, TagId> = taxonomy
                    .leaf_names(domain)
                    .into_iter()
                    .map(|(name, id)| (name.to_string(), id.clone()))
                    .collect();
                (!leaves.is_empty()).then_some((domain, leaves))
            })
            .collect();

        let all_tags_by_id = nodes
            .iter()
            .map(|node| (node.id.clone(), node.clone()))
            .collect();

        Self {
            nodes,
            l3_tag_to_id_map,
            all_tags_by_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::OutlineOptions;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const OUTLINE: &str = "\
# **ResearchMethod**
- Quantitative
    - Experiment
        - Field Study
            - Hidden
";

    #[test]
    fn export_shape() {
        let taxonomy = Taxonomy::from_outline(OUTLINE, &OutlineOptions::default()).unwrap();
        let export = TaxonomyExport::from_taxonomy(&taxonomy);

        assert_eq!(export.nodes.len(), 3);
        assert_eq!(export.all_tags_by_id.len(), 3);

        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(
            value["nodes"][0],
            json!({
                "id": "Quantitative",
                "name": "Quantitative",
                "level": 1,
                "category": "ResearchMethod",
                "parentId": null,
                "childrenIds": ["Quantitative-Experiment"]
            })
        );
        assert_eq!(
            value["nodes"][2]["childrenIds"],
            json!([]),
            "hidden children are not published"
        );
        assert_eq!(
            value["l3TagToIdMap"],
            json!({
                "ResearchMethod": {
                    "Field Study": "Quantitative-Experiment-Field_Study"
                }
            })
        );
    }
}
