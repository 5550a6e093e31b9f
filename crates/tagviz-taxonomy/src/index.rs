//! Taxonomy index
//!
//! [`Taxonomy`] owns every normalized node and answers the lookups the
//! resolver and the artifact builders need. It is immutable after
//! [`Taxonomy::build`].
//!
//! Hidden nodes (domain roots and anything deeper than level 3) stay in the
//! node table so parent chains remain intact, but no public lookup returns
//! them.

use crate::domain::Domain;
use crate::error::TaxonomyResult;
use crate::level::{normalize, TagLevel};
use crate::node::{TagId, TagNode};
use crate::outline::{OutlineDiagnostics, OutlineOptions, OutlineParser};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Immutable index over a normalized tag hierarchy
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    /// All nodes in document order, hidden ones included
    nodes: Vec<TagNode>,
    /// id -> position in `nodes`
    by_id: HashMap<TagId, usize>,
    /// domain -> display name -> position of the last published node
    by_name: HashMap<Domain, IndexMap<String, usize>>,
    /// (domain, level) -> positions in document order
    by_level: HashMap<(Domain, TagLevel), Vec<usize>>,
    /// Published display names registered more than once in a domain
    duplicate_names: usize,
    /// Diagnostics of the parse this taxonomy came from
    outline: OutlineDiagnostics,
}

impl Taxonomy {
    /// Build index from normalized nodes
    ///
    /// Total: duplicate display names resolve last-registered-wins and are
    /// counted, never rejected.
    #[must_use]
    pub fn build(nodes: Vec<TagNode>) -> Self {
        let mut by_id = HashMap::with_capacity(nodes.len());
        let mut by_name: HashMap<Domain, IndexMap<String, usize>> = HashMap::new();
        let mut by_level: HashMap<(Domain, TagLevel), Vec<usize>> = HashMap::new();
        let mut duplicate_names = 0;

        for (position, node) in nodes.iter().enumerate() {
            by_id.insert(node.id.clone(), position);

            let Some(level) = node.display_level else {
                continue;
            };

            by_level.entry((node.domain, level)).or_default().push(position);

            let names = by_name.entry(node.domain).or_default();
            if let Some(previous) = names.insert(node.display_name.clone(), position) {
                duplicate_names += 1;
                tracing::debug!(
                    domain = %node.domain,
                    name = %node.display_name,
                    replaced = %nodes[previous].id,
                    by = %node.id,
                    "duplicate display name, keeping last"
                );
            }
        }

        if duplicate_names > 0 {
            tracing::warn!(duplicate_names, "taxonomy has duplicate display names");
        }

        Self {
            nodes,
            by_id,
            by_name,
            by_level,
            duplicate_names,
            outline: OutlineDiagnostics::default(),
        }
    }

    /// Parse, normalize and index an outline document
    ///
    /// # Errors
    /// Returns error if the parser options are invalid
    pub fn from_outline(text: &str, options: &OutlineOptions) -> TaxonomyResult<Self> {
        let parsed = OutlineParser::new(options.clone())?.parse(text);
        let mut taxonomy = Self::build(normalize(parsed.nodes));
        taxonomy.outline = parsed.diagnostics;
        Ok(taxonomy)
    }

    /// Published node by id
    #[must_use]
    pub fn lookup_by_id(&self, id: &str) -> Option<&TagNode> {
        self.node(id).filter(|node| node.is_published())
    }

    /// Published node by display name within a domain (last registered wins)
    #[must_use]
    pub fn lookup_by_display_name(&self, domain: Domain, name: &str) -> Option<&TagNode> {
        self.by_name
            .get(&domain)
            .and_then(|names| names.get(name))
            .map(|&position| &self.nodes[position])
    }

    /// Published ancestors of a node, immediate parent first, ending at the
    /// level-1 ancestor
    ///
    /// Empty for level-1 nodes and unknown ids.
    #[must_use]
    pub fn ancestors_of(&self, id: &str) -> Vec<&TagNode> {
        let mut ancestors = Vec::new();
        let Some(mut current) = self.node(id) else {
            return ancestors;
        };

        let mut seen = HashSet::new();
        seen.insert(&current.id);

        while current.display_level != Some(TagLevel::L1) {
            let Some(parent) = current.parent.as_ref().and_then(|p| self.node(p.as_str())) else {
                break;
            };
            if !seen.insert(&parent.id) {
                tracing::warn!(id = %parent.id, "cycle in parent chain");
                break;
            }
            if parent.is_published() {
                ancestors.push(parent);
            }
            current = parent;
        }

        ancestors
    }

    /// Published nodes of a domain at a level, in document order
    #[must_use]
    pub fn nodes_at(&self, domain: Domain, level: TagLevel) -> Vec<&TagNode> {
        self.by_level
            .get(&(domain, level))
            .map(|positions| positions.iter().map(|&p| &self.nodes[p]).collect())
            .unwrap_or_default()
    }

    /// Published children of a node, in authoring order
    #[must_use]
    pub fn children_of(&self, id: &str) -> Vec<&TagNode> {
        self.node(id)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|child| self.lookup_by_id(child.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Level-3 display name -> id for one domain, in document order
    #[must_use]
    pub fn leaf_names(&self, domain: Domain) -> IndexMap<&str, &TagId> {
        self.nodes_at(domain, TagLevel::L3)
            .into_iter()
            .map(|node| (node.display_name.as_str(), &node.id))
            .collect()
    }

    /// Published nodes in document order
    pub fn published(&self) -> impl Iterator<Item = &TagNode> {
        self.nodes.iter().filter(|node| node.is_published())
    }

    /// Published nodes of one domain in document order
    pub fn published_in(&self, domain: Domain) -> impl Iterator<Item = &TagNode> {
        self.published().filter(move |node| node.domain == domain)
    }

    /// Every node, hidden ones included
    #[inline]
    #[must_use]
    pub fn all_nodes(&self) -> &[TagNode] {
        &self.nodes
    }

    /// Number of display-name registrations that replaced an earlier one
    #[inline]
    #[must_use]
    pub fn duplicate_display_names(&self) -> usize {
        self.duplicate_names
    }

    /// Diagnostics of the outline parse, zeroed when built from nodes
    #[inline]
    #[must_use]
    pub fn outline_diagnostics(&self) -> &OutlineDiagnostics {
        &self.outline
    }

    /// Number of published nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_level.values().map(Vec::len).sum()
    }

    /// Whether no node is published
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn node(&self, id: &str) -> Option<&TagNode> {
        self.by_id.get(id).map(|&position| &self.nodes[position])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const OUTLINE: &str = "\
# **Platform**
- ContentForm
    - Social
        - Microblog
            - Weibo
            - Twitter
                - Too Deep
# **ResearchContent**
- Users
    - Demographics
        - Age
- Spread
    - Rumors
        - Age
";

    fn taxonomy() -> Taxonomy {
        Taxonomy::from_outline(OUTLINE, &OutlineOptions::default()).unwrap()
    }

    fn names(nodes: &[&TagNode]) -> Vec<String> {
        nodes.iter().map(|n| n.display_name.clone()).collect()
    }

    #[test]
    fn hidden_nodes_are_not_looked_up() {
        let taxonomy = taxonomy();
        assert!(taxonomy.lookup_by_id("ContentForm").is_none());
        assert!(taxonomy.lookup_by_id("ResearchContent").is_none());
        assert!(taxonomy
            .lookup_by_id("ContentForm-Social-Microblog-Twitter-Too_Deep")
            .is_none());
        assert!(taxonomy.lookup_by_id("ContentForm-Social").is_some());
        assert_eq!(taxonomy.all_nodes().len(), 13);
        assert_eq!(taxonomy.len(), 10);
    }

    #[test]
    fn display_levels_per_scheme() {
        let taxonomy = taxonomy();
        let weibo = taxonomy
            .lookup_by_display_name(Domain::PlatformContentForm, "Weibo")
            .unwrap();
        assert_eq!(weibo.display_level, Some(TagLevel::L3));

        let users = taxonomy
            .lookup_by_display_name(Domain::ResearchContent, "Users")
            .unwrap();
        assert_eq!(users.display_level, Some(TagLevel::L1));
    }

    #[test]
    fn ancestors_end_at_level_one() {
        let taxonomy = taxonomy();
        let ancestors = taxonomy.ancestors_of("ContentForm-Social-Microblog-Weibo");
        assert_eq!(names(&ancestors), vec!["Microblog", "Social"]);
        assert!(taxonomy.ancestors_of("ContentForm-Social").is_empty());
        assert!(taxonomy.ancestors_of("missing").is_empty());
    }

    #[test]
    fn duplicate_names_resolve_to_last() {
        let taxonomy = taxonomy();
        assert_eq!(taxonomy.duplicate_display_names(), 1);

        let age = taxonomy
            .lookup_by_display_name(Domain::ResearchContent, "Age")
            .unwrap();
        assert_eq!(age.id.as_str(), "Spread-Rumors-Age");
    }

    #[test]
    fn lookups_are_scoped_by_domain() {
        let taxonomy = taxonomy();
        assert!(taxonomy
            .lookup_by_display_name(Domain::PlatformAttribute, "Weibo")
            .is_none());
        assert!(taxonomy
            .lookup_by_display_name(Domain::ResearchContent, "Weibo")
            .is_none());
    }

    #[test]
    fn level_and_child_queries() {
        let taxonomy = taxonomy();
        assert_eq!(
            names(&taxonomy.nodes_at(Domain::ResearchContent, TagLevel::L1)),
            vec!["Users", "Spread"]
        );
        assert_eq!(
            names(&taxonomy.children_of("ContentForm-Social-Microblog")),
            vec!["Weibo", "Twitter"]
        );
        assert!(taxonomy.children_of("ContentForm-Social-Microblog-Twitter").is_empty());

        let leaves = taxonomy.leaf_names(Domain::PlatformContentForm);
        assert_eq!(leaves.keys().copied().collect::<Vec<_>>(), vec!["Weibo", "Twitter"]);
    }

    #[test]
    fn outline_diagnostics_are_kept() {
        let taxonomy = taxonomy();
        assert_eq!(taxonomy.outline_diagnostics().headings, 2);
        assert_eq!(Taxonomy::build(Vec::new()).outline_diagnostics().headings, 0);
        assert!(Taxonomy::default().is_empty());
    }
}
