//! Tag identifiers and nodes

use crate::domain::Domain;
use crate::level::TagLevel;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};

/// Globally unique, path-derived tag identifier
///
/// Built from the sanitized display names on the path from the domain
/// root to the node, e.g. `Users-Demographics-Age`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(String);

impl TagId {
    /// Wrap an already-built identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier of a node directly under the document root
    #[inline]
    #[must_use]
    pub fn root(name: &str) -> Self {
        Self(sanitize_segment(name))
    }

    /// Identifier of a child of `self`
    #[must_use]
    pub fn child(&self, name: &str, separator: &str) -> Self {
        Self(format!("{}{}{}", self.0, separator, sanitize_segment(name)))
    }

    /// Identifier with a numeric disambiguation suffix
    #[must_use]
    pub fn with_suffix(&self, n: usize) -> Self {
        Self(format!("{}~{}", self.0, n))
    }

    /// Identifier text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TagId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TagId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TagId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Replace every whitespace character with `_`
#[must_use]
pub fn sanitize_segment(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Node as emitted by the outline parser, before level normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNode {
    /// Unique identifier
    pub id: TagId,
    /// Display name as authored
    pub name: String,
    /// Owning domain
    pub domain: Domain,
    /// Structural level; the domain root sits at its scheme's root level
    pub raw_level: u8,
    /// Parent node, `None` for domain roots
    pub parent: Option<TagId>,
    /// Children in authoring order
    pub children: Vec<TagId>,
}

/// Node with its normalized display level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
    /// Unique identifier
    pub id: TagId,
    /// Display name as authored
    pub display_name: String,
    /// Owning domain
    pub domain: Domain,
    /// Structural level from the parser
    pub raw_level: u8,
    /// Display level; `None` for hidden roots and over-deep nodes
    pub display_level: Option<TagLevel>,
    /// Parent node, `None` for domain roots
    pub parent: Option<TagId>,
    /// Children in authoring order (hidden ones included)
    pub children: Vec<TagId>,
}

impl TagNode {
    /// Combine a parsed node with its display level
    #[must_use]
    pub fn from_raw(raw: RawNode, display_level: Option<TagLevel>) -> Self {
        Self {
            id: raw.id,
            display_name: raw.name,
            domain: raw.domain,
            raw_level: raw.raw_level,
            display_level,
            parent: raw.parent,
            children: raw.children,
        }
    }

    /// Whether the node is part of the published taxonomy
    #[inline]
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.display_level.is_some()
    }

    /// Whether the node is a published level-3 leaf
    #[inline]
    #[must_use]
    pub fn is_leaf_level(&self) -> bool {
        self.display_level == Some(TagLevel::L3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_whitespace() {
        assert_eq!(sanitize_segment("Social Media"), "Social_Media");
        assert_eq!(sanitize_segment("  a\tb c "), "a_b_c");
        assert_eq!(sanitize_segment("图文 社交"), "图文_社交");
    }

    #[test]
    fn child_ids_extend_parent_path() {
        let root = TagId::root("Research Content");
        let child = root.child("User Groups", "-");
        assert_eq!(root.as_str(), "Research_Content");
        assert_eq!(child.as_str(), "Research_Content-User_Groups");
    }

    #[test]
    fn suffix_disambiguates() {
        let id = TagId::new("a-b");
        assert_eq!(id.with_suffix(2).as_str(), "a-b~2");
    }
}
