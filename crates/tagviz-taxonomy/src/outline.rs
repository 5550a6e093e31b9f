//! Outline parser
//!
//! Turns an indentation-structured taxonomy document into a flat table of
//! [`RawNode`]s with parent/child links.
//!
//! # Format
//!
//! ```text
//! # **Platform**                 <- heading: opens a section
//! - ContentForm                  <- platform only: selects the sub-mode tree
//!     - Social Media             <- bullets; depth = leading width / indent unit
//!         - Microblog
//!             - Weibo
//! # **ResearchContent**
//! - User Groups
//!     - Demographics
//!         - Age
//! ```
//!
//! Parsing is lenient: unknown sections are skipped, over-indented bullets
//! are clamped to the nearest enclosing depth, colliding ids get a numeric
//! suffix. Nothing here returns an error; problems are counted in
//! [`OutlineDiagnostics`].

use crate::domain::{Domain, PlatformMode, SectionKind};
use crate::error::{TaxonomyError, TaxonomyResult};
use crate::node::{RawNode, TagId};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// `**title**` anywhere in a heading
static HEADING_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("heading pattern is valid"));

/// `**name**` at the start of a bullet
static BULLET_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*\*(.+?)\*\*").expect("bullet pattern is valid"));

/// Parser options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineOptions {
    /// Width of one indentation level, in spaces (a tab counts as one level)
    pub indent_unit: usize,
    /// Separator between path segments in generated ids
    pub id_separator: String,
    /// Heading title → section it opens
    pub sections: IndexMap<String, SectionKind>,
    /// Platform first-level bullet text → sub-mode it selects
    pub platform_modes: IndexMap<String, PlatformMode>,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        let sections = [
            ("研究涉及平台", SectionKind::Platform),
            ("研究内容", SectionKind::Research(Domain::ResearchContent)),
            ("研究方法", SectionKind::Research(Domain::ResearchMethod)),
        ]
        .into_iter()
        .map(|(alias, kind)| (alias.to_string(), kind))
        .collect();

        let platform_modes = [
            ("内容形式", PlatformMode::ContentForm),
            ("平台属性", PlatformMode::Attribute),
        ]
        .into_iter()
        .map(|(alias, mode)| (alias.to_string(), mode))
        .collect();

        Self {
            indent_unit: 4,
            id_separator: "-".to_string(),
            sections,
            platform_modes,
        }
    }
}

impl OutlineOptions {
    /// With a different indentation width
    #[inline]
    #[must_use]
    pub fn with_indent_unit(mut self, indent_unit: usize) -> Self {
        self.indent_unit = indent_unit;
        self
    }

    /// With an extra heading alias
    #[must_use]
    pub fn with_section(mut self, alias: impl Into<String>, kind: SectionKind) -> Self {
        self.sections.insert(alias.into(), kind);
        self
    }

    /// With an extra sub-mode alias
    #[must_use]
    pub fn with_platform_mode(mut self, alias: impl Into<String>, mode: PlatformMode) -> Self {
        self.platform_modes.insert(alias.into(), mode);
        self
    }

    /// Check the options are usable
    ///
    /// # Errors
    /// Returns error for a zero indent unit or a blank / whitespace separator
    pub fn validate(&self) -> TaxonomyResult<()> {
        if self.indent_unit == 0 {
            return Err(TaxonomyError::invalid_options("indent unit must be positive"));
        }
        if self.id_separator.is_empty() || self.id_separator.chars().any(char::is_whitespace) {
            return Err(TaxonomyError::invalid_options(
                "id separator must be non-empty and contain no whitespace",
            ));
        }
        Ok(())
    }

    /// Section opened by a heading title; canonical names always work
    fn section_for(&self, title: &str) -> Option<SectionKind> {
        self.sections
            .get(title)
            .copied()
            .or_else(|| title.parse().ok())
    }

    /// Sub-mode selected by a platform bullet; canonical names always work
    fn mode_for(&self, label: &str) -> Option<PlatformMode> {
        self.platform_modes
            .get(label)
            .copied()
            .or_else(|| label.parse().ok())
    }
}

/// Counters for everything the lenient parser smoothed over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineDiagnostics {
    /// Heading lines seen
    pub headings: usize,
    /// Bullets accepted as tags or sub-mode selectors
    pub bullets: usize,
    /// Bullets indented deeper than one level below their predecessor
    pub clamped_bullets: usize,
    /// Ids that collided and received a suffix
    pub renamed_ids: usize,
    /// Unknown headings and unknown platform sub-modes
    pub skipped_sections: usize,
    /// Lines dropped: bullets in skipped sections or outside any section,
    /// and lines that are neither headings nor bullets
    pub skipped_lines: usize,
}

/// Parser output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOutline {
    /// Nodes in document order (roots included)
    pub nodes: Vec<RawNode>,
    /// What was smoothed over
    pub diagnostics: OutlineDiagnostics,
}

/// Classified input line
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Blank,
    Heading(String),
    Bullet { depth: usize, name: String },
    Other,
}

/// Section currently open
#[derive(Debug, Clone, Copy)]
enum Section {
    /// Before the first heading
    Outside,
    /// Under an unknown heading
    Skipped,
    /// Research section, with its root node
    Research { root: usize },
    /// Platform section, with the selected sub-mode tree root (if any)
    Platform { tree: Option<usize> },
}

/// Outline parser
#[derive(Debug, Clone, Default)]
pub struct OutlineParser {
    options: OutlineOptions,
}

impl OutlineParser {
    /// Create parser with the given options
    ///
    /// # Errors
    /// Returns error if the options fail [`OutlineOptions::validate`]
    pub fn new(options: OutlineOptions) -> TaxonomyResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Parser options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &OutlineOptions {
        &self.options
    }

    /// Parse an outline document
    #[must_use]
    pub fn parse(&self, text: &str) -> ParsedOutline {
        let mut builder = TreeBuilder::new(&self.options);
        let mut section = Section::Outside;
        let mut stack: Vec<usize> = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            match self.classify(line) {
                Line::Blank => {}
                Line::Other => {
                    tracing::debug!(line = line_no + 1, "ignoring unrecognized outline line");
                    builder.diagnostics.skipped_lines += 1;
                }
                Line::Heading(title) => {
                    builder.diagnostics.headings += 1;
                    stack.clear();
                    section = match self.options.section_for(&title) {
                        Some(SectionKind::Research(domain)) => Section::Research {
                            root: builder.open_root(domain, &title, false),
                        },
                        Some(SectionKind::Platform) => Section::Platform { tree: None },
                        None => {
                            tracing::warn!(line = line_no + 1, %title, "skipping unknown outline section");
                            builder.diagnostics.skipped_sections += 1;
                            Section::Skipped
                        }
                    };
                }
                Line::Bullet { depth, name } => match section {
                    Section::Outside | Section::Skipped => {
                        builder.diagnostics.skipped_lines += 1;
                    }
                    Section::Research { root } => {
                        builder.attach(root, depth, &name, &mut stack);
                    }
                    Section::Platform { .. } if depth == 0 => {
                        stack.clear();
                        let selected = match self.options.mode_for(&name) {
                            Some(mode) => {
                                builder.diagnostics.bullets += 1;
                                Some(builder.open_root(mode.domain(), &name, true))
                            }
                            None => {
                                tracing::warn!(line = line_no + 1, %name, "skipping unknown platform sub-mode");
                                builder.diagnostics.skipped_sections += 1;
                                None
                            }
                        };
                        section = Section::Platform { tree: selected };
                    }
                    Section::Platform { tree: Some(root) } => {
                        builder.attach(root, depth - 1, &name, &mut stack);
                    }
                    Section::Platform { tree: None } => {
                        builder.diagnostics.skipped_lines += 1;
                    }
                },
            }
        }

        let parsed = builder.finish();
        tracing::info!(
            nodes = parsed.nodes.len(),
            headings = parsed.diagnostics.headings,
            clamped = parsed.diagnostics.clamped_bullets,
            renamed = parsed.diagnostics.renamed_ids,
            skipped = parsed.diagnostics.skipped_lines,
            "parsed taxonomy outline"
        );
        parsed
    }

    /// Classify a single line
    fn classify(&self, line: &str) -> Line {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Line::Blank;
        }

        if let Some(rest) = trimmed.strip_prefix('#') {
            let rest = rest.trim_start_matches('#').trim();
            let title = HEADING_EMPHASIS
                .captures(rest)
                .and_then(|caps| caps.get(1))
                .map_or(rest, |m| m.as_str())
                .trim();
            return if title.is_empty() {
                Line::Other
            } else {
                Line::Heading(title.to_string())
            };
        }

        if let Some(rest) = trimmed.strip_prefix('-') {
            let rest = rest.trim();
            // `---` rules and bare dashes are not items
            if rest.is_empty() || rest.chars().all(|c| c == '-') {
                return Line::Other;
            }
            let name = BULLET_EMPHASIS
                .captures(rest)
                .and_then(|caps| caps.get(1))
                .map_or(rest, |m| m.as_str())
                .trim();
            if name.is_empty() {
                return Line::Other;
            }
            return Line::Bullet {
                depth: self.leading_width(line) / self.options.indent_unit,
                name: name.to_string(),
            };
        }

        Line::Other
    }

    /// Width of leading whitespace in spaces; a tab is one indent unit
    fn leading_width(&self, line: &str) -> usize {
        line.chars()
            .take_while(|c| c.is_whitespace())
            .map(|c| if c == '\t' { self.options.indent_unit } else { 1 })
            .sum()
    }
}

/// Convenience: parse with validated options
///
/// # Errors
/// Returns error if the options are invalid
pub fn parse_outline(text: &str, options: &OutlineOptions) -> TaxonomyResult<ParsedOutline> {
    Ok(OutlineParser::new(options.clone())?.parse(text))
}

/// Accumulates nodes and guarantees id uniqueness
struct TreeBuilder<'o> {
    options: &'o OutlineOptions,
    nodes: Vec<RawNode>,
    ids: HashMap<TagId, usize>,
    roots: HashMap<Domain, usize>,
    /// Roots left out of their children's ids
    bare_roots: HashSet<usize>,
    diagnostics: OutlineDiagnostics,
}

impl<'o> TreeBuilder<'o> {
    fn new(options: &'o OutlineOptions) -> Self {
        Self {
            options,
            nodes: Vec::new(),
            ids: HashMap::new(),
            roots: HashMap::new(),
            bare_roots: HashSet::new(),
            diagnostics: OutlineDiagnostics::default(),
        }
    }

    /// Root of a domain tree; a repeated heading reopens the existing root
    ///
    /// Research headings are structural only: their bullets start fresh
    /// ids, while a platform sub-mode prefixes the ids below it.
    fn open_root(&mut self, domain: Domain, name: &str, in_child_ids: bool) -> usize {
        if let Some(&root) = self.roots.get(&domain) {
            return root;
        }

        let id = self.unique_id(TagId::root(name));
        let position = self.push(RawNode {
            id,
            name: name.to_string(),
            domain,
            raw_level: domain.scheme().root_raw_level(),
            parent: None,
            children: Vec::new(),
        });
        self.roots.insert(domain, position);
        if !in_child_ids {
            self.bare_roots.insert(position);
        }
        position
    }

    /// Attach a bullet at `depth` below `root`, maintaining the open stack
    fn attach(&mut self, root: usize, depth: usize, name: &str, stack: &mut Vec<usize>) {
        if depth > stack.len() {
            tracing::debug!(%name, depth, open = stack.len(), "clamping over-indented bullet");
            self.diagnostics.clamped_bullets += 1;
        }
        stack.truncate(depth);

        let parent = stack.last().copied().unwrap_or(root);
        let child = self.push_child(parent, name);
        self.diagnostics.bullets += 1;
        stack.push(child);
    }

    fn push_child(&mut self, parent: usize, name: &str) -> usize {
        let (candidate, domain, raw_level) = {
            let bare = self.bare_roots.contains(&parent);
            let parent = &self.nodes[parent];
            (
                if bare {
                    TagId::root(name)
                } else {
                    parent.id.child(name, &self.options.id_separator)
                },
                parent.domain,
                parent.raw_level.saturating_add(1),
            )
        };

        let id = self.unique_id(candidate);
        let parent_id = self.nodes[parent].id.clone();
        self.nodes[parent].children.push(id.clone());
        self.push(RawNode {
            id,
            name: name.to_string(),
            domain,
            raw_level,
            parent: Some(parent_id),
            children: Vec::new(),
        })
    }

    fn push(&mut self, node: RawNode) -> usize {
        let position = self.nodes.len();
        self.ids.insert(node.id.clone(), position);
        self.nodes.push(node);
        position
    }

    fn unique_id(&mut self, candidate: TagId) -> TagId {
        if !self.ids.contains_key(&candidate) {
            return candidate;
        }

        let mut n = 2;
        loop {
            let renamed = candidate.with_suffix(n);
            if !self.ids.contains_key(&renamed) {
                tracing::warn!(id = %candidate, renamed = %renamed, "disambiguating colliding tag id");
                self.diagnostics.renamed_ids += 1;
                return renamed;
            }
            n += 1;
        }
    }

    fn finish(self) -> ParsedOutline {
        ParsedOutline {
            nodes: self.nodes,
            diagnostics: self.diagnostics,
        }
    }
}
