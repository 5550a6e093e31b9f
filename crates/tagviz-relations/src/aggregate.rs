//! Cross-domain co-occurrence aggregation
//!
//! For each of five domain pairs, every paper contributes its id to the
//! bucket `(pair, left level, right level)` under the label key
//! `"left__right"`, for every label it carries on each side.
//!
//! ```text
//! ResolvedPaper ──add_paper──▶ ConnectionAccumulator ──finalize──▶ ConnectionTable
//!                                   ▲        │
//!                                   └─merge──┘   (parallel chunks, corpus order)
//! ```
//!
//! Buckets, label keys and paper ids all keep first-seen order, so merging
//! contiguous chunks in corpus order reproduces the sequential result
//! exactly.

use crate::error::RelationsError;
use crate::resolve::{ResolvedPaper, ResolvedPaperTags};
use crate::strength::{ConnectionStrength, StrengthThresholds};
use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use tagviz_taxonomy::{Domain, TagLevel};

/// The five aggregated domain pairs, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PairType {
    /// Platform content form vs research content
    ContentFormContent,
    /// Platform content form vs research method
    ContentFormMethod,
    /// Research content vs research method
    ContentMethod,
    /// Platform attribute vs research content
    AttributeContent,
    /// Platform attribute vs research method
    AttributeMethod,
}

impl PairType {
    /// All pairs, in output order
    pub const ALL: [Self; 5] = [
        Self::ContentFormContent,
        Self::ContentFormMethod,
        Self::ContentMethod,
        Self::AttributeContent,
        Self::AttributeMethod,
    ];

    /// Left domain
    #[inline]
    #[must_use]
    pub fn left(self) -> Domain {
        match self {
            Self::ContentFormContent | Self::ContentFormMethod => Domain::PlatformContentForm,
            Self::ContentMethod => Domain::ResearchContent,
            Self::AttributeContent | Self::AttributeMethod => Domain::PlatformAttribute,
        }
    }

    /// Right domain
    #[inline]
    #[must_use]
    pub fn right(self) -> Domain {
        match self {
            Self::ContentFormContent | Self::AttributeContent => Domain::ResearchContent,
            Self::ContentFormMethod | Self::ContentMethod | Self::AttributeMethod => {
                Domain::ResearchMethod
            }
        }
    }

    /// Name used in configuration, `Left__Right`
    #[must_use]
    pub fn name(self) -> String {
        format!("{}__{}", self.left(), self.right())
    }

    /// Whether one side is a platform domain
    #[inline]
    #[must_use]
    pub fn has_platform_side(self) -> bool {
        self.left().is_platform()
    }

    /// Platform level handling when not configured
    #[inline]
    #[must_use]
    pub fn default_platform_levels(self) -> PlatformLevels {
        match self {
            Self::ContentFormContent | Self::ContentFormMethod | Self::AttributeContent => {
                PlatformLevels::Collapsed
            }
            Self::ContentMethod | Self::AttributeMethod => PlatformLevels::Resolved,
        }
    }
}

impl Display for PairType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}", self.left(), self.right())
    }
}

impl FromStr for PairType {
    type Err = RelationsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|pair| pair.name() == trimmed)
            .ok_or_else(|| RelationsError::UnknownPair(s.to_string()))
    }
}

/// How the platform side of a pair contributes labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformLevels {
    /// Matched platform names, deduplicated, all at level 1
    Collapsed,
    /// Resolved labels at their own levels
    Resolved,
}

/// Per-pair platform level handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairPolicy {
    levels: [PlatformLevels; 5],
}

impl PairPolicy {
    /// With one pair's handling replaced
    #[must_use]
    pub fn with(mut self, pair: PairType, levels: PlatformLevels) -> Self {
        self.levels[Self::slot(pair)] = levels;
        self
    }

    /// Handling for a pair
    #[inline]
    #[must_use]
    pub fn platform_levels(&self, pair: PairType) -> PlatformLevels {
        self.levels[Self::slot(pair)]
    }

    /// Whether the platform side of a pair is collapsed to level 1
    #[inline]
    #[must_use]
    pub fn collapses(&self, pair: PairType) -> bool {
        pair.has_platform_side() && self.platform_levels(pair) == PlatformLevels::Collapsed
    }

    fn slot(pair: PairType) -> usize {
        pair as usize
    }
}

impl Default for PairPolicy {
    fn default() -> Self {
        Self {
            levels: PairType::ALL.map(PairType::default_platform_levels),
        }
    }
}

/// Bucket identity: pair and the level on each side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketKey {
    /// Domain pair
    pub pair: PairType,
    /// Level of the left label
    pub left: TagLevel,
    /// Level of the right label
    pub right: TagLevel,
}

impl BucketKey {
    /// Create bucket key
    #[inline]
    #[must_use]
    pub fn new(pair: PairType, left: TagLevel, right: TagLevel) -> Self {
        Self { pair, left, right }
    }
}

impl Display for BucketKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}__{}_{}",
            self.pair.left(),
            self.left,
            self.pair.right(),
            self.right
        )
    }
}

impl Serialize for BucketKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Label key inside a bucket
#[inline]
#[must_use]
pub fn label_key(left: &str, right: &str) -> String {
    format!("{left}__{right}")
}

/// Finalized statistics of one label pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Number of distinct papers
    pub paper_count: usize,
    /// Distinct paper ids, first-seen order
    pub paper_ids: Vec<String>,
    /// Tier of `paper_count`
    pub connection_strength: ConnectionStrength,
}

/// Finalized buckets, first-seen order throughout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConnectionTable {
    buckets: IndexMap<BucketKey, IndexMap<String, Connection>>,
}

impl ConnectionTable {
    /// Entries of a bucket
    #[must_use]
    pub fn bucket(&self, key: &BucketKey) -> Option<&IndexMap<String, Connection>> {
        self.buckets.get(key)
    }

    /// One label pair of a bucket
    #[must_use]
    pub fn get(&self, key: &BucketKey, left: &str, right: &str) -> Option<&Connection> {
        self.bucket(key)
            .and_then(|entries| entries.get(&label_key(left, right)))
    }

    /// Buckets in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&BucketKey, &IndexMap<String, Connection>)> {
        self.buckets.iter()
    }

    /// Number of non-empty buckets
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no paper contributed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Label pairs across all buckets
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.buckets.values().map(IndexMap::len).sum()
    }

    /// Label pairs per strength tier, `[weak, medium, strong]`
    #[must_use]
    pub fn strength_histogram(&self) -> [usize; 3] {
        let mut histogram = [0; 3];
        for connection in self.buckets.values().flat_map(IndexMap::values) {
            let slot = match connection.connection_strength {
                ConnectionStrength::Weak => 0,
                ConnectionStrength::Medium => 1,
                ConnectionStrength::Strong => 2,
            };
            histogram[slot] += 1;
        }
        histogram
    }
}

/// Raw, not yet deduplicated paper ids per bucket and label pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionAccumulator {
    buckets: IndexMap<BucketKey, IndexMap<String, Vec<String>>>,
}

impl ConnectionAccumulator {
    /// Create empty accumulator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one paper id to a label pair
    pub fn add(&mut self, key: BucketKey, left: &str, right: &str, paper_id: &str) {
        self.buckets
            .entry(key)
            .or_default()
            .entry(label_key(left, right))
            .or_default()
            .push(paper_id.to_string());
    }

    /// Append every contribution of one paper
    pub fn add_paper(&mut self, paper: &ResolvedPaper, policy: &PairPolicy) {
        for pair in PairType::ALL {
            let (Some(left), Some(right)) = (paper.domain(pair.left()), paper.domain(pair.right()))
            else {
                continue;
            };

            let collapse = policy.collapses(pair);
            let left_sides = side_labels(left, collapse);
            let right_sides = side_labels(right, false);

            for (left_level, left_labels) in &left_sides {
                for (right_level, right_labels) in &right_sides {
                    let key = BucketKey::new(pair, *left_level, *right_level);
                    for left_label in left_labels {
                        for right_label in right_labels {
                            self.add(key, left_label, right_label, &paper.id);
                        }
                    }
                }
            }
        }
    }

    /// Append another accumulator's contributions after this one's
    pub fn merge(&mut self, other: Self) {
        for (key, entries) in other.buckets {
            let bucket = self.buckets.entry(key).or_default();
            for (label, ids) in entries {
                bucket.entry(label).or_default().extend(ids);
            }
        }
    }

    /// Number of buckets touched so far
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether nothing was added
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Deduplicate ids, count and classify every label pair
    #[must_use]
    pub fn finalize(self, thresholds: &StrengthThresholds) -> ConnectionTable {
        let buckets = self
            .buckets
            .into_iter()
            .map(|(key, entries)| {
                let entries = entries
                    .into_iter()
                    .map(|(label, ids)| {
                        let paper_ids: Vec<String> =
                            ids.into_iter().collect::<IndexSet<_>>().into_iter().collect();
                        let paper_count = paper_ids.len();
                        let connection = Connection {
                            paper_count,
                            paper_ids,
                            connection_strength: thresholds.classify(paper_count),
                        };
                        (label, connection)
                    })
                    .collect();
                (key, entries)
            })
            .collect();

        ConnectionTable { buckets }
    }
}

/// Labels of one side, grouped by level
fn side_labels(tags: &ResolvedPaperTags, collapse: bool) -> Vec<(TagLevel, Vec<&str>)> {
    if collapse {
        let names: IndexSet<&str> = tags.matched.iter().map(String::as_str).collect();
        return vec![(TagLevel::L1, names.into_iter().collect())];
    }

    TagLevel::ALL
        .into_iter()
        .map(|level| (level, tags.labels_at(level)))
        .filter(|(_, labels)| !labels.is_empty())
        .collect()
}

/// Aggregates resolved papers into a [`ConnectionTable`]
#[derive(Debug, Clone, Default)]
pub struct CrossDomainAggregator {
    thresholds: StrengthThresholds,
    policy: PairPolicy,
    parallel: bool,
}

impl CrossDomainAggregator {
    /// Create aggregator with the given thresholds and default policy
    #[inline]
    #[must_use]
    pub fn new(thresholds: StrengthThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    /// With a platform level policy
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: PairPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// With parallel accumulation on or off
    #[inline]
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Thresholds in use
    #[inline]
    #[must_use]
    pub fn thresholds(&self) -> &StrengthThresholds {
        &self.thresholds
    }

    /// Accumulate raw contributions of a corpus, in corpus order
    #[must_use]
    pub fn accumulate(&self, papers: &[ResolvedPaper]) -> ConnectionAccumulator {
        if self.parallel {
            papers
                .par_iter()
                .fold(ConnectionAccumulator::new, |mut acc, paper| {
                    acc.add_paper(paper, &self.policy);
                    acc
                })
                .reduce(ConnectionAccumulator::new, |mut left, right| {
                    left.merge(right);
                    left
                })
        } else {
            let mut acc = ConnectionAccumulator::new();
            for paper in papers {
                acc.add_paper(paper, &self.policy);
            }
            acc
        }
    }

    /// Accumulate and finalize a corpus
    #[must_use]
    pub fn aggregate(&self, papers: &[ResolvedPaper]) -> ConnectionTable {
        let table = self.accumulate(papers).finalize(&self.thresholds);

        let [weak, medium, strong] = table.strength_histogram();
        tracing::info!(
            papers = papers.len(),
            buckets = table.len(),
            connections = table.connection_count(),
            strong,
            medium,
            weak,
            parallel = self.parallel,
            "aggregated cross-domain connections"
        );
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paper::Paper;
    use crate::resolve::TagResolver;
    use pretty_assertions::assert_eq;
    use tagviz_test_utils::sample_taxonomy;

    fn resolved(papers: &[Paper]) -> Vec<ResolvedPaper> {
        let taxonomy = sample_taxonomy();
        TagResolver::new(&taxonomy).resolve_all(papers).0
    }

    fn key(pair: PairType, left: TagLevel, right: TagLevel) -> BucketKey {
        BucketKey::new(pair, left, right)
    }

    #[test]
    fn pair_domains_and_names() {
        assert_eq!(
            PairType::ALL.map(PairType::name),
            [
                "PlatformContentForm__ResearchContent",
                "PlatformContentForm__ResearchMethod",
                "ResearchContent__ResearchMethod",
                "PlatformAttribute__ResearchContent",
                "PlatformAttribute__ResearchMethod",
            ]
            .map(String::from)
        );
        assert_eq!(
            "ResearchContent__ResearchMethod".parse::<PairType>().unwrap(),
            PairType::ContentMethod
        );
        assert!("ResearchMethod__ResearchContent".parse::<PairType>().is_err());
    }

    #[test]
    fn default_policy_collapses_three_pairs() {
        let policy = PairPolicy::default();
        let collapsed: Vec<_> = PairType::ALL
            .into_iter()
            .filter(|pair| policy.collapses(*pair))
            .collect();
        assert_eq!(
            collapsed,
            vec![
                PairType::ContentFormContent,
                PairType::ContentFormMethod,
                PairType::AttributeContent
            ]
        );

        let policy = policy.with(PairType::ContentMethod, PlatformLevels::Collapsed);
        assert!(!policy.collapses(PairType::ContentMethod));
    }

    #[test]
    fn bucket_key_format() {
        let key = key(PairType::AttributeMethod, TagLevel::L2, TagLevel::L3);
        assert_eq!(key.to_string(), "PlatformAttribute_L2__ResearchMethod_L3");
    }

    #[test]
    fn content_method_pairs_every_level() {
        let papers = resolved(&[Paper::new("p1")
            .with_tags(Domain::ResearchContent, ["Age"])
            .with_tags(Domain::ResearchMethod, ["Topic Modeling"])]);

        let table = CrossDomainAggregator::default().aggregate(&papers);
        let pair = PairType::ContentMethod;

        assert_eq!(table.bucket(&key(pair, TagLevel::L1, TagLevel::L1)).unwrap().len(), 1);
        let deep = table
            .get(&key(pair, TagLevel::L3, TagLevel::L2), "Age", "Computational")
            .unwrap();
        assert_eq!(deep.paper_ids, vec!["p1"]);
        assert_eq!(table.len(), 9);
        assert_eq!(table.connection_count(), 9);
    }

    #[test]
    fn collapsed_platform_side_is_level_one_only() {
        let papers = resolved(&[Paper::new("p1")
            .with_platforms(["Weibo", "Weibo"])
            .with_tags(Domain::ResearchContent, ["Age"])]);

        let table = CrossDomainAggregator::default().aggregate(&papers);
        let pair = PairType::ContentFormContent;

        let at_l1 = table.bucket(&key(pair, TagLevel::L1, TagLevel::L3)).unwrap();
        assert_eq!(at_l1.keys().collect::<Vec<_>>(), vec!["Weibo__Age"]);
        assert!(table.bucket(&key(pair, TagLevel::L3, TagLevel::L3)).is_none());
        assert!(table.bucket(&key(pair, TagLevel::L2, TagLevel::L1)).is_none());
    }

    #[test]
    fn resolved_platform_side_uses_hierarchy() {
        let papers = resolved(&[Paper::new("p1")
            .with_platforms(["Weibo"])
            .with_tags(Domain::ResearchMethod, ["Field Experiment"])]);

        let table = CrossDomainAggregator::default().aggregate(&papers);
        let pair = PairType::AttributeMethod;

        assert!(table
            .get(&key(pair, TagLevel::L1, TagLevel::L1), "Commercial", "Quantitative")
            .is_some());
        assert!(table
            .get(&key(pair, TagLevel::L3, TagLevel::L3), "Weibo", "Field Experiment")
            .is_some());
    }

    #[test]
    fn duplicate_contributions_are_deduplicated() {
        let papers = resolved(&[
            Paper::new("p1")
                .with_tags(Domain::ResearchContent, ["Age", "Gender"])
                .with_tags(Domain::ResearchMethod, ["Lab Experiment"]),
            Paper::new("p2")
                .with_tags(Domain::ResearchContent, ["Age"])
                .with_tags(Domain::ResearchMethod, ["Lab Experiment"]),
        ]);

        let table = CrossDomainAggregator::default().aggregate(&papers);
        let connection = table
            .get(
                &key(PairType::ContentMethod, TagLevel::L1, TagLevel::L1),
                "User Groups",
                "Quantitative",
            )
            .unwrap();
        assert_eq!(connection.paper_ids, vec!["p1", "p2"]);
        assert_eq!(connection.paper_count, 2);
        assert_eq!(connection.connection_strength, ConnectionStrength::Weak);
    }

    #[test]
    fn merge_appends_in_order() {
        let k = key(PairType::ContentMethod, TagLevel::L1, TagLevel::L1);
        let other_key = key(PairType::ContentMethod, TagLevel::L2, TagLevel::L1);

        let mut first = ConnectionAccumulator::new();
        first.add(k, "a", "b", "p1");
        let mut second = ConnectionAccumulator::new();
        second.add(other_key, "c", "d", "p2");
        second.add(k, "a", "b", "p2");
        second.add(k, "a", "b", "p1");

        let mut sequential = ConnectionAccumulator::new();
        sequential.add(k, "a", "b", "p1");
        sequential.add(other_key, "c", "d", "p2");
        sequential.add(k, "a", "b", "p2");
        sequential.add(k, "a", "b", "p1");

        first.merge(second);
        assert_eq!(first, sequential);

        let table = first.finalize(&StrengthThresholds::default());
        assert_eq!(table.get(&k, "a", "b").unwrap().paper_ids, vec!["p1", "p2"]);
    }

    #[test]
    fn papers_missing_a_side_contribute_nothing() {
        let papers = resolved(&[Paper::new("p1").with_tags(Domain::ResearchContent, ["Age"])]);
        let table = CrossDomainAggregator::default().aggregate(&papers);
        assert!(table.is_empty());
    }

    #[test]
    fn serializes_with_string_keys() {
        let mut acc = ConnectionAccumulator::new();
        acc.add(
            key(PairType::ContentFormMethod, TagLevel::L1, TagLevel::L2),
            "X",
            "A",
            "p1",
        );
        let table = acc.finalize(&StrengthThresholds::default());

        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "PlatformContentForm_L1__ResearchMethod_L2": {
                    "X__A": {"paperCount": 1, "paperIds": ["p1"], "connectionStrength": "weak"}
                }
            })
        );
    }
}
