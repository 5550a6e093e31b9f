//! The batch pipeline
//!
//! ```text
//! outline ─▶ Taxonomy ─┬──────────────────────────────▶ taxonomy / hierarchy / platform
//!                      │
//! corpus ──▶ Corpus ───┴▶ TagResolver ─▶ aggregator ──▶ connections
//!                                     └▶ processed ───▶ papers / node metadata
//! ```
//!
//! Every artifact is serialized in memory before anything touches the
//! output directory; every file is then staged as a temporary file and
//! renamed into place once all of them are staged.

use crate::config::{ConfigResult, TagvizConfig};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tagviz_relations::{
    Artifact, ConnectionTable, Corpus, CrossDomainAggregator, CrossLevelConnections,
    HierarchyMapping, NodeMetadata, PairPolicy, PlatformConfiguration, ProcessedPapers,
    RelationsResult, ResolveStats, StrengthThresholds, TagResolver,
};
use tagviz_taxonomy::{Domain, OutlineDiagnostics, OutlineOptions, Taxonomy, TaxonomyExport};
use tempfile::NamedTempFile;

/// Input documents of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineInputs {
    /// Taxonomy outline text
    pub outline: PathBuf,
    /// Paper corpus JSON
    pub papers: PathBuf,
}

impl PipelineInputs {
    /// Create inputs
    #[must_use]
    pub fn new(outline: impl Into<PathBuf>, papers: impl Into<PathBuf>) -> Self {
        Self {
            outline: outline.into(),
            papers: papers.into(),
        }
    }
}

/// Counts by strength tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StrengthCounts {
    /// Weak connections
    pub weak: usize,
    /// Medium connections
    pub medium: usize,
    /// Strong connections
    pub strong: usize,
}

/// Summary of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Published nodes per domain
    pub nodes_per_domain: IndexMap<Domain, usize>,
    /// Display names shadowed by a later node of the same domain
    pub duplicate_display_names: usize,
    /// What the outline parser smoothed over
    pub outline: OutlineDiagnostics,
    /// Papers read
    pub papers: usize,
    /// Records skipped as malformed
    pub skipped_papers: usize,
    /// Tag resolution totals
    pub resolution: ResolveStats,
    /// Non-empty buckets
    pub buckets: usize,
    /// Label pairs across all buckets
    pub connections: usize,
    /// Label pairs per tier
    pub strength: StrengthCounts,
    /// Files written, empty for a check
    pub written: Vec<PathBuf>,
}

impl RunReport {
    fn new(
        taxonomy: &Taxonomy,
        corpus: &Corpus,
        resolution: ResolveStats,
        table: &ConnectionTable,
    ) -> Self {
        let [weak, medium, strong] = table.strength_histogram();
        Self {
            nodes_per_domain: Domain::ALL
                .into_iter()
                .map(|domain| (domain, taxonomy.published_in(domain).count()))
                .collect(),
            duplicate_display_names: taxonomy.duplicate_display_names(),
            outline: *taxonomy.outline_diagnostics(),
            papers: corpus.len(),
            skipped_papers: corpus.skipped,
            resolution,
            buckets: table.len(),
            connections: table.connection_count(),
            strength: StrengthCounts {
                weak,
                medium,
                strong,
            },
            written: Vec::new(),
        }
    }

    /// Human-readable summary
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "Taxonomy:");
        for (domain, count) in &self.nodes_per_domain {
            let _ = writeln!(text, "  {domain}: {count} nodes");
        }
        let _ = writeln!(
            text,
            "  Outline: {} headings, {} bullets, {} clamped, {} renamed ids, {} skipped lines",
            self.outline.headings,
            self.outline.bullets,
            self.outline.clamped_bullets,
            self.outline.renamed_ids,
            self.outline.skipped_lines
        );
        let _ = writeln!(text, "  Duplicate display names: {}", self.duplicate_display_names);
        let _ = writeln!(text, "Papers:");
        let _ = writeln!(text, "  Read: {} ({} skipped)", self.papers, self.skipped_papers);
        let _ = writeln!(
            text,
            "  Tags matched: {}, dropped: {}",
            self.resolution.matched,
            self.resolution.total_dropped()
        );
        let _ = writeln!(text, "Connections:");
        let _ = writeln!(text, "  Buckets: {}", self.buckets);
        let _ = writeln!(
            text,
            "  Pairs: {} (strong {}, medium {}, weak {})",
            self.connections, self.strength.strong, self.strength.medium, self.strength.weak
        );
        if !self.written.is_empty() {
            let _ = writeln!(text, "Written:");
            for path in &self.written {
                let _ = writeln!(text, "  {}", path.display());
            }
        }
        text
    }
}

/// One serialized artifact awaiting its write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    /// Artifact name for logs
    pub name: &'static str,
    /// Target file name
    pub file_name: String,
    /// JSON text
    pub contents: String,
}

fn render<A: Artifact>(
    artifact: &A,
    file_name: &str,
    pretty: bool,
) -> RelationsResult<RenderedArtifact> {
    Ok(RenderedArtifact {
        name: A::NAME,
        file_name: file_name.to_string(),
        contents: artifact.to_json(pretty)?,
    })
}

/// Everything a run produced, not yet written
#[derive(Debug, Clone)]
pub struct Build {
    /// Run summary
    pub report: RunReport,
    /// Serialized artifacts in write order
    pub artifacts: Vec<RenderedArtifact>,
}

impl Build {
    /// Serialized artifact by file name
    #[must_use]
    pub fn artifact(&self, file_name: &str) -> Option<&RenderedArtifact> {
        self.artifacts.iter().find(|a| a.file_name == file_name)
    }

    /// Write every artifact into `dir`, creating it if needed
    ///
    /// Every file is staged next to its target before any target is
    /// replaced, so a failure while staging leaves the directory as it was.
    /// A rename failing after that can leave earlier files replaced.
    ///
    /// # Errors
    /// Returns error if the directory or a file cannot be written
    pub fn write(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;

        let mut staged = Vec::with_capacity(self.artifacts.len());
        for artifact in &self.artifacts {
            let path = dir.join(&artifact.file_name);
            if path.is_dir() {
                anyhow::bail!("cannot replace directory {} with {}", path.display(), artifact.name);
            }
            let mut file = NamedTempFile::new_in(dir)
                .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
            file.write_all(artifact.contents.as_bytes())
                .with_context(|| format!("failed to write {}", artifact.name))?;
            staged.push((artifact, file, path));
        }

        let mut written = Vec::with_capacity(staged.len());
        for (artifact, file, path) in staged {
            file.persist(&path)
                .map_err(|e| e.error)
                .with_context(|| format!("failed to move {} into place", path.display()))?;

            tracing::info!(
                artifact = artifact.name,
                path = %path.display(),
                bytes = artifact.contents.len(),
                "wrote artifact"
            );
            written.push(path);
        }
        Ok(written)
    }
}

/// Configured pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: TagvizConfig,
    options: OutlineOptions,
    thresholds: StrengthThresholds,
    policy: PairPolicy,
}

impl Pipeline {
    /// Create pipeline from a loaded configuration
    ///
    /// # Errors
    /// Returns error if the configuration does not validate
    pub fn new(config: TagvizConfig) -> ConfigResult<Self> {
        let options = config.outline_options()?;
        let thresholds = config.thresholds()?;
        let policy = config.pair_policy()?;
        Ok(Self {
            config,
            options,
            thresholds,
            policy,
        })
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &TagvizConfig {
        &self.config
    }

    /// Read and index the outline
    ///
    /// # Errors
    /// Returns error if the file cannot be read
    pub fn load_taxonomy(&self, path: &Path) -> Result<Taxonomy> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read outline {}", path.display()))?;
        let taxonomy = Taxonomy::from_outline(&text, &self.options)
            .with_context(|| format!("failed to parse outline {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            published = taxonomy.len(),
            duplicates = taxonomy.duplicate_display_names(),
            "loaded taxonomy"
        );
        Ok(taxonomy)
    }

    /// Read the paper corpus
    ///
    /// # Errors
    /// Returns error if the file cannot be read or holds no paper list
    pub fn load_corpus(&self, path: &Path) -> Result<Corpus> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read paper corpus {}", path.display()))?;
        Corpus::from_json_str(&text)
            .with_context(|| format!("failed to load paper corpus {}", path.display()))
    }

    /// Run everything in memory
    ///
    /// # Errors
    /// Returns error if an input is missing or unreadable, or an artifact
    /// fails to serialize
    pub fn run(&self, inputs: &PipelineInputs) -> Result<Build> {
        let taxonomy = self.load_taxonomy(&inputs.outline)?;
        let corpus = self.load_corpus(&inputs.papers)?;

        let (resolved, stats) = TagResolver::new(&taxonomy).resolve_all(&corpus.papers);
        let table = CrossDomainAggregator::new(self.thresholds)
            .with_policy(self.policy.clone())
            .with_parallel(self.config.aggregation.parallel)
            .aggregate(&resolved);

        let processed = ProcessedPapers::new(&corpus.papers, &resolved);
        let metadata = NodeMetadata::build(&taxonomy, &processed);
        let report = RunReport::new(&taxonomy, &corpus, stats, &table);

        let files = &self.config.output.files;
        let pretty = self.config.output.pretty;
        let artifacts = vec![
            render(&TaxonomyExport::from_taxonomy(&taxonomy), &files.taxonomy, pretty)?,
            render(&processed, &files.processed_papers, pretty)?,
            render(&HierarchyMapping::from_taxonomy(&taxonomy), &files.hierarchy_mapping, pretty)?,
            render(&metadata, &files.node_metadata, pretty)?,
            render(
                &PlatformConfiguration::from_taxonomy(&taxonomy),
                &files.platform_configuration,
                pretty,
            )?,
            render(&CrossLevelConnections::new(table), &files.cross_level_connections, pretty)?,
        ];

        Ok(Build { report, artifacts })
    }

    /// Run and write into the configured output directory
    ///
    /// # Errors
    /// Returns error if the run fails or a file cannot be written; nothing
    /// is written when the run fails
    pub fn build(&self, inputs: &PipelineInputs) -> Result<RunReport> {
        let build = self.run(inputs)?;
        let written = build.write(&self.config.output.dir)?;

        let mut report = build.report;
        report.written = written;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagviz_relations::Paper;

    #[test]
    fn report_text_lists_every_section() {
        let taxonomy = tagviz_test_utils::sample_taxonomy();
        let corpus = Corpus::from_papers(vec![Paper::new("p1")]);
        let mut report = RunReport::new(
            &taxonomy,
            &corpus,
            ResolveStats::default(),
            &ConnectionTable::default(),
        );
        report.written.push(PathBuf::from("out/taxonomy.json"));

        let text = report.generate_text();
        assert!(text.contains("ResearchContent: 9 nodes"));
        assert!(text.contains("Read: 1 (0 skipped)"));
        assert!(text.contains("Pairs: 0 (strong 0, medium 0, weak 0)"));
        assert!(text.contains("out/taxonomy.json"));
    }
}
