//! Layered configuration
//!
//! `defaults/tagviz.default.toml` is embedded in the binary. [`Loader`]
//! layers user files and single-key overrides over it, merging tables key by
//! key, then deserializes into [`TagvizConfig`] and validates the result.
//! Any failure here is fatal to a run.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tagviz_relations::{PairPolicy, PairType, PlatformLevels, RelationsError, StrengthThresholds};
use tagviz_taxonomy::{OutlineOptions, PlatformMode, SectionKind, TaxonomyError};
use toml::{Table, Value};

const DEFAULT_TOML: &str = include_str!("../defaults/tagviz.default.toml");

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A config file could not be read
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A layer is not valid TOML, or the merged document has the wrong shape
    #[error("failed to parse {origin}: {source}")]
    Parse {
        /// Layer description
        origin: String,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// Override key cannot be applied
    #[error("invalid override '{0}'")]
    InvalidOverride(String),

    /// Values parse but are not usable
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// Outline options rejected
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),

    /// Thresholds or pair names rejected
    #[error(transparent)]
    Relations(#[from] RelationsError),
}

impl ConfigError {
    /// Create invalid configuration error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Result type alias for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagvizConfig {
    /// Outline parsing
    pub outline: OutlineConfig,
    /// Strength tiers
    pub strength: StrengthConfig,
    /// Aggregation mode and per-pair platform handling
    pub aggregation: AggregationConfig,
    /// Artifact output
    pub output: OutputConfig,
}

/// `[outline]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutlineConfig {
    /// Spaces per indentation level
    pub indent_unit: usize,
    /// Separator between id segments
    pub id_separator: String,
    /// Heading title -> section name
    pub sections: IndexMap<String, String>,
    /// Platform bullet -> sub-mode name
    pub platform_modes: IndexMap<String, String>,
}

/// `[strength]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrengthConfig {
    /// Strong threshold
    pub strong: usize,
    /// Medium threshold
    pub medium: usize,
}

/// `[aggregation]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregationConfig {
    /// Accumulate on the rayon pool
    pub parallel: bool,
    /// Pair name -> platform level handling
    pub platform_levels: IndexMap<String, PlatformLevels>,
}

/// `[output]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory artifacts are written to
    pub dir: PathBuf,
    /// Pretty-print JSON
    pub pretty: bool,
    /// File name per artifact
    pub files: OutputFiles,
}

/// `[output.files]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputFiles {
    /// Published taxonomy
    pub taxonomy: String,
    /// Papers with resolved tags
    pub processed_papers: String,
    /// Parent/child id mappings
    pub hierarchy_mapping: String,
    /// Per-node display metadata
    pub node_metadata: String,
    /// Platform sub-mode configuration
    pub platform_configuration: String,
    /// Cross-domain co-occurrences
    pub cross_level_connections: String,
}

impl OutputFiles {
    /// All file names, in write order
    #[must_use]
    pub fn all(&self) -> [&str; 6] {
        [
            &self.taxonomy,
            &self.processed_papers,
            &self.hierarchy_mapping,
            &self.node_metadata,
            &self.platform_configuration,
            &self.cross_level_connections,
        ]
    }
}

impl TagvizConfig {
    /// Built-in defaults only
    ///
    /// # Errors
    /// Returns error if the embedded defaults are unusable
    pub fn load_defaults() -> ConfigResult<Self> {
        Loader::new().build()
    }

    /// Check every section
    ///
    /// # Errors
    /// Returns the first problem found
    pub fn validate(&self) -> ConfigResult<()> {
        self.outline_options()?;
        self.thresholds()?;
        self.pair_policy()?;
        self.validate_output()
    }

    /// Parser options from `[outline]`
    ///
    /// # Errors
    /// Returns error for an unknown section or sub-mode target, or unusable
    /// indentation / separator
    pub fn outline_options(&self) -> ConfigResult<OutlineOptions> {
        let outline = &self.outline;
        let mut options = OutlineOptions {
            indent_unit: outline.indent_unit,
            id_separator: outline.id_separator.clone(),
            sections: IndexMap::new(),
            platform_modes: IndexMap::new(),
        };
        for (alias, target) in &outline.sections {
            options = options.with_section(alias.clone(), target.parse::<SectionKind>()?);
        }
        for (alias, target) in &outline.platform_modes {
            options = options.with_platform_mode(alias.clone(), target.parse::<PlatformMode>()?);
        }
        options.validate()?;
        Ok(options)
    }

    /// Thresholds from `[strength]`
    ///
    /// # Errors
    /// Returns error unless `strong > medium > 0`
    pub fn thresholds(&self) -> ConfigResult<StrengthThresholds> {
        Ok(StrengthThresholds::new(self.strength.strong, self.strength.medium)?)
    }

    /// Policy from `[aggregation.platform_levels]`; unlisted pairs keep
    /// their defaults
    ///
    /// # Errors
    /// Returns error for a key that names no pair
    pub fn pair_policy(&self) -> ConfigResult<PairPolicy> {
        self.aggregation
            .platform_levels
            .iter()
            .try_fold(PairPolicy::default(), |policy, (name, &levels)| {
                Ok(policy.with(name.parse::<PairType>()?, levels))
            })
    }

    fn validate_output(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for name in self.output.files.all() {
            if name.trim().is_empty() {
                return Err(ConfigError::invalid("output file names must not be empty"));
            }
            if name.contains(['/', '\\']) {
                return Err(ConfigError::invalid(format!(
                    "output file name '{name}' must not contain a path separator"
                )));
            }
            if !seen.insert(name) {
                return Err(ConfigError::invalid(format!(
                    "output file name '{name}' is used twice"
                )));
            }
        }
        Ok(())
    }

    /// Render as TOML
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[derive(Debug, Clone)]
enum Layer {
    Source { origin: String, text: String },
    Override { key: String, value: Value },
}

/// Layers user overrides over the built-in defaults
#[derive(Debug, Clone)]
pub struct Loader {
    layers: Vec<Layer>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            layers: vec![Layer::Source {
                origin: "built-in defaults".to_string(),
                text: DEFAULT_TOML.to_string(),
            }],
        }
    }

    /// Layer TOML text
    #[must_use]
    pub fn with_str(mut self, origin: impl Into<String>, text: impl Into<String>) -> Self {
        self.layers.push(Layer::Source {
            origin: origin.into(),
            text: text.into(),
        });
        self
    }

    /// Layer a configuration file
    ///
    /// # Errors
    /// Returns error if the file cannot be read
    pub fn with_file(self, path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.with_str(path.display().to_string(), text))
    }

    /// Layer a configuration file if it exists
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> ConfigResult<Self> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Set one dotted key, e.g. `output.dir`
    ///
    /// # Errors
    /// Returns error for an empty key segment
    pub fn set_override(mut self, key: &str, value: impl Into<Value>) -> ConfigResult<Self> {
        if key.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(ConfigError::InvalidOverride(key.to_string()));
        }
        self.layers.push(Layer::Override {
            key: key.to_string(),
            value: value.into(),
        });
        Ok(self)
    }

    /// Merge every layer, deserialize and validate
    ///
    /// # Errors
    /// Returns error if a layer does not parse, the merged document has the
    /// wrong shape, or validation fails
    pub fn build(self) -> ConfigResult<TagvizConfig> {
        let mut merged = Table::new();
        for layer in self.layers {
            match layer {
                Layer::Source { origin, text } => {
                    let table: Table = toml::from_str(&text)
                        .map_err(|source| ConfigError::Parse { origin, source })?;
                    merge_tables(&mut merged, table);
                }
                Layer::Override { key, value } => set_path(&mut merged, &key, value)?,
            }
        }

        let config: TagvizConfig =
            Value::Table(merged)
                .try_into()
                .map_err(|source| ConfigError::Parse {
                    origin: "merged configuration".to_string(),
                    source,
                })?;
        config.validate()?;

        tracing::debug!(
            parallel = config.aggregation.parallel,
            strong = config.strength.strong,
            medium = config.strength.medium,
            "configuration loaded"
        );
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Overlay wins key by key; nested tables merge recursively
fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        let merged = match (base.remove(&key), value) {
            (Some(Value::Table(mut existing)), Value::Table(incoming)) => {
                merge_tables(&mut existing, incoming);
                Value::Table(existing)
            }
            (_, value) => value,
        };
        base.insert(key, merged);
    }
}

fn set_path(table: &mut Table, key: &str, value: Value) -> ConfigResult<()> {
    let mut segments: Vec<&str> = key.split('.').collect();
    let Some(last) = segments.pop() else {
        return Err(ConfigError::InvalidOverride(key.to_string()));
    };

    let mut current = table;
    for segment in segments {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        let Value::Table(next) = entry else {
            return Err(ConfigError::InvalidOverride(key.to_string()));
        };
        current = next;
    }
    current.insert(last.to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tagviz_taxonomy::Domain;

    #[test]
    fn loads_default_config() {
        let config = TagvizConfig::load_defaults().unwrap();
        assert_eq!(config.outline.indent_unit, 4);
        assert!(!config.aggregation.parallel);
        assert_eq!(config.thresholds().unwrap(), StrengthThresholds::default());
        assert_eq!(config.pair_policy().unwrap(), PairPolicy::default());
        assert_eq!(config.outline_options().unwrap(), OutlineOptions::default());
        assert_eq!(
            config.output.files.cross_level_connections,
            "crossLevelConnections.json"
        );
    }

    #[test]
    fn user_layer_merges_key_by_key() {
        let config = Loader::new()
            .with_str(
                "user",
                r#"
                [strength]
                strong = 8

                [outline.sections]
                "Methods" = "ResearchMethod"
                "#,
            )
            .build()
            .unwrap();

        assert_eq!(config.strength.strong, 8);
        assert_eq!(config.strength.medium, 10);

        let options = config.outline_options().unwrap();
        assert_eq!(
            options.sections.get("Methods"),
            Some(&SectionKind::Research(Domain::ResearchMethod))
        );
        assert!(options.sections.contains_key("研究内容"));
    }

    #[test]
    fn mixed_case_keys_stay_distinct() {
        let config = Loader::new()
            .with_str(
                "user",
                r#"
                [outline.sections]
                "Methods" = "ResearchMethod"
                "methods" = "ResearchContent"

                [outline.platform_modes]
                "ContentForm" = "Attribute"
                "#,
            )
            .set_override(
                "aggregation.platform_levels.PlatformContentForm__ResearchMethod",
                "resolved",
            )
            .unwrap()
            .build()
            .unwrap();

        let options = config.outline_options().unwrap();
        assert_eq!(
            options.sections.get("Methods"),
            Some(&SectionKind::Research(Domain::ResearchMethod))
        );
        assert_eq!(
            options.sections.get("methods"),
            Some(&SectionKind::Research(Domain::ResearchContent))
        );
        assert_eq!(options.platform_modes.get("ContentForm"), Some(&PlatformMode::Attribute));
        assert!(!options.platform_modes.contains_key("contentform"));

        let policy = config.pair_policy().unwrap();
        assert!(!policy.collapses(PairType::ContentFormMethod));
        assert_eq!(config.aggregation.platform_levels.len(), 5);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("aggregation.parallel", true)
            .unwrap()
            .set_override("output.dir", "out/site")
            .unwrap()
            .build()
            .unwrap();
        assert!(config.aggregation.parallel);
        assert_eq!(config.output.dir, PathBuf::from("out/site"));

        assert!(Loader::new().set_override("output..dir", "x").is_err());
        assert!(matches!(
            Loader::new().set_override("output.pretty.deep", 1).unwrap().build(),
            Err(ConfigError::InvalidOverride(_))
        ));
    }

    #[test]
    fn platform_levels_override_one_pair() {
        let config = Loader::new()
            .set_override(
                "aggregation.platform_levels.PlatformAttribute__ResearchContent",
                "resolved",
            )
            .unwrap()
            .build()
            .unwrap();
        let policy = config.pair_policy().unwrap();
        assert!(!policy.collapses(PairType::AttributeContent));
        assert!(policy.collapses(PairType::ContentFormContent));
    }

    #[test]
    fn invalid_values_are_fatal() {
        let bad_thresholds = Loader::new().with_str("user", "[strength]\nmedium = 30\n").build();
        assert!(matches!(bad_thresholds, Err(ConfigError::Relations(_))));

        let bad_target = Loader::new()
            .with_str("user", "[outline.sections]\n\"Venue\" = \"Venues\"\n")
            .build();
        assert!(matches!(bad_target, Err(ConfigError::Taxonomy(_))));

        let bad_pair = Loader::new()
            .with_str("user", "[aggregation.platform_levels]\n\"A__B\" = \"resolved\"\n")
            .build();
        assert!(matches!(bad_pair, Err(ConfigError::Relations(_))));

        let bad_indent = Loader::new().with_str("user", "[outline]\nindent_unit = 0\n").build();
        assert!(matches!(bad_indent, Err(ConfigError::Taxonomy(_))));

        let clash = Loader::new()
            .with_str("user", "[output.files]\ntaxonomy = \"nodeMetadata.json\"\n")
            .build();
        assert!(matches!(clash, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_keys_and_bad_toml_are_rejected() {
        let typo = Loader::new().with_str("user", "[strength]\nstrogn = 5\n").build();
        assert!(matches!(typo, Err(ConfigError::Parse { .. })));

        let broken = Loader::new().with_str("user", "[strength\n").build();
        assert!(matches!(broken, Err(ConfigError::Parse { origin, .. }) if origin == "user"));
    }

    #[test]
    fn missing_files() {
        let dir = std::env::temp_dir().join("tagviz-config-test-missing");
        assert!(matches!(
            Loader::new().with_file(dir.join("nope.toml")),
            Err(ConfigError::Read { .. })
        ));
        assert!(Loader::new().with_optional_file(dir.join("nope.toml")).is_ok());
    }

    #[test]
    fn renders_back_to_toml() {
        let config = TagvizConfig::load_defaults().unwrap();
        let text = config.to_toml().unwrap();
        let reloaded = Loader::new().with_str("rendered", text).build().unwrap();
        assert_eq!(reloaded, config);
    }
}
