//! Paper records and corpus loading
//!
//! A corpus is JSON: either `{"papers": [...]}` or a bare array. Each record
//! may carry
//! - `id` (string or number; defaults to `paper_NNN` from its 1-based position)
//! - bibliographic metadata (`name`, `abstract`, `authors`, `year`, `doi`, or
//!   their capitalized spreadsheet forms)
//! - a `tags` object mapping a domain name or alias to leaf names
//! - tag fields at the top level under the same aliases
//! - a combined `platforms` list offered to both platform domains
//!
//! Tag values are a list of names or one comma-separated string.
//! A record that cannot be read is skipped and counted; it never aborts the
//! load.

use crate::error::{RelationsError, RelationsResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tagviz_taxonomy::Domain;

/// Where a tag field's names go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    /// Names belong to a single domain
    Domain(Domain),
    /// Names belong to either platform domain
    Platforms,
}

impl TagField {
    /// Source-corpus field names, besides canonical domain names
    const ALIASES: [(&'static str, Self); 8] = [
        ("研究内容", Self::Domain(Domain::ResearchContent)),
        ("研究方法", Self::Domain(Domain::ResearchMethod)),
        ("研究涉及平台-内容形式", Self::Domain(Domain::PlatformContentForm)),
        ("研究涉及平台-平台属性", Self::Domain(Domain::PlatformAttribute)),
        ("研究涉及平台", Self::Platforms),
        ("platforms", Self::Platforms),
        ("Platforms", Self::Platforms),
        ("Platform", Self::Platforms),
    ];

    /// Resolve a record key
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|&(_, field)| field)
            .or_else(|| key.parse().ok().map(Self::Domain))
    }
}

/// Bibliographic fields passed through to `processedPapers.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperMetadata {
    /// Title
    #[serde(default)]
    pub name: Option<String>,
    /// Abstract
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Authors, as authored (string or list)
    #[serde(default)]
    pub authors: Option<Value>,
    /// Publication year, as authored (number or string)
    #[serde(default)]
    pub year: Option<Value>,
    /// DOI
    #[serde(default)]
    pub doi: Option<String>,
}

impl PaperMetadata {
    /// Read metadata from a record's fields
    ///
    /// Each field is taken from the first non-null of its keys, the
    /// lowercase form before the spreadsheet form, so a record carrying
    /// both `doi` and `DOI` keeps `doi`.
    ///
    /// # Errors
    /// Returns error if a text field holds something other than a string
    pub fn from_fields(position: usize, fields: &Map<String, Value>) -> RelationsResult<Self> {
        Ok(Self {
            name: text_field(position, fields, &["name", "Name"])?,
            abstract_text: text_field(position, fields, &["abstract", "Abstract"])?,
            authors: first_present(fields, &["authors", "Authors"]).cloned(),
            year: first_present(fields, &["year", "Year"]).cloned(),
            doi: text_field(position, fields, &["doi", "DOI"])?,
        })
    }
}

fn first_present<'v>(fields: &'v Map<String, Value>, keys: &[&str]) -> Option<&'v Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

fn text_field(
    position: usize,
    fields: &Map<String, Value>,
    keys: &[&str],
) -> RelationsResult<Option<String>> {
    match first_present(fields, keys) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(RelationsError::malformed_corpus(format!(
            "record {position}: '{}' must be a string, got {other}",
            keys[0]
        ))),
    }
}

/// A paper and its authored leaf tags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paper {
    /// Paper id
    pub id: String,
    /// Pass-through metadata
    pub metadata: PaperMetadata,
    /// Domain -> authored leaf names, in authoring order
    pub domain_tags: IndexMap<Domain, Vec<String>>,
    /// Platform names not assigned to a sub-mode tree
    pub platforms: Vec<String>,
}

impl Paper {
    /// Create paper with no tags
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Add leaf names for a domain
    #[must_use]
    pub fn with_tags<I, S>(mut self, domain: Domain, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain_tags
            .entry(domain)
            .or_default()
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Add combined platform names
    #[must_use]
    pub fn with_platforms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms.extend(names.into_iter().map(Into::into));
        self
    }

    /// Names offered to a domain: its own list, then (platform domains only)
    /// combined platform names not already listed
    #[must_use]
    pub fn tags_for(&self, domain: Domain) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .domain_tags
            .get(&domain)
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_default();

        if domain.is_platform() {
            let explicit = names.len();
            for platform in &self.platforms {
                if !names[..explicit].contains(&platform.as_str()) {
                    names.push(platform);
                }
            }
        }
        names
    }

    /// Read one corpus record; `position` is 1-based
    ///
    /// # Errors
    /// Returns error if the record is not an object or a field has the wrong
    /// shape
    pub fn from_record(position: usize, record: Value) -> RelationsResult<Self> {
        let Value::Object(map) = record else {
            return Err(RelationsError::malformed_corpus(format!(
                "record {position} is not an object"
            )));
        };

        let id = match map.get("id") {
            None | Some(Value::Null) => format!("paper_{position:03}"),
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            Some(other) => {
                return Err(RelationsError::malformed_corpus(format!(
                    "record {position}: id must be a string or number, got {other}"
                )))
            }
        };

        let metadata = PaperMetadata::from_fields(position, &map)?;

        let mut paper = Self {
            id,
            metadata,
            ..Self::default()
        };

        match map.get("tags") {
            None | Some(Value::Null) => {}
            Some(Value::Object(tags)) => paper.read_tag_fields(position, tags, true)?,
            Some(_) => {
                return Err(RelationsError::malformed_corpus(format!(
                    "record {position}: tags must be an object"
                )))
            }
        }
        paper.read_tag_fields(position, &map, false)?;

        Ok(paper)
    }

    fn read_tag_fields(
        &mut self,
        position: usize,
        fields: &Map<String, Value>,
        explicit: bool,
    ) -> RelationsResult<()> {
        for (key, value) in fields {
            let Some(field) = TagField::from_key(key) else {
                if explicit {
                    tracing::debug!(paper = %self.id, %key, "ignoring unknown tag field");
                }
                continue;
            };

            let names = tag_names(value).ok_or_else(|| {
                RelationsError::malformed_corpus(format!(
                    "record {position}: tag field '{key}' must be a list of names or a string"
                ))
            })?;

            match field {
                TagField::Domain(domain) => {
                    self.domain_tags.entry(domain).or_default().extend(names);
                }
                TagField::Platforms => self.platforms.extend(names),
            }
        }
        Ok(())
    }
}

/// Names in a tag value; `None` for an unusable shape
fn tag_names(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null => Some(Vec::new()),
        Value::String(text) => Some(split_names(text)),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(|name| name.trim().to_string()))
            .filter(|name| name.as_ref().map_or(true, |n| !n.is_empty()))
            .collect(),
        _ => None,
    }
}

fn split_names(text: &str) -> Vec<String> {
    text.split([',', '，'])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Papers read from a corpus document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    /// Readable papers in input order
    pub papers: Vec<Paper>,
    /// Records skipped as malformed
    pub skipped: usize,
}

impl Corpus {
    /// Wrap already-built papers
    #[must_use]
    pub fn from_papers(papers: Vec<Paper>) -> Self {
        Self { papers, skipped: 0 }
    }

    /// Parse a corpus document
    ///
    /// # Errors
    /// Returns error if the text is not JSON or holds no paper list
    pub fn from_json_str(text: &str) -> RelationsResult<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| RelationsError::malformed_corpus(e.to_string()))?;
        Self::from_value(value)
    }

    /// Read a corpus from parsed JSON
    ///
    /// # Errors
    /// Returns error if the value is neither an array nor an object with a
    /// `papers` array
    pub fn from_value(value: Value) -> RelationsResult<Self> {
        let records = match value {
            Value::Array(records) => records,
            Value::Object(mut map) => match map.remove("papers") {
                Some(Value::Array(records)) => records,
                _ => {
                    return Err(RelationsError::malformed_corpus(
                        "expected a 'papers' array",
                    ))
                }
            },
            _ => {
                return Err(RelationsError::malformed_corpus(
                    "expected an array of papers or an object with 'papers'",
                ))
            }
        };

        let mut corpus = Self::default();
        for (index, record) in records.into_iter().enumerate() {
            match Paper::from_record(index + 1, record) {
                Ok(paper) => corpus.papers.push(paper),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed paper record");
                    corpus.skipped += 1;
                }
            }
        }

        tracing::info!(
            papers = corpus.papers.len(),
            skipped = corpus.skipped,
            "loaded paper corpus"
        );
        Ok(corpus)
    }

    /// Number of readable papers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    /// Whether no paper was read
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}
