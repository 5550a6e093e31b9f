//! Testing utilities for tagviz workspace
//!
//! Shared outline and corpus fixtures.

#![allow(missing_docs)]

use tagviz_taxonomy::{OutlineOptions, Taxonomy};

/// Small but complete outline: both platform sub-modes (sharing leaf
/// platforms), and three-level content and method trees.
pub const SAMPLE_OUTLINE: &str = "\
# **Platform**
- ContentForm
    - Social Media
        - Microblog
            - Twitter
            - Weibo
        - Short Video
            - TikTok
            - Douyin
    - Forums
        - Q&A
            - Zhihu
            - Reddit
- Attribute
    - Commercial
        - International
            - Twitter
            - TikTok
            - Reddit
        - Domestic
            - Weibo
            - Douyin
            - Zhihu

# **ResearchContent**
- User Groups
    - Demographics
        - Age
        - Gender
    - Communities
        - Fandom
- Information Spread
    - Misinformation
        - Rumor Detection
        - Fact Checking

# **ResearchMethod**
- Quantitative
    - Experiment
        - Field Experiment
        - Lab Experiment
    - Computational
        - Topic Modeling
- Qualitative
    - Interview
        - Semi-structured Interview
";

/// Corpus over [`SAMPLE_OUTLINE`]: canonical and source-style keys, one
/// record without id, one unmatched tag, one malformed record.
pub const SAMPLE_CORPUS: &str = r#"{
  "papers": [
    {
      "id": "paper_001",
      "name": "Rumors on microblogs",
      "year": 2021,
      "platforms": ["Twitter", "Weibo"],
      "tags": {
        "ResearchContent": ["Rumor Detection", "Age"],
        "ResearchMethod": ["Field Experiment"]
      }
    },
    {
      "id": "paper_002",
      "Name": "Teens on short video",
      "Authors": "A. Author; B. Author",
      "Year": "2022",
      "研究涉及平台": "TikTok",
      "研究内容": ["Age"],
      "研究方法": ["Topic Modeling", "Unknown Method"]
    },
    {
      "Name": "Fandom interviews",
      "DOI": "10.1000/fandom",
      "研究涉及平台": ["Zhihu"],
      "研究内容": "Fandom, Age",
      "研究方法": ["Semi-structured Interview"]
    },
    {
      "id": "paper_004",
      "tags": 42
    }
  ]
}"#;

/// Options the fixtures are written for
#[must_use]
pub fn sample_options() -> OutlineOptions {
    OutlineOptions::default()
}

/// Taxonomy built from [`SAMPLE_OUTLINE`]
#[must_use]
pub fn sample_taxonomy() -> Taxonomy {
    Taxonomy::from_outline(SAMPLE_OUTLINE, &sample_options()).unwrap()
}

/// Outline with a single three-level content tree `A -> B -> C`
#[must_use]
pub fn chain_outline(domain_heading: &str) -> String {
    format!("# **{domain_heading}**\n- A\n    - B\n        - C\n")
}

/// Random-but-valid outline text: `shape[i]` is the depth of the i-th
/// bullet, each clamped to at most one deeper than its predecessor.
#[must_use]
pub fn outline_from_shape(heading: &str, shape: &[(usize, u8)]) -> String {
    let mut text = format!("# **{heading}**\n");
    let mut previous = 0usize;
    for (i, &(depth, name)) in shape.iter().enumerate() {
        let depth = if i == 0 { 0 } else { depth.min(previous + 1) };
        previous = depth;
        text.push_str(&" ".repeat(depth * 4));
        text.push_str(&format!("- n{name}\n"));
    }
    text
}
