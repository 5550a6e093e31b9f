use super::Artifact;
use crate::aggregate::ConnectionTable;
use crate::combos::level_combinations;
use serde::Serialize;

/// `crossLevelConnections.json`: connection buckets plus the fixed level index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossLevelConnections {
    /// Bucket key -> label key -> connection
    pub connections: ConnectionTable,
    /// The 27 level combinations
    pub level_combinations: Vec<String>,
}

impl CrossLevelConnections {
    /// Pair a finalized table with the level combinations
    #[must_use]
    pub fn new(connections: ConnectionTable) -> Self {
        Self {
            connections,
            level_combinations: level_combinations(),
        }
    }
}

impl Artifact for CrossLevelConnections {
    const NAME: &'static str = "cross-level connections";
    const FILE_NAME: &'static str = "crossLevelConnections.json";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_still_lists_combinations() {
        let artifact = CrossLevelConnections::new(ConnectionTable::default());
        let value: serde_json::Value = serde_json::from_str(&artifact.to_json(false).unwrap()).unwrap();

        assert_eq!(value["connections"], serde_json::json!({}));
        assert_eq!(value["levelCombinations"].as_array().unwrap().len(), 27);
    }
}
