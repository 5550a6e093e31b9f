//! Level combinations over the platform, content and method axes

use tagviz_taxonomy::TagLevel;

/// Number of entries returned by [`level_combinations`]
pub const LEVEL_COMBINATION_COUNT: usize = 27;

/// `{L1,L2,L3}^3` joined with `_`, rightmost axis varying fastest
#[must_use]
pub fn level_combinations() -> Vec<String> {
    let mut combinations = Vec::with_capacity(LEVEL_COMBINATION_COUNT);
    for platform in TagLevel::ALL {
        for content in TagLevel::ALL {
            for method in TagLevel::ALL {
                combinations.push(format!("{platform}_{content}_{method}"));
            }
        }
    }
    combinations
}
