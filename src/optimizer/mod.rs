pub mod candidate;
pub mod scoring;
pub mod search;
pub mod weights;

use serde::{Deserialize, Serialize};

pub use candidate::{build_candidates, Candidate, SynergyBonus};
pub use search::{combination, find_best_team, find_best_team_until, BestTeam, SearchResult, Stopped};
pub use weights::{
    DuplicatePreset, DuplicateWeights, EffectPreset, RangeConstraint, RangePreset, WeightConfig,
};

/// Everything a search needs besides the candidates. Built once per request from
/// the session and never changed while the search runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub team_size: usize,
    pub weights: WeightConfig,
    pub range: RangeConstraint,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            team_size: 3,
            weights: WeightConfig::default(),
            range: RangeConstraint::default(),
        }
    }
}
