//! The user's team-building settings. A `TeamSession` is a value: changing a
//! setting produces a new session, and every search works from a snapshot of one.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::champion::{Category, Mode, RosterChampion};
use crate::optimizer::weights::{
    DuplicatePreset, EffectPreset, RangeConstraint, RangePreset, WeightConfig,
};
use crate::optimizer::SearchConfig;

pub const DEFAULT_SESSION_PATH: &str = "data/teams.json";

pub const STAR_LEVELS: [u8; 5] = [1, 2, 3, 4, 5];

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read session {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse session {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write session {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamSession {
    mode: Mode,
    size: usize,
    stars: BTreeMap<u8, bool>,
    types: BTreeMap<Category, bool>,
    weights: WeightConfig,
    range: RangeConstraint,
}

impl Default for TeamSession {
    fn default() -> Self {
        Self {
            mode: Mode::Arena,
            size: Mode::Arena.default_size(),
            stars: STAR_LEVELS.iter().map(|&stars| (stars, true)).collect(),
            types: Category::ALL.iter().map(|&category| (category, true)).collect(),
            weights: WeightConfig::default(),
            range: RangeConstraint::default(),
        }
    }
}

impl TeamSession {
    /// Load a stored session. A missing file yields the defaults; settings missing
    /// from the file are defaulted individually.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| SessionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let session: TeamSession =
            serde_json::from_str(&raw).map_err(|source| SessionError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(session.validated())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = path.as_ref();
        let payload = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SessionError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, payload).map_err(|source| SessionError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn validated(mut self) -> Self {
        self.size = self.size.max(1);
        for stars in STAR_LEVELS {
            self.stars.entry(stars).or_insert(true);
        }
        for category in Category::ALL {
            self.types.entry(category).or_insert(true);
        }
        self.weights = self.weights.with_missing_defaults();
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn weights(&self) -> &WeightConfig {
        &self.weights
    }

    pub fn range(&self) -> &RangeConstraint {
        &self.range
    }

    pub fn star_enabled(&self, stars: u8) -> bool {
        self.stars.get(&stars).copied().unwrap_or(true)
    }

    pub fn category_enabled(&self, category: Category) -> bool {
        self.types.get(&category).copied().unwrap_or(true)
    }

    /// Switch mode; the team size follows the mode's default.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self.size = mode.default_size();
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size.max(1);
        self
    }

    pub fn with_star(mut self, stars: u8, enabled: bool) -> Self {
        self.stars.insert(stars, enabled);
        self
    }

    pub fn with_category(mut self, category: Category, enabled: bool) -> Self {
        self.types.insert(category, enabled);
        self
    }

    pub fn with_weights(mut self, weights: WeightConfig) -> Self {
        self.weights = weights.with_missing_defaults();
        self
    }

    pub fn with_range(mut self, range: RangeConstraint) -> Self {
        self.range = range;
        self
    }

    pub fn with_effect_preset(mut self, preset: EffectPreset) -> Self {
        self.weights.effects = preset.weights();
        self
    }

    pub fn with_duplicate_preset(mut self, preset: DuplicatePreset) -> Self {
        self.weights.duplicates = preset.weights();
        self
    }

    pub fn with_range_preset(mut self, preset: RangePreset) -> Self {
        self.range = preset.apply(self.range);
        self
    }

    /// Key under which results for the current mode and size are cached.
    pub fn result_key(&self) -> String {
        result_key(self.mode, self.size)
    }

    /// Whether `champion`, whose effective power is `power`, may be a candidate.
    pub fn admits(&self, champion: &RosterChampion, power: f64) -> bool {
        self.category_enabled(champion.category)
            && self.star_enabled(champion.stars)
            && self.range.contains_champion(power)
            && self.mode.accepts_role(champion.role)
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            team_size: self.size,
            weights: self.weights.clone(),
            range: self.range,
        }
    }
}

pub fn result_key(mode: Mode, size: usize) -> String {
    format!("{mode}-{size}")
}
