//! Static game data: the champion catalog, the synergy catalog and the effect table.
//! The optimizer only reads this; it is loaded once from `data/game.json`.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::champion::{Category, ChampionId};
use crate::data::effects::{Effect, EffectInfo, EffectTable};

pub const DEFAULT_GAME_DATA_PATH: &str = "data/game.json";

#[derive(Debug, Error)]
pub enum GameDataError {
    #[error("failed to read game data {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse game data {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogChampion {
    pub uid: String,
    pub stars: u8,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(default)]
    pub pi: u32,
}

/// One directed synergy: the `from` champion (at a given star level) grants
/// `effect` when a champion with uid `to_uid` (any star level) shares its team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyRecord {
    pub from_uid: String,
    pub from_stars: u8,
    pub to_uid: String,
    pub effect: Effect,
    pub amount: f64,
}

impl SynergyRecord {
    pub fn from_id(&self) -> ChampionId {
        ChampionId::new(self.from_uid.clone(), self.from_stars)
    }

    pub fn is_from(&self, id: &ChampionId) -> bool {
        self.from_uid == id.uid && self.from_stars == id.stars
    }

    /// Deduplication key for special effects: one per source champion and effect.
    pub fn special_key(&self) -> String {
        format!("{}-{}-{}", self.from_uid, self.from_stars, self.effect)
    }
}

/// Read access to static game data.
pub trait GameData {
    /// Full synergy catalog, in catalog order.
    fn synergies(&self) -> &[SynergyRecord];

    fn synergies_from(&self, id: &ChampionId) -> Vec<&SynergyRecord> {
        self.synergies()
            .iter()
            .filter(|synergy| synergy.is_from(id))
            .collect()
    }

    fn effect_base(&self, effect: Effect) -> f64;

    fn is_special(&self, effect: Effect) -> bool;

    fn catalog_champion(&self, id: &ChampionId) -> Option<&CatalogChampion>;

    fn catalog_pi(&self, id: &ChampionId) -> Option<u32> {
        self.catalog_champion(id).map(|champion| champion.pi)
    }
}

#[derive(Debug, Default, Deserialize)]
struct GameDataFile {
    #[serde(default)]
    champions: Vec<CatalogChampion>,
    #[serde(default)]
    synergies: Vec<SynergyRecord>,
    #[serde(default)]
    effects: BTreeMap<Effect, EffectInfo>,
}

#[derive(Debug, Clone, Default)]
pub struct StaticGameData {
    champions: HashMap<ChampionId, CatalogChampion>,
    synergies: Vec<SynergyRecord>,
    by_source: HashMap<ChampionId, Vec<usize>>,
    effects: EffectTable,
}

impl StaticGameData {
    pub fn new(
        champions: Vec<CatalogChampion>,
        synergies: Vec<SynergyRecord>,
        effects: EffectTable,
    ) -> Self {
        let champions = champions
            .into_iter()
            .map(|champion| (ChampionId::new(champion.uid.clone(), champion.stars), champion))
            .collect();
        let mut by_source: HashMap<ChampionId, Vec<usize>> = HashMap::new();
        for (index, synergy) in synergies.iter().enumerate() {
            by_source.entry(synergy.from_id()).or_default().push(index);
        }
        Self {
            champions,
            synergies,
            by_source,
            effects,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let file: GameDataFile = serde_json::from_str(raw)?;
        let effects = EffectTable::default().with_overrides(&file.effects);
        Ok(Self::new(file.champions, file.synergies, effects))
    }

    pub fn champion_count(&self) -> usize {
        self.champions.len()
    }
}

impl GameData for StaticGameData {
    fn synergies(&self) -> &[SynergyRecord] {
        &self.synergies
    }

    fn synergies_from(&self, id: &ChampionId) -> Vec<&SynergyRecord> {
        self.by_source
            .get(id)
            .map(|indices| indices.iter().map(|&index| &self.synergies[index]).collect())
            .unwrap_or_default()
    }

    fn effect_base(&self, effect: Effect) -> f64 {
        self.effects.base(effect)
    }

    fn is_special(&self, effect: Effect) -> bool {
        self.effects.is_special(effect)
    }

    fn catalog_champion(&self, id: &ChampionId) -> Option<&CatalogChampion> {
        self.champions.get(id)
    }
}

pub fn load_game_data(path: impl AsRef<Path>) -> Result<StaticGameData, GameDataError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| GameDataError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let data = StaticGameData::from_json_str(&raw).map_err(|source| GameDataError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        champions = data.champion_count(),
        synergies = data.synergies.len(),
        "loaded game data"
    );
    Ok(data)
}
