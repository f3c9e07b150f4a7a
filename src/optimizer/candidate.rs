//! Engine-facing candidates: roster champions reduced to identity, category,
//! power and weighted synergy bonuses keyed by partner uid.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::champion::{Category, ChampionId, RosterChampion};
use crate::data::game_data::GameData;
use crate::optimizer::weights::WeightConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyBonus {
    pub value: f64,
    /// Bonuses sharing a key count once per team.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<String>,
}

impl SynergyBonus {
    pub fn plain(value: f64) -> Self {
        Self {
            value,
            special: None,
        }
    }

    pub fn special(value: f64, key: impl Into<String>) -> Self {
        Self {
            value,
            special: Some(key.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: ChampionId,
    pub category: Category,
    pub power: f64,
    /// Bonus granted when the champion with this uid (any star level) is on the team.
    #[serde(default)]
    pub synergies: HashMap<String, SynergyBonus>,
}

impl Candidate {
    pub fn new(id: ChampionId, category: Category, power: f64) -> Self {
        Self {
            id,
            category,
            power,
            synergies: HashMap::new(),
        }
    }

    pub fn with_synergy(mut self, partner_uid: impl Into<String>, bonus: SynergyBonus) -> Self {
        self.synergies.insert(partner_uid.into(), bonus);
        self
    }

    /// Bonus this candidate grants when teamed with `partner`.
    pub fn bonus_with(&self, partner: &Candidate) -> Option<&SynergyBonus> {
        self.synergies.get(&partner.id.uid)
    }
}

/// Power used for a roster champion: the user's value when set, otherwise the catalog's.
pub fn champion_power(champion: &RosterChampion, game_data: &dyn GameData) -> f64 {
    if champion.pi > 0 {
        return f64::from(champion.pi);
    }
    game_data
        .catalog_pi(&champion.id())
        .map(f64::from)
        .unwrap_or(0.0)
}

/// Build engine candidates in roster order. Each synergy's value is
/// `weight(effect) * amount / base(effect)`; special effects get the key
/// `"{from_uid}-{from_stars}-{effect}"`. When the catalog lists several synergies
/// towards the same partner, the last one wins.
pub fn build_candidates(
    champions: &[&RosterChampion],
    game_data: &dyn GameData,
    weights: &WeightConfig,
) -> Vec<Candidate> {
    champions
        .iter()
        .map(|champion| {
            let id = champion.id();
            let mut candidate = Candidate::new(
                id.clone(),
                champion.category,
                champion_power(champion, game_data),
            );
            for synergy in game_data.synergies_from(&id) {
                let value = weights.effect(synergy.effect) * synergy.amount
                    / game_data.effect_base(synergy.effect);
                let special = game_data
                    .is_special(synergy.effect)
                    .then(|| synergy.special_key());
                candidate
                    .synergies
                    .insert(synergy.to_uid.clone(), SynergyBonus { value, special });
            }
            candidate
        })
        .collect()
}
