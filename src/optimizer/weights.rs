//! Weight configuration, range constraints and their named presets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::effects::Effect;

/// Multipliers applied to the diversity term when several team members share a
/// category. Counts above five use the five-count weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateWeights {
    #[serde(rename = "2")]
    pub two: f64,
    #[serde(rename = "3")]
    pub three: f64,
    #[serde(rename = "4")]
    pub four: f64,
    #[serde(rename = "5")]
    pub five: f64,
}

impl Default for DuplicateWeights {
    fn default() -> Self {
        DuplicatePreset::Balanced.weights()
    }
}

impl DuplicateWeights {
    pub fn uniform(weight: f64) -> Self {
        Self {
            two: weight,
            three: weight,
            four: weight,
            five: weight,
        }
    }

    pub fn weight(&self, count: usize) -> f64 {
        match count {
            0 | 1 => 1.0,
            2 => self.two,
            3 => self.three,
            4 => self.four,
            _ => self.five,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    pub effects: BTreeMap<Effect, f64>,
    pub duplicates: DuplicateWeights,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            effects: EffectPreset::Offensive.weights(),
            duplicates: DuplicateWeights::default(),
        }
    }
}

impl WeightConfig {
    /// Weight for `effect`; effects without a configured weight contribute nothing.
    pub fn effect(&self, effect: Effect) -> f64 {
        self.effects.get(&effect).copied().unwrap_or(0.0)
    }

    pub fn with_effect(mut self, effect: Effect, weight: f64) -> Self {
        self.effects.insert(effect, weight);
        self
    }

    pub fn with_duplicates(mut self, duplicates: DuplicateWeights) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Fill effects missing from a stored configuration with the default weights,
    /// leaving the ones present untouched.
    pub fn with_missing_defaults(mut self) -> Self {
        for (effect, weight) in EffectPreset::Offensive.weights() {
            self.effects.entry(effect).or_insert(weight);
        }
        self
    }
}

/// Inclusive power bounds. Champion bounds filter the pool before a search;
/// team bounds zero the value of any team whose summed power falls outside them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RangeConstraint {
    pub minimum_champion: f64,
    pub maximum_champion: f64,
    pub minimum_team: f64,
    pub maximum_team: f64,
}

impl Default for RangeConstraint {
    fn default() -> Self {
        Self {
            minimum_champion: 0.0,
            maximum_champion: 10_000.0,
            minimum_team: 0.0,
            maximum_team: 50_000.0,
        }
    }
}

impl RangeConstraint {
    pub fn unbounded() -> Self {
        Self {
            minimum_champion: f64::NEG_INFINITY,
            maximum_champion: f64::INFINITY,
            minimum_team: f64::NEG_INFINITY,
            maximum_team: f64::INFINITY,
        }
    }

    pub fn contains_champion(&self, power: f64) -> bool {
        self.minimum_champion <= power && power <= self.maximum_champion
    }

    pub fn contains_team(&self, power: f64) -> bool {
        self.minimum_team <= power && power <= self.maximum_team
    }
}

macro_rules! named_preset {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|preset| preset.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| format!("unknown {} preset '{s}'", stringify!($name)))
            }
        }
    };
}

named_preset!(EffectPreset {
    Offensive => "offensive",
    Balanced => "balanced",
    Defensive => "defensive",
});

named_preset!(DuplicatePreset {
    All => "all",
    Balanced => "balanced",
    None => "none",
});

named_preset!(RangePreset {
    All => "all",
    Streak => "streak",
});

impl EffectPreset {
    pub fn weights(self) -> BTreeMap<Effect, f64> {
        use Effect::*;
        let table: [(Effect, f64, f64, f64); 16] = [
            // (effect, offensive, balanced, defensive)
            (Attack, 0.6, 0.5, 0.1),
            (Idol, 0.6, 0.5, 0.3),
            (Inseparable, 0.6, 0.5, 0.1),
            (MutantAgenda, 0.6, 0.5, 0.1),
            (CritRate, 0.4, 0.5, 0.1),
            (CritDamage, 0.4, 0.5, 0.1),
            (Stun, 0.5, 0.5, 0.5),
            (PowerGain, 0.2, 0.5, 0.3),
            (PowerSteal, 0.2, 0.5, 0.3),
            (PerfectBlock, 0.1, 0.5, 0.8),
            (Block, 0.1, 0.5, 0.7),
            (Armor, 0.1, 0.5, 0.7),
            (Health, 0.1, 0.5, 0.5),
            (HealthSteal, 0.2, 0.5, 0.5),
            (HeroesForHire, 0.2, 0.5, 0.5),
            (Thunderbolts, 0.2, 0.5, 0.6),
        ];
        table
            .into_iter()
            .map(|(effect, offensive, balanced, defensive)| {
                let weight = match self {
                    EffectPreset::Offensive => offensive,
                    EffectPreset::Balanced => balanced,
                    EffectPreset::Defensive => defensive,
                };
                (effect, weight)
            })
            .collect()
    }
}

impl DuplicatePreset {
    pub fn weights(self) -> DuplicateWeights {
        match self {
            DuplicatePreset::All => DuplicateWeights::uniform(1.0),
            DuplicatePreset::Balanced => DuplicateWeights {
                two: 0.8,
                three: 0.4,
                four: 0.2,
                five: 0.1,
            },
            DuplicatePreset::None => DuplicateWeights::uniform(0.0),
        }
    }
}

impl RangePreset {
    /// Apply the preset over `range`. The streak preset only narrows the team bounds.
    pub fn apply(self, range: RangeConstraint) -> RangeConstraint {
        match self {
            RangePreset::All => RangeConstraint::default(),
            RangePreset::Streak => RangeConstraint {
                minimum_team: 4_000.0,
                maximum_team: 4_500.0,
                ..range
            },
        }
    }
}
