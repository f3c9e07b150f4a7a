//! Synergy effect identifiers and their base magnitudes.
//!
//! A synergy's raw amount is divided by its effect's base magnitude so that weights
//! for different effects are comparable: a weight of 1.0 on any effect turns a
//! "typical" bonus of that effect into a contribution of 1.0.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Attack,
    Idol,
    Inseparable,
    MutantAgenda,
    CritRate,
    CritDamage,
    Stun,
    PowerGain,
    PowerSteal,
    PerfectBlock,
    Block,
    Armor,
    Health,
    HealthSteal,
    HeroesForHire,
    Thunderbolts,
}

impl Effect {
    pub const ALL: [Effect; 16] = [
        Effect::Attack,
        Effect::Idol,
        Effect::Inseparable,
        Effect::MutantAgenda,
        Effect::CritRate,
        Effect::CritDamage,
        Effect::Stun,
        Effect::PowerGain,
        Effect::PowerSteal,
        Effect::PerfectBlock,
        Effect::Block,
        Effect::Armor,
        Effect::Health,
        Effect::HealthSteal,
        Effect::HeroesForHire,
        Effect::Thunderbolts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Idol => "idol",
            Self::Inseparable => "inseparable",
            Self::MutantAgenda => "mutantagenda",
            Self::CritRate => "critrate",
            Self::CritDamage => "critdamage",
            Self::Stun => "stun",
            Self::PowerGain => "powergain",
            Self::PowerSteal => "powersteal",
            Self::PerfectBlock => "perfectblock",
            Self::Block => "block",
            Self::Armor => "armor",
            Self::Health => "health",
            Self::HealthSteal => "healthsteal",
            Self::HeroesForHire => "heroesforhire",
            Self::Thunderbolts => "thunderbolts",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Effect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Effect::ALL
            .into_iter()
            .find(|effect| effect.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown effect '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectInfo {
    pub base: f64,
    /// Special (team-named) effects apply once per source champion, however
    /// many partners trigger them.
    #[serde(default)]
    pub special: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectTable {
    effects: BTreeMap<Effect, EffectInfo>,
}

impl Default for EffectTable {
    fn default() -> Self {
        let entries = [
            (Effect::Attack, 6.0, false),
            (Effect::Idol, 3.0, true),
            (Effect::Inseparable, 5.0, true),
            (Effect::MutantAgenda, 8.0, true),
            (Effect::CritRate, 5.0, false),
            (Effect::CritDamage, 15.0, false),
            (Effect::Stun, 15.0, false),
            (Effect::PowerGain, 3.0, false),
            (Effect::PowerSteal, 4.0, false),
            (Effect::PerfectBlock, 10.0, false),
            (Effect::Block, 10.0, false),
            (Effect::Armor, 4.0, false),
            (Effect::Health, 4.0, false),
            (Effect::HealthSteal, 4.0, false),
            (Effect::HeroesForHire, 3.0, true),
            (Effect::Thunderbolts, 3.0, true),
        ];
        Self {
            effects: entries
                .into_iter()
                .map(|(effect, base, special)| (effect, EffectInfo { base, special }))
                .collect(),
        }
    }
}

impl EffectTable {
    /// Overlay entries from a data file on top of the built-in table.
    pub fn with_overrides(mut self, overrides: &BTreeMap<Effect, EffectInfo>) -> Self {
        for (effect, info) in overrides {
            self.effects.insert(*effect, *info);
        }
        self
    }

    /// Base magnitude used to normalize a raw synergy amount. Missing or
    /// non-positive bases normalize by 1.
    pub fn base(&self, effect: Effect) -> f64 {
        self.effects
            .get(&effect)
            .map(|info| info.base)
            .filter(|base| *base > 0.0)
            .unwrap_or(1.0)
    }

    pub fn is_special(&self, effect: Effect) -> bool {
        self.effects.get(&effect).is_some_and(|info| info.special)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_every_effect() {
        let table = EffectTable::default();
        for effect in Effect::ALL {
            assert!(table.base(effect) > 0.0, "{effect} has no base");
        }
        assert!(table.is_special(Effect::Idol));
        assert!(!table.is_special(Effect::Attack));
    }

    #[test]
    fn overrides_replace_builtin_entries() {
        let mut overrides = BTreeMap::new();
        overrides.insert(Effect::Attack, EffectInfo { base: 0.0, special: true });
        let table = EffectTable::default().with_overrides(&overrides);
        assert_eq!(table.base(Effect::Attack), 1.0);
        assert!(table.is_special(Effect::Attack));
    }

    #[test]
    fn effect_names_parse_case_insensitively() {
        assert_eq!("MutantAgenda".parse::<Effect>(), Ok(Effect::MutantAgenda));
        assert!("lifesteal".parse::<Effect>().is_err());
    }
}
