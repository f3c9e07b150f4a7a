//! Team value: diversity multiplier × summed power × synergy total.
//!
//! A team without any active synergy is worth 0 whatever its power.

use crate::data::champion::Category;
use crate::optimizer::candidate::{Candidate, SynergyBonus};
use crate::optimizer::weights::DuplicateWeights;

pub fn team_power<'a>(members: impl IntoIterator<Item = &'a Candidate>) -> f64 {
    members.into_iter().map(|member| member.power).sum()
}

pub fn category_counts<'a>(members: impl IntoIterator<Item = &'a Candidate>) -> [usize; Category::COUNT] {
    let mut counts = [0; Category::COUNT];
    for member in members {
        counts[member.category.index()] += 1;
    }
    counts
}

/// Product of the duplicate weights of every category present more than once.
pub fn diversity_multiplier(counts: &[usize], duplicates: &DuplicateWeights) -> f64 {
    counts
        .iter()
        .filter(|&&count| count > 1)
        .fold(1.0, |multiplier, &count| multiplier * duplicates.weight(count))
}

/// Sum of triggered bonuses. Keyless bonuses stack; for each special key only
/// the most recently seen bonus is kept.
pub fn synergy_total<'a>(synergies: impl IntoIterator<Item = &'a SynergyBonus>) -> f64 {
    let mut stacked = 0.0;
    let mut specials: Vec<(&str, f64)> = Vec::new();
    for bonus in synergies {
        match bonus.special.as_deref() {
            None => stacked += bonus.value,
            Some(key) => match specials.iter_mut().find(|(seen, _)| *seen == key) {
                Some(slot) => slot.1 = bonus.value,
                None => specials.push((key, bonus.value)),
            },
        }
    }
    specials.iter().fold(stacked, |total, (_, value)| total + value)
}

pub fn team_value<'a>(
    members: impl IntoIterator<Item = &'a Candidate>,
    synergies: impl IntoIterator<Item = &'a SynergyBonus>,
    counts: &[usize],
    duplicates: &DuplicateWeights,
) -> f64 {
    let synergy = synergy_total(synergies);
    if synergy == 0.0 {
        return 0.0;
    }
    diversity_multiplier(counts, duplicates) * team_power(members) * synergy
}
