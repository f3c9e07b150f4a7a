//! Exhaustive best-team search.
//!
//! Enumerates every `k`-subset of the ordered candidate list depth first, taking
//! the "include candidate i" branch before the "skip candidate i" branch. Running
//! category counts and triggered bonuses live on a single stack that is pushed on
//! descent and truncated on backtrack, so no partial team is ever copied.
//!
//! Ties are broken by enumeration order: a later leaf replaces the best one only
//! when it is strictly better.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use crate::data::champion::{Category, ChampionId};
use crate::optimizer::candidate::{Candidate, SynergyBonus};
use crate::optimizer::scoring::{team_power, team_value};
use crate::optimizer::SearchConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestTeam {
    pub ids: Vec<ChampionId>,
    pub value: f64,
}

/// Best team found, or `None` when the pool is smaller than the team size or no
/// team scores above zero.
pub type SearchResult = Option<BestTeam>;

/// Returned by [find_best_team_until] when the progress sink asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stopped;

/// Number of `k`-subsets of `n` items, saturating at `u64::MAX`.
pub fn combination(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k) as u128;
    let n = n as u128;
    let mut result: u128 = 1;
    for i in 0..k {
        result = result * (n - i) / (i + 1);
        if result > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    result as u64
}

/// Run the search to completion. `on_progress(current, total)` is called once per
/// evaluated team, `total` being `C(candidates.len(), team_size)`.
pub fn find_best_team<F>(candidates: &[Candidate], config: &SearchConfig, mut on_progress: F) -> SearchResult
where
    F: FnMut(u64, u64),
{
    find_best_team_until(candidates, config, |current, total| {
        on_progress(current, total);
        ControlFlow::Continue(())
    })
    .unwrap_or_default()
}

/// Like [find_best_team], but the progress sink may return `Break` to abandon the
/// search; nothing is returned for an abandoned search.
pub fn find_best_team_until<F>(
    candidates: &[Candidate],
    config: &SearchConfig,
    on_progress: F,
) -> Result<SearchResult, Stopped>
where
    F: FnMut(u64, u64) -> ControlFlow<()>,
{
    if candidates.len() < config.team_size {
        return Ok(None);
    }

    let mut search = Search {
        candidates,
        config,
        stack: TeamStack::with_capacity(config.team_size),
        current: 0,
        total: combination(candidates.len(), config.team_size),
        best: None,
        on_progress,
        stopped: false,
    };
    search.explore(0);

    if search.stopped {
        return Err(Stopped);
    }
    tracing::debug!(
        evaluated = search.current,
        total = search.total,
        best = search.best.as_ref().map(|leaf| leaf.value),
        "search finished"
    );

    Ok(search
        .best
        .filter(|leaf| leaf.value > 0.0)
        .map(|leaf| BestTeam {
            ids: leaf
                .members
                .iter()
                .map(|&index| candidates[index].id.clone())
                .collect(),
            value: leaf.value,
        }))
}

/// Partial team: chosen candidate indices, category counts and the bonuses their
/// pairs trigger, in trigger order.
struct TeamStack<'a> {
    members: Vec<usize>,
    counts: [usize; Category::COUNT],
    synergies: Vec<&'a SynergyBonus>,
}

impl<'a> TeamStack<'a> {
    fn with_capacity(team_size: usize) -> Self {
        Self {
            members: Vec::with_capacity(team_size),
            counts: [0; Category::COUNT],
            synergies: Vec::new(),
        }
    }

    /// Add `candidates[index]`, triggering its bonuses with every current member in
    /// both directions. Returns the mark to hand back to [TeamStack::pop].
    fn push(&mut self, candidates: &'a [Candidate], index: usize) -> usize {
        let mark = self.synergies.len();
        let next = &candidates[index];
        for &member_index in &self.members {
            let member = &candidates[member_index];
            if let Some(bonus) = member.bonus_with(next) {
                self.synergies.push(bonus);
            }
            if let Some(bonus) = next.bonus_with(member) {
                self.synergies.push(bonus);
            }
        }
        self.members.push(index);
        self.counts[next.category.index()] += 1;
        mark
    }

    fn pop(&mut self, candidates: &[Candidate], mark: usize) {
        if let Some(index) = self.members.pop() {
            self.counts[candidates[index].category.index()] -= 1;
        }
        self.synergies.truncate(mark);
    }
}

struct Leaf {
    members: Vec<usize>,
    value: f64,
}

struct Search<'a, F> {
    candidates: &'a [Candidate],
    config: &'a SearchConfig,
    stack: TeamStack<'a>,
    current: u64,
    total: u64,
    best: Option<Leaf>,
    on_progress: F,
    stopped: bool,
}

impl<'a, F> Search<'a, F>
where
    F: FnMut(u64, u64) -> ControlFlow<()>,
{
    fn explore(&mut self, index: usize) {
        if self.stopped {
            return;
        }
        if self.stack.members.len() == self.config.team_size {
            self.evaluate_leaf();
            return;
        }
        // Not enough candidates left to fill the team: no leaf below this node.
        let missing = self.config.team_size - self.stack.members.len();
        if self.candidates.len() - index < missing {
            return;
        }

        let mark = self.stack.push(self.candidates, index);
        self.explore(index + 1);
        self.stack.pop(self.candidates, mark);

        self.explore(index + 1);
    }

    fn evaluate_leaf(&mut self) {
        let candidates = self.candidates;
        let members = || self.stack.members.iter().map(|&index| &candidates[index]);

        let power = team_power(members());
        let value = if power != 0.0 && self.config.range.contains_team(power) {
            team_value(
                members(),
                self.stack.synergies.iter().copied(),
                &self.stack.counts,
                &self.config.weights.duplicates,
            )
        } else {
            0.0
        };

        let improves = match &self.best {
            None => !value.is_nan(),
            Some(best) => value > best.value,
        };
        if improves {
            self.best = Some(Leaf {
                members: self.stack.members.clone(),
                value,
            });
        }

        self.current += 1;
        if (self.on_progress)(self.current, self.total).is_break() {
            self.stopped = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::weights::{DuplicateWeights, RangeConstraint, WeightConfig};

    fn config(team_size: usize) -> SearchConfig {
        SearchConfig {
            team_size,
            weights: WeightConfig::default().with_duplicates(DuplicateWeights::uniform(1.0)),
            range: RangeConstraint::unbounded(),
        }
    }

    fn pool(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| {
                let category = Category::ALL[i % Category::COUNT];
                let mut candidate = Candidate::new(ChampionId::new(format!("c{i}"), 3), category, 1.0 + i as f64);
                if i + 1 < n {
                    candidate = candidate.with_synergy(format!("c{}", i + 1), SynergyBonus::plain(1.0));
                }
                candidate
            })
            .collect()
    }

    #[test]
    fn combination_matches_known_values() {
        assert_eq!(combination(4, 2), 6);
        assert_eq!(combination(10, 0), 1);
        assert_eq!(combination(2, 3), 0);
        assert_eq!(combination(30, 5), 142_506);
        assert_eq!(combination(200, 100), u64::MAX);
    }

    #[test]
    fn stack_pop_restores_previous_state() {
        let candidates = pool(4);
        let mut stack = TeamStack::with_capacity(3);
        let first = stack.push(&candidates, 0);
        let before_counts = stack.counts;
        let before_synergies = stack.synergies.len();
        let second = stack.push(&candidates, 1);
        assert_eq!(stack.synergies.len(), 1);
        stack.pop(&candidates, second);
        assert_eq!(stack.counts, before_counts);
        assert_eq!(stack.synergies.len(), before_synergies);
        assert_eq!(stack.members, vec![0]);
        stack.pop(&candidates, first);
        assert!(stack.members.is_empty());
        assert_eq!(stack.counts, [0; Category::COUNT]);
    }

    #[test]
    fn large_teams_reserve_no_synergy_slots_up_front() {
        let team_size = 1 << 20;
        let stack = TeamStack::with_capacity(team_size);
        assert!(stack.members.capacity() >= team_size);
        assert_eq!(stack.synergies.capacity(), 0);
    }

    #[test]
    fn stop_request_abandons_search() {
        let candidates = pool(8);
        let mut ticks = 0;
        let outcome = find_best_team_until(&candidates, &config(3), |current, _| {
            ticks += 1;
            if current == 5 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(outcome, Err(Stopped));
        assert_eq!(ticks, 5);
    }

    #[test]
    fn ties_keep_the_first_enumerated_team() {
        let candidates = vec![
            Candidate::new(ChampionId::new("a", 3), Category::Tech, 1.0)
                .with_synergy("b", SynergyBonus::plain(1.0)),
            Candidate::new(ChampionId::new("b", 3), Category::Mutant, 1.0),
            Candidate::new(ChampionId::new("c", 3), Category::Skill, 1.0)
                .with_synergy("d", SynergyBonus::plain(1.0)),
            Candidate::new(ChampionId::new("d", 3), Category::Mystic, 1.0),
        ];
        let best = find_best_team(&candidates, &config(2), |_, _| {}).expect("a team scores");
        assert_eq!(best.ids, vec![ChampionId::new("a", 3), ChampionId::new("b", 3)]);
    }
}
