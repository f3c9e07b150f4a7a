use std::ops::ControlFlow;

use synergist::data::{Category, ChampionId};
use synergist::optimizer::scoring::{category_counts, team_power, team_value};
use synergist::optimizer::{
    combination, find_best_team, find_best_team_until, Candidate, DuplicateWeights,
    RangeConstraint, SearchConfig, SynergyBonus, WeightConfig,
};

fn candidate(uid: &str, category: Category, power: f64) -> Candidate {
    Candidate::new(ChampionId::new(uid, 3), category, power)
}

fn config(team_size: usize) -> SearchConfig {
    SearchConfig {
        team_size,
        weights: WeightConfig::default().with_duplicates(DuplicateWeights::uniform(1.0)),
        range: RangeConstraint::unbounded(),
    }
}

/// Small deterministic generator so pools are reproducible without extra crates.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

fn generated_pool(seed: u64, size: usize) -> Vec<Candidate> {
    let mut rng = Lcg(seed);
    let mut pool: Vec<Candidate> = (0..size)
        .map(|i| {
            candidate(
                &format!("hero{i}"),
                Category::ALL[rng.below(Category::COUNT as u64) as usize],
                100.0 + rng.below(900) as f64,
            )
        })
        .collect();
    for i in 0..size {
        for j in 0..size {
            if i == j || rng.below(3) != 0 {
                continue;
            }
            let value = 0.25 + rng.below(8) as f64 * 0.25;
            let bonus = match rng.below(4) {
                0 => SynergyBonus::special(value, format!("hero{i}-3-idol")),
                1 => SynergyBonus::special(value, "shared-key"),
                _ => SynergyBonus::plain(value),
            };
            let partner = format!("hero{j}");
            pool[i].synergies.insert(partner, bonus);
        }
    }
    pool
}

/// Copy-on-extend reference: every subset is rebuilt from scratch with fresh
/// accumulators, bonuses collected in the same order the search triggers them.
fn reference_best(pool: &[Candidate], config: &SearchConfig) -> Option<(Vec<ChampionId>, f64)> {
    fn visit(
        pool: &[Candidate],
        config: &SearchConfig,
        index: usize,
        chosen: Vec<usize>,
        bonuses: Vec<SynergyBonus>,
        best: &mut Option<(Vec<usize>, f64)>,
    ) {
        if chosen.len() == config.team_size {
            let members: Vec<&Candidate> = chosen.iter().map(|&i| &pool[i]).collect();
            let power = team_power(members.iter().copied());
            let value = if power != 0.0 && config.range.contains_team(power) {
                let counts = category_counts(members.iter().copied());
                team_value(members.iter().copied(), bonuses.iter(), &counts, &config.weights.duplicates)
            } else {
                0.0
            };
            let improves = match best {
                None => !value.is_nan(),
                Some((_, best_value)) => value > *best_value,
            };
            if improves {
                *best = Some((chosen, value));
            }
            return;
        }
        if pool.len() - index < config.team_size - chosen.len() {
            return;
        }

        let next = &pool[index];
        let mut extended_bonuses = bonuses.clone();
        for &member in &chosen {
            if let Some(bonus) = pool[member].bonus_with(next) {
                extended_bonuses.push(bonus.clone());
            }
            if let Some(bonus) = next.bonus_with(&pool[member]) {
                extended_bonuses.push(bonus.clone());
            }
        }
        let mut extended = chosen.clone();
        extended.push(index);
        visit(pool, config, index + 1, extended, extended_bonuses, best);
        visit(pool, config, index + 1, chosen, bonuses, best);
    }

    if pool.len() < config.team_size {
        return None;
    }
    let mut best = None;
    visit(pool, config, 0, Vec::new(), Vec::new(), &mut best);
    best.filter(|(_, value)| *value > 0.0).map(|(members, value)| {
        (members.iter().map(|&i| pool[i].id.clone()).collect(), value)
    })
}

#[test]
fn single_synergy_pair_wins() {
    let pool = vec![
        candidate("a", Category::Cosmic, 1.0).with_synergy("b", SynergyBonus::plain(10.0)),
        candidate("b", Category::Tech, 1.0),
        candidate("c", Category::Mutant, 1.0),
        candidate("d", Category::Skill, 1.0),
    ];
    let best = find_best_team(&pool, &config(2), |_, _| {}).expect("a team scores");
    assert_eq!(best.ids, vec![ChampionId::new("a", 3), ChampionId::new("b", 3)]);
    assert_eq!(best.value, 20.0);
}

#[test]
fn undersized_pool_returns_nothing_and_reports_no_progress() {
    let pool = vec![
        candidate("a", Category::Cosmic, 1.0).with_synergy("b", SynergyBonus::plain(1.0)),
        candidate("b", Category::Tech, 1.0),
    ];
    let mut ticks = 0;
    let best = find_best_team(&pool, &config(3), |_, _| ticks += 1);
    assert_eq!(best, None);
    assert_eq!(ticks, 0);
}

#[test]
fn pool_of_exactly_team_size_scores_the_whole_pool() {
    let pool = vec![
        candidate("a", Category::Cosmic, 300.0).with_synergy("b", SynergyBonus::plain(1.5)),
        candidate("b", Category::Cosmic, 200.0).with_synergy("c", SynergyBonus::plain(0.5)),
        candidate("c", Category::Science, 100.0),
    ];
    let mut config = config(3);
    config.weights.duplicates = DuplicateWeights::uniform(0.8);

    let mut ticks = Vec::new();
    let best = find_best_team(&pool, &config, |current, max| ticks.push((current, max)))
        .expect("a team scores");
    assert_eq!(ticks, vec![(1, 1)]);
    assert_eq!(best.ids.len(), 3);
    assert_eq!(best.value, 0.8 * 600.0 * 2.0);
}

#[test]
fn progress_ticks_once_per_team_up_to_the_combination_count() {
    let pool = generated_pool(7, 9);
    let mut seen = Vec::new();
    find_best_team(&pool, &config(4), |current, max| seen.push((current, max)));

    let total = combination(9, 4);
    assert_eq!(total, 126);
    assert_eq!(seen.len() as u64, total);
    for (index, (current, max)) in seen.iter().enumerate() {
        assert_eq!(*current, index as u64 + 1);
        assert_eq!(*max, total);
    }
}

#[test]
fn search_is_deterministic() {
    let pool = generated_pool(42, 12);
    let first = find_best_team(&pool, &config(3), |_, _| {});
    let second = find_best_team(&pool, &config(3), |_, _| {});
    assert_eq!(first, second);
}

#[test]
fn stack_search_matches_copy_on_extend_reference() {
    for seed in 1..=12 {
        for team_size in 1..=4 {
            let pool = generated_pool(seed, 9);
            let mut config = config(team_size);
            config.weights.duplicates = DuplicateWeights {
                two: 0.9,
                three: 0.7,
                four: 0.5,
                five: 0.3,
            };
            let found = find_best_team(&pool, &config, |_, _| {})
                .map(|best| (best.ids, best.value));
            assert_eq!(found, reference_best(&pool, &config), "seed {seed}, k {team_size}");
        }
    }
}

#[test]
fn special_bonus_counts_once_regardless_of_order() {
    let build = |order: &[usize]| {
        let all = [
            candidate("x", Category::Cosmic, 10.0).with_synergy("y", SynergyBonus::special(2.0, "idol")),
            candidate("y", Category::Tech, 10.0).with_synergy("z", SynergyBonus::special(2.0, "idol")),
            candidate("z", Category::Mutant, 10.0).with_synergy("x", SynergyBonus::special(2.0, "idol")),
        ];
        order.iter().map(|&i| all[i].clone()).collect::<Vec<_>>()
    };
    for order in [[0, 1, 2], [2, 1, 0], [1, 0, 2]] {
        let best = find_best_team(&build(&order), &config(3), |_, _| {}).expect("a team scores");
        assert_eq!(best.value, 30.0 * 2.0, "order {order:?}");
    }
}

#[test]
fn teams_outside_the_power_range_are_worth_nothing() {
    let pool = vec![
        candidate("big", Category::Cosmic, 5_000.0).with_synergy("huge", SynergyBonus::plain(5.0)),
        candidate("huge", Category::Tech, 5_000.0),
        candidate("small", Category::Mutant, 1_000.0).with_synergy("tiny", SynergyBonus::plain(1.0)),
        candidate("tiny", Category::Skill, 1_000.0),
    ];
    let mut config = config(2);
    config.range = RangeConstraint {
        minimum_champion: 0.0,
        maximum_champion: 10_000.0,
        minimum_team: 0.0,
        maximum_team: 4_000.0,
    };
    let best = find_best_team(&pool, &config, |_, _| {}).expect("the small pair fits");
    assert_eq!(best.ids, vec![ChampionId::new("small", 3), ChampionId::new("tiny", 3)]);
    assert_eq!(best.value, 2_000.0);
}

#[test]
fn teams_without_synergy_yield_no_result() {
    let pool = vec![
        candidate("a", Category::Cosmic, 100.0),
        candidate("b", Category::Tech, 100.0),
        candidate("c", Category::Mutant, 100.0),
    ];
    assert_eq!(find_best_team(&pool, &config(2), |_, _| {}), None);
}

#[test]
fn breaking_from_progress_stops_without_a_result() {
    let pool = generated_pool(3, 10);
    let mut ticks = 0;
    let outcome = find_best_team_until(&pool, &config(3), |current, _| {
        ticks += 1;
        if current >= 10 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    assert!(outcome.is_err());
    assert_eq!(ticks, 10);
}
