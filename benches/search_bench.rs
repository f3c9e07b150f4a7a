//! Exhaustive search throughput: teams evaluated per second for growing pools.
//!
//! Run with: `cargo bench --bench search`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use synergist::data::{Category, ChampionId};
use synergist::optimizer::{
    combination, find_best_team, Candidate, SearchConfig, SynergyBonus,
};

/// Synthetic pool: every champion synergizes with the next two, every fifth bonus special.
fn pool(size: usize) -> Vec<Candidate> {
    (0..size)
        .map(|i| {
            let mut candidate = Candidate::new(
                ChampionId::new(format!("hero{i}"), 4),
                Category::ALL[i % Category::COUNT],
                1_500.0 + (i * 37 % 400) as f64,
            );
            for offset in 1..=2 {
                let partner = (i + offset) % size;
                let bonus = if (i + offset) % 5 == 0 {
                    SynergyBonus::special(0.5, format!("hero{i}-4-idol"))
                } else {
                    SynergyBonus::plain(0.3)
                };
                candidate = candidate.with_synergy(format!("hero{partner}"), bonus);
            }
            candidate
        })
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(20);

    for (size, team_size) in [(20usize, 3usize), (30, 3), (25, 5)] {
        let candidates = pool(size);
        let config = SearchConfig {
            team_size,
            ..SearchConfig::default()
        };
        group.throughput(Throughput::Elements(combination(size, team_size)));
        group.bench_with_input(
            BenchmarkId::new(format!("k{team_size}"), size),
            &candidates,
            |b, candidates| b.iter(|| black_box(find_best_team(candidates, &config, |_, _| {}))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
