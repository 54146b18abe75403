//! Single-game and weekly evolution throughput.
//!
//! Run with: cargo bench --package hoops_core
//!
//! This will generate HTML reports in target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use chrono::NaiveDate;
use hoops_core::engine::test_fixtures::{splash_team, uniform_team};
use hoops_core::{BadgeCatalog, CampaignContext, Player, PlayerEvolutionEngine, SimConfig, simulate_game};

fn bench_single_game(c: &mut Criterion) {
    let home = splash_team(1, "Home", 76);
    let away = uniform_team(2, "Away", 74);
    let catalog = BadgeCatalog::builtin();
    let mut group = c.benchmark_group("single_game");

    for (name, config) in [
        ("realistic", SimConfig::realistic()),
        ("fast_paced", SimConfig::fast_paced()),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, config| {
            let mut seed = 0u64;
            b.iter(|| {
                seed += 1;
                let result =
                    simulate_game(1, &home, &away, black_box(seed), config, catalog.clone());
                black_box(result)
            });
        });
    }

    group.finish();
}

fn bench_weekly_evolution(c: &mut Criterion) {
    let config = SimConfig::default();
    let engine = PlayerEvolutionEngine::new(&config.evolution);
    let ctx = CampaignContext::new(2025, NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(), 9);
    let league: Vec<Player> =
        (1..=30).flat_map(|id| uniform_team(id, "T", 72).roster).collect();

    c.bench_function("weekly_evolution_300_players", |b| {
        b.iter(|| {
            let mut players = league.clone();
            black_box(engine.evolve_week(&mut players, &ctx))
        });
    });
}

criterion_group!(benches, bench_single_game, bench_weekly_evolution);
criterion_main!(benches);
