//! Compare sequential vs parallel Monte Carlo run times.
//!
//! Run with: `cargo bench --bench monte_carlo_parallel`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use broadside::data::ScenarioConfig;
use broadside::parallel::WorkerPool;
use broadside::simulator::{simulate_parallel, CombatSimulator};

const SKIRMISH: &str = include_str!("../scenarios/skirmish.json");

fn bench_monte_carlo_sequential_vs_parallel(c: &mut Criterion) {
    let Ok(scenario) = ScenarioConfig::from_json_str(SKIRMISH) else {
        panic!("bundled skirmish scenario must parse");
    };
    let seed = 42u64;
    let iterations = 2000;

    let mut group = c.benchmark_group("monte_carlo");
    group.sample_size(20);
    group.measurement_time(std::time::Duration::from_secs(10));

    group.bench_function("sequential", |b| {
        let mut fleets = scenario.build_fleets(seed);
        b.iter(|| black_box(CombatSimulator.simulate(&mut fleets, iterations)));
    });

    group.bench_function("parallel", |b| {
        let pool = WorkerPool::default_workers();
        b.iter(|| black_box(simulate_parallel(&scenario.fleets, iterations, seed, &pool)));
    });

    group.finish();
}

criterion_group!(benches, bench_monte_carlo_sequential_vs_parallel);
criterion_main!(benches);
