use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::combat::rng::mix_seed;
use crate::combat::{Fleet, GauntletResult, MultiBattle, ShipType, SimulationError};
use crate::data::scenario::FleetConfig;
use crate::parallel::{fixed_size_batches, WorkerPool};

/// Iterations handled by one parallel batch. Batch boundaries, and with them the
/// dice, depend only on the iteration count, never on the worker count.
pub const ITERATIONS_PER_BATCH: usize = 250;

/// Aggregate outcome of many gauntlets. Keys are fleet names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub iterations: u64,
    pub victory_probability: BTreeMap<String, f64>,
    pub draw_probability: f64,
    /// Mean surviving ships per type, counted over the gauntlets the fleet won.
    pub expected_survivors: BTreeMap<String, BTreeMap<ShipType, f64>>,
}

impl SimulationResult {
    /// Sum of every victory probability plus the draw probability; 1 up to rounding.
    pub fn probability_total(&self) -> f64 {
        self.victory_probability.values().sum::<f64>() + self.draw_probability
    }
}

/// Raw counts for a run of gauntlets; batches merge these before dividing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub iterations: u64,
    pub draws: u64,
    pub wins: BTreeMap<String, u64>,
    pub survivors: BTreeMap<String, BTreeMap<ShipType, u64>>,
}

impl Tally {
    /// Empty tally with every fleet listed, so fleets that never win still report 0.
    pub fn for_fleets<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tally = Self::default();
        for name in names {
            tally.wins.entry(name.to_string()).or_insert(0);
            tally.survivors.entry(name.to_string()).or_default();
        }
        tally
    }

    pub fn record(&mut self, fleets: &[Fleet], gauntlet: &GauntletResult) {
        self.iterations += 1;
        let Some(winner) = gauntlet.survivor.and_then(|index| fleets.get(index)) else {
            self.draws += 1;
            return;
        };
        *self.wins.entry(winner.name().to_string()).or_insert(0) += 1;
        let by_type = self.survivors.entry(winner.name().to_string()).or_default();
        for ship in winner.living_ships() {
            *by_type.entry(ship.ship_type).or_insert(0) += 1;
        }
    }

    pub fn merge(&mut self, other: Tally) {
        self.iterations += other.iterations;
        self.draws += other.draws;
        for (name, wins) in other.wins {
            *self.wins.entry(name).or_insert(0) += wins;
        }
        for (name, by_type) in other.survivors {
            let ours = self.survivors.entry(name).or_default();
            for (ship_type, count) in by_type {
                *ours.entry(ship_type).or_insert(0) += count;
            }
        }
    }

    pub fn finish(self) -> SimulationResult {
        let total = self.iterations.max(1) as f64;
        let victory_probability = self
            .wins
            .iter()
            .map(|(name, &wins)| (name.clone(), wins as f64 / total))
            .collect();
        let expected_survivors = self
            .survivors
            .into_iter()
            .map(|(name, by_type)| {
                let wins = self.wins.get(&name).copied().unwrap_or(0);
                let means = if wins == 0 {
                    BTreeMap::new()
                } else {
                    by_type
                        .into_iter()
                        .map(|(ship_type, count)| (ship_type, count as f64 / wins as f64))
                        .collect()
                };
                (name, means)
            })
            .collect();

        SimulationResult {
            iterations: self.iterations,
            victory_probability,
            draw_probability: self.draws as f64 / total,
            expected_survivors,
        }
    }
}

/// Sequential Monte Carlo over a caller-owned fleet list. Damage is reset before
/// every gauntlet; the ships' own dice carry on between iterations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatSimulator;

impl CombatSimulator {
    pub fn simulate(
        &self,
        fleets: &mut [Fleet],
        iterations: u32,
    ) -> Result<SimulationResult, SimulationError> {
        check_inputs(fleets.len(), iterations)?;
        let names: Vec<String> = fleets.iter().map(|fleet| fleet.name().to_string()).collect();
        let mut tally = Tally::for_fleets(names.iter().map(String::as_str));
        run_gauntlets(fleets, u64::from(iterations), &mut tally)?;
        let result = tally.finish();
        log_summary(&result);
        Ok(result)
    }
}

/// Parallel Monte Carlo: iterations are split into batches, each batch builds its
/// own fleets from `configs` with dice seeded from `seed` and the batch index, and
/// the per-batch tallies are merged.
pub fn simulate_parallel(
    configs: &[FleetConfig],
    iterations: u32,
    seed: u64,
    pool: &WorkerPool,
) -> Result<SimulationResult, SimulationError> {
    check_inputs(configs.len(), iterations)?;
    let ranges = fixed_size_batches(iterations as usize, ITERATIONS_PER_BATCH);
    debug!(
        batches = ranges.len(),
        workers = pool.workers,
        "starting parallel simulation"
    );

    let tallies: Vec<Result<Tally, SimulationError>> = pool.install(|| {
        ranges
            .par_iter()
            .enumerate()
            .map(|(batch, &(start, end))| {
                let batch_seed = mix_seed(seed, &["batch"], batch as u64);
                let mut fleets: Vec<Fleet> =
                    configs.iter().map(|config| config.build(batch_seed)).collect();
                let mut tally =
                    Tally::for_fleets(configs.iter().map(|config| config.name.as_str()));
                run_gauntlets(&mut fleets, (end - start) as u64, &mut tally)?;
                Ok(tally)
            })
            .collect()
    });

    let mut merged = Tally::for_fleets(configs.iter().map(|config| config.name.as_str()));
    for tally in tallies {
        merged.merge(tally?);
    }
    let result = merged.finish();
    log_summary(&result);
    Ok(result)
}

fn check_inputs(fleets: usize, iterations: u32) -> Result<(), SimulationError> {
    if fleets < 2 {
        return Err(SimulationError::NotEnoughFleets { found: fleets });
    }
    if iterations == 0 {
        return Err(SimulationError::InvalidIterations);
    }
    Ok(())
}

fn run_gauntlets(
    fleets: &mut [Fleet],
    iterations: u64,
    tally: &mut Tally,
) -> Result<(), SimulationError> {
    for _ in 0..iterations {
        fleets.iter_mut().for_each(Fleet::reset);
        let gauntlet = MultiBattle::new(fleets)?.run();
        tally.record(fleets, &gauntlet);
    }
    Ok(())
}

fn log_summary(result: &SimulationResult) {
    info!(
        iterations = result.iterations,
        draw_probability = result.draw_probability,
        fleets = result.victory_probability.len(),
        "simulation finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::fixed;
    use crate::combat::{Ship, ShipConfig, WeaponLoadout};
    use crate::data::scenario::ShipGroup;

    fn gunboat(face: u8, initiative: i32) -> Ship {
        Ship::new(
            ShipType::Interceptor,
            ShipConfig {
                initiative,
                cannons: WeaponLoadout {
                    ion: 1,
                    ..WeaponLoadout::default()
                },
                ..ShipConfig::default()
            },
            fixed(face),
        )
    }

    #[test]
    fn rejects_bad_inputs() {
        let simulator = CombatSimulator;
        let mut one = vec![Fleet::new("solo", vec![gunboat(6, 0)], false)];
        assert_eq!(
            simulator.simulate(&mut one, 10),
            Err(SimulationError::NotEnoughFleets { found: 1 })
        );
        let mut two = vec![
            Fleet::new("a", vec![gunboat(6, 0)], false),
            Fleet::new("b", vec![gunboat(6, 0)], false),
        ];
        assert_eq!(
            simulator.simulate(&mut two, 0),
            Err(SimulationError::InvalidIterations)
        );
    }

    #[test]
    fn expected_survivors_are_conditioned_on_wins() {
        let mut fleets = vec![
            Fleet::new("fast", vec![gunboat(6, 3), gunboat(6, 3)], false),
            Fleet::new("slow", vec![gunboat(6, 1)], false),
        ];
        let result = CombatSimulator
            .simulate(&mut fleets, 8)
            .expect("two fleets simulate");
        assert_eq!(result.victory_probability["fast"], 1.0);
        assert_eq!(result.victory_probability["slow"], 0.0);
        assert_eq!(result.expected_survivors["fast"][&ShipType::Interceptor], 2.0);
        assert!(result.expected_survivors["slow"].is_empty());
    }

    #[test]
    fn tallies_merge_by_name() {
        let mut left = Tally::for_fleets(["a", "b"]);
        left.iterations = 3;
        left.draws = 1;
        left.wins.insert("a".into(), 2);
        let mut right = Tally::for_fleets(["a", "b"]);
        right.iterations = 2;
        right.wins.insert("b".into(), 2);
        right
            .survivors
            .entry("b".into())
            .or_default()
            .insert(ShipType::Cruiser, 4);
        left.merge(right);

        let result = left.finish();
        assert_eq!(result.iterations, 5);
        assert!((result.probability_total() - 1.0).abs() < 1e-12);
        assert_eq!(result.expected_survivors["b"][&ShipType::Cruiser], 2.0);
    }

    #[test]
    fn parallel_run_is_reproducible() {
        let config = |name: &str, initiative: i32| FleetConfig {
            name: name.to_string(),
            antimatter_splitter: false,
            ships: vec![ShipGroup {
                ship_type: ShipType::Cruiser,
                quantity: 2,
                config: ShipConfig {
                    hull: 1,
                    initiative,
                    cannons: WeaponLoadout {
                        plasma: 1,
                        ..WeaponLoadout::default()
                    },
                    ..ShipConfig::default()
                },
            }],
        };
        let configs = vec![config("red", 2), config("blue", 2)];
        let one = simulate_parallel(&configs, 600, 99, &WorkerPool::with_workers(1));
        let many = simulate_parallel(&configs, 600, 99, &WorkerPool::with_workers(4));
        assert_eq!(one, many);
        let result = one.expect("parallel simulation runs");
        assert_eq!(result.iterations, 600);
        assert!((result.probability_total() - 1.0).abs() < 1e-9);
    }
}
