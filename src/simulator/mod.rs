pub mod export;
pub mod monte_carlo;

pub use export::write_result_csv;
pub use monte_carlo::{
    simulate_parallel, CombatSimulator, SimulationResult, Tally, ITERATIONS_PER_BATCH,
};
