use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("a gauntlet needs at least 2 fleets, found {found}")]
    NotEnoughFleets { found: usize },
    #[error("iteration count must be at least 1")]
    InvalidIterations,
}
