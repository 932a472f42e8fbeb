pub mod battle;
pub mod dice;
pub mod error;
pub mod fleet;
pub mod gauntlet;
pub mod phase;
pub mod planner;
pub mod rng;
pub mod ship;
pub mod solver;

pub use battle::{Battle, BattleOutcome, BattleResult, Victor, MAX_ROUNDS};
pub use error::SimulationError;
pub use fleet::Fleet;
pub use gauntlet::{GauntletResult, MultiBattle};
pub use phase::{Phase, Side};
pub use planner::{
    DamagePlanner, DamageType, DpsRemovalDamagePlanner, Firepower, NpcDamagePlanner, Plan,
};
pub use rng::{DieRoll, Rng};
pub use ship::{RiftShot, Ship, ShipConfig, ShipId, ShipType, Shot, WeaponLoadout, WeaponType};
