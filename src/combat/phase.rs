use serde::Serialize;

use crate::combat::ship::ShipId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    pub const fn opponent(self) -> Self {
        match self {
            Self::Attacker => Self::Defender,
            Self::Defender => Self::Attacker,
        }
    }
}

/// One scheduled firing slot: every ship of `shooter` at `initiative` fires
/// either its missiles or its cannons at the opposing side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    pub ships: Vec<ShipId>,
    pub initiative: i32,
    pub shooter: Side,
    pub missile_phase: bool,
}

impl Phase {
    pub fn target(&self) -> Side {
        self.shooter.opponent()
    }

    pub fn includes(&self, id: ShipId) -> bool {
        self.ships.contains(&id)
    }
}
