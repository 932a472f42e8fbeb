//! Damage planners score a candidate damage distribution. The solver only talks
//! to [`DamagePlanner`]; the two implementations differ in how they weigh ships.
//!
//! - [`NpcDamagePlanner`]: static per-type priority, the rule NPC hulls and rift
//!   backlash follow.
//! - [`DpsRemovalDamagePlanner`]: ranks ships by the firepower they still bring,
//!   an approximation of how a player removes the biggest threat first.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::combat::dice::{HIT, TOTAL_RIFT_DIE_DAMAGE};
use crate::combat::phase::Phase;
use crate::combat::ship::{Ship, ShipType, Shot};

/// Which planner governs a fleet's damage assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageType {
    Npc,
    Dps,
}

/// Candidate solution: total score, whether every ship dies, and damage per ship slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub score: f64,
    pub all_destroyed: bool,
    pub damage_assignments: Vec<u32>,
}

impl Plan {
    pub fn empty() -> Self {
        Self {
            score: 0.0,
            all_destroyed: false,
            damage_assignments: Vec::new(),
        }
    }
}

pub trait DamagePlanner {
    /// Scores `damage_assignments[i]` landing on `ships[i]`, which currently has `remaining_hp[i]`.
    fn evaluate(
        &self,
        ships: &[&Ship],
        remaining_hp: &[u32],
        damage_assignments: &[u32],
        upcoming: &[Phase],
    ) -> Plan;

    /// Order in which the solver should consider ships; most valuable target first.
    fn compare_ships(&self, a: &Ship, b: &Ship, upcoming: &[Phase]) -> Ordering;

    fn optimally_sort_ships(&self, ships: &mut [&Ship], upcoming: &[Phase]) {
        ships.sort_by(|a, b| self.compare_ships(a, b, upcoming));
    }

    fn optimally_sort_shots(&self, shots: &mut [Shot]) {
        shots.sort_by(compare_shots);
    }

    /// Greedy upper bound on the score any assignment of `shots` can reach.
    /// `sorted_ships` must already be in [`DamagePlanner::optimally_sort_ships`] order.
    fn calculate_max_score(
        &self,
        sorted_ships: &[&Ship],
        shots: &[Shot],
        remaining_hp: &[u32],
        upcoming: &[Phase],
    ) -> f64 {
        let Some(min_damage) = shots.iter().map(|shot| shot.damage).min() else {
            return 0.0;
        };
        let mut pool: i64 = shots.iter().map(|shot| i64::from(shot.damage)).sum();
        let mut assignments = vec![0u32; sorted_ships.len()];
        let mut ships_left = false;

        for (slot, &hp) in remaining_hp.iter().enumerate().take(sorted_ships.len()) {
            if pool >= i64::from(hp) {
                assignments[slot] = hp;
                let overkill = i64::from(min_damage.saturating_sub(hp));
                pool -= i64::from(hp) + overkill;
                if pool <= 0 {
                    break;
                }
            } else {
                ships_left = true;
            }
        }

        if pool > 0 && ships_left {
            for (slot, ship) in sorted_ships.iter().enumerate() {
                if assignments[slot] == 0 {
                    let damage = pool.min(i64::from(ship.remaining_hp()));
                    assignments[slot] = damage as u32;
                    pool -= damage;
                    if pool <= 0 {
                        break;
                    }
                }
            }
        }

        self.evaluate(sorted_ships, remaining_hp, &assignments, upcoming)
            .score
    }
}

/// Rolls that still depend on shields come first, lowest total first; natural hits
/// go last, biggest first.
pub fn compare_shots(a: &Shot, b: &Shot) -> Ordering {
    match (a.roll == HIT, b.roll == HIT) {
        (true, true) => b.damage.cmp(&a.damage),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => (i32::from(a.roll) + a.computers)
            .cmp(&(i32::from(b.roll) + b.computers))
            .then_with(|| b.damage.cmp(&a.damage)),
    }
}

fn score_assignments(
    ships: &[&Ship],
    remaining_hp: &[u32],
    damage_assignments: &[u32],
    kill_weight: f64,
    mut weight_of: impl FnMut(&Ship) -> f64,
) -> Plan {
    let mut all_destroyed = true;
    let mut score = 0.0;
    for (slot, ship) in ships.iter().enumerate() {
        let hp = remaining_hp[slot];
        let damage = damage_assignments.get(slot).copied().unwrap_or(0);
        if damage == 0 {
            all_destroyed = false;
            continue;
        }
        let weight = weight_of(ship);
        if hp > damage {
            all_destroyed = false;
            // Wounds count more the closer they bring the ship to death.
            let left = hp - damage;
            score += weight + 2f64.powi(ship.max_hp().saturating_sub(left) as i32);
        } else {
            score += weight * kill_weight;
        }
    }
    Plan {
        score,
        all_destroyed,
        damage_assignments: damage_assignments.to_vec(),
    }
}

const NPC_KILL_WEIGHT: f64 = (1u64 << 20) as f64;
const NPC_MAX_PRIORITY: u32 = 11;

const fn npc_priority(ship_type: ShipType) -> u32 {
    match ship_type {
        ShipType::Dreadnaught => 0,
        ShipType::Orbital => 1,
        ShipType::Cruiser => 3,
        ShipType::Carrier => 4,
        ShipType::Starbase => 5,
        ShipType::Interceptor => 8,
        ShipType::Gcds => 9,
        ShipType::Guardian => 10,
        ShipType::Ancient => NPC_MAX_PRIORITY,
    }
}

fn npc_weight(ship_type: ShipType) -> f64 {
    f64::from(1u32 << (NPC_MAX_PRIORITY - npc_priority(ship_type)))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NpcDamagePlanner;

impl DamagePlanner for NpcDamagePlanner {
    fn evaluate(
        &self,
        ships: &[&Ship],
        remaining_hp: &[u32],
        damage_assignments: &[u32],
        _upcoming: &[Phase],
    ) -> Plan {
        score_assignments(
            ships,
            remaining_hp,
            damage_assignments,
            NPC_KILL_WEIGHT,
            |ship| npc_weight(ship.ship_type),
        )
    }

    fn compare_ships(&self, a: &Ship, b: &Ship, _upcoming: &[Phase]) -> Ordering {
        npc_priority(a.ship_type)
            .cmp(&npc_priority(b.ship_type))
            .then_with(|| a.remaining_hp().cmp(&b.remaining_hp()))
    }
}

const DPS_KILL_WEIGHT: f64 = 10_000.0;
const DPS_MIN_PRIORITY: f64 = 0.1;

const fn dps_tiebreak(ship_type: ShipType) -> u32 {
    match ship_type {
        ShipType::Dreadnaught => 0,
        ShipType::Gcds => 1,
        ShipType::Cruiser => 2,
        ShipType::Carrier => 3,
        ShipType::Guardian => 4,
        ShipType::Starbase => 5,
        ShipType::Interceptor => 6,
        ShipType::Orbital => 7,
        ShipType::Ancient => 8,
    }
}

/// Expected output of one ship type: everything it fires, and what is left once its
/// missiles are spent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Firepower {
    pub total: f64,
    pub cannons: f64,
}

impl Firepower {
    pub fn of(ship: &Ship) -> Self {
        let accuracy = f64::from(ship.computers) + 1.0;
        let rift = f64::from(ship.rift) * f64::from(TOTAL_RIFT_DIE_DAMAGE);
        let cannons = rift + accuracy * f64::from(ship.cannons.total_damage());
        let missiles = accuracy * f64::from(ship.missiles.total_damage());
        Self {
            total: cannons + missiles,
            cannons,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DpsRemovalDamagePlanner {
    firepower: HashMap<ShipType, Firepower>,
}

impl DpsRemovalDamagePlanner {
    /// Builds the per-type firepower table from the first ship seen of each type.
    pub fn new<'a>(ships: impl IntoIterator<Item = &'a Ship>) -> Self {
        let mut firepower = HashMap::new();
        for ship in ships {
            firepower
                .entry(ship.ship_type)
                .or_insert_with(|| Firepower::of(ship));
        }
        Self { firepower }
    }

    /// Threat a ship poses: its missiles only count while it still has a missile
    /// phase queued ahead of the first cannon phase.
    pub fn ship_priority(&self, ship: &Ship, upcoming: &[Phase]) -> f64 {
        let firepower = self
            .firepower
            .get(&ship.ship_type)
            .copied()
            .unwrap_or_else(|| Firepower::of(ship));
        for phase in upcoming {
            if !phase.missile_phase {
                return firepower.cannons;
            }
            if phase.includes(ship.id()) {
                return firepower.total;
            }
        }
        firepower.cannons
    }
}

impl DamagePlanner for DpsRemovalDamagePlanner {
    fn evaluate(
        &self,
        ships: &[&Ship],
        remaining_hp: &[u32],
        damage_assignments: &[u32],
        upcoming: &[Phase],
    ) -> Plan {
        score_assignments(
            ships,
            remaining_hp,
            damage_assignments,
            DPS_KILL_WEIGHT,
            |ship| self.ship_priority(ship, upcoming).max(DPS_MIN_PRIORITY),
        )
    }

    fn compare_ships(&self, a: &Ship, b: &Ship, upcoming: &[Phase]) -> Ordering {
        self.ship_priority(b, upcoming)
            .total_cmp(&self.ship_priority(a, upcoming))
            .then_with(|| a.remaining_hp().cmp(&b.remaining_hp()))
            .then_with(|| b.computers.cmp(&a.computers))
            .then_with(|| a.initiative.cmp(&b.initiative))
            .then_with(|| dps_tiebreak(a.ship_type).cmp(&dps_tiebreak(b.ship_type)))
    }
}
