use std::cmp::{Ordering, Reverse};
use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, trace};

use crate::combat::fleet::Fleet;
use crate::combat::phase::{Phase, Side};
use crate::combat::ship::{Ship, ShipId, ShipType, Shot};

/// Upper bound on cannon rounds; an unresolved bout goes to the defender.
pub const MAX_ROUNDS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleOutcome {
    Attacker,
    Defender,
    Draw,
}

/// Snapshot of a surviving ship at the end of a bout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Victor {
    pub id: ShipId,
    pub ship_type: ShipType,
    pub remaining_hp: u32,
}

impl From<&Ship> for Victor {
    fn from(ship: &Ship) -> Self {
        Self {
            id: ship.id(),
            ship_type: ship.ship_type,
            remaining_hp: ship.remaining_hp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleResult {
    pub outcome: BattleOutcome,
    pub victors: Vec<Victor>,
    /// Cannon rounds started; 0 when missiles settled the bout.
    pub rounds: u32,
}

/// One bout between two fleets. The defender fires first on initiative ties and
/// wins stalemates.
pub struct Battle<'a> {
    attacker: &'a mut Fleet,
    defender: &'a mut Fleet,
}

impl<'a> Battle<'a> {
    pub fn new(attacker: &'a mut Fleet, defender: &'a mut Fleet) -> Self {
        Self { attacker, defender }
    }

    pub fn fight(&mut self) -> BattleResult {
        if let Some(result) = self.check_outcome(0) {
            return result;
        }

        let mut queue: VecDeque<Phase> = self.schedule().into();

        while queue.front().is_some_and(|phase| phase.missile_phase) {
            let Some(phase) = queue.pop_front() else {
                break;
            };
            self.resolve_missiles(&phase, queue.make_contiguous());
            if let Some(result) = self.check_outcome(0) {
                debug!(outcome = ?result.outcome, "bout decided by missiles");
                return result;
            }
        }

        let mut rounds = 0;
        while rounds < MAX_ROUNDS {
            rounds += 1;
            for _ in 0..queue.len() {
                let Some(phase) = queue.pop_front() else {
                    break;
                };
                if !self.fleet(phase.shooter).any_alive(&phase.ships) {
                    continue;
                }
                self.resolve_cannons(&phase, queue.make_contiguous());
                queue.push_back(phase);
                if let Some(result) = self.check_outcome(rounds) {
                    debug!(outcome = ?result.outcome, rounds, "bout decided");
                    return result;
                }
            }

            self.attacker.heal();
            self.defender.heal();

            if !self.attacker.has_cannons() && !self.defender.has_cannons() {
                debug!(rounds, "no cannons left, defender holds");
                return self.defender_holds(rounds);
            }
        }

        debug!(rounds, "round cap reached, defender holds");
        self.defender_holds(rounds)
    }

    /// Missile phases first, then cannon phases; each group by descending
    /// initiative with the defender ahead on ties.
    pub fn schedule(&self) -> Vec<Phase> {
        let mut phases = Vec::new();
        for side in [Side::Defender, Side::Attacker] {
            let fleet = self.fleet(side);
            let has_missiles = fleet.has_missiles();
            for initiative in fleet.initiatives() {
                if has_missiles {
                    let ships = fleet.ship_ids_at_initiative(initiative, true);
                    if !ships.is_empty() {
                        phases.push(Phase {
                            ships,
                            initiative,
                            shooter: side,
                            missile_phase: true,
                        });
                    }
                }
                phases.push(Phase {
                    ships: fleet.ship_ids_at_initiative(initiative, false),
                    initiative,
                    shooter: side,
                    missile_phase: false,
                });
            }
        }
        phases.sort_by(compare_phases);
        trace!(phases = phases.len(), "bout scheduled");
        phases
    }

    fn resolve_missiles(&mut self, phase: &Phase, upcoming: &[Phase]) {
        let (shooter, target) = self.sides(phase.shooter);
        let shots = shooter.shoot_missiles_for_initiative(phase.initiative);
        shooter.assign_damage(&shots, target, upcoming);
    }

    fn resolve_cannons(&mut self, phase: &Phase, upcoming: &[Phase]) {
        let (shooter, target) = self.sides(phase.shooter);
        let mut shots = shooter.shoot_cannons_for_initiative(phase.initiative);
        let rifts = shooter.shoot_rift_cannons_for_initiative(phase.initiative);

        let mut backlash = Vec::new();
        for rift in &rifts {
            if rift.target_damage > 0 {
                shots.push(Shot::guaranteed(rift.target_damage));
            }
            if rift.self_damage > 0 {
                backlash.push(rift.self_damage);
            }
        }

        shooter.assign_damage(&shots, target, upcoming);
        shooter.absorb_rift_backlash(&backlash, upcoming);
    }

    fn check_outcome(&self, rounds: u32) -> Option<BattleResult> {
        let (outcome, victors) = match (self.attacker.is_alive(), self.defender.is_alive()) {
            (false, false) => (BattleOutcome::Draw, Vec::new()),
            (false, true) => (BattleOutcome::Defender, survivors(&*self.defender)),
            (true, false) => (BattleOutcome::Attacker, survivors(&*self.attacker)),
            (true, true) => return None,
        };
        Some(BattleResult {
            outcome,
            victors,
            rounds,
        })
    }

    fn defender_holds(&self, rounds: u32) -> BattleResult {
        BattleResult {
            outcome: BattleOutcome::Defender,
            victors: survivors(&*self.defender),
            rounds,
        }
    }

    fn fleet(&self, side: Side) -> &Fleet {
        match side {
            Side::Attacker => &*self.attacker,
            Side::Defender => &*self.defender,
        }
    }

    fn sides(&mut self, shooter: Side) -> (&mut Fleet, &mut Fleet) {
        match shooter {
            Side::Attacker => (&mut *self.attacker, &mut *self.defender),
            Side::Defender => (&mut *self.defender, &mut *self.attacker),
        }
    }
}

fn survivors(fleet: &Fleet) -> Vec<Victor> {
    fleet.living_ships().map(Victor::from).collect()
}

fn compare_phases(a: &Phase, b: &Phase) -> Ordering {
    let key = |phase: &Phase| {
        (
            !phase.missile_phase,
            Reverse(phase.initiative),
            phase.shooter == Side::Attacker,
        )
    };
    key(a).cmp(&key(b))
}
