//! Exhaustive damage assignment. Every shot lands on exactly one ship it can hit;
//! the search picks the distribution the planner scores highest.
//!
//! Ships and shots are put in planner order first so good branches are met early,
//! then a depth-first search walks shot by shot. Sub-problems that look the same
//! (same shot index, same multiset of type and post-damage HP) are memoised, and
//! the search stops as soon as it meets a plan that kills everything or matches the
//! greedy upper bound.

use std::collections::HashMap;

use tracing::trace;

use crate::combat::phase::Phase;
use crate::combat::planner::{
    DamagePlanner, DamageType, DpsRemovalDamagePlanner, NpcDamagePlanner, Plan,
};
use crate::combat::ship::{Ship, ShipType, Shot};

type MemoKey = (usize, Vec<(ShipType, i64)>);

/// Applies `shots` to the ships of `ships` listed in `candidates`, choosing targets
/// with the planner selected by `damage_type`. Shots no candidate can be hit by are wasted.
pub fn assign_damage(
    shots: &[Shot],
    ships: &mut [Ship],
    candidates: &[usize],
    damage_type: DamageType,
    upcoming: &[Phase],
) {
    if shots.is_empty() || candidates.is_empty() {
        return;
    }

    let solution = {
        let view: Vec<&Ship> = candidates.iter().map(|&index| &ships[index]).collect();
        match damage_type {
            DamageType::Npc => solve(&NpcDamagePlanner, shots, &view, upcoming),
            DamageType::Dps => {
                let planner = DpsRemovalDamagePlanner::new(view.iter().copied());
                solve(&planner, shots, &view, upcoming)
            }
        }
    };

    let Some(Solution { order, plan }) = solution else {
        return;
    };

    for (slot, &planned) in plan.damage_assignments.iter().enumerate() {
        let ship = &mut ships[candidates[order[slot]]];
        // Summed shots may overshoot; a wreck only absorbs what it had left.
        let dealt = planned.min(ship.remaining_hp());
        ship.take_damage(dealt);
    }
}

struct Solution {
    /// `order[slot]` is the position in the caller's candidate list of the ship in `slot`.
    order: Vec<usize>,
    plan: Plan,
}

fn solve<P: DamagePlanner>(
    planner: &P,
    shots: &[Shot],
    ships: &[&Ship],
    upcoming: &[Phase],
) -> Option<Solution> {
    let mut order: Vec<usize> = (0..ships.len()).collect();
    order.sort_by(|&a, &b| planner.compare_ships(ships[a], ships[b], upcoming));
    let sorted: Vec<&Ship> = order.iter().map(|&index| ships[index]).collect();

    let mut sorted_shots = shots.to_vec();
    planner.optimally_sort_shots(&mut sorted_shots);

    let mut usable = Vec::with_capacity(sorted_shots.len());
    let mut can_damage = Vec::with_capacity(sorted_shots.len());
    for shot in sorted_shots {
        let row: Vec<u32> = sorted
            .iter()
            .map(|ship| if ship.shot_hits(&shot) { shot.damage } else { 0 })
            .collect();
        if row.iter().any(|&damage| damage > 0) {
            usable.push(shot);
            can_damage.push(row);
        }
    }

    let remaining_hp: Vec<u32> = sorted.iter().map(|ship| ship.remaining_hp()).collect();
    let max_score = planner.calculate_max_score(&sorted, &usable, &remaining_hp, upcoming);
    if max_score <= 0.0 {
        return None;
    }

    let mut search = Search {
        planner,
        ships: &sorted,
        can_damage: &can_damage,
        remaining_hp: &remaining_hp,
        upcoming,
        max_score,
        assignments: vec![0; sorted.len()],
        memo: HashMap::new(),
    };
    let plan = search.run(0);
    trace!(
        shots = usable.len(),
        ships = sorted.len(),
        memo_entries = search.memo.len(),
        score = plan.score,
        max_score,
        "damage assignment solved"
    );

    Some(Solution { order, plan })
}

struct Search<'a, P> {
    planner: &'a P,
    ships: &'a [&'a Ship],
    can_damage: &'a [Vec<u32>],
    remaining_hp: &'a [u32],
    upcoming: &'a [Phase],
    max_score: f64,
    assignments: Vec<u32>,
    memo: HashMap<MemoKey, Plan>,
}

impl<P: DamagePlanner> Search<'_, P> {
    fn run(&mut self, shot: usize) -> Plan {
        if shot == self.can_damage.len() {
            return self.planner.evaluate(
                self.ships,
                self.remaining_hp,
                &self.assignments,
                self.upcoming,
            );
        }

        let key = self.memo_key(shot);
        if let Some(plan) = self.memo.get(&key) {
            return plan.clone();
        }

        let mut best = Plan::empty();
        for slot in 0..self.ships.len() {
            let damage = self.can_damage[shot][slot];
            if damage == 0 {
                continue;
            }
            self.assignments[slot] += damage;
            let plan = self.run(shot + 1);
            if plan.all_destroyed || plan.score >= self.max_score {
                return plan;
            }
            if plan.score > best.score {
                best = plan;
            }
            self.assignments[slot] -= damage;
        }

        self.memo.insert(key, best.clone());
        best
    }

    fn memo_key(&self, shot: usize) -> MemoKey {
        let mut signature: Vec<(ShipType, i64)> = self
            .ships
            .iter()
            .zip(self.remaining_hp)
            .zip(&self.assignments)
            .map(|((ship, &hp), &assigned)| (ship.ship_type, i64::from(hp) - i64::from(assigned)))
            .collect();
        signature.sort_unstable();
        (shot, signature)
    }
}
