use std::collections::BTreeSet;

use crate::combat::phase::Phase;
use crate::combat::planner::DamageType;
use crate::combat::ship::{RiftShot, Ship, ShipId, Shot};
use crate::combat::solver;

/// A named group of ships fighting on one side of a bout.
///
/// Shield, cannon and missile summaries are captured once at construction so the
/// per-phase checks stay cheap for homogeneous fleets.
#[derive(Debug)]
pub struct Fleet {
    name: String,
    ships: Vec<Ship>,
    antimatter_splitter: bool,
    damage_type: DamageType,
    cannons_at_start: bool,
    missiles_at_start: bool,
    mixed_shields: bool,
    min_shield_at_start: i32,
}

impl Fleet {
    pub fn new(name: impl Into<String>, ships: Vec<Ship>, antimatter_splitter: bool) -> Self {
        let damage_type = if ships.iter().any(Ship::is_player_ship) {
            DamageType::Dps
        } else {
            DamageType::Npc
        };
        let shields: BTreeSet<i32> = ships.iter().map(|ship| ship.shields).collect();
        Self {
            name: name.into(),
            cannons_at_start: ships.iter().any(Ship::has_cannons),
            missiles_at_start: ships.iter().any(Ship::has_missiles),
            mixed_shields: shields.len() > 1,
            min_shield_at_start: shields.first().copied().unwrap_or(0),
            ships,
            antimatter_splitter,
            damage_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn antimatter_splitter(&self) -> bool {
        self.antimatter_splitter
    }

    pub fn damage_type(&self) -> DamageType {
        self.damage_type
    }

    /// Distinct initiative values among living ships, ascending.
    pub fn initiatives(&self) -> BTreeSet<i32> {
        self.living_ships().map(|ship| ship.initiative).collect()
    }

    /// Living ships at `initiative`, optionally only those carrying missiles.
    pub fn ship_ids_at_initiative(&self, initiative: i32, missiles_only: bool) -> Vec<ShipId> {
        self.living_ships()
            .filter(|ship| ship.initiative == initiative)
            .filter(|ship| !missiles_only || ship.has_missiles())
            .map(Ship::id)
            .collect()
    }

    /// Missiles never split: the splitter only applies to antimatter cannons.
    pub fn shoot_missiles_for_initiative(&mut self, initiative: i32) -> Vec<Shot> {
        self.living_at_mut(initiative)
            .flat_map(|ship| ship.shoot_missiles(false))
            .collect()
    }

    pub fn shoot_cannons_for_initiative(&mut self, initiative: i32) -> Vec<Shot> {
        let splitter = self.antimatter_splitter;
        self.living_at_mut(initiative)
            .flat_map(|ship| ship.shoot_cannons(splitter))
            .collect()
    }

    pub fn shoot_rift_cannons_for_initiative(&mut self, initiative: i32) -> Vec<RiftShot> {
        self.living_at_mut(initiative)
            .flat_map(Ship::shoot_rift_cannon)
            .collect()
    }

    fn living_at_mut(&mut self, initiative: i32) -> impl Iterator<Item = &mut Ship> {
        self.ships
            .iter_mut()
            .filter(move |ship| ship.is_alive() && ship.initiative == initiative)
    }

    /// Distributes this fleet's `shots` over `target`'s living ships using this
    /// fleet's planner. Shots that cannot beat the target's weakest shield are discarded.
    pub fn assign_damage(&self, shots: &[Shot], target: &mut Fleet, upcoming: &[Phase]) {
        let min_shield = target.min_shield();
        let shots: Vec<Shot> = shots
            .iter()
            .copied()
            .filter(|shot| shot.hits(min_shield))
            .collect();
        let candidates = target.living_indices(|_| true);
        solver::assign_damage(
            &shots,
            &mut target.ships,
            &candidates,
            self.damage_type,
            upcoming,
        );
    }

    /// Rift backlash lands on this fleet's own living rift-armed ships, NPC rules.
    /// With no such ship left the backlash is wasted.
    pub fn absorb_rift_backlash(&mut self, self_damage: &[u32], upcoming: &[Phase]) {
        let shots: Vec<Shot> = self_damage
            .iter()
            .filter(|&&damage| damage > 0)
            .map(|&damage| Shot::guaranteed(damage))
            .collect();
        let candidates = self.living_indices(|ship| ship.rift > 0);
        solver::assign_damage(
            &shots,
            &mut self.ships,
            &candidates,
            DamageType::Npc,
            upcoming,
        );
    }

    fn living_indices(&self, keep: impl Fn(&Ship) -> bool) -> Vec<usize> {
        self.ships
            .iter()
            .enumerate()
            .filter(|(_, ship)| ship.is_alive() && keep(ship))
            .map(|(index, _)| index)
            .collect()
    }

    /// Lowest shield among living ships; fixed for fleets that started uniform.
    pub fn min_shield(&self) -> i32 {
        if !self.mixed_shields {
            return self.min_shield_at_start;
        }
        self.living_ships()
            .map(|ship| ship.shields)
            .min()
            .unwrap_or(self.min_shield_at_start)
    }

    pub fn has_cannons(&self) -> bool {
        self.cannons_at_start && self.living_ships().any(Ship::has_cannons)
    }

    pub fn has_missiles(&self) -> bool {
        self.missiles_at_start && self.living_ships().any(Ship::has_missiles)
    }

    pub fn heal(&mut self) {
        self.ships.iter_mut().for_each(Ship::apply_healing);
    }

    pub fn reset(&mut self) {
        self.ships.iter_mut().for_each(Ship::reset_damage);
    }

    pub fn living_ships(&self) -> impl Iterator<Item = &Ship> {
        self.ships.iter().filter(|ship| ship.is_alive())
    }

    pub fn is_alive(&self) -> bool {
        self.ships.iter().any(Ship::is_alive)
    }

    /// Whether any of `ids` still belongs to a living ship of this fleet.
    pub fn any_alive(&self, ids: &[ShipId]) -> bool {
        self.living_ships().any(|ship| ids.contains(&ship.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::{cycle, fixed};
    use crate::combat::ship::{ShipConfig, ShipType, WeaponLoadout};

    fn ion_ship(ship_type: ShipType, initiative: i32, shields: i32, face: u8) -> Ship {
        Ship::new(
            ship_type,
            ShipConfig {
                initiative,
                shields,
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
    fn composition_picks_the_planner() {
        let npc = Fleet::new("npc", vec![ion_ship(ShipType::Ancient, 1, 0, 6)], false);
        let mixed = Fleet::new(
            "mixed",
            vec![
                ion_ship(ShipType::Guardian, 1, 0, 6),
                ion_ship(ShipType::Interceptor, 1, 0, 6),
            ],
            false,
        );
        assert_eq!(npc.damage_type(), DamageType::Npc);
        assert_eq!(mixed.damage_type(), DamageType::Dps);
    }

    #[test]
    fn only_living_ships_at_the_initiative_fire() {
        let mut fleet = Fleet::new(
            "blue",
            vec![
                ion_ship(ShipType::Interceptor, 3, 0, 6),
                ion_ship(ShipType::Interceptor, 3, 0, 6),
                ion_ship(ShipType::Cruiser, 2, 0, 6),
            ],
            false,
        );
        fleet.ships[1].take_damage(1);
        assert_eq!(fleet.shoot_cannons_for_initiative(3).len(), 1);
        assert_eq!(fleet.shoot_cannons_for_initiative(2).len(), 1);
        assert!(fleet.shoot_cannons_for_initiative(7).is_empty());
        assert_eq!(fleet.initiatives().into_iter().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn splitter_applies_to_cannons_only() {
        let config = ShipConfig {
            cannons: WeaponLoadout {
                antimatter: 1,
                ..WeaponLoadout::default()
            },
            missiles: WeaponLoadout {
                antimatter: 1,
                ..WeaponLoadout::default()
            },
            ..ShipConfig::default()
        };
        let ship = Ship::new(ShipType::Dreadnaught, config, fixed(6));
        let mut fleet = Fleet::new("split", vec![ship], true);
        assert_eq!(fleet.shoot_missiles_for_initiative(0).len(), 1);
        assert_eq!(fleet.shoot_cannons_for_initiative(0).len(), 4);
    }

    #[test]
    fn min_shield_tracks_survivors_when_mixed() {
        let mut fleet = Fleet::new(
            "shields",
            vec![
                ion_ship(ShipType::Interceptor, 0, 1, 6),
                ion_ship(ShipType::Cruiser, 0, 3, 6),
            ],
            false,
        );
        assert_eq!(fleet.min_shield(), 1);
        fleet.ships[0].take_damage(1);
        assert_eq!(fleet.min_shield(), 3);
        fleet.reset();
        assert_eq!(fleet.min_shield(), 1);
    }

    #[test]
    fn shots_below_the_weakest_shield_are_discarded() {
        let shooter = Fleet::new("red", vec![ion_ship(ShipType::Cruiser, 0, 0, 6)], false);
        let mut target = Fleet::new("blue", vec![ion_ship(ShipType::Cruiser, 0, 2, 6)], false);
        let weak = Shot {
            roll: 5,
            computers: 2,
            damage: 1,
        };
        shooter.assign_damage(&[weak], &mut target, &[]);
        assert_eq!(target.ships()[0].damage_taken(), 0);
        shooter.assign_damage(&[Shot::guaranteed(1)], &mut target, &[]);
        assert!(!target.is_alive());
    }

    #[test]
    fn rift_backlash_stays_on_rift_ships() {
        let rift = Ship::new(
            ShipType::Cruiser,
            ShipConfig {
                hull: 1,
                rift: 1,
                ..ShipConfig::default()
            },
            cycle(vec![1]),
        );
        let bystander = ion_ship(ShipType::Dreadnaught, 0, 0, 6);
        let mut fleet = Fleet::new("rift", vec![bystander, rift], false);
        fleet.absorb_rift_backlash(&[1], &[]);
        assert_eq!(fleet.ships()[0].damage_taken(), 0);
        assert_eq!(fleet.ships()[1].damage_taken(), 1);
    }

    #[test]
    fn rift_backlash_without_rift_ships_is_wasted() {
        let bystander = ion_ship(ShipType::Interceptor, 0, 0, 6);
        let mut fleet = Fleet::new("plain", vec![bystander], false);
        fleet.absorb_rift_backlash(&[1, 1], &[]);
        assert_eq!(fleet.ships()[0].damage_taken(), 0);
        assert!(fleet.is_alive());
    }

    #[test]
    fn cannon_summary_follows_losses() {
        let unarmed = Ship::new(ShipType::Starbase, ShipConfig::default(), fixed(6));
        let mut fleet = Fleet::new(
            "mixed",
            vec![ion_ship(ShipType::Interceptor, 0, 0, 6), unarmed],
            false,
        );
        assert!(fleet.has_cannons());
        assert!(!fleet.has_missiles());
        fleet.ships[0].take_damage(1);
        assert!(!fleet.has_cannons());
        assert!(fleet.is_alive());
    }

    #[test]
    fn healing_restores_living_ships() {
        let mut ship = ion_ship(ShipType::Starbase, 0, 0, 6);
        ship.hull = 3;
        ship.heal = 1;
        let mut fleet = Fleet::new("heal", vec![ship], false);
        fleet.ships[0].take_damage(2);
        fleet.heal();
        assert_eq!(fleet.ships()[0].damage_taken(), 1);
        assert!(fleet.any_alive(&[fleet.ships()[0].id()]));
    }
}
