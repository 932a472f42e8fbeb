use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::combat::dice::{self, HIT, HIT_AFTER_MODIFIERS, MISS};
use crate::combat::rng::{self, DieRoll};

static NEXT_SHIP_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a ship instance; stable across resets, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ShipId(u64);

impl ShipId {
    fn next() -> Self {
        Self(NEXT_SHIP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShipType {
    Interceptor,
    Cruiser,
    Dreadnaught,
    Carrier,
    Starbase,
    Orbital,
    Ancient,
    Guardian,
    #[serde(rename = "GCDS", alias = "Gcds")]
    Gcds,
}

impl ShipType {
    pub const ALL: [ShipType; 9] = [
        Self::Interceptor,
        Self::Cruiser,
        Self::Dreadnaught,
        Self::Carrier,
        Self::Starbase,
        Self::Orbital,
        Self::Ancient,
        Self::Guardian,
        Self::Gcds,
    ];

    /// NPC hulls follow fixed targeting rules; everything else is player-controlled.
    pub const fn is_npc(self) -> bool {
        matches!(self, Self::Ancient | Self::Guardian | Self::Gcds)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interceptor => "Interceptor",
            Self::Cruiser => "Cruiser",
            Self::Dreadnaught => "Dreadnaught",
            Self::Carrier => "Carrier",
            Self::Starbase => "Starbase",
            Self::Orbital => "Orbital",
            Self::Ancient => "Ancient",
            Self::Guardian => "Guardian",
            Self::Gcds => "GCDS",
        }
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponType {
    Ion,
    Plasma,
    Soliton,
    Antimatter,
}

impl WeaponType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ion => "ion",
            Self::Plasma => "plasma",
            Self::Soliton => "soliton",
            Self::Antimatter => "antimatter",
        }
    }

    pub const fn damage(self) -> u32 {
        match self {
            Self::Ion => 1,
            Self::Plasma => 2,
            Self::Soliton => 3,
            Self::Antimatter => 4,
        }
    }
}

/// Per-class weapon counts, used for both cannons and missiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponLoadout {
    pub ion: u32,
    pub plasma: u32,
    pub soliton: u32,
    pub antimatter: u32,
}

impl WeaponLoadout {
    pub fn counts(&self) -> [(WeaponType, u32); 4] {
        [
            (WeaponType::Ion, self.ion),
            (WeaponType::Plasma, self.plasma),
            (WeaponType::Soliton, self.soliton),
            (WeaponType::Antimatter, self.antimatter),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.counts().iter().all(|&(_, count)| count == 0)
    }

    /// Damage if every weapon hit once.
    pub fn total_damage(&self) -> u32 {
        self.counts()
            .iter()
            .fold(0u32, |total, &(weapon, count)| {
                total.saturating_add(weapon.damage().saturating_mul(count))
            })
    }
}

/// Ship blueprint as supplied by the configuration layer. Every field defaults to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    pub hull: u32,
    pub computers: i32,
    pub shields: i32,
    pub initiative: i32,
    pub cannons: WeaponLoadout,
    pub missiles: WeaponLoadout,
    pub rift: u32,
    pub heal: u32,
}

/// One resolved weapon attack, before the target's shields are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shot {
    pub roll: u8,
    pub computers: i32,
    pub damage: u32,
}

impl Shot {
    /// Shot that ignores shields, used for rift damage.
    pub const fn guaranteed(damage: u32) -> Self {
        Self {
            roll: HIT,
            computers: 0,
            damage,
        }
    }

    pub fn hits(&self, shields: i32) -> bool {
        match self.roll {
            MISS => false,
            HIT => true,
            roll => {
                i32::from(roll)
                    .saturating_add(self.computers)
                    .saturating_sub(shields)
                    >= HIT_AFTER_MODIFIERS
            }
        }
    }
}

/// Outcome of one rift cannon roll. Only non-zero results are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiftShot {
    pub self_damage: u32,
    pub target_damage: u32,
}

pub struct Ship {
    id: ShipId,
    pub ship_type: ShipType,
    pub hull: u32,
    pub computers: i32,
    pub shields: i32,
    pub initiative: i32,
    pub cannons: WeaponLoadout,
    pub missiles: WeaponLoadout,
    pub rift: u32,
    pub heal: u32,
    damage: u32,
    roll_d6: DieRoll,
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ship")
            .field("id", &self.id)
            .field("ship_type", &self.ship_type)
            .field("hull", &self.hull)
            .field("computers", &self.computers)
            .field("shields", &self.shields)
            .field("initiative", &self.initiative)
            .field("cannons", &self.cannons)
            .field("missiles", &self.missiles)
            .field("rift", &self.rift)
            .field("heal", &self.heal)
            .field("damage", &self.damage)
            .finish_non_exhaustive()
    }
}

impl Ship {
    pub fn new(ship_type: ShipType, config: ShipConfig, roll_d6: DieRoll) -> Self {
        Self {
            id: ShipId::next(),
            ship_type,
            hull: config.hull,
            computers: config.computers,
            shields: config.shields,
            initiative: config.initiative,
            cannons: config.cannons,
            missiles: config.missiles,
            rift: config.rift,
            heal: config.heal,
            damage: 0,
            roll_d6,
        }
    }

    /// Ship rolling the seeded SplitMix64 die.
    pub fn seeded(ship_type: ShipType, config: ShipConfig, seed: u64) -> Self {
        Self::new(ship_type, config, rng::seeded(seed))
    }

    pub fn id(&self) -> ShipId {
        self.id
    }

    pub fn config(&self) -> ShipConfig {
        ShipConfig {
            hull: self.hull,
            computers: self.computers,
            shields: self.shields,
            initiative: self.initiative,
            cannons: self.cannons,
            missiles: self.missiles,
            rift: self.rift,
            heal: self.heal,
        }
    }

    pub fn is_player_ship(&self) -> bool {
        !self.ship_type.is_npc()
    }

    pub fn shoot_cannons(&mut self, antimatter_splitter: bool) -> Vec<Shot> {
        let loadout = self.cannons;
        self.roll_weapons(&loadout, antimatter_splitter)
    }

    pub fn shoot_missiles(&mut self, antimatter_splitter: bool) -> Vec<Shot> {
        let loadout = self.missiles;
        self.roll_weapons(&loadout, antimatter_splitter)
    }

    fn roll_weapons(&mut self, loadout: &WeaponLoadout, antimatter_splitter: bool) -> Vec<Shot> {
        let mut shots = Vec::new();
        for (weapon, count) in loadout.counts() {
            for _ in 0..count {
                let roll = (self.roll_d6)();
                if roll == MISS {
                    continue;
                }
                if weapon == WeaponType::Antimatter && antimatter_splitter {
                    shots.extend((0..weapon.damage()).map(|_| Shot {
                        roll,
                        computers: self.computers,
                        damage: 1,
                    }));
                } else {
                    shots.push(Shot {
                        roll,
                        computers: self.computers,
                        damage: weapon.damage(),
                    });
                }
            }
        }
        shots
    }

    pub fn shoot_rift_cannon(&mut self) -> Vec<RiftShot> {
        (0..self.rift)
            .filter_map(|_| {
                let (self_damage, target_damage) = dice::rift_effect((self.roll_d6)());
                (self_damage > 0 || target_damage > 0).then_some(RiftShot {
                    self_damage,
                    target_damage,
                })
            })
            .collect()
    }

    pub fn shot_hits(&self, shot: &Shot) -> bool {
        shot.hits(self.shields)
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.damage = self.damage.saturating_add(amount);
    }

    pub fn damage_taken(&self) -> u32 {
        self.damage
    }

    pub fn max_hp(&self) -> u32 {
        self.hull.saturating_add(1)
    }

    pub fn remaining_hp(&self) -> u32 {
        self.max_hp().saturating_sub(self.damage)
    }

    pub fn is_alive(&self) -> bool {
        self.remaining_hp() > 0
    }

    pub fn reset_damage(&mut self) {
        self.damage = 0;
    }

    /// Regenerates up to `heal` damage; wrecks stay wrecked.
    pub fn apply_healing(&mut self) {
        if self.heal > 0 && self.is_alive() {
            self.damage = self.damage.saturating_sub(self.heal);
        }
    }

    /// Regular cannons or a rift cannon.
    pub fn has_cannons(&self) -> bool {
        !self.cannons.is_empty() || self.rift > 0
    }

    pub fn has_missiles(&self) -> bool {
        !self.missiles.is_empty()
    }
}
