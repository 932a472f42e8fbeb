/// Faces and thresholds shared by every weapon roll.
pub const NUM_SIDES: u8 = 6;
/// A natural 1 always misses.
pub const MISS: u8 = 1;
/// A natural 6 always hits.
pub const HIT: u8 = 6;
/// `roll + computers - shields` must reach this to hit.
pub const HIT_AFTER_MODIFIERS: i32 = 6;

pub const RIFT_SELF_DAMAGE: u8 = 1;
pub const RIFT_MISS_1: u8 = 2;
pub const RIFT_MISS_2: u8 = 3;
/// Target damage summed over all six rift faces; used to rate rift firepower.
pub const TOTAL_RIFT_DIE_DAMAGE: u32 = 6;

/// Damage dealt by a rift face as `(self_damage, target_damage)`.
pub const fn rift_effect(face: u8) -> (u32, u32) {
    match face {
        RIFT_SELF_DAMAGE => (1, 0),
        RIFT_MISS_1 | RIFT_MISS_2 => (0, 0),
        4 => (0, 1),
        5 => (0, 2),
        HIT => (1, 3),
        _ => (0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rift_table_matches_every_face() {
        let table: Vec<(u32, u32)> = (1..=NUM_SIDES).map(rift_effect).collect();
        assert_eq!(table, vec![(1, 0), (0, 0), (0, 0), (0, 1), (0, 2), (1, 3)]);
    }

    #[test]
    fn rift_total_damage_matches_table() {
        let total: u32 = (1..=NUM_SIDES)
            .map(rift_effect)
            .map(|(own, target)| own + target)
            .sum();
        assert_eq!(total, 8);
        let target_only: u32 = (1..=NUM_SIDES).map(|face| rift_effect(face).1).sum();
        assert_eq!(target_only, TOTAL_RIFT_DIE_DAMAGE);
    }
}
