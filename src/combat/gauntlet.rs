use tracing::debug;

use crate::combat::battle::{Battle, BattleOutcome, BattleResult};
use crate::combat::error::SimulationError;
use crate::combat::fleet::Fleet;

/// Winner-stays-on elimination. The last fleet in the list defends, the one
/// before it attacks; losers leave and the next fleet in line challenges the survivor.
pub struct MultiBattle<'a> {
    fleets: &'a mut [Fleet],
    remaining: Vec<usize>,
}

/// Every bout in order, plus the index of the fleet left standing (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GauntletResult {
    pub bouts: Vec<BattleResult>,
    pub survivor: Option<usize>,
}

impl<'a> MultiBattle<'a> {
    pub fn new(fleets: &'a mut [Fleet]) -> Result<Self, SimulationError> {
        if fleets.len() < 2 {
            return Err(SimulationError::NotEnoughFleets {
                found: fleets.len(),
            });
        }
        let remaining = (0..fleets.len()).collect();
        Ok(Self { fleets, remaining })
    }

    pub fn run(mut self) -> GauntletResult {
        let mut bouts = Vec::new();
        while self.remaining.len() > 1 {
            let defender_slot = self.remaining.len() - 1;
            let attacker_slot = defender_slot - 1;
            let (attacker, defender) = pair_mut(
                self.fleets,
                self.remaining[attacker_slot],
                self.remaining[defender_slot],
            );
            let result = Battle::new(attacker, defender).fight();
            debug!(
                attacker = attacker.name(),
                defender = defender.name(),
                outcome = ?result.outcome,
                "gauntlet bout finished"
            );

            match result.outcome {
                BattleOutcome::Attacker => {
                    self.remaining.remove(defender_slot);
                }
                BattleOutcome::Defender => {
                    self.remaining.remove(attacker_slot);
                }
                BattleOutcome::Draw => {
                    self.remaining.truncate(attacker_slot);
                }
            }
            bouts.push(result);
        }

        GauntletResult {
            bouts,
            survivor: self.remaining.first().copied(),
        }
    }
}

/// Two distinct mutable fleets out of one slice.
fn pair_mut(fleets: &mut [Fleet], first: usize, second: usize) -> (&mut Fleet, &mut Fleet) {
    if first < second {
        let (head, tail) = fleets.split_at_mut(second);
        (&mut head[first], &mut tail[0])
    } else {
        let (head, tail) = fleets.split_at_mut(first);
        (&mut tail[0], &mut head[second])
    }
}
