//! Dice sources for combat. Uses SplitMix64 for throughput and good statistical quality.
//! Deterministic: same seed produces the same roll sequence. Not cryptographically secure.
//!
//! Every [`Ship`](crate::combat::Ship) owns its own [`DieRoll`], so tests can force
//! exact faces and parallel trials never share roll state.

use crate::combat::dice::NUM_SIDES;

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

/// Boxed die source handed to a ship at construction. Returns a face in `1..=6`.
pub type DieRoll = Box<dyn FnMut() -> u8 + Send>;

#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX64_GOLDEN);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
        z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
        z ^ (z >> 31)
    }

    /// Uniform face in `1..=6`. Uses the high bits; the modulo bias over 2^32 is negligible.
    #[inline]
    pub fn roll_d6(&mut self) -> u8 {
        ((self.next_u64() >> 32) % u64::from(NUM_SIDES)) as u8 + 1
    }

    pub fn into_die(mut self) -> DieRoll {
        Box::new(move || self.roll_d6())
    }
}

/// Die that always lands on `face`.
pub fn fixed(face: u8) -> DieRoll {
    Box::new(move || face)
}

/// Die that walks `faces` in order and wraps around. An empty list always misses.
pub fn cycle(faces: Vec<u8>) -> DieRoll {
    let mut next = 0usize;
    Box::new(move || {
        if faces.is_empty() {
            return crate::combat::dice::MISS;
        }
        let face = faces[next % faces.len()];
        next = next.wrapping_add(1);
        face
    })
}

/// Seeded SplitMix64 die.
pub fn seeded(seed: u64) -> DieRoll {
    Rng::new(seed).into_die()
}

/// Seed from OS entropy, falling back to the clock when entropy is unavailable.
pub fn entropy_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(err) => {
            tracing::warn!("os entropy unavailable ({err}), seeding from clock");
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(SPLITMIX64_GOLDEN)
        }
    }
}

/// Fold identifying strings into a seed so each ship gets an independent, reproducible stream.
pub fn mix_seed(seed: u64, parts: &[&str], ordinal: u64) -> u64 {
    let mut acc = seed;
    for part in parts {
        for b in part.bytes() {
            acc = acc.wrapping_mul(37).wrapping_add(u64::from(b));
        }
    }
    let mut mixer = Rng::new(acc ^ ordinal.wrapping_mul(SPLITMIX64_GOLDEN));
    mixer.next_u64()
}
