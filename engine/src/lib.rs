//! Elimination-tournament battle engine.
//!
//! A roster of participants is seeded into a [`BattleEngine`], which resolves
//! one random pairwise clash per round until a single survivor remains.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod api;
pub mod battle;
pub mod combat;
pub mod config;
pub mod content;
pub mod driver;
pub mod error;
pub mod log;
pub mod participant;
pub mod roster;

pub use battle::{BattleEngine, Phase, Standings};
pub use combat::{Blow, Clash, Resolver, UniformResolver, MAX_DAMAGE};
pub use config::{BattleConfig, Pacing};
pub use driver::{DriveOutcome, Driver};
pub use error::{BattleError, BattleResult};
pub use log::{BattleLog, CombatEvent, DEFAULT_LOG_CAPACITY};
pub use participant::{Participant, Vitality, MAX_HEALTH};
pub use roster::{Roster, RosterEntry};

enum Source {
    Seeded(ChaCha8Rng),
    Scripted { values: Vec<u32>, cursor: usize },
}

/// Random source for every draw the engine makes.
///
/// Seeded dice are deterministic per seed; scripted dice replay a fixed
/// sequence so exact scenarios can be reproduced in tests.
pub struct Dice {
    source: Source,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { source: Source::Seeded(ChaCha8Rng::seed_from_u64(seed)) }
    }

    pub fn from_entropy() -> Self {
        Self { source: Source::Seeded(ChaCha8Rng::from_entropy()) }
    }

    /// Replays `values` in order, wrapping around when exhausted. Each value is
    /// reduced into the range requested by the draw.
    pub fn from_scripted(values: Vec<u32>) -> Self {
        Self { source: Source::Scripted { values, cursor: 0 } }
    }

    /// Uniform index in `0..bound`. `bound` must be non-zero.
    pub fn index(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(0..bound),
            Source::Scripted { values, cursor } => next_scripted(values, cursor) as usize % bound,
        }
    }

    /// Uniform integer in `lo..=hi`.
    pub fn between(&mut self, lo: u32, hi: u32) -> u32 {
        debug_assert!(lo <= hi);
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(lo..=hi),
            Source::Scripted { values, cursor } => {
                let span = u64::from(hi - lo) + 1;
                lo + (u64::from(next_scripted(values, cursor)) % span) as u32
            }
        }
    }

    /// True with probability `p`.
    ///
    /// Scripted dice resolve `p` to whole percent (rounded), and a value
    /// passes when `value % 100` falls below that percentage.
    pub fn chance(&mut self, p: f64) -> bool {
        let p = p.clamp(0.0, 1.0);
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_bool(p),
            Source::Scripted { values, cursor } => {
                next_scripted(values, cursor) % 100 < (p * 100.0).round() as u32
            }
        }
    }
}

fn next_scripted(values: &[u32], cursor: &mut usize) -> u32 {
    if values.is_empty() {
        return 0;
    }
    let v = values[*cursor % values.len()];
    *cursor += 1;
    v
}

impl std::fmt::Debug for Dice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Source::Seeded(_) => f.write_str("Dice(seeded)"),
            Source::Scripted { values, cursor } => f
                .debug_struct("Dice")
                .field("scripted", values)
                .field("cursor", cursor)
                .finish(),
        }
    }
}
