use serde::{Deserialize, Serialize};

use crate::participant::Participant;
use crate::Dice;

/// Highest damage a single blow can deal. A roll of 0 is a miss.
pub const MAX_DAMAGE: u32 = 30;

/// Damage at or above this is rendered as a heavy blow.
pub const HEAVY_DAMAGE: u32 = 25;

/// Outcome of one resolved round, addressed by index into the living set
/// the resolver was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clash {
    pub attacker: usize,
    pub defender: usize,
    pub damage: u32,
    /// Defender health after the blow, already floored at 0.
    pub defender_health: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blow {
    Miss,
    Hit,
    Heavy,
}

impl Blow {
    pub fn from_damage(damage: u32) -> Self {
        match damage {
            0 => Blow::Miss,
            d if d >= HEAVY_DAMAGE => Blow::Heavy,
            _ => Blow::Hit,
        }
    }
}

/// Picks who fights whom and how hard.
///
/// Callers guarantee `living.len() >= 2`. Implementations must not keep
/// state between calls; every round is independent.
pub trait Resolver {
    fn resolve(&self, living: &[Participant], dice: &mut Dice) -> Clash;
}

/// Uniform attacker, uniform distinct defender, uniform damage in
/// `0..=MAX_DAMAGE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformResolver;

impl Resolver for UniformResolver {
    fn resolve(&self, living: &[Participant], dice: &mut Dice) -> Clash {
        let (attacker, defender) = pick_pair(dice, living.len());
        let damage = roll_damage(dice);
        let defender_health = living[defender].health().saturating_sub(damage);
        Clash {
            attacker,
            defender,
            damage,
            defender_health,
        }
    }
}

/// Draw an attacker index, then redraw the defender until it differs.
pub fn pick_pair(dice: &mut Dice, living: usize) -> (usize, usize) {
    debug_assert!(living >= 2, "pick_pair needs two living participants");
    let attacker = dice.index(living);
    let mut defender = dice.index(living);
    while defender == attacker {
        defender = dice.index(living);
    }
    (attacker, defender)
}

pub fn roll_damage(dice: &mut Dice) -> u32 {
    dice.between(0, MAX_DAMAGE)
}
