use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::combat::{Resolver, UniformResolver};
use crate::config::{BattleConfig, Pacing};
use crate::error::{BattleError, BattleResult};
use crate::log::{BattleLog, CombatEvent};
use crate::participant::Participant;
use crate::roster::Roster;
use crate::Dice;

/// Battle lifecycle: `Idle -> Ready -> Fighting -> Finished`, with reset
/// returning to `Ready` from any phase but `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Ready,
    Fighting,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::Ready => "ready",
            Phase::Fighting => "fighting",
            Phase::Finished => "finished",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Standings {
    pub alive: usize,
    pub eliminated: usize,
    pub total: usize,
}

/// Owns the living set, the event log and the winner of one tournament.
///
/// All mutation goes through [`load_roster`](Self::load_roster),
/// [`start`](Self::start), [`advance_round`](Self::advance_round) and
/// [`reset`](Self::reset); each runs to completion before returning.
pub struct BattleEngine<R = UniformResolver> {
    phase: Phase,
    roster: Roster,
    living: Vec<Participant>,
    log: BattleLog,
    winner: Option<Participant>,
    rounds: u64,
    speed: f64,
    pacing: Pacing,
    dice: Dice,
    resolver: R,
}

impl BattleEngine<UniformResolver> {
    pub fn new(config: &BattleConfig) -> Self {
        let dice = match config.seed {
            Some(seed) => Dice::from_seed(seed),
            None => Dice::from_entropy(),
        };
        Self::with_dice(config, dice)
    }

    pub fn with_dice(config: &BattleConfig, dice: Dice) -> Self {
        Self::with_resolver(config, dice, UniformResolver)
    }
}

impl<R: Resolver> BattleEngine<R> {
    pub fn with_resolver(config: &BattleConfig, dice: Dice, resolver: R) -> Self {
        let speed = if valid_speed(config.speed) {
            config.speed
        } else {
            warn!(speed = config.speed, "ignoring configured speed, using 1.0");
            1.0
        };
        Self {
            phase: Phase::Idle,
            roster: Roster::default(),
            living: Vec::new(),
            log: BattleLog::new(config.log_capacity),
            winner: None,
            rounds: 0,
            speed,
            pacing: config.pacing,
            dice,
            resolver,
        }
    }

    /// Seed the engine from a roster. Allowed in every phase; always lands
    /// in `Ready` with full health, an empty log and no winner.
    pub fn load_roster(&mut self, roster: &Roster) -> BattleResult<()> {
        if roster.is_empty() {
            warn!(phase = %self.phase, "rejected empty roster");
            return Err(BattleError::InvalidRoster("roster is empty".into()));
        }
        self.roster = roster.clone();
        self.reseed();
        info!(participants = self.roster.len(), "roster loaded");
        Ok(())
    }

    /// Begin fighting. With fewer than two living participants this is a
    /// silent no-op and the engine stays `Ready`.
    pub fn start(&mut self) -> BattleResult<()> {
        if self.phase != Phase::Ready {
            return Err(BattleError::precondition("start", self.phase));
        }
        if self.living.len() < 2 {
            debug!(living = self.living.len(), "start ignored, not enough participants");
            return Ok(());
        }
        self.log.clear();
        self.winner = None;
        self.phase = Phase::Fighting;
        info!(living = self.living.len(), "battle started");
        Ok(())
    }

    /// Resolve one round and apply it.
    ///
    /// Zero-health participants are pruned after the blow lands. When one
    /// participant is left it becomes the winner and the phase moves to
    /// `Finished`.
    pub fn advance_round(&mut self) -> BattleResult<CombatEvent> {
        if self.phase != Phase::Fighting {
            return Err(BattleError::precondition("advance_round", self.phase));
        }
        if self.living.len() < 2 {
            self.settle()?;
            return Err(BattleError::precondition("advance_round", self.phase));
        }

        let clash = self.resolver.resolve(&self.living, &mut self.dice);
        let n = self.living.len();
        if clash.attacker >= n || clash.defender >= n || clash.attacker == clash.defender {
            return Err(BattleError::InvariantViolation(format!(
                "resolver paired {} with {} among {} living",
                clash.attacker, clash.defender, n
            )));
        }

        let attacker = self.living[clash.attacker].display_name().to_owned();
        let defender = &mut self.living[clash.defender];
        let defender_name = defender.display_name().to_owned();
        let knocked_out = defender.lower_health_to(clash.defender_health);
        let remaining = defender.health();

        let event = self.log.record(attacker, defender_name, clash.damage).clone();
        self.rounds += 1;
        debug!(
            round = self.rounds,
            attacker = %event.attacker,
            defender = %event.defender,
            damage = event.damage,
            remaining,
            knocked_out,
            "round resolved"
        );

        self.living.retain(Participant::is_alive);
        self.settle()?;
        Ok(event)
    }

    /// Back to `Ready` with the full original roster. A no-op while `Idle`.
    pub fn reset(&mut self) -> BattleResult<()> {
        if self.phase == Phase::Idle {
            debug!("reset ignored, no roster loaded");
            return Ok(());
        }
        self.reseed();
        info!(participants = self.roster.len(), "battle reset");
        Ok(())
    }

    /// Change the advisory tick speed. Takes effect on the next tick the
    /// driver schedules.
    pub fn set_speed(&mut self, multiplier: f64) -> BattleResult<()> {
        if !valid_speed(multiplier) {
            return Err(BattleError::InvalidSpeed(multiplier));
        }
        self.speed = multiplier;
        debug!(speed = multiplier, interval = ?self.tick_interval(), "speed changed");
        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn living(&self) -> &[Participant] {
        &self.living
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    /// Set only while `Finished`.
    pub fn winner(&self) -> Option<&Participant> {
        self.winner.as_ref()
    }

    /// Rounds resolved since the last seed or reset.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn tick_interval(&self) -> Duration {
        self.pacing.interval(self.speed)
    }

    pub fn standings(&self) -> Standings {
        let total = self.roster.len();
        let alive = self.living.len();
        Standings {
            alive,
            eliminated: total.saturating_sub(alive),
            total,
        }
    }

    fn reseed(&mut self) {
        self.living = self.roster.iter().map(Participant::from_entry).collect();
        self.log.clear();
        self.winner = None;
        self.rounds = 0;
        self.phase = Phase::Ready;
    }

    fn settle(&mut self) -> BattleResult<()> {
        match self.living.as_slice() {
            [sole] => {
                info!(
                    winner = %sole.display_name(),
                    health = sole.health(),
                    rounds = self.rounds,
                    "battle finished"
                );
                self.winner = Some(sole.clone());
                self.phase = Phase::Finished;
                Ok(())
            }
            [] => {
                warn!(rounds = self.rounds, "living set emptied without a winner");
                self.winner = None;
                self.phase = Phase::Finished;
                Err(BattleError::InvariantViolation(
                    "no participants left and no winner recorded".into(),
                ))
            }
            _ => Ok(()),
        }
    }
}

impl<R> fmt::Debug for BattleEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BattleEngine")
            .field("phase", &self.phase)
            .field("living", &self.living.len())
            .field("roster", &self.roster.len())
            .field("log", &self.log.len())
            .field("rounds", &self.rounds)
            .finish()
    }
}

fn valid_speed(speed: f64) -> bool {
    speed.is_finite() && speed > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RosterEntry;

    fn roster(n: usize) -> Roster {
        Roster::new((0..n).map(|i| RosterEntry::new(format!("p{i}"), format!("P{i}")))).unwrap()
    }

    fn seeded() -> BattleEngine {
        BattleEngine::new(&BattleConfig::default().with_seed(5))
    }

    #[test]
    fn empty_living_set_finalizes_without_winner() {
        let mut engine = seeded();
        engine.load_roster(&roster(3)).unwrap();
        engine.start().unwrap();
        engine.living.clear();

        let err = engine.advance_round().unwrap_err();
        assert!(matches!(err, BattleError::InvariantViolation(_)));
        assert_eq!(engine.phase(), Phase::Finished);
        assert!(engine.winner().is_none());
    }

    #[test]
    fn lone_survivor_mid_fight_is_crowned() {
        let mut engine = seeded();
        engine.load_roster(&roster(3)).unwrap();
        engine.start().unwrap();
        engine.living.truncate(1);

        let err = engine.advance_round().unwrap_err();
        assert_eq!(err, BattleError::precondition("advance_round", Phase::Finished));
        assert_eq!(engine.winner().map(Participant::id), Some("p0"));
    }

    #[test]
    fn configured_bad_speed_falls_back() {
        let engine = BattleEngine::new(&BattleConfig::default().with_speed(-2.0));
        assert!((engine.speed() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn phase_display_is_lowercase() {
        assert_eq!(Phase::Fighting.to_string(), "fighting");
        let err = BattleError::precondition("start", Phase::Idle);
        assert_eq!(err.to_string(), "`start` is not allowed while idle");
    }
}
