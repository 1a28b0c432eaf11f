use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::battle::{BattleEngine, Phase};
use crate::combat::Resolver;
use crate::error::{BattleError, BattleResult};
use crate::log::CombatEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum DriveOutcome {
    /// Fewer than two participants; the engine stayed `Ready`.
    NotStarted,
    /// The engine left `Fighting`, by finishing or by an external reset.
    Finished { rounds: u64 },
    /// The round limit was hit while still fighting.
    Stopped { rounds: u64 },
}

/// Periodic trigger for [`BattleEngine::advance_round`].
///
/// The interval is re-read from the engine before every tick, so a speed
/// change made from the event callback applies to the next round.
#[derive(Debug, Clone, Copy, Default)]
pub struct Driver {
    max_rounds: Option<u64>,
}

impl Driver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rounds(mut self, max_rounds: u64) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    /// Start the battle if it is `Ready`, then tick until the phase leaves
    /// `Fighting`. `sleep` is handed each tick interval before the round runs.
    /// Driving an `Idle` or `Finished` engine is a precondition violation.
    pub fn run<R, S, F>(
        &self,
        engine: &mut BattleEngine<R>,
        mut sleep: S,
        mut on_event: F,
    ) -> BattleResult<DriveOutcome>
    where
        R: Resolver,
        S: FnMut(Duration),
        F: FnMut(&mut BattleEngine<R>, &CombatEvent),
    {
        match engine.phase() {
            Phase::Ready => {
                engine.start()?;
                if engine.phase() == Phase::Ready {
                    return Ok(DriveOutcome::NotStarted);
                }
            }
            Phase::Fighting => {}
            phase => return Err(BattleError::precondition("drive", phase)),
        }

        let mut rounds = 0u64;
        while engine.phase() == Phase::Fighting {
            if self.max_rounds.is_some_and(|max| rounds >= max) {
                debug!(rounds, "round limit reached");
                return Ok(DriveOutcome::Stopped { rounds });
            }
            sleep(engine.tick_interval());
            let event = engine.advance_round()?;
            rounds += 1;
            on_event(engine, &event);
        }
        Ok(DriveOutcome::Finished { rounds })
    }

    /// Run with no delay between rounds.
    pub fn run_instant<R: Resolver>(
        &self,
        engine: &mut BattleEngine<R>,
    ) -> BattleResult<DriveOutcome> {
        self.run(engine, |_| {}, |_, _| {})
    }
}
