use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::battle::BattleEngine;
use crate::config::BattleConfig;
use crate::driver::{DriveOutcome, Driver};
use crate::log::{CombatEvent, DEFAULT_LOG_CAPACITY};
use crate::roster::{Roster, RosterFormat};
use crate::Dice;

const DEFAULT_SAMPLES: u32 = 100;
const DEFAULT_MAX_ROUNDS: u64 = 100_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationConfig {
    /// Roster file (JSON or YAML). Takes precedence over the other sources.
    #[serde(default)]
    pub roster_path: Option<String>,
    /// Name of a builtin roster.
    #[serde(default)]
    pub roster_id: Option<String>,
    /// Size of a synthetic roster generated from `seed`.
    #[serde(default)]
    pub generate: Option<usize>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_samples")]
    pub samples: u32,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u64,
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

fn default_samples() -> u32 {
    DEFAULT_SAMPLES
}

fn default_max_rounds() -> u64 {
    DEFAULT_MAX_ROUNDS
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            roster_path: None,
            roster_id: None,
            generate: None,
            seed: 0,
            samples: DEFAULT_SAMPLES,
            max_rounds: DEFAULT_MAX_ROUNDS,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl SimulationConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read simulation config: {}", path.display()))?;
        let cfg = match RosterFormat::from_path(path) {
            RosterFormat::Yaml => serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse simulation YAML: {}", path.display()))?,
            RosterFormat::Json => serde_json::from_str(&text)
                .with_context(|| format!("failed to parse simulation JSON: {}", path.display()))?,
        };
        Ok(cfg)
    }

    pub fn roster(&self) -> Result<Roster> {
        if let Some(path) = &self.roster_path {
            return Roster::load(path);
        }
        if let Some(id) = &self.roster_id {
            return Roster::builtin(id);
        }
        if let Some(count) = self.generate {
            let mut dice = Dice::from_seed(self.seed);
            return Ok(Roster::generate(count, &mut dice));
        }
        bail!("no roster source: set roster_path, roster_id or generate")
    }

    fn battle_config(&self, seed: u64) -> BattleConfig {
        BattleConfig::default()
            .with_seed(seed)
            .with_log_capacity(self.log_capacity)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BattleSummary {
    pub winner_id: Option<String>,
    pub winner: Option<String>,
    pub winner_health: Option<u32>,
    pub rounds: u64,
    pub outcome: DriveOutcome,
    /// Newest first, capped at the log capacity.
    pub log: Vec<CombatEvent>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WinTally {
    pub display_name: String,
    pub wins: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationStats {
    pub samples: u32,
    /// Keyed by participant id, in roster order.
    pub wins: IndexMap<String, WinTally>,
    /// Battles cut off by `max_rounds`.
    pub unfinished: u32,
    /// Battles that never started because fewer than two fighters were seeded.
    pub not_started: u32,
    pub mean_rounds: f64,
    pub median_rounds: u64,
}

impl SimulationStats {
    /// Participants sorted by wins, most first; ties keep roster order.
    pub fn leaderboard(&self) -> Vec<(&str, &WinTally)> {
        let mut rows: Vec<_> = self.wins.iter().map(|(id, t)| (id.as_str(), t)).collect();
        rows.sort_by(|a, b| b.1.wins.cmp(&a.1.wins));
        rows
    }
}

/// Run one battle to completion with `cfg.seed`.
pub fn simulate_battle(cfg: &SimulationConfig) -> Result<BattleSummary> {
    let roster = cfg.roster()?;
    run_one(&roster, cfg, cfg.seed)
}

/// Run `cfg.samples` battles over the same roster; battle `i` uses seed
/// `cfg.seed + i`.
pub fn simulate_battles(cfg: &SimulationConfig) -> Result<SimulationStats> {
    let roster = cfg.roster()?;
    let mut wins: IndexMap<String, WinTally> = roster
        .iter()
        .map(|e| {
            let tally = WinTally {
                display_name: e.display_name.clone(),
                wins: 0,
            };
            (e.id.clone(), tally)
        })
        .collect();
    let mut unfinished = 0u32;
    let mut not_started = 0u32;
    let mut finished_rounds: Vec<u64> = Vec::with_capacity(cfg.samples as usize);

    for i in 0..cfg.samples {
        let summary = run_one(&roster, cfg, cfg.seed.wrapping_add(i as u64))?;
        match summary.outcome {
            DriveOutcome::Finished { .. } => {
                if let Some(tally) = summary.winner_id.as_ref().and_then(|id| wins.get_mut(id)) {
                    tally.wins += 1;
                }
                finished_rounds.push(summary.rounds);
            }
            DriveOutcome::Stopped { .. } => unfinished += 1,
            DriveOutcome::NotStarted => not_started += 1,
        }
    }

    finished_rounds.sort_unstable();
    let mean_rounds = if finished_rounds.is_empty() {
        0.0
    } else {
        finished_rounds.iter().sum::<u64>() as f64 / finished_rounds.len() as f64
    };
    let median_rounds = match finished_rounds.len() {
        0 => 0,
        n if n % 2 == 1 => finished_rounds[n / 2],
        n => (finished_rounds[n / 2 - 1] + finished_rounds[n / 2]) / 2,
    };

    Ok(SimulationStats {
        samples: cfg.samples,
        wins,
        unfinished,
        not_started,
        mean_rounds,
        median_rounds,
    })
}

fn run_one(roster: &Roster, cfg: &SimulationConfig, seed: u64) -> Result<BattleSummary> {
    let mut engine = BattleEngine::new(&cfg.battle_config(seed));
    engine.load_roster(roster)?;
    let outcome = Driver::new()
        .with_max_rounds(cfg.max_rounds)
        .run_instant(&mut engine)?;
    let winner = engine.winner();
    Ok(BattleSummary {
        winner_id: winner.map(|w| w.id().to_owned()),
        winner: winner.map(|w| w.display_name().to_owned()),
        winner_health: winner.map(|w| w.health()),
        rounds: engine.rounds(),
        outcome,
        log: engine.log().iter().cloned().collect(),
    })
}
