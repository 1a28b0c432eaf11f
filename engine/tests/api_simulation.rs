use std::fs;

use arena_engine::api::{simulate_battle, simulate_battles, SimulationConfig};
use arena_engine::DriveOutcome;

#[test]
fn builtin_battle_runs_to_a_winner() {
    let cfg = SimulationConfig {
        roster_id: Some("fight_club".into()),
        seed: 2025,
        ..Default::default()
    };
    let summary = simulate_battle(&cfg).unwrap();
    assert!(summary.winner.is_some());
    assert!(summary.winner_health.is_some_and(|h| h > 0));
    assert!(matches!(summary.outcome, DriveOutcome::Finished { .. }));
    assert!(!summary.log.is_empty());
    assert!(summary.log.len() <= 50);
    assert_eq!(summary.log[0].sequence, summary.rounds);
}

#[test]
fn many_battles_account_for_every_sample() {
    let cfg = SimulationConfig {
        generate: Some(6),
        seed: 1,
        samples: 40,
        ..Default::default()
    };
    let stats = simulate_battles(&cfg).unwrap();
    assert_eq!(stats.samples, 40);
    assert_eq!(stats.wins.len(), 6);
    let total: u32 = stats.wins.values().map(|t| t.wins).sum();
    assert_eq!(total + stats.unfinished, 40);
    assert_eq!(stats.unfinished, 0);
    assert_eq!(stats.not_started, 0);
    assert!(stats.mean_rounds > 0.0);
    assert!(stats.median_rounds > 0);

    let board = stats.leaderboard();
    assert!(board.windows(2).all(|w| w[0].1.wins >= w[1].1.wins));
}

#[test]
fn round_limit_leaves_battles_unfinished() {
    let cfg = SimulationConfig {
        roster_id: Some("fight_club".into()),
        samples: 5,
        max_rounds: 3,
        ..Default::default()
    };
    let stats = simulate_battles(&cfg).unwrap();
    assert_eq!(stats.unfinished, 5);
    assert_eq!(stats.not_started, 0);
    assert_eq!(stats.median_rounds, 0);
}

#[test]
fn missing_roster_source_is_an_error() {
    let err = simulate_battle(&SimulationConfig::default()).unwrap_err();
    assert!(err.to_string().contains("no roster source"));
}

#[test]
fn single_entry_roster_never_starts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solo.json");
    fs::write(&path, r#"[{"id": "1", "username": "alone"}]"#).unwrap();
    let cfg = SimulationConfig {
        roster_path: Some(path.to_string_lossy().into_owned()),
        ..Default::default()
    };
    let summary = simulate_battle(&cfg).unwrap();
    assert_eq!(summary.outcome, DriveOutcome::NotStarted);
    assert!(summary.winner.is_none());
}

#[test]
fn config_loads_from_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim.yaml");
    fs::write(&path, "roster_id: duel\nseed: 9\nsamples: 12\n").unwrap();
    let cfg = SimulationConfig::load(&path).unwrap();
    assert_eq!(cfg.samples, 12);
    assert_eq!(cfg.max_rounds, 100_000);

    let stats = simulate_battles(&cfg).unwrap();
    let total: u32 = stats.wins.values().map(|t| t.wins).sum();
    assert_eq!(total, 12);
}

#[test]
fn lone_fighter_battles_are_not_started_rather_than_unfinished() {
    let cfg = SimulationConfig {
        generate: Some(1),
        seed: 4,
        samples: 3,
        ..Default::default()
    };
    let stats = simulate_battles(&cfg).unwrap();
    assert_eq!(stats.not_started, 3);
    assert_eq!(stats.unfinished, 0);
    assert_eq!(stats.wins.values().map(|t| t.wins).sum::<u32>(), 0);
    assert_eq!(stats.median_rounds, 0);
}
