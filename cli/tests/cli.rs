#![allow(deprecated)] // Command::cargo_bin

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn arena() -> Command {
    Command::cargo_bin("arena").unwrap()
}

#[test]
fn battle_with_builtin_roster_crowns_a_winner() {
    arena()
        .args(["battle", "--builtin", "fight_club", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[START] 16 fighters"))
        .stdout(predicate::str::contains("[KO]"))
        .stdout(predicate::str::contains("[WINNER] @"));
}

#[test]
fn battle_is_reproducible_with_a_seed() {
    let run = || {
        let out = arena()
            .args(["battle", "--generate", "5", "--seed", "11", "--json"])
            .output()
            .unwrap();
        assert!(out.status.success());
        let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
        (v["winner"]["id"].clone(), v["rounds"].clone())
    };
    assert_eq!(run(), run());
}

#[test]
fn json_summary_has_capped_log() {
    let out = arena()
        .args(["battle", "--generate", "30", "--seed", "3", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["outcome"]["outcome"], "finished");
    assert_eq!(v["standings"]["alive"], 1);
    assert_eq!(v["log"].as_array().unwrap().len(), 50);
}

#[test]
fn round_limit_is_reported() {
    arena()
        .args(["battle", "--generate", "10", "--seed", "1", "--max-rounds", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[END] stopped after 2 rounds, 10 of 10 remaining"));
}

#[test]
fn roster_file_with_bom_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pair.json");
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(br#"[{"id":"a","username":"ana"},{"id":"b","username":"bo"}]"#);
    fs::write(&path, bytes).unwrap();

    arena()
        .args(["battle", "--seed", "2", "--roster"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[START] 2 fighters"))
        .stdout(predicate::str::is_match(r"\[WINNER\] @(ana|bo) with \d+ HP").unwrap());
}

#[test]
fn single_fighter_does_not_start() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solo.yaml");
    fs::write(&path, "- id: a\n  username: ana\n").unwrap();

    arena()
        .args(["battle", "--roster"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("not enough fighters"));
}

#[test]
fn empty_roster_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.json");
    fs::write(&path, "[]").unwrap();

    arena()
        .args(["battle", "--roster"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid roster"));
}

#[test]
fn zero_speed_is_rejected() {
    arena()
        .args(["battle", "--generate", "3", "--speed", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("speed multiplier"));
}

#[test]
fn roster_dump_round_trips_through_battle() {
    let out = arena()
        .args(["roster", "--generate", "4", "--seed", "5", "--yaml"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gen.yml");
    fs::write(&path, &out.stdout).unwrap();

    arena()
        .args(["battle", "--seed", "5", "--roster"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[START] 4 fighters"));
}

#[test]
fn builtins_are_listed() {
    arena()
        .arg("builtins")
        .assert()
        .success()
        .stdout(predicate::str::contains("duel (2 fighters)"))
        .stdout(predicate::str::contains("fight_club (16 fighters)"));
}

#[test]
fn sim_prints_win_table() {
    Command::cargo_bin("arena-sim")
        .unwrap()
        .args(["--builtin", "duel", "--samples", "20", "--seed", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("battles:            20"))
        .stdout(predicate::str::contains("gladiator_real [follower_0]"));
}

#[test]
fn sim_separates_unstartable_battles() {
    Command::cargo_bin("arena-sim")
        .unwrap()
        .args(["--generate", "1", "--samples", "3", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unfinished:         0"))
        .stdout(predicate::str::contains("not started:        3"));
}
