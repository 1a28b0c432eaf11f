use arena_engine::roster::RosterFormat;
use arena_engine::{
    content, BattleConfig, BattleEngine, CombatEvent, Dice, DriveOutcome, Driver, Participant,
    Roster, Standings,
};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use encoding_rs::Encoding;
use serde::Serialize;
use std::{fs, path::Path, path::PathBuf, thread};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct BattleReport<'a> {
    outcome: DriveOutcome,
    winner: Option<&'a Participant>,
    rounds: u64,
    standings: Standings,
    log: Vec<&'a CombatEvent>,
}

#[derive(Args)]
struct RosterSource {
    /// Roster file (JSON array, or YAML with a .yaml/.yml extension)
    #[arg(long, conflicts_with_all = ["builtin", "generate"])]
    roster: Option<PathBuf>,
    /// Name of a builtin roster (see `arena builtins`)
    #[arg(long, conflicts_with = "generate")]
    builtin: Option<String>,
    /// Generate a synthetic roster of this many fighters
    #[arg(long)]
    generate: Option<usize>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run an elimination battle and print every round
    Battle {
        #[command(flatten)]
        source: RosterSource,
        /// RNG seed for determinism (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Speed multiplier for the tick interval
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
        /// Wait the tick interval between rounds instead of running flat out
        #[arg(long, default_value_t = false)]
        realtime: bool,
        /// Stop after this many rounds
        #[arg(long)]
        max_rounds: Option<u64>,
        /// Print a JSON summary instead of the play-by-play
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Generate a synthetic roster and dump it to stdout
    Roster {
        /// Number of fighters
        #[arg(long, default_value_t = 16)]
        generate: usize,
        /// RNG seed for determinism (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Emit YAML instead of JSON
        #[arg(long, default_value_t = false)]
        yaml: bool,
    },
    /// List builtin rosters
    Builtins,
}

#[derive(Parser)]
#[command(name = "arena")]
#[command(about = "Elimination battle arena")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Cmd,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_text_auto(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn dice_for(seed: Option<u64>) -> Dice {
    seed.map_or_else(Dice::from_entropy, Dice::from_seed)
}

fn load_roster(source: &RosterSource, seed: Option<u64>) -> anyhow::Result<Roster> {
    if let Some(path) = &source.roster {
        let text = read_text_auto(path)
            .with_context(|| format!("failed to read roster: {}", path.display()))?;
        return Roster::parse(&text, RosterFormat::from_path(path))
            .with_context(|| format!("invalid roster file: {}", path.display()));
    }
    if let Some(name) = &source.builtin {
        return Roster::builtin(name);
    }
    let count = source.generate.unwrap_or(16);
    Ok(Roster::generate(count, &mut dice_for(seed)))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Cmd::Battle {
            source,
            seed,
            speed,
            realtime,
            max_rounds,
            json,
        } => {
            let roster = load_roster(&source, seed)?;
            info!(fighters = roster.len(), ?seed, speed, "roster loaded");
            let config = BattleConfig {
                seed,
                ..BattleConfig::default()
            };
            let mut engine = BattleEngine::new(&config);
            engine.set_speed(speed)?;
            engine.load_roster(&roster)?;
            run_battle(&mut engine, realtime, max_rounds, json)?;
        }
        Cmd::Roster {
            generate,
            seed,
            yaml,
        } => {
            let roster = Roster::generate(generate, &mut dice_for(seed));
            if yaml {
                print!("{}", serde_yaml::to_string(&roster)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&roster)?);
            }
        }
        Cmd::Builtins => {
            let mut names: Vec<_> = content::builtin_rosters().into_keys().collect();
            names.sort_unstable();
            for name in names {
                let roster = Roster::builtin(name)?;
                println!("{name} ({} fighters)", roster.len());
            }
        }
    }
    Ok(())
}

fn run_battle(
    engine: &mut BattleEngine,
    realtime: bool,
    max_rounds: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let mut driver = Driver::new();
    if let Some(max) = max_rounds {
        driver = driver.with_max_rounds(max);
    }
    if !json {
        let s = engine.standings();
        println!(
            "[START] {} fighters, tick {:?}",
            s.total,
            engine.tick_interval()
        );
    }

    let mut alive = engine.standings().alive;
    let outcome = driver.run(
        engine,
        |interval| {
            if realtime {
                thread::sleep(interval);
            }
        },
        |engine, event| {
            let now = engine.standings().alive;
            if !json {
                print_event(engine.rounds(), event);
                if now < alive {
                    println!("[KO] @{} is eliminated ({} remaining)", event.defender, now);
                }
            }
            alive = now;
        },
    )?;

    if json {
        let report = BattleReport {
            outcome,
            winner: engine.winner(),
            rounds: engine.rounds(),
            standings: engine.standings(),
            log: engine.log().iter().collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match (outcome, engine.winner()) {
        (DriveOutcome::NotStarted, _) => println!("[END] not enough fighters to battle"),
        (DriveOutcome::Stopped { rounds }, _) => {
            let s = engine.standings();
            println!("[END] stopped after {rounds} rounds, {} of {} remaining", s.alive, s.total);
        }
        (DriveOutcome::Finished { .. }, Some(winner)) => println!(
            "[WINNER] @{} with {} HP remaining after {} rounds",
            winner.display_name(),
            winner.health(),
            engine.rounds()
        ),
        (DriveOutcome::Finished { .. }, None) => println!("[END] no winner"),
    }
    Ok(())
}

fn print_event(round: u64, event: &CombatEvent) {
    println!(
        "[R{round:>4}] {} {}",
        event.occurred_at.format("%H:%M:%S"),
        event
    );
}
