use arena_engine::api::{simulate_battles, SimulationConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arena-sim")]
#[command(about = "Monte Carlo sim: many battles over one roster")]
struct Args {
    /// Simulation config (JSON or YAML). Flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Roster file (JSON or YAML)
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Builtin roster name
    #[arg(long)]
    builtin: Option<String>,

    /// Generate a synthetic roster of this size
    #[arg(long)]
    generate: Option<usize>,

    /// Number of battles
    #[arg(long)]
    samples: Option<u32>,

    /// Safety cap on rounds per battle
    #[arg(long)]
    max_rounds: Option<u64>,

    /// RNG base seed (battle i uses seed+i)
    #[arg(long)]
    seed: Option<u64>,

    /// Rows to show in the win table
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Print the raw stats as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut cfg = match args.config.as_ref() {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig {
            generate: Some(16),
            seed: 12345,
            ..Default::default()
        },
    };
    if let Some(path) = args.roster {
        cfg.roster_path = Some(path.to_string_lossy().into_owned());
    }
    if args.builtin.is_some() {
        cfg.roster_id = args.builtin;
        cfg.roster_path = None;
    }
    if args.generate.is_some() {
        cfg.generate = args.generate;
        cfg.roster_path = None;
        cfg.roster_id = None;
    }
    if let Some(samples) = args.samples {
        cfg.samples = samples;
    }
    if let Some(max_rounds) = args.max_rounds {
        cfg.max_rounds = max_rounds;
    }
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }

    info!(samples = cfg.samples, seed = cfg.seed, "running simulation");
    let stats = simulate_battles(&cfg)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let samples_f = stats.samples.max(1) as f64;
    println!("arena-sim results");
    println!("-----------------");
    println!("battles:            {}", stats.samples);
    println!("fighters:           {}", stats.wins.len());
    println!("unfinished:         {}", stats.unfinished);
    println!("not started:        {}", stats.not_started);
    println!("avg rounds:         {:.2}", stats.mean_rounds);
    println!("median rounds:      {}", stats.median_rounds);
    println!();
    println!("{:<24} {:>6} {:>8}", "fighter", "wins", "rate");
    for (id, tally) in stats.leaderboard().into_iter().take(args.top) {
        let label = format!("{} [{}]", tally.display_name, id);
        println!(
            "{:<24} {:>6} {:>7.1}%",
            label,
            tally.wins,
            tally.wins as f64 / samples_f * 100.0
        );
    }

    Ok(())
}
