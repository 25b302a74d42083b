use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use chinchon_core::AppInfo;
use chinchon_sim::config::{ResolvedOutputs, SimulationConfig};
use chinchon_sim::logging;
use chinchon_sim::simulator::Simulator;

/// Batch simulator for Chinchón matches.
#[derive(Debug, Parser)]
#[command(
    name = "chinchon-sim",
    author,
    version,
    about = "Seeded Chinchón match simulator"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "sim/sim.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of matches to play.
    #[arg(long, value_name = "COUNT")]
    matches: Option<usize>,

    /// Override the RNG seed for match generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no match is played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SimulationConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(matches) = cli.matches {
        config.matches.count = matches;
    }

    if let Some(seed) = cli.seed {
        config.matches.seed = seed;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let players = config.game.players;
    let matches = config.matches.count;

    println!(
        "Loaded configuration '{run_id}' with {players} players ({matches} match{}) on {} {}",
        if matches == 1 { "" } else { "es" },
        AppInfo::name(),
        AppInfo::version()
    );

    if cli.validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let telemetry = logging::install(&config.telemetry, &outputs)?;
    let simulator = Simulator::new(config, outputs);
    let summary = simulator.run()?;

    println!(
        "Simulation complete for '{run_id}': {} matches ({} finished) -> {} rows at {}",
        summary.matches_played,
        summary.matches_finished,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = telemetry.as_ref() {
        println!("Telemetry log: {}", guard.path().display());
    }

    Ok(())
}
