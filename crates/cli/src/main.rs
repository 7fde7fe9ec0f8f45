//! Gemfire command-line shell.

mod format;
mod repl;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gemfire_autoplay::{
    run_autoplay, write_json, write_text, AutoplayConfig, AutoplayError, AutoplayRequest,
    Simulator,
};
use gemfire_core::{Catalog, GameConfig, PlayerClass, RunState};
use gemfire_data::{load_catalog_or_builtin, load_game_config_or_default, save_snapshot};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Gemfire: a turn-based gem battler, headless
#[derive(Parser, Debug)]
#[command(name = "gemfire")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log filter such as `debug` or `gemfire_core=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log: Option<String>,

    /// Directory with optional config.json and catalog.json overrides
    #[arg(long, global = true, default_value = "assets")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Let the autoplay pilot play a run and report on it
    Auto {
        #[arg(short, long, default_value_t = 0xC0FFEE)]
        seed: u64,

        #[arg(short, long, default_value = "knight", value_parser = parse_class)]
        class: PlayerClass,

        #[arg(long, default_value_t = 600)]
        max_steps: u32,

        /// Rollouts per candidate action; 0 plays the greedy pilot only
        #[arg(long, default_value_t = 0)]
        rollouts: u32,

        /// Stop once this day is reached
        #[arg(long)]
        target_day: Option<u32>,

        /// Write the full result as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the step-by-step text report
        #[arg(long)]
        text: Option<PathBuf>,
    },

    /// Drive a run with the greedy pilot, printing every event
    Simulate {
        #[arg(short, long, default_value_t = 0xC0FFEE)]
        seed: u64,

        #[arg(short, long, default_value = "knight", value_parser = parse_class)]
        class: PlayerClass,

        #[arg(long, default_value_t = 200)]
        max_steps: u32,

        /// Save a snapshot of the final state
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Play interactively, one command per line
    Play {
        #[arg(short, long, default_value_t = 0xC0FFEE)]
        seed: u64,

        #[arg(short, long, default_value = "knight", value_parser = parse_class)]
        class: PlayerClass,

        /// Resume from a saved snapshot instead of starting fresh
        #[arg(long)]
        load: Option<PathBuf>,
    },

    /// Load and validate the data directory
    Check,
}

fn parse_class(value: &str) -> Result<PlayerClass, String> {
    PlayerClass::from_id(value).ok_or_else(|| format!("unknown class {value} (knight, mage, rogue)"))
}

fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(spec) => EnvFilter::new(spec),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log.as_deref());
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let (config, catalog) = load_world(&args.data_dir)?;
    match args.command {
        Commands::Auto {
            seed,
            class,
            max_steps,
            rollouts,
            target_day,
            json,
            text,
        } => {
            let mut request = AutoplayRequest::default();
            request.config = AutoplayConfig {
                seed,
                class,
                max_steps,
                rollouts_per_action: rollouts,
                ..AutoplayConfig::default()
            };
            request.targets.target_day = target_day;
            let factory = || -> Result<Simulator, AutoplayError> {
                Simulator::from_config(config.clone(), catalog.clone(), &request.config)
            };
            let result = run_autoplay(&factory, &request).context("autoplay")?;
            if let Some(path) = json.as_deref() {
                write_json(path, &result).with_context(|| format!("write {}", path.display()))?;
            }
            if let Some(path) = text.as_deref() {
                write_text(path, &result).with_context(|| format!("write {}", path.display()))?;
            }
            let metrics = &result.final_metrics;
            println!("seed {seed}: {:?} after {} steps", result.status, result.summary.steps);
            println!(
                "day {} {} health {}/{} zenny {} banked {} battles won {}",
                metrics.day,
                metrics.stage,
                metrics.health,
                metrics.max_health,
                metrics.zenny,
                metrics.banked,
                result.summary.battles_won
            );
            Ok(())
        }
        Commands::Simulate {
            seed,
            class,
            max_steps,
            save,
        } => simulate(config, catalog, class, seed, max_steps, save.as_deref()),
        Commands::Play { seed, class, load } => repl::run(config, catalog, class, seed, load),
        Commands::Check => {
            println!(
                "{}: {} gems, {} enemies, {} classes",
                args.data_dir.display(),
                catalog.gems.len(),
                catalog.enemies.len(),
                catalog.classes.len()
            );
            for class in PlayerClass::ALL {
                RunState::new(config.clone(), catalog.clone(), class, 1)
                    .with_context(|| format!("start a {class:?} run"))?;
            }
            println!("ok");
            Ok(())
        }
    }
}

fn load_world(dir: &Path) -> anyhow::Result<(GameConfig, Catalog)> {
    let config = load_game_config_or_default(dir)?;
    let catalog = load_catalog_or_builtin(dir)?;
    tracing::debug!(dir = %dir.display(), gems = catalog.gems.len(), "data.loaded");
    Ok((config, catalog))
}

fn simulate(
    config: GameConfig,
    catalog: Catalog,
    class: PlayerClass,
    seed: u64,
    max_steps: u32,
    save: Option<&Path>,
) -> anyhow::Result<()> {
    let cfg = AutoplayConfig {
        seed,
        class,
        ..AutoplayConfig::default()
    };
    let mut sim = Simulator::from_config(config, catalog, &cfg)?;
    for step in 0..max_steps {
        let Some(action) = sim.greedy_action(&cfg) else {
            break;
        };
        println!("{step:>4} {}", action.short_label());
        let events = sim
            .apply_action_events(&action)
            .with_context(|| format!("step {step}: {}", action.short_label()))?;
        for event in &events {
            println!("       {}", format::format_event(event));
        }
    }
    format::print_state(&sim.run);

    if let Some(path) = save {
        save_snapshot(path, &sim.run.snapshot())?;
        println!("saved to {}", path.display());
    }
    Ok(())
}
