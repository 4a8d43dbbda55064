//! Command-line front end for the bundled demo machine.
//!
//! `demo` runs seeded trials and prints a JSON run report; `replay` feeds a
//! recorded choice sequence back through the same machine.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use statecheck::demo::{self, DEFAULT_CAPACITY};
use statecheck::exit_codes;
use statecheck::io::config::{ConfigOverrides, load_config};
use statecheck::logging;

#[derive(Parser)]
#[command(
    name = "statecheck",
    version,
    about = "Randomized state-machine testing demo"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run seeded trials against the demo ring queue.
    Demo {
        /// TOML config file; missing file means defaults.
        #[arg(long, default_value = "statecheck.toml")]
        config: PathBuf,
        /// Base seed; trial `i` uses `seed + i`.
        #[arg(long)]
        seed: Option<u64>,
        /// Steps per trial.
        #[arg(long)]
        steps: Option<u32>,
        /// Halve the step count.
        #[arg(long)]
        short: bool,
        /// Costly inapplicable attempts allowed per step.
        #[arg(long)]
        max_costly_attempts: Option<u32>,
        /// Number of trials to run.
        #[arg(long, default_value_t = 100)]
        trials: u32,
        /// Queue capacity.
        #[arg(long, default_value_t = DEFAULT_CAPACITY)]
        capacity: usize,
        /// Use the queue variant with a broken length.
        #[arg(long)]
        buggy: bool,
    },
    /// Replay a recorded choice sequence (the `choices` of a report).
    Replay {
        /// Comma-separated choice values.
        #[arg(long, value_delimiter = ',', required = true)]
        draws: Vec<u64>,
        /// TOML config file the failing run used.
        #[arg(long, default_value = "statecheck.toml")]
        config: PathBuf,
        /// Steps per trial.
        #[arg(long)]
        steps: Option<u32>,
        /// Halve the step count.
        #[arg(long)]
        short: bool,
        /// Costly inapplicable attempts allowed per step.
        #[arg(long)]
        max_costly_attempts: Option<u32>,
        /// Queue capacity.
        #[arg(long, default_value_t = DEFAULT_CAPACITY)]
        capacity: usize,
        /// Use the queue variant with a broken length.
        #[arg(long)]
        buggy: bool,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Demo {
            config,
            seed,
            steps,
            short,
            max_costly_attempts,
            trials,
            capacity,
            buggy,
        } => {
            let overrides = ConfigOverrides {
                steps,
                short,
                max_costly_attempts,
                seed,
            };
            let cfg = load_config(&config)?.apply_overrides(&overrides)?;
            let report = demo::run_trials(&cfg, trials, capacity, buggy)?;
            print_json(&report)?;
            Ok(report.exit_code())
        }
        Command::Replay {
            draws,
            config,
            steps,
            short,
            max_costly_attempts,
            capacity,
            buggy,
        } => {
            let overrides = ConfigOverrides {
                steps,
                short,
                max_costly_attempts,
                seed: None,
            };
            let cfg = load_config(&config)?.apply_overrides(&overrides)?;
            let report = demo::replay(draws, cfg.budget(), capacity, buggy)?;
            print_json(&report)?;
            Ok(report.exit_code())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize report")?;
    println!("{json}");
    Ok(())
}
