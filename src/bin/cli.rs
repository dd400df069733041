// bin/cli.rs - TRAVOS CLI Tool
//
//! TRAVOS Command Line Interface
//!
//! Evaluates scenario files and manages the scenario store.
//!
//! # Usage
//!
//! ```bash
//! # Evaluate a scenario file
//! travos-cli evaluate ./scenario.json
//!
//! # Import a file as scenario 3, then evaluate it from the store
//! travos-cli scenarios import 3 ./scenario.json
//! travos-cli run 3 --format json
//!
//! # List stored scenarios
//! travos-cli scenarios list
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use travos_trust::config::AppConfig;
use travos_trust::observability::init_tracing;
use travos_trust::scenario::{Scenario, ScenarioDocument};
use travos_trust::store::{scenario_name, ScenarioStore};
use travos_trust::trust::{BatchEvaluator, Outcome, TrustResult};

/// TRAVOS CLI Tool
#[derive(Parser, Debug)]
#[command(name = "travos-cli")]
#[command(author = "SavageS")]
#[command(version)]
#[command(about = "TRAVOS trust evaluation - evaluate scenarios and manage the scenario store")]
#[command(long_about = None)]
struct Args {
    /// Config file path (policy, store location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Scenario store directory (overrides config)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Log level for diagnostics on stderr
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a scenario JSON file
    Evaluate {
        /// Scenario file
        file: PathBuf,
    },

    /// Scenario store commands
    #[command(subcommand)]
    Scenarios(ScenarioCommands),

    /// Evaluate a stored scenario
    Run {
        /// Scenario number
        number: u64,
    },
}

#[derive(Subcommand, Debug)]
enum ScenarioCommands {
    /// List stored scenarios
    List,

    /// Show a stored scenario document
    Show {
        /// Scenario number
        number: u64,
    },

    /// Import a scenario file under a number
    Import {
        /// Scenario number
        number: u64,

        /// Scenario file
        file: PathBuf,
    },

    /// Remove a stored scenario
    Remove {
        /// Scenario number
        number: u64,
    },
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(store) = &args.store {
        config.store.path = store.clone();
    }
    config.logging.level = args.log_level.clone();
    init_tracing(config.tracing());

    match &args.command {
        Commands::Evaluate { file } => cmd_evaluate(&args, &config, file),
        Commands::Run { number } => cmd_run(&args, &config, *number),
        Commands::Scenarios(cmd) => cmd_scenarios(&args, &config, cmd),
    }
}

fn open_store(config: &AppConfig) -> Result<ScenarioStore> {
    ScenarioStore::open(&config.store.path)
        .with_context(|| format!("Failed to open scenario store at {}", config.store.path.display()))
}

fn read_document(file: &Path) -> Result<ScenarioDocument> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    ScenarioDocument::from_json(&json).with_context(|| format!("Invalid scenario file {}", file.display()))
}

// =============================================================================
// Command Handlers
// =============================================================================

fn cmd_evaluate(args: &Args, config: &AppConfig, file: &Path) -> Result<()> {
    let document = read_document(file)?;
    let title = document
        .name
        .clone()
        .unwrap_or_else(|| file.display().to_string());
    evaluate_document(args, &config.evaluator(), &title, document)
}

fn cmd_run(args: &Args, config: &AppConfig, number: u64) -> Result<()> {
    let store = open_store(config)?;
    let document = store.require_scenario(&scenario_name(number))?;
    evaluate_document(args, &config.evaluator(), &scenario_name(number), document)
}

fn evaluate_document(
    args: &Args,
    evaluator: &BatchEvaluator,
    title: &str,
    document: ScenarioDocument,
) -> Result<()> {
    let scenario = Scenario::try_from(document)?;
    let results = evaluator.evaluate(&scenario)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => print_results(title, &results),
    }
    Ok(())
}

fn print_results(title: &str, results: &[TrustResult]) {
    println!("{} {}", "Evaluation:".bold().cyan(), title);
    println!("{}", "─".repeat(72));

    if results.is_empty() {
        println!("  No observations");
        return;
    }

    for result in results {
        let outcome = match result.outcome {
            Outcome::Trustworthy => result.outcome.as_str().green(),
            Outcome::Untrustworthy => result.outcome.as_str().red(),
        };
        println!(
            "  {} {} -> {}: {}",
            format!("#{}", result.index).bold(),
            result.sender,
            result.recipient,
            result.message
        );
        println!(
            "      {} {} ({:.4}) via {}  confidence {:.4}",
            "Trust:".bold(),
            outcome,
            result.final_trust_value,
            result.source,
            result.confidence
        );
        println!(
            "      {} {} -> {}",
            "History:".bold(),
            result.previous_history,
            result.final_outcome
        );
    }
}

fn cmd_scenarios(args: &Args, config: &AppConfig, cmd: &ScenarioCommands) -> Result<()> {
    let store = open_store(config)?;

    match cmd {
        ScenarioCommands::List => {
            let summaries = store.scenario_summaries()?;
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
                OutputFormat::Text => {
                    println!("{}", "Scenarios".bold().cyan());
                    println!("{}", "─".repeat(60));
                    if summaries.is_empty() {
                        println!("  No scenarios stored");
                    }
                    for summary in summaries {
                        let stored = chrono::DateTime::from_timestamp(summary.stored_at, 0)
                            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                            .unwrap_or_else(|| "-".into());
                        println!(
                            "  {:<20} {:>3} users  {:>4} observations  {}",
                            summary.name.bold(),
                            summary.users,
                            summary.observations,
                            stored.dimmed()
                        );
                    }
                }
            }
        }

        ScenarioCommands::Show { number } => {
            let document = store.require_scenario(&scenario_name(*number))?;
            println!("{}", document.to_json_pretty()?);
        }

        ScenarioCommands::Import { number, file } => {
            let mut document = read_document(file)?;
            Scenario::try_from(document.clone())
                .with_context(|| format!("Scenario file {} cannot be evaluated", file.display()))?;

            let name = scenario_name(*number);
            document.name.get_or_insert_with(|| name.clone());
            store.put_scenario(&name, &document)?;
            store.flush()?;
            println!("{} Stored {}", "✓".green(), name.bold());
        }

        ScenarioCommands::Remove { number } => {
            let name = scenario_name(*number);
            if store.delete_scenario(&name)? {
                store.flush()?;
                println!("{} Removed {}", "✓".green(), name.bold());
            } else {
                println!("{} {} not found", "Error:".red(), name);
            }
        }
    }

    Ok(())
}
