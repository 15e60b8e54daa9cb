//! chainer CLI: forward-chaining inference over rule files.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;

use chainer::config::EngineConfig;
use chainer::engine::{Derivation, ForwardChainingEngine};
use chainer::fact::parse_fact_list;
use chainer::rules::RuleSet;

#[derive(Parser)]
#[command(name = "chainer", version, about = "Forward-chaining inference engine")]
struct Cli {
    /// Engine configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive every reachable fact from a rule file and seed facts.
    Run {
        /// Rule file (`.json`, or the `@rule` text format).
        #[arg(long)]
        rules: PathBuf,

        /// Seed fact (repeatable).
        #[arg(long = "fact", value_name = "FACT")]
        facts: Vec<String>,

        /// File with seed facts, one per line or comma-separated.
        #[arg(long)]
        facts_file: Option<PathBuf>,

        /// Override the configured iteration cap.
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the rules in a rule file.
    Rules {
        /// Rule file (`.json`, or the `@rule` text format).
        #[arg(long)]
        rules: PathBuf,
    },

    /// Print the engine configuration as TOML (the `--config` file, or defaults).
    Config,
}

#[derive(Serialize)]
struct RunReport<'a> {
    facts: Vec<&'a str>,
    derived: &'a [Derivation<String>],
    rounds: usize,
    reached_fixpoint: bool,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Run {
            rules,
            facts,
            facts_file,
            max_iterations,
            json,
        } => {
            if let Some(max_iterations) = max_iterations {
                config.max_iterations = max_iterations;
            }
            let rule_set = RuleSet::load(&rules)?;

            let mut seeds = facts;
            if let Some(path) = facts_file {
                let content = std::fs::read_to_string(&path)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("failed to read facts from {}", path.display()))?;
                seeds.extend(parse_fact_list(&content));
            }

            let mut engine: ForwardChainingEngine<String> = ForwardChainingEngine::new(config)?;
            let outcome = engine.reason_detailed(&seeds, &rule_set.rules);

            let mut sorted: Vec<&str> = outcome.facts.iter().map(String::as_str).collect();
            sorted.sort_unstable();

            if json {
                let report = RunReport {
                    facts: sorted,
                    derived: &outcome.derived,
                    rounds: outcome.rounds,
                    reached_fixpoint: outcome.reached_fixpoint,
                };
                println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
                return Ok(());
            }

            println!("Facts ({}):", sorted.len());
            for fact in &sorted {
                match outcome.derived.iter().find(|d| d.fact == *fact) {
                    Some(d) => println!(
                        "  {fact}  <- {} (round {})",
                        d.rule_name
                            .clone()
                            .unwrap_or_else(|| format!("rule #{}", d.rule_index)),
                        d.round
                    ),
                    None => println!("  {fact}"),
                }
            }
            println!(
                "Derived {} fact(s) in {} round(s) from {} rule(s) in {}.",
                outcome.derived.len(),
                outcome.rounds,
                rule_set.len(),
                rule_set.name
            );
            if outcome.reached_fixpoint {
                println!("Fixpoint reached.");
            } else {
                println!(
                    "Stopped at the iteration cap ({}) before a fixpoint; the result may be incomplete.",
                    engine.max_iterations()
                );
            }
        }

        Commands::Rules { rules } => {
            let rule_set = RuleSet::load(&rules)?;
            if rule_set.is_empty() {
                println!("No rules in {}.", rule_set.source);
            } else {
                println!(
                    "Rules in {} ({} active of {}):",
                    rule_set.source,
                    rule_set.active_count(),
                    rule_set.len()
                );
                for rule in &rule_set.rules {
                    println!("  {rule}");
                }
            }
        }

        Commands::Config => {
            config.validate()?;
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
