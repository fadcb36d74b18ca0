//! DAO process harness
//!
//! Hosts one in-memory DAO process and feeds it messages:
//! - `replay`: newline-delimited host messages in, one `HandleResult` JSON
//!   line out per message
//! - `config`: print the effective configuration
//!
//! Logs go to stderr so stdout stays machine-readable.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dao_runtime::{DaoConfig, DaoProcess};
use dao_types::{DaoState, Environment, ProcessInfo};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod replay;

/// DAO process harness CLI
#[derive(Parser)]
#[command(name = "daod")]
#[command(about = "DAO process harness - replays host messages against a DAO process", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "DAO_CONFIG")]
    config: Option<String>,

    /// Process identity; also the treasury holder
    #[arg(long, env = "DAO_PROCESS_ID", default_value = "AOS")]
    process_id: String,

    /// Process owner; the only identity allowed to send Init
    #[arg(long, env = "DAO_OWNER", default_value = "FOOBAR")]
    owner: String,

    /// Process tag as NAME=VALUE (repeatable)
    #[arg(long = "process-tag", value_parser = parse_tag)]
    process_tags: Vec<(String, String)>,

    /// Log level (overrides configuration)
    #[arg(long, env = "DAO_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "DAO_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Replay newline-delimited JSON messages
    Replay {
        /// Input file (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Resume from a state snapshot instead of an uninitialized process
        #[arg(long)]
        state_in: Option<PathBuf>,

        /// Write the final state snapshot here
        #[arg(long)]
        state_out: Option<PathBuf>,
    },

    /// Print the effective configuration as JSON
    Config,
}

fn parse_tag(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = DaoConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_tracing(&level, cli.json || config.logging.json);

    let mut process_info = ProcessInfo::new(cli.process_id.as_str(), cli.owner.as_str());
    for (name, value) in &cli.process_tags {
        process_info = process_info.with_tag(name.as_str(), value.as_str());
    }
    let env = Environment::new(process_info);

    match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Replay {
            input,
            state_in,
            state_out,
        } => {
            let mut process = match state_in {
                Some(path) => {
                    let file = File::open(&path)
                        .with_context(|| format!("Failed to open {}", path.display()))?;
                    let state: DaoState = serde_json::from_reader(BufReader::new(file))
                        .with_context(|| format!("Invalid state snapshot {}", path.display()))?;
                    DaoProcess::from_state(env, config, state).with_context(|| {
                        format!("Refusing state snapshot {}", path.display())
                    })?
                }
                None => DaoProcess::new(env, config),
            };

            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            let stats = match input {
                Some(path) => {
                    let file = File::open(&path)
                        .with_context(|| format!("Failed to open {}", path.display()))?;
                    replay::replay(&mut process, BufReader::new(file), &mut out)?
                }
                None => replay::replay(&mut process, io::stdin().lock(), &mut out)?,
            };
            info!(
                messages = stats.handled,
                refused = stats.refused,
                "Replay finished"
            );

            if let Some(path) = state_out {
                let state = process
                    .state()
                    .context("Process was never initialized; no state to write")?;
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                serde_json::to_writer_pretty(BufWriter::new(file), state)?;
            }
            Ok(())
        }
    }
}
