//! CLI for reconstructing Chromium issue tracker records.
//!
//! Fetches one or more issues, or runs a search, and prints the result as
//! JSON on stdout.

use clap::{Parser, Subcommand};
use crbug_issues::runner::DEFAULT_CONCURRENCY;
use crbug_issues::search::DEFAULT_SEARCH_LIMIT;
use crbug_issues::{FetchResult, RunSummary, Runner, RunnerConfig, RunnerError};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// crbug - Reconstruct Chromium issue tracker records.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (defaults to ./crbug.toml when present).
    #[arg(long, global = true, env = "CRBUG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch issues by id.
    Issue {
        /// Issue ids, e.g. 40063133.
        #[arg(required = true)]
        ids: Vec<String>,

        /// Maximum concurrent fetches.
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Skip the browser automation fallback.
        #[arg(long)]
        no_browser: bool,
    },

    /// Search issues with a tracker query.
    Search {
        /// Query in tracker syntax, e.g. "status:open compositor".
        query: String,

        /// Maximum number of results.
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match args.command {
        Command::Issue {
            ids,
            concurrency,
            no_browser,
        } => {
            let config = RunnerConfig::new(args.config, concurrency, !no_browser);
            match fetch(config, &ids).await {
                Ok(summary) if summary.all_success() => ExitCode::from(0),
                Ok(_) => ExitCode::from(1),
                Err(e) => {
                    error!(error = %e, "Critical failure");
                    ExitCode::from(2)
                }
            }
        }
        Command::Search { query, limit } => {
            let config = RunnerConfig::new(args.config, 1, false);
            let runner = match Runner::new(config) {
                Ok(runner) => runner,
                Err(e) => {
                    error!(error = %e, "Critical failure");
                    return ExitCode::from(2);
                }
            };
            match runner.search(&query, limit).await {
                Ok(results) => print_json(&results),
                Err(e) => {
                    error!(error = %e, "Search failed");
                    ExitCode::from(1)
                }
            }
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Logs are written to stderr in compact form so stdout only carries JSON.
/// `RUST_LOG` controls the level and defaults to "info".
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Fetches every id and prints one record, or an array for several ids.
async fn fetch(config: RunnerConfig, ids: &[String]) -> Result<RunSummary, RunnerError> {
    let runner = Runner::new(config)?;
    let (results, summary) = runner.fetch_issues(ids).await;

    let output = match results.as_slice() {
        [single] => to_value(single),
        _ => Value::Array(results.iter().map(to_value).collect()),
    };
    print_json(&output);
    Ok(summary)
}

fn to_value(result: &FetchResult) -> Value {
    serde_json::to_value(result).unwrap_or_else(|e| {
        error!(issue_id = result.issue_id(), error = %e, "Failed to serialize record");
        Value::Null
    })
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::from(0)
        }
        Err(e) => {
            error!(error = %e, "Failed to serialize output");
            ExitCode::from(1)
        }
    }
}
