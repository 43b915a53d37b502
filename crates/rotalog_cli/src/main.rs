//! rotalog CLI
//!
//! Command-line tools around the rotating log sink.
//!
//! # Commands
//!
//! - `run` - Log heartbeats into a sink, rotating on SIGHUP
//! - `rotate-once` - Rotate a log file a single time
//! - `list` - Show the current file and its archives

mod commands;
mod logging;

use clap::{Parser, Subcommand};
use rotalog_core::{validate_retention, RotatingFileSink, SinkConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Rotating log file tools.
#[derive(Parser)]
#[command(name = "rotalog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the current log file
    #[arg(global = true, short, long, env = "ROTALOG_PATH")]
    path: Option<PathBuf>,

    /// Number of archived generations to keep
    #[arg(
        global = true,
        short,
        long,
        env = "ROTALOG_RETENTION",
        default_value = "8",
        allow_negative_numbers = true
    )]
    retention: i64,

    /// Fsync the log file before closing or rotating it
    #[arg(global = true, long)]
    sync_on_close: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write heartbeat records into the log, rotating on SIGHUP
    Run {
        /// Milliseconds between heartbeats
        #[arg(short, long, default_value = "500")]
        interval_ms: u64,

        /// Also rotate after this many heartbeats
        #[arg(long)]
        rotate_every: Option<u64>,

        /// Stop after this many heartbeats
        #[arg(short, long)]
        count: Option<u64>,
    },

    /// Rotate the log file once
    RotateOnce,

    /// List the current log file and its archives
    List,

    /// Show version information
    Version,
}

impl Cli {
    fn sink_config(&self, command: &str) -> Result<SinkConfig, Box<dyn std::error::Error>> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| format!("Log file path required for {command}"))?;
        let retention = validate_retention(self.retention)?;
        Ok(SinkConfig::new(path)
            .retention(retention)
            .sync_on_close(self.sync_on_close))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            interval_ms,
            rotate_every,
            count,
        } => {
            let sink = Arc::new(RotatingFileSink::with_config(cli.sink_config("run")?)?);
            sink.open()?;
            logging::init(cli.verbose, Some(Arc::clone(&sink)));
            let options = commands::run::RunOptions {
                interval: Duration::from_millis(interval_ms.max(1)),
                rotate_every,
                count,
            };
            commands::run::run(sink, &options)?;
        }
        Commands::RotateOnce => {
            logging::init(cli.verbose, None);
            let sink = RotatingFileSink::with_config(cli.sink_config("rotate-once")?)?;
            match commands::rotate::run(&sink)? {
                Some(archived) => println!("✓ Rotated into {}", archived.display()),
                None => println!("✓ Rotated (no archive kept)"),
            }
        }
        Commands::List => {
            logging::init(cli.verbose, None);
            let sink = RotatingFileSink::with_config(cli.sink_config("list")?)?;
            commands::list::print(&commands::list::run(&sink)?);
        }
        Commands::Version => {
            println!("rotalog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("rotalog core v{}", rotalog_core::VERSION);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_retention_is_rejected() {
        let cli = Cli::try_parse_from(["rotalog", "list", "--path", "app.log", "--retention", "-1"])
            .unwrap();
        assert!(cli.sink_config("list").is_err());
    }

    #[test]
    fn path_is_required() {
        let cli = Cli::try_parse_from(["rotalog", "rotate-once"]).unwrap();
        if cli.path.is_none() {
            assert!(cli.sink_config("rotate-once").is_err());
        }
    }

    #[test]
    fn run_options_parse() {
        let cli = Cli::try_parse_from([
            "rotalog",
            "run",
            "--path",
            "logs/app.log",
            "--rotate-every",
            "10",
            "--count",
            "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                interval_ms,
                rotate_every,
                count,
            } => {
                assert_eq!(interval_ms, 500);
                assert_eq!(rotate_every, Some(10));
                assert_eq!(count, Some(3));
            }
            _ => panic!("expected run command"),
        }
    }
}
