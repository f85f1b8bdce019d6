// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `stackrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stackrun",
    version,
    about = "Build, start and supervise a backend service and its frontend dev server.",
    long_about = None
)]
pub struct CliArgs {
    /// Launch mode: `web` (1), `consola` (2), `compile` (3) or `full` (4).
    ///
    /// If omitted, an interactive menu is shown.
    #[arg(value_name = "MODE")]
    pub mode: Option<String>,

    /// Path to the launch config file (TOML).
    ///
    /// Default: `Stackrun.toml` in the current working directory, falling
    /// back to built-in defaults when that file does not exist.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Override the service settle delay (e.g. `8s`, `1500ms`).
    #[arg(long, value_name = "DURATION")]
    pub settle_delay: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STACKRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve the config, print the launch plan, but don't spawn anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
