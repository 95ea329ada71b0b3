// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `mpbuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mpbuild",
    version,
    about = "Compile mini-program assets into a distributable tree, with watch mode.",
    long_about = None
)]
pub struct CliArgs {
    /// Task names to run, in order, as a series.
    ///
    /// Entry points: `build`, `compile`, `clean`, `watch`, `dev`, plus every
    /// per-category task (`wxss`, `json`, `typescript-watch`, ...). Defaults
    /// to `build`.
    #[arg(value_name = "TASK")]
    pub tasks: Vec<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Mpbuild.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Mpbuild.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MPBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// List the registered tasks and their shapes, without executing.
    #[arg(long)]
    pub list: bool,
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
