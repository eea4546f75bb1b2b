// src/cli.rs

//! CLI argument parsing using `clap`.

use std::fmt;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `frontpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "frontpipe",
    version,
    about = "Front-end asset pipelines: dev server, component library and production build.",
    long_about = None
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub pipeline: PipelineName,

    /// Path to the config file (TOML).
    ///
    /// The file is optional: when it does not exist, built-in defaults are
    /// used and the current directory is the project root.
    #[arg(long, global = true, value_name = "PATH", default_value = "Frontpipe.toml")]
    pub config: String,

    /// Run the pipeline's tasks once and exit (no server, tunnel, report or watchers).
    #[arg(long, global = true)]
    pub once: bool,

    /// Validate the pipeline and print its plan and watch bindings without running anything.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FRONTPIPE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// The three top-level pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum PipelineName {
    /// Development build, dev server with live reload, tunnel and watchers.
    Serve,
    /// Isolated component library with its own server and watchers.
    Lib,
    /// Production build, build server, tunnel and PageSpeed report.
    Build,
}

impl fmt::Display for PipelineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineName::Serve => "serve",
            PipelineName::Lib => "lib",
            PipelineName::Build => "build",
        };
        f.write_str(s)
    }
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
