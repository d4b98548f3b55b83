//! # CLI Argument Definitions
//!
//! Flags given here override `busgen.toml` and `BUSGEN__*` environment variables.

use busgen_logger::LevelFilter;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "busgen")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "A generator for in-process event buses with type-safe wrappers")]
pub struct Cli {
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, env = "BUSGEN_LOG_LEVEL")]
    pub log_level: Option<LevelFilter>,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file (defaults to an optional `busgen.toml`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a type-safe event bus from an `event_map!` declaration
    Generate(GenerateArgs),
}

#[derive(Debug, Default, Args)]
pub struct GenerateArgs {
    /// Package target as <dir>.<Binding> (repeatable)
    #[arg(short, long = "package", value_name = "TARGET")]
    pub packages: Vec<String>,

    /// Output file path (only valid with a single target)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path through which generated code reaches the runtime crate
    #[arg(long, value_name = "PATH")]
    pub runtime_path: Option<String>,

    /// Continue with the remaining targets after a failure
    #[arg(long)]
    pub keep_going: bool,

    /// Verify generated files are up to date instead of writing them
    #[arg(long)]
    pub check: bool,
}
