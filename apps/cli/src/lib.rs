//! # Busgen CLI
//!
//! `busgen generate` compiles one or more `<dir>.<Binding>` targets and writes
//! the typed bus module next to each declaration.

pub mod args;
pub mod config;
mod error;
pub mod generate;

pub use crate::error::CliError;

use crate::args::{Cli, Command};
use busgen_logger::{LevelFilter, Logger};

/// Runs a parsed invocation to completion.
///
/// # Errors
/// Any [`CliError`]; logging setup failures are reported through `anyhow`.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::load_config(cli.config.as_deref())?;

    let level = match cli.log_level {
        Some(level) => level,
        None => config
            .log_level
            .parse::<LevelFilter>()
            .map_err(|_| CliError::InvalidLogLevel { value: config.log_level.clone() })?,
    };
    let _logger =
        Logger::builder().name(env!("CARGO_PKG_NAME")).level(level).ansi(!cli.no_color).init()?;

    match cli.command {
        Command::Generate(args) => {
            let plan = generate::Plan::resolve(args, config)?;
            generate::run(&plan)?;
        },
    }

    Ok(())
}
