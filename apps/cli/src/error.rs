use busgen_compiler::{CompileError, TargetParseError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of a `busgen` invocation.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    InvalidTarget(#[from] TargetParseError),

    #[error("--output cannot be used with {count} targets")]
    OutputConflict { count: usize },

    #[error("failed to load configuration from {}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("invalid log level `{value}`")]
    InvalidLogLevel { value: String },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("generated code is out of date: {}", display_paths(.paths))]
    Stale { paths: Vec<PathBuf> },

    #[error("{failed} of {total} targets failed")]
    Failed { failed: usize, total: usize },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}
