use crate::error::CliError;
use busgen_compiler::{DEFAULT_RUNTIME_PATH, Target};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "busgen.toml";

/// Prefix of environment overrides; nested keys use `__` (`BUSGEN__KEEP_GOING`).
pub const ENV_PREFIX: &str = "BUSGEN";

/// Settings shared by every `generate` run before CLI flags are applied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub targets: Vec<String>,
    pub output: Option<PathBuf>,
    pub runtime_path: String,
    pub keep_going: bool,
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            targets: vec![Target::default().to_string()],
            output: None,
            runtime_path: DEFAULT_RUNTIME_PATH.to_owned(),
            keep_going: false,
            log_level: "info".to_owned(),
        }
    }
}

/// Layers the config file and `BUSGEN__*` variables over the defaults.
///
/// An explicit `path` must exist; the default `busgen.toml` is optional.
///
/// # Errors
/// Returns [`CliError::Config`] when a source is missing or malformed.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig, CliError> {
    let (file, required) =
        path.map_or_else(|| (PathBuf::from(DEFAULT_CONFIG_FILE), false), |p| (p.to_path_buf(), true));

    let config = Config::builder()
        .add_source(File::from(file.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("targets")
                .try_parsing(true),
        )
        .build()
        .and_then(|config| config.try_deserialize::<CliConfig>())
        .map_err(|source| CliError::Config { path: file.clone(), source })?;

    tracing::debug!(path = %file.display(), targets = config.targets.len(), "Configuration loaded");
    Ok(config)
}
