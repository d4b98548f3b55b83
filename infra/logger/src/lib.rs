//! # Logger
//!
//! Process-level logging for the busgen binaries.
//! It installs a single global `tracing` subscriber that writes to stderr,
//! filtered by level and by `RUST_LOG`-style directives.
//!
//! * Use [`LoggerBuilder::env_filter`] to set module-directed filters
//!   (e.g., `"busgen_compiler=debug"`), in addition to `RUST_LOG`.
//! * [`LoggerBuilder::json`] switches to one JSON object per event.
//! * [`LoggerBuilder::ansi`] turns colors off for `NO_COLOR` terminals and CI logs.
//!
//! ## Example
//!
//! ```rust
//! # use busgen_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("busgen")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::LoggerError;
pub use tracing::level_filters::LevelFilter;

use private::Sealed;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug)]
struct LoggerConfig {
    level: LevelFilter,
    ansi: bool,
    json: bool,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { level: LevelFilter::WARN, ansi: true, json: false, env_filter: None }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}

/// A builder for configuring and initializing the global tracing subscriber.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName> {
    config: LoggerConfig,
    name: N,
}

impl LoggerBuilder<NoName> {
    /// Sets the name of the logger.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName> {
        LoggerBuilder { name: WithName(name.into()), config: self.config }
    }
}

impl LoggerBuilder<WithName> {
    /// Configures the minimum log level to be emitted.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Adds an explicit env filter (e.g., `busgen_compiler=debug`).
    ///
    /// Invalid filters will cause [`LoggerBuilder::init`] to return an error.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Enables or disables ANSI colors.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn ansi(mut self, enabled: bool) -> Self {
        self.config.ansi = enabled;
        self
    }

    /// Enables JSON logging.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.config.json = true;
        self
    }

    /// Consumes the builder and initializes the global tracing subscriber.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber has already been set.
    /// Returns [`LoggerError::InvalidConfiguration`] for invalid builder settings.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let name = self.name.0;
        if name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name cannot be empty".into(),
                context: None,
            });
        }

        let env_filter = build_env_filter(&self.config)?;
        let console = layer().with_writer(std::io::stderr).with_target(false);
        let console = if self.config.json {
            console.json().with_ansi(false).boxed()
        } else {
            console.compact().with_ansi(self.config.ansi).boxed()
        };

        tracing_subscriber::registry().with(env_filter).with(console).try_init()?;
        tracing::debug!(logger = %name, level = %self.config.level, "Logger initialized");

        Ok(Logger { name })
    }
}

/// A handle to the initialized logging system.
#[must_use = "The handle names the process in shutdown logs."]
#[derive(Debug)]
pub struct Logger {
    name: String,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`] to configure the global tracing subscriber.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { config: LoggerConfig::default(), name: NoName }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    config.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn builder_defaults() {
        let builder = Logger::builder().name("busgen").env_filter("busgen=debug");
        assert!(builder.config.ansi);
        assert!(!builder.config.json);
        assert_eq!(builder.config.level, LevelFilter::WARN);
        assert_eq!(builder.config.env_filter.as_deref(), Some("busgen=debug"));
    }

    #[test]
    #[serial]
    fn builder_configuration() {
        let builder =
            Logger::builder().name("busgen").level(LevelFilter::TRACE).ansi(false).json();
        assert!(!builder.config.ansi);
        assert!(builder.config.json);
        assert_eq!(builder.config.level, LevelFilter::TRACE);
    }

    #[test]
    #[serial]
    fn invalid_filter_is_rejected() {
        let config = LoggerConfig { env_filter: Some("busgen=[".into()), ..LoggerConfig::default() };
        let err = build_env_filter(&config).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("busgen=["));
    }

    #[test]
    #[serial]
    fn blank_name_is_rejected() {
        let err = Logger::builder().name("  ").init().unwrap_err();
        assert_eq!(err.to_string(), "Invalid logger configuration: Logger name cannot be empty");
    }
}
