//! Diagnostic logging setup for jitaudit
//!
//! The audit log itself is a binary file; this crate configures the ordinary
//! `tracing` output that the audit crates emit about what they are doing
//! (opening the log, each record written, write failures).
//!
//! # Quick Start
//!
//! ```ignore
//! use jitaudit_logging::{AuditSubscriberBuilder, LogConfig};
//!
//! // JSON lines to the console
//! AuditSubscriberBuilder::new().init();
//!
//! // Pretty output with debug detail
//! AuditSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init();
//! ```

pub mod config;

pub use config::{ConsoleConfig, FileConfig, LogConfig, RotationStrategy};

use std::fs::{self, File};

use thiserror::Error;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log file or its directory could not be created
    #[error("I/O error: {0}")]
    Io(String),

    /// A global subscriber is already installed
    #[error("Subscriber init error: {0}")]
    Init(String),

    /// The configured default level is not a tracing level
    #[error("Invalid log level {level:?}: {reason}")]
    InvalidLevel { level: String, reason: String },
}

/// Builder for configuring and initializing the tracing subscriber
pub struct AuditSubscriberBuilder {
    config: LogConfig,
}

impl AuditSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    ///
    /// Default: JSONL output to console
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    fn build_layers(&self) -> Result<(Vec<BoxedLayer>, Option<WorkerGuard>), LoggingError> {
        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = None;

        let console = &self.config.console;
        if console.enabled {
            let layer: BoxedLayer = match (console.pretty, console.test_writer) {
                (true, true) => fmt::layer()
                    .with_ansi(console.ansi)
                    .with_target(true)
                    .with_test_writer()
                    .boxed(),
                (true, false) => fmt::layer()
                    .with_ansi(console.ansi)
                    .with_target(true)
                    .boxed(),
                (false, true) => fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_test_writer()
                    .boxed(),
                (false, false) => fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .boxed(),
            };
            layers.push(layer);
        }

        if let Some(file_config) = &self.config.file {
            let (writer, file_guard) = create_file_writer(file_config)?;
            guard = Some(file_guard);
            layers.push(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(writer)
                    .boxed(),
            );
        }

        Ok((layers, guard))
    }

    /// Parse the configured default level
    ///
    /// Checked even when `RUST_LOG` overrides it, so a bad config fails everywhere.
    fn default_level(&self) -> Result<Level, LoggingError> {
        self.config
            .default_level
            .parse::<Level>()
            .map_err(|e| LoggingError::InvalidLevel {
                level: self.config.default_level.clone(),
                reason: e.to_string(),
            })
    }

    /// Try to initialize the subscriber globally
    ///
    /// Returns the file writer guard, if file output is configured; keep it
    /// alive for the duration of the program.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let level = self.default_level()?;
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
        });
        let (layers, guard) = self.build_layers()?;

        Registry::default()
            .with(layers)
            .with(env_filter)
            .try_init()
            .map_err(|e| LoggingError::Init(e.to_string()))?;

        Ok(guard)
    }

    /// Initialize the subscriber globally
    ///
    /// # Panics
    ///
    /// Panics if a global subscriber has already been set or the log file
    /// cannot be created.
    pub fn init(self) -> Option<WorkerGuard> {
        match self.try_init() {
            Ok(guard) => guard,
            Err(e) => panic!("failed to initialize logging: {e}"),
        }
    }
}

impl Default for AuditSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn create_file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    fs::create_dir_all(&config.directory).map_err(|e| LoggingError::Io(e.to_string()))?;
    let rotation = match config.rotation {
        RotationStrategy::Never => {
            let path = config.directory.join(format!("{}.log", config.prefix));
            let file = File::create(&path).map_err(|e| LoggingError::Io(e.to_string()))?;
            return Ok(tracing_appender::non_blocking(file));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };
    let appender = RollingFileAppender::new(rotation, &config.directory, &config.prefix);
    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize logging with default settings (JSONL to console)
pub fn init_default() {
    AuditSubscriberBuilder::new().init();
}

/// Initialize logging for development (verbose, pretty console output)
pub fn init_development() {
    AuditSubscriberBuilder::new()
        .with_config(LogConfig::development())
        .init();
}

/// Initialize logging for tests; safe to call from every test
pub fn init_testing() {
    let _ = AuditSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_creation() {
        let builder = AuditSubscriberBuilder::new();
        assert_eq!(builder.config.default_level, "info");
        assert!(!builder.config.console.pretty);
    }

    #[test]
    fn test_builder_with_level() {
        let builder = AuditSubscriberBuilder::new().with_level("trace");
        assert_eq!(builder.config.default_level, "trace");
    }

    #[test]
    fn test_default_level_parses() {
        let builder = AuditSubscriberBuilder::new().with_level("DEBUG");
        assert_eq!(builder.default_level().unwrap(), Level::DEBUG);

        for config in [LogConfig::default(), LogConfig::development(), LogConfig::testing()] {
            let builder = AuditSubscriberBuilder::new().with_config(config);
            assert!(builder.default_level().is_ok());
        }
    }

    #[test]
    fn test_bad_level_is_rejected() {
        let err = AuditSubscriberBuilder::new()
            .with_level("loud")
            .with_console(false)
            .try_init()
            .unwrap_err();
        assert!(matches!(err, LoggingError::InvalidLevel { ref level, .. } if level == "loud"));
    }

    #[test]
    fn test_builder_with_console() {
        let builder = AuditSubscriberBuilder::new().with_console(false);
        let (layers, guard) = builder.build_layers().unwrap();
        assert!(layers.is_empty());
        assert!(guard.is_none());
    }

    #[test]
    fn test_file_layer_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let builder = AuditSubscriberBuilder::new()
            .with_console(false)
            .with_file_output(FileConfig {
                directory: dir.path().join("logs"),
                prefix: "jit".to_string(),
                rotation: RotationStrategy::Never,
            });

        let (layers, guard) = builder.build_layers().unwrap();
        assert_eq!(layers.len(), 1);
        assert!(guard.is_some());
        assert!(dir.path().join("logs").join("jit.log").exists());
    }

    #[test]
    fn test_init_testing_twice() {
        init_testing();
        init_testing();
    }
}
