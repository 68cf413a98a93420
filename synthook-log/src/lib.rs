//! Synthook Logging
//!
//! Installs a `tracing` subscriber configured from environment variables.
//! Every Synthook crate logs through `tracing` macros with structured
//! fields (`correlation_id`, `sink_id`, `attempt`); this crate decides
//! where and how those events are written.
//!
//! # Environment Variables
//!
//! - `SYNTHOOK_DEBUG=1` - Enable debug logging
//! - `SYNTHOOK_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `SYNTHOOK_LOG_FORMAT=json|pretty|compact` - Set output format (default `json`)
//! - `SYNTHOOK_LOG_COLOR=1|0` - Enable/disable ANSI colors
//! - `SYNTHOOK_LOG_TARGET=1|0` - Include the module path of each event
//! - `RUST_LOG` - Full `EnvFilter` directives, overriding the level
//!
//! # Usage
//!
//! ```rust
//! synthook_log::init();
//! tracing::info!(sink_id = "local", "Harness started");
//! ```

use once_cell::sync::OnceCell;
use std::env;
use std::fmt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt as fmt_layer;
use tracing_subscriber::prelude::*;

/// Prefix of every environment variable read by [`LogConfig::from_env`]
pub const ENV_PREFIX: &str = "SYNTHOOK";

static INSTALLED: OnceCell<LogConfig> = OnceCell::new();

/// Minimum level of emitted events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl Level {
    /// Parse a level name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    /// `EnvFilter` directive for this level
    pub fn directive(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directive())
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// One JSON object per event
    #[default]
    Json,
    /// Multi-line human-readable output
    Pretty,
    /// Single-line human-readable output
    Compact,
}

impl Format {
    /// Parse a format name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(Format::Json),
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            _ => None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether ANSI colors are enabled
    pub color: bool,
    /// Whether to include the event target
    pub target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false,
            target: true,
        }
    }
}

impl LogConfig {
    /// Read configuration from `SYNTHOOK_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));
        let flag = |name: &str| var(name).map(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        let debug = flag("DEBUG").unwrap_or(false);

        let level = var("LOG_LEVEL")
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = var("LOG_FORMAT")
            .and_then(|s| Format::parse(&s))
            .unwrap_or_default();

        // JSON output never carries color codes unless asked for
        let color = flag("LOG_COLOR").unwrap_or(
            format != Format::Json && lookup("NO_COLOR").is_none() && lookup("TERM").is_some(),
        );

        let target = flag("LOG_TARGET").unwrap_or(true);

        Self {
            debug,
            level,
            format,
            color,
            target,
        }
    }

    /// Filter honouring `RUST_LOG` first, then the configured level
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.directive()))
    }
}

/// Install the global subscriber from the environment
///
/// Idempotent: later calls, and calls after another subscriber was set,
/// leave the existing one in place.
pub fn init() -> &'static LogConfig {
    init_with(LogConfig::from_env())
}

/// Install the global subscriber with an explicit configuration
///
/// Only the first call in a process has any effect; the configuration
/// actually in use is returned.
pub fn init_with(config: LogConfig) -> &'static LogConfig {
    INSTALLED.get_or_init(|| {
        // Another subscriber may already be installed (e.g. by a test harness)
        let _ = install(&config);
        config
    })
}

/// Configuration installed by [`init`], if any
pub fn installed() -> Option<&'static LogConfig> {
    INSTALLED.get()
}

// Events go to stderr; stdout is left to program output
fn install(config: &LogConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    match config.format {
        Format::Json => registry
            .with(
                fmt_layer::layer()
                    .json()
                    .with_target(config.target)
                    .with_current_span(true)
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        Format::Pretty => registry
            .with(
                fmt_layer::layer()
                    .pretty()
                    .with_target(config.target)
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        Format::Compact => registry
            .with(
                fmt_layer::layer()
                    .compact()
                    .with_target(config.target)
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
}
