//! Structured logging setup for buildapps
//!
//! Logs always go to stderr so that `find --format json` output on stdout
//! stays machine readable.
//!
//! ```no_run
//! use buildapps::util::logging;
//!
//! // BUILDAPPS_LOG_LEVEL=debug BUILDAPPS_LOG_JSON=true
//! logging::init_logging(logging::config_from_env());
//!
//! tracing::info!(target_chip = "esp32", "Finding apps");
//! ```

use std::env;
use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "BUILDAPPS_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "BUILDAPPS_LOG_JSON";

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's events
    pub level: Level,

    pub use_json: bool,

    /// Include the module target (e.g. buildapps::finder) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }
}

/// Parses a log level, case-insensitive. Unknown names fall back to INFO.
///
/// ```
/// use buildapps::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn build_filter(level: Level) -> EnvFilter {
    // RUST_LOG, when set, takes precedence over the configured level
    match env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => {
            EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(level.to_string()))
        }
        _ => EnvFilter::new(format!("warn,buildapps={}", level)),
    }
}

/// Installs the global subscriber. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        }
    });
}

/// Reads `BUILDAPPS_LOG_LEVEL` and `BUILDAPPS_LOG_JSON`
pub fn config_from_env() -> LoggingConfig {
    let level = env::var(LOG_LEVEL_ENV)
        .map(|v| parse_level(&v))
        .unwrap_or(Level::INFO);

    let use_json = env::var(LOG_JSON_ENV)
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    LoggingConfig {
        level,
        use_json,
        ..Default::default()
    }
}
