//! Subscriber setup for applications embedding the bundler.
//!
//! Only built with the `logging` feature. The library itself just emits
//! `tracing` events: `debug` per module read, `info` per bundle, `warn` per
//! tree-shaking ambiguity.

use std::sync::Once;

use amdpack_config::GlobalSettings;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// No logging output
    Silent,
    /// Only errors
    Error,
    /// Errors and warnings, including tree-shaking ambiguities
    Warn,
    /// One line per emitted bundle (default)
    #[default]
    Info,
    /// One line per discovered module
    Debug,
    /// Everything
    Trace,
}

/// Each level with its filter directive name.
const LEVELS: [(LogLevel, &str, LevelFilter); 6] = [
    (LogLevel::Silent, "off", LevelFilter::OFF),
    (LogLevel::Error, "error", LevelFilter::ERROR),
    (LogLevel::Warn, "warn", LevelFilter::WARN),
    (LogLevel::Info, "info", LevelFilter::INFO),
    (LogLevel::Debug, "debug", LevelFilter::DEBUG),
    (LogLevel::Trace, "trace", LevelFilter::TRACE),
];

impl LogLevel {
    fn entry(self) -> (&'static str, LevelFilter) {
        LEVELS
            .iter()
            .find(|(level, ..)| *level == self)
            .map_or(("info", LevelFilter::INFO), |(_, name, filter)| (*name, *filter))
    }

    /// Level named in the `[settings]` table, falling back to the default
    /// when absent or unrecognised.
    pub fn from_settings(settings: &GlobalSettings) -> Self {
        settings
            .log_level
            .as_deref()
            .and_then(|name| name.parse().ok())
            .unwrap_or_default()
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let name = match lower.as_str() {
            "silent" => "off",
            "warning" => "warn",
            other => other,
        };
        LEVELS
            .iter()
            .find(|(_, known, _)| *known == name)
            .map(|(level, ..)| *level)
            .ok_or_else(|| format!("Invalid log level: {s}"))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.entry().0)
    }
}

fn install(filter: EnvFilter) {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false).without_time())
            .init();
    });
}

/// Install a global subscriber printing events at `level` and above.
///
/// Only the first call in a process takes effect; `RUST_LOG` directives are
/// layered on top of `level`.
///
/// ```rust,no_run
/// use amdpack_bundler::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Info);
/// ```
pub fn init_logging(level: LogLevel) {
    install(
        EnvFilter::builder()
            .with_default_directive(level.entry().1.into())
            .from_env_lossy(),
    );
}

/// Like [`init_logging`], but the level comes from `RUST_LOG` alone,
/// defaulting to info.
pub fn init_logging_from_env() {
    install(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("off".parse::<LogLevel>().unwrap(), LogLevel::Silent);
        assert_eq!("TRACE".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert!("invalid".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Silent.to_string(), "off");
    }

    #[test]
    fn test_log_level_from_settings() {
        let settings = GlobalSettings {
            log_level: Some("debug".to_string()),
        };
        assert_eq!(LogLevel::from_settings(&settings), LogLevel::Debug);
        assert_eq!(LogLevel::from_settings(&GlobalSettings::default()), LogLevel::Info);
    }
}
