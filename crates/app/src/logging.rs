//! Tracing subscriber setup for the binary.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to this
//! workspace's crates and noisy HTTP dependencies are capped at `warn`.

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

const CRATES: [&str; 4] = ["tutorial_progress", "services", "storage", "tutorial_core"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: Level,
    pub use_json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
        }
    }
}

impl LoggingConfig {
    #[must_use]
    pub fn from_args(level: Option<&str>, use_json: bool) -> Self {
        Self {
            level: level.map_or(Level::INFO, parse_level),
            use_json,
        }
    }
}

/// Parse a level name case-insensitively, defaulting to `INFO`.
#[must_use]
pub fn parse_level(raw: &str) -> Level {
    match raw.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!("invalid log level '{raw}', defaulting to info");
            Level::INFO
        }
    }
}

fn build_filter(config: LoggingConfig) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    let mut directives: Vec<String> = CRATES
        .iter()
        .map(|krate| format!("{krate}={}", config.level))
        .collect();
    directives.extend(["hyper=warn", "reqwest=warn", "sqlx=warn"].map(String::from));
    EnvFilter::new(directives.join(","))
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config);
        let registry = tracing_subscriber::registry().with(filter);
        if config.use_json {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            registry
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_is_case_insensitive() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("nonsense"), Level::INFO);
    }

    #[test]
    fn config_defaults_to_info() {
        let config = LoggingConfig::from_args(None, true);
        assert_eq!(config.level, Level::INFO);
        assert!(config.use_json);
    }
}
