//! Logging setup for the dashboard binaries.
//!
//! The library only emits `tracing` events; installing a subscriber is
//! left to the process that embeds it.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LogConfig {
    pub fn verbose() -> Self {
        Self {
            level: "debug".to_string(),
            json: false,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        self.filter_with(std::env::var(EnvFilter::DEFAULT_ENV).ok())
    }

    /// `env` wins when it parses, then the configured level, then `info`
    fn filter_with(&self, env: Option<String>) -> EnvFilter {
        env.and_then(|directives| EnvFilter::try_new(directives).ok())
            .or_else(|| EnvFilter::try_new(&self.level).ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    }
}

/// Installs a global fmt subscriber.
///
/// Returns `false` when a subscriber was already installed, in which case
/// the existing one is left in place.
pub fn init(config: &LogConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_keeps_first_subscriber() {
        let _ = init(&LogConfig::verbose());
        assert!(!init(&LogConfig::default()));
    }

    fn expected(directives: &str) -> String {
        EnvFilter::new(directives).to_string()
    }

    #[test]
    fn test_configured_level_is_used() {
        let filter = LogConfig::verbose().filter_with(None);
        assert_eq!(filter.to_string(), expected("debug"));
    }

    #[test]
    fn test_env_directives_override_level() {
        let filter = LogConfig::verbose().filter_with(Some("warn".to_string()));
        assert_eq!(filter.to_string(), expected("warn"));

        let filter = LogConfig::verbose().filter_with(Some("hr_dashboard=loud".to_string()));
        assert_eq!(filter.to_string(), expected("debug"));
    }

    #[test]
    fn test_bad_level_falls_back_to_info() {
        let config = LogConfig {
            level: "hr_dashboard=loud".to_string(),
            json: false,
        };
        assert_eq!(config.filter_with(None).to_string(), expected("info"));
    }
}
