//! Server configuration loaded from environment variables.

use crate::dictionary::DictionaryConfig;
use crate::state::DEFAULT_VERDICT_DISPLAY;
use std::net::SocketAddr;
use std::time::Duration;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP/WebSocket server binds to
    pub addr: SocketAddr,
    /// How long a verdict stays on screen before the turn resolves
    pub verdict_display: Duration,
    /// Turn clock period (one game second)
    pub clock_period: Duration,
    pub dictionary: DictionaryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            verdict_display: DEFAULT_VERDICT_DISPLAY,
            clock_period: Duration::from_secs(1),
            dictionary: DictionaryConfig::default(),
        }
    }
}

/// Parse `var` if it is set and non-empty
fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
        _ => Ok(None),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            addr: parse_var("WORDCHAIN_ADDR")?.unwrap_or(defaults.addr),
            verdict_display: parse_var("VERDICT_DISPLAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.verdict_display),
            clock_period: parse_var("CLOCK_PERIOD_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.clock_period),
            dictionary: DictionaryConfig::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in ["WORDCHAIN_ADDR", "VERDICT_DISPLAY_MS", "CLOCK_PERIOD_MS"] {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        clear_env();
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.verdict_display, Duration::from_millis(1500));
        assert_eq!(config.clock_period, Duration::from_secs(1));
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        std::env::set_var("WORDCHAIN_ADDR", "127.0.0.1:4000");
        std::env::set_var("VERDICT_DISPLAY_MS", "0");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.addr, "127.0.0.1:4000".parse::<SocketAddr>().unwrap());
        assert!(config.verdict_display.is_zero());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_value() {
        clear_env();
        std::env::set_var("CLOCK_PERIOD_MS", "soon");
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("CLOCK_PERIOD_MS"));
        clear_env();
    }
}
