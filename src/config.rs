//! Runtime configuration read from the environment.

use std::env;

use thiserror::Error;

use crate::generator::print::DEFAULT_PRINT_DELAY_MS;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:8080",
];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("PORT must be a number between 1 and 65535, got '{0}'")]
    InvalidPort(String),
    #[error("PRINT_DELAY_MS must be a non-negative number of milliseconds, got '{0}'")]
    InvalidPrintDelay(String),
    #[error("{key} must be true or false, got '{value}'")]
    InvalidFlag { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `*` allows any origin.
    pub allowed_origins: Vec<String>,
    pub print_delay_ms: u64,
    /// Reject emissions whose rendered document still carries tokens.
    pub block_on_unresolved_tokens: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            print_delay_ms: DEFAULT_PRINT_DELAY_MS,
            block_on_unresolved_tokens: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = value("HOST").unwrap_or(defaults.host);

        let port = match value("PORT") {
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(ConfigError::InvalidPort(raw)),
            },
            None => defaults.port,
        };

        let allowed_origins = match value("ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|o| o.trim().trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => defaults.allowed_origins,
        };

        let print_delay_ms = match value("PRINT_DELAY_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidPrintDelay(raw))?,
            None => defaults.print_delay_ms,
        };

        let block_on_unresolved_tokens = match value("BLOCK_ON_UNRESOLVED_TOKENS") {
            Some(raw) => parse_flag("BLOCK_ON_UNRESOLVED_TOKENS", raw)?,
            None => defaults.block_on_unresolved_tokens,
        };

        Ok(Self {
            host,
            port,
            allowed_origins,
            print_delay_ms,
            block_on_unresolved_tokens,
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

fn parse_flag(key: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.print_delay_ms, 250);
        assert!(!cfg.block_on_unresolved_tokens);
        assert!(cfg.allowed_origins.contains(&"http://localhost:5173".to_string()));
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("ALLOWED_ORIGINS", "https://hr.example.com/, ,https://ops.example.com"),
            ("PRINT_DELAY_MS", "0"),
            ("BLOCK_ON_UNRESOLVED_TOKENS", "TRUE"),
        ])
        .unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 9090);
        assert_eq!(
            cfg.allowed_origins,
            vec!["https://hr.example.com", "https://ops.example.com"]
        );
        assert_eq!(cfg.print_delay_ms, 0);
        assert!(cfg.block_on_unresolved_tokens);
        assert!(!cfg.allows_any_origin());
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            config(&[("PORT", "0")]).unwrap_err(),
            ConfigError::InvalidPort("0".into())
        );
        assert_eq!(
            config(&[("PRINT_DELAY_MS", "-5")]).unwrap_err(),
            ConfigError::InvalidPrintDelay("-5".into())
        );
        assert!(matches!(
            config(&[("BLOCK_ON_UNRESOLVED_TOKENS", "maybe")]),
            Err(ConfigError::InvalidFlag { .. })
        ));
    }

    #[test]
    fn test_wildcard_origin() {
        assert!(config(&[("ALLOWED_ORIGINS", "*")]).unwrap().allows_any_origin());
    }
}
