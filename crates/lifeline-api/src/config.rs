//! Environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

/// Settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Directory holding `progression.json` and `settings.json`.
    pub save_dir: PathBuf,
    /// Wall-clock interval between engine ticks, in milliseconds.
    pub tick_ms: u64,
    /// Unlock every scenario regardless of progress.
    pub dev_unlock: bool,
    /// Scenario asset to load instead of the built-in one.
    pub scenarios_path: Option<PathBuf>,
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, so tests need not touch the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };
        let save_dir = lookup("LIFELINE_SAVE_DIR").map_or_else(|| PathBuf::from("./save"), PathBuf::from);
        let tick_ms = match lookup("LIFELINE_TICK_MS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) | Err(_) => {
                    return Err(AppError::Config(format!(
                        "LIFELINE_TICK_MS must be a positive integer, got '{raw}'"
                    )));
                }
                Ok(value) => value,
            },
            None => 100,
        };
        let dev_unlock = match lookup("LIFELINE_DEV_UNLOCK").as_deref() {
            None | Some("" | "0" | "false") => false,
            Some("1" | "true") => true,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "LIFELINE_DEV_UNLOCK must be true or false, got '{other}'"
                )));
            }
        };
        let scenarios_path = lookup("LIFELINE_SCENARIOS")
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            save_dir,
            tick_ms,
            dev_unlock,
            scenarios_path,
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.save_dir, PathBuf::from("./save"));
        assert_eq!(config.tick_ms, 100);
        assert!(!config.dev_unlock);
        assert!(config.scenarios_path.is_none());
    }

    #[test]
    fn test_values_are_read_from_lookup() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("LIFELINE_SAVE_DIR", "/tmp/lifeline"),
            ("LIFELINE_TICK_MS", "50"),
            ("LIFELINE_DEV_UNLOCK", "true"),
            ("LIFELINE_SCENARIOS", "custom.yaml"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.save_dir, PathBuf::from("/tmp/lifeline"));
        assert_eq!(config.tick_ms, 50);
        assert!(config.dev_unlock);
        assert_eq!(config.scenarios_path, Some(PathBuf::from("custom.yaml")));
    }

    #[test]
    fn test_invalid_port_is_a_config_error() {
        let result = AppConfig::from_lookup(lookup_from(&[("PORT", "http")]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_tick_is_a_config_error() {
        let result = AppConfig::from_lookup(lookup_from(&[("LIFELINE_TICK_MS", "0")]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_unrecognized_dev_unlock_is_a_config_error() {
        let result = AppConfig::from_lookup(lookup_from(&[("LIFELINE_DEV_UNLOCK", "maybe")]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
