use std::{env, str::FromStr};

use thiserror::Error;
use vibefm_collab::Config as CollabConfig;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9050;

/// Configuration of the server, read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub collab: CollabConfig,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got \"{value}\"")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from any variable source, missing values use defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CollabConfig::default();

        let port = parse(&lookup, "VIBEFM_SERVER_PORT", "port number")?.unwrap_or(DEFAULT_PORT);

        let message_history_limit = parse(&lookup, "VIBEFM_MESSAGE_HISTORY", "message count")?
            .unwrap_or(defaults.message_history_limit);

        let slow_mode_interval = parse::<u32, _>(&lookup, "VIBEFM_SLOW_MODE_SECONDS", "duration in seconds")?
            .map(|seconds| chrono::Duration::seconds(seconds.into()))
            .unwrap_or(defaults.slow_mode_interval);

        Ok(Self {
            port,
            collab: CollabConfig {
                message_history_limit,
                slow_mode_interval,
            },
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            collab: CollabConfig::default(),
        }
    }
}

fn parse<T, F>(lookup: &F, name: &'static str, expected: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value,
            }),
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::{ConfigError, ServerConfig, DEFAULT_PORT};

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_are_used_when_unset() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.collab.message_history_limit, 100);
        assert_eq!(config.collab.slow_mode_interval.num_seconds(), 5);
    }

    #[test]
    fn values_are_read() {
        let config = config_from(&[
            ("VIBEFM_SERVER_PORT", "8080"),
            ("VIBEFM_MESSAGE_HISTORY", "20"),
            ("VIBEFM_SLOW_MODE_SECONDS", "30"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.collab.message_history_limit, 20);
        assert_eq!(config.collab.slow_mode_interval.num_seconds(), 30);
    }

    #[test]
    fn invalid_values_are_errors() {
        let error = config_from(&[("VIBEFM_SERVER_PORT", "loud")]).unwrap_err();

        assert_eq!(
            error,
            ConfigError::Invalid {
                name: "VIBEFM_SERVER_PORT",
                expected: "port number",
                value: "loud".to_string()
            }
        );
    }
}
