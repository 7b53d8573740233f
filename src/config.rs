// ⚙️ Configuration - environment (and optional .env) driven settings

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = "food_wastage.db";

/// Top-level configuration for the CLI and the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub server: ServerConfig,
    pub log_level: String,
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("FOOD_PORT must be a valid u16, got {0:?}")]
    InvalidPort(String),

    #[error("FOOD_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost(#[from] std::net::AddrParseError),
}

impl AppConfig {
    /// Read `.env` if present, then the process environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("FOOD_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let host = lookup("FOOD_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port_raw = lookup("FOOD_PORT").unwrap_or_else(|| "3000".to_string());
        let port = port_raw
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port_raw.clone()))?;
        let log_level = lookup("FOOD_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            db_path: PathBuf::from(db_path),
            server: ServerConfig { host, port },
            log_level,
        })
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(
            config.server.socket_addr().unwrap(),
            "127.0.0.1:3000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("FOOD_DB_PATH", "/tmp/ledger.db"),
            ("FOOD_HOST", "localhost"),
            ("FOOD_PORT", "8080"),
            ("FOOD_LOG_LEVEL", "debug"),
        ])
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/ledger.db"));
        assert_eq!(config.server.socket_addr().unwrap().port(), 8080);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("FOOD_PORT", "eighty")]),
            Err(ConfigError::InvalidPort(_))
        ));

        let config = config_from(&[("FOOD_HOST", "not-an-ip")]).unwrap();
        assert!(matches!(config.server.socket_addr(), Err(ConfigError::InvalidHost(_))));
    }
}
