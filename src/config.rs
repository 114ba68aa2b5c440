use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// How long processed reports stay downloadable.
    pub result_ttl: Duration,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
            result_ttl: Duration::from_secs(30 * 60),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let bind_addr = parse_or(&env_map, "BIND_ADDR", defaults.bind_addr, "must be an IP address")?;
        let port = parse_or(&env_map, "PORT", defaults.port, "must be a valid u16")?;

        let result_ttl_secs = parse_or(
            &env_map,
            "RESULT_TTL_SECS",
            defaults.result_ttl.as_secs(),
            "must be a whole number of seconds",
        )?;
        if result_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "RESULT_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let max_upload_bytes = parse_or(
            &env_map,
            "MAX_UPLOAD_BYTES",
            defaults.max_upload_bytes,
            "must be a valid byte count",
        )?;
        if max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_UPLOAD_BYTES".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Config {
            bind_addr,
            port,
            result_ttl: Duration::from_secs(result_ttl_secs),
            max_upload_bytes,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
    reason: &str,
) -> Result<T, ConfigError> {
    match env_map.get(key).map(|s| s.trim()) {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(key.to_string(), reason.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_env_empty() {
        let config = Config::from_env_map(HashMap::new()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.result_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn test_overrides() {
        let mut env_map = HashMap::new();
        env_map.insert("PORT".to_string(), "9000".to_string());
        env_map.insert("BIND_ADDR".to_string(), "0.0.0.0".to_string());
        env_map.insert("RESULT_TTL_SECS".to_string(), "60".to_string());
        env_map.insert("MAX_UPLOAD_BYTES".to_string(), "1024".to_string());

        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_addr, IpAddr::from([0, 0, 0, 0]));
        assert_eq!(config.result_ttl, Duration::from_secs(60));
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = HashMap::new();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_bind_addr() {
        let mut env_map = HashMap::new();
        env_map.insert("BIND_ADDR".to_string(), "localhost:80".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "BIND_ADDR"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut env_map = HashMap::new();
        env_map.insert("RESULT_TTL_SECS".to_string(), "0".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "RESULT_TTL_SECS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_zero_upload_limit_rejected() {
        let mut env_map = HashMap::new();
        env_map.insert("MAX_UPLOAD_BYTES".to_string(), "0".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "MAX_UPLOAD_BYTES"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
