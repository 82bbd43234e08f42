use serde::Deserialize;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] envy::Error),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub host: Option<String>,

    /// Bind address under its legacy name. `host` wins when both are set.
    pub ip: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config: Config = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(test)]
    fn from_env_no_dotenv() -> Result<Self, ConfigError> {
        let config: Config = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(ConfigError::Validation(format!(
                "Database URL must use the sqlite: scheme: {}",
                self.database_url
            )));
        }

        if self.max_connections == 0 || self.max_connections > 100 {
            return Err(ConfigError::Validation(format!(
                "Max connections must be between 1 and 100, got: {}",
                self.max_connections
            )));
        }

        if self.max_text_length == 0 {
            return Err(ConfigError::Validation(
                "Max text length must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    pub fn bind_host(&self) -> &str {
        self.host
            .as_deref()
            .or(self.ip.as_deref())
            .unwrap_or(DEFAULT_HOST)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.bind_host(), self.port)
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite:///tmp/lifo.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_max_text_length() -> usize {
    80
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Serializes tests that mutate the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [
            "HOST",
            "IP",
            "PORT",
            "DATABASE_URL",
            "MAX_CONNECTIONS",
            "MAX_TEXT_LENGTH",
        ] {
            env::remove_var(key);
        }
    }

    fn test_config() -> Config {
        Config {
            host: Some("127.0.0.1".to_string()),
            ip: None,
            port: 8080,
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            max_text_length: 80,
        }
    }

    #[test]
    fn test_config_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let config = Config::from_env_no_dotenv().expect("Failed to load config with defaults");

        assert_eq!(config.host, None);
        assert_eq!(config.ip, None);
        assert_eq!(config.bind_host(), "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "sqlite:///tmp/lifo.db");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.max_text_length, 80);
        assert_eq!(config.server_address(), "0.0.0.0:8080");
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_config_legacy_ip_variable() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("IP", "10.0.0.5");

        let config = Config::from_env_no_dotenv().expect("Failed to load config from IP");
        clear_env();

        assert_eq!(config.server_address(), "10.0.0.5:8080");
    }

    #[test]
    fn test_config_host_and_ip_both_set() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("HOST", "127.0.0.1");
        env::set_var("IP", "0.0.0.0");

        let result = Config::from_env_no_dotenv();
        clear_env();

        let config = result.expect("HOST and IP together should load");
        assert_eq!(config.bind_host(), "127.0.0.1");
        assert_eq!(config.server_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_config_validation_invalid_database_url() {
        let config = Config {
            database_url: "postgres://localhost/items".to_string(),
            ..test_config()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("must use the sqlite: scheme"));
    }

    #[test]
    fn test_config_validation_invalid_max_connections() {
        let config = Config {
            max_connections: 0,
            ..test_config()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Max connections must be between"));
    }

    #[test]
    fn test_config_validation_zero_text_length() {
        let config = Config {
            max_text_length: 0,
            ..test_config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_in_memory_detection() {
        let config = test_config();
        assert!(config.validate().is_ok());
        assert!(config.is_in_memory());
        assert_eq!(config.server_address(), "127.0.0.1:8080");
    }
}
