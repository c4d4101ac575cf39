use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub enable_tracing: bool,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    /// PostgreSQL connection URL. When absent the service runs on the
    /// in-memory stores.
    #[serde(default)]
    pub postgres_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Transfer engine tuning
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Upper bound on waiting for the per-account locks of one transfer.
    /// Past this the transaction is failed instead of queueing forever.
    pub lock_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 5000,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            log_file: "bankledger.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            enable_tracing: true,
            gateway: GatewayConfig::default(),
            engine: EngineConfig::default(),
            postgres_url: None,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }

    /// Load `config/{env}.yaml` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        match fs::read_to_string(&config_path) {
            Ok(content) => serde_yaml::from_str(&content).expect("Failed to parse config yaml"),
            Err(_) => {
                eprintln!("Config file {} not found, using defaults", config_path);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.gateway.port, 3000);
        assert_eq!(config.engine.lock_timeout_ms, 5000);
        assert!(config.postgres_url.is_none());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
log_level: "debug"
log_dir: "logs"
log_file: "test.log"
use_json: true
rotation: "hourly"
enable_tracing: false
gateway:
  host: "127.0.0.1"
  port: 8080
engine:
  lock_timeout_ms: 250
postgres_url: "postgresql://u:p@localhost:5432/db"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.engine.lock_timeout_ms, 250);
        assert!(config.postgres_url.is_some());
    }

    #[test]
    fn test_engine_section_defaults_when_missing() {
        let yaml = r#"
log_level: "info"
log_dir: "logs"
log_file: "test.log"
use_json: false
rotation: "daily"
enable_tracing: true
gateway:
  host: "0.0.0.0"
  port: 3000
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.engine.lock_timeout_ms, 5000);
    }
}
