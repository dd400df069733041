// config.rs - Layered Application Configuration

//! Application configuration.
//!
//! Sources, later overriding earlier:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file
//! 3. `TRAVOS__<SECTION>__<KEY>` environment variables
//!
//! ```toml
//! [server]
//! listen = "127.0.0.1:8080"
//!
//! [policy]
//! confidence_threshold = 0.95
//! tie_break = "opinion"
//! ```

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::observability::{MetricsConfig, TracingConfig, TracingFormat};
use crate::trust::{BatchEvaluator, TrustEngine, TrustPolicy};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TRAVOS";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP server settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

/// Scenario store settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory of the sled database
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/scenarios"),
        }
    }
}

/// Batch evaluation settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Judge observations on the rayon pool
    pub parallel: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Logging settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    pub format: TracingFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: TracingFormat::Pretty,
        }
    }
}

/// Prometheus exporter settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub listen: SocketAddr,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: MetricsConfig::default().listen_addr,
        }
    }
}

/// Complete application configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub policy: TrustPolicy,
    pub evaluation: EvaluationConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsSettings,
}

impl AppConfig {
    /// Load defaults, then `path` if given and present, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                builder = builder.add_source(config::File::from(path));
            } else {
                tracing::warn!("Config file {} not found, using defaults", path.display());
            }
        }

        let builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let parsed: AppConfig = builder.build()?.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Batch evaluator built from the policy and evaluation settings
    pub fn evaluator(&self) -> BatchEvaluator {
        BatchEvaluator::new(TrustEngine::new(self.policy)).parallel(self.evaluation.parallel)
    }

    pub fn tracing(&self) -> TracingConfig {
        TracingConfig::for_level(&self.logging.level, self.logging.format)
    }

    pub fn metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            listen_addr: self.metrics.listen,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trust::TieBreak;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.policy, TrustPolicy::default());
        assert!(config.evaluation.parallel);
        assert!(!config.metrics.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load(Some(Path::new("/nonexistent/travos.toml"))).unwrap();
        assert_eq!(config.policy, TrustPolicy::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
listen = "0.0.0.0:9999"

[policy]
confidence_threshold = 0.9
tie_break = "experience"

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.listen.port(), 9999);
        assert_eq!(config.policy.confidence_threshold, 0.9);
        assert_eq!(config.policy.cooperation_threshold, 0.5);
        assert_eq!(config.policy.tie_break, TieBreak::Experience);
        assert_eq!(config.logging.format, TracingFormat::Json);
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[policy]\ncooperation_threshold = 2.0").unwrap();

        let err = AppConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
