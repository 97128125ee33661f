use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::storage::{PostgresConfig, StorageConfig, StorageType};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub fixtures: FixturesConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where API keys and submissions live
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(rename = "type", default)]
    pub storage_type: StorageType,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// JSON fixture file seeding the in-memory sources
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixturesConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    /// Base directory for per-render scratch directories
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
    #[serde(default)]
    pub image_fetch_timeout_secs: Option<u64>,
}

/// Admin surface; disabled unless a token is set
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            storage_type: StorageType::default(),
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

impl StorageSettings {
    /// Resolve into a storage backend configuration
    pub fn to_storage_config(&self) -> Result<StorageConfig, config::ConfigError> {
        match self.storage_type {
            StorageType::InMemory => Ok(StorageConfig::in_memory()),
            StorageType::Postgres => {
                let url = self
                    .url
                    .as_deref()
                    .filter(|url| !url.trim().is_empty())
                    .ok_or_else(|| {
                        config::ConfigError::Message(
                            "storage.url is required for postgres storage".to_string(),
                        )
                    })?;

                Ok(StorageConfig::Postgres(
                    PostgresConfig::new(url).with_max_connections(self.max_connections),
                ))
            }
        }
    }
}

impl ExportConfig {
    pub fn image_fetch_timeout(&self) -> Option<Duration> {
        self.image_fetch_timeout_secs.map(Duration::from_secs)
    }
}

impl AdminConfig {
    /// Configured admin token, ignoring blank values
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_start_in_memory_server() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(matches!(
            config.storage.to_storage_config().unwrap(),
            StorageConfig::InMemory
        ));
        assert!(config.admin.token().is_none());
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.max_connections, 10);
        assert!(config.fixtures.path.is_none());
    }

    #[test]
    fn test_postgres_requires_url() {
        let settings: StorageSettings = serde_json::from_str(r#"{"type": "postgres"}"#).unwrap();
        assert!(settings.to_storage_config().is_err());

        let settings: StorageSettings = serde_json::from_str(
            r#"{"type": "postgres", "url": "postgres://localhost/forms", "max_connections": 4}"#,
        )
        .unwrap();
        match settings.to_storage_config().unwrap() {
            StorageConfig::Postgres(pg) => {
                assert_eq!(pg.url, "postgres://localhost/forms");
                assert_eq!(pg.max_connections, 4);
            }
            StorageConfig::InMemory => panic!("expected postgres"),
        }
    }

    #[test]
    fn test_blank_admin_token_disables_admin() {
        let admin = AdminConfig {
            token: Some("   ".to_string()),
        };
        assert!(admin.token().is_none());
    }

    #[test]
    fn test_export_timeout() {
        let export: ExportConfig =
            serde_json::from_str(r#"{"image_fetch_timeout_secs": 15}"#).unwrap();
        assert_eq!(export.image_fetch_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(ExportConfig::default().image_fetch_timeout(), None);
    }
}
