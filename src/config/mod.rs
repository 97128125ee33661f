//! Application configuration

mod app_config;

pub use app_config::{
    AdminConfig, AppConfig, ExportConfig, FixturesConfig, LogFormat, LoggingConfig,
    ServerConfig, StorageSettings,
};
