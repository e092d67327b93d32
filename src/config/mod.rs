//! Configuration management

mod app_config;

pub use app_config::{
    AppConfig, ChecklistConfig, LogFormat, LoggingConfig, MetricsConfig, ServerConfig,
    StorageSettings, WorkflowConfig,
};
