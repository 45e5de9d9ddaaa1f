use thiserror::Error;

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod record;

pub use app_config::{AppConfig, Environment};
pub use catalog::{CatalogRules, CategoryRule, ColumnKeywords};
pub use config::{load_app_config, load_app_config_from_env};
pub use record::{round_price, ProductRecord};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog rules file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog rules file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog rules validation failed: {0}")]
    Validation(String),
}
