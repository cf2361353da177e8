//! Error types for ddlforge

use thiserror::Error;

/// Result type for ddlforge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ddlforge
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Model validation error: {0}")]
    ModelValidationError(String),

    #[error("Unsupported feature: {dialect} does not support {feature}")]
    UnsupportedFeatureError { dialect: String, feature: String },

    #[error("Lossy change: {0} (set allow_lossy_changes to acknowledge)")]
    LossyChangeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Convert Serde JSON errors to ddlforge errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert Serde YAML errors to ddlforge errors
impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to ddlforge errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
