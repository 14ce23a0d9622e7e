//! Error types for proxima-core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProximaError>;

#[derive(Error, Debug)]
pub enum ProximaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ProximaError {
    fn from(err: toml::de::Error) -> Self {
        ProximaError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for ProximaError {
    fn from(err: serde_json::Error) -> Self {
        ProximaError::Parse(err.to_string())
    }
}
