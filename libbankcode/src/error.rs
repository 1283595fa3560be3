//! Error types for bankcode

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BankcodeError>;

#[derive(Error, Debug)]
pub enum BankcodeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl BankcodeError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BankcodeError::InvalidInput(_) => 3,
            BankcodeError::Catalog(CatalogError::NotFound(_)) => 2,
            BankcodeError::Catalog(_) => 1,
            BankcodeError::Config(_) => 1,
            BankcodeError::Clipboard(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Failures reported by a catalog client.
///
/// Cloneable so a single outcome can travel through the completion queue and
/// still be logged afterwards.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A specific branch lookup came back empty or absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any transport-level failure (connect, status, decode)
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("Clipboard access denied: {0}")]
    Denied(String),

    #[error("No branch is selected")]
    NothingSelected,
}
