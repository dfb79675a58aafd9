//! # Config Loading Errors
//!
//! Pricing itself fails with [`fabquote_core::PricingError`]. This module only
//! covers reading engine and tenant configuration from disk.

use fabquote_core::ConfigError;
use thiserror::Error;

/// Result type alias for configuration loading.
pub type ConfigLoadResult<T> = Result<T, ConfigLoadError>;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// Failed to read or write the config file.
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for the expected shape.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to save config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The tenant configuration parsed but broke a pricing invariant.
    #[error("Invalid tenant pricing config: {0}")]
    Tenant(#[from] ConfigError),

    /// Engine settings are out of range.
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("No config path available")]
    NoConfigPath,
}
