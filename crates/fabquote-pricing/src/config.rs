//! # Pricing Configuration
//!
//! Engine settings and tenant pricing rules loaded from TOML.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     FABQUOTE_BATCH_CONCURRENCY=8                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pricing/pricing.toml (Linux)                             │
//! │     ~/Library/Application Support/com.fabquote.pricing/pricing.toml    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     concurrency = 5                                                    │
//! │                                                                         │
//! │  Tenant pricing rules are NOT part of this file: they are loaded       │
//! │  per tenant with load_tenant_config() and validated on the way in.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pricing.toml
//! [batch]
//! concurrency = 5  # items priced concurrently per async batch window
//! ```
//!
//! ## Tenant File Format
//! ```toml
//! margin_floor_percent = "30"
//! overhead_percent = "15"
//! energy_tariff_per_kwh = "0.12"
//! labor_rate_per_hour = "25"
//! rush_upcharge_percent = "25"
//! grid_co2e_factor = "0.4"
//! logistics_co2e_factor = "0.0001"
//! minimum_charge = "5"
//!
//! [[volume_discounts]]
//! min_quantity = 50
//! discount_percent = "10"
//! ```

use fabquote_core::validation::validate_tenant_config;
use fabquote_core::TenantPricingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ConfigLoadError, ConfigLoadResult};

/// Environment variable overriding [`BatchSettings::concurrency`].
pub const ENV_BATCH_CONCURRENCY: &str = "FABQUOTE_BATCH_CONCURRENCY";

// =============================================================================
// Batch Settings
// =============================================================================

/// Async batch behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Number of items priced concurrently in one window.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    5
}

impl Default for BatchSettings {
    fn default() -> Self {
        BatchSettings {
            concurrency: default_concurrency(),
        }
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub batch: BatchSettings,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pricing.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigLoadResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading pricing config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load pricing config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigLoadResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigLoadError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Pricing config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigLoadResult<()> {
        if self.batch.concurrency == 0 {
            return Err(ConfigLoadError::InvalidConfig(
                "batch concurrency must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from a key lookup (the process environment in
    /// production).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_BATCH_CONCURRENCY) {
            match value.parse::<usize>() {
                Ok(concurrency) => {
                    debug!(concurrency, "Overriding batch concurrency from environment");
                    self.batch.concurrency = concurrency;
                }
                Err(_) => warn!(value = %value, "Ignoring unparsable batch concurrency"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "fabquote", "pricing")
            .map(|dirs| dirs.config_dir().join("pricing.toml"))
    }
}

// =============================================================================
// Tenant Configuration
// =============================================================================

/// Reads a tenant's pricing rules from a TOML file.
///
/// The configuration is validated before it is returned, so a broken
/// discount schedule is reported at load time instead of on the first quote.
pub fn load_tenant_config(path: &Path) -> ConfigLoadResult<TenantPricingConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config: TenantPricingConfig = toml::from_str(&contents)?;
    validate_tenant_config(&config)?;

    info!(
        ?path,
        margin_floor = %config.margin_floor_percent,
        tiers = config.volume_discounts.len(),
        "Loaded tenant pricing config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const TENANT_TOML: &str = r#"
margin_floor_percent = "30"
overhead_percent = "15"
energy_tariff_per_kwh = "0.12"
labor_rate_per_hour = "25"
rush_upcharge_percent = "25"
grid_co2e_factor = "0.4"
logistics_co2e_factor = "0.0001"
minimum_charge = "5"

[[volume_discounts]]
min_quantity = 50
discount_percent = "10"

[[volume_discounts]]
min_quantity = 100
discount_percent = "15"
"#;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.batch.concurrency, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.batch.concurrency = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigLoadError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pricing.toml");
        std::fs::write(&path, "[batch]\nconcurrency = 12\n").unwrap();

        let mut config: EngineConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(config.batch.concurrency, 12);

        config.apply_overrides(|_| None);
        assert_eq!(config.batch.concurrency, 12);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_or_default(Some(dir.path().join("absent.toml")));
        assert!(config.batch.concurrency > 0);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = EngineConfig::default();
        config.apply_overrides(|key| (key == ENV_BATCH_CONCURRENCY).then(|| "9".to_string()));
        assert_eq!(config.batch.concurrency, 9);

        config.apply_overrides(|_| Some("many".to_string()));
        assert_eq!(config.batch.concurrency, 9);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pricing.toml");

        let mut config = EngineConfig::default();
        config.batch.concurrency = 3;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[batch]"));
        let reloaded: EngineConfig = toml::from_str(&contents).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_load_tenant_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TENANT_TOML.as_bytes()).unwrap();

        let config = load_tenant_config(file.path()).unwrap();
        assert_eq!(config.margin_floor_percent.value(), dec!(30));
        assert_eq!(config.minimum_charge.amount(), dec!(5));
        assert_eq!(config.volume_discounts.len(), 2);
    }

    #[test]
    fn test_load_tenant_config_rejects_invalid_rules() {
        let broken = TENANT_TOML.replace("margin_floor_percent = \"30\"", "margin_floor_percent = \"0\"");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(broken.as_bytes()).unwrap();

        let err = load_tenant_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Tenant(_)));
        assert!(err.to_string().contains("cannot be zero"));
    }

    #[test]
    fn test_load_tenant_config_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"margin_floor_percent = [").unwrap();
        assert!(matches!(
            load_tenant_config(file.path()),
            Err(ConfigLoadError::Parse(_))
        ));
    }
}
