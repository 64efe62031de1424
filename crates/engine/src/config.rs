//! Run configuration. Loaded from TOML, validated before any matching
//! starts: a bad config rejects the whole run rather than skewing results.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use concord_core::Amount;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// Symmetric candidate window around the bank date, in days.
    pub date_window_days: u32,
    pub similarity_enabled: bool,
    pub similarity_threshold: f64,
    pub tolerance: ToleranceConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            date_window_days: 2,
            similarity_enabled: true,
            similarity_threshold: 0.85,
            tolerance: ToleranceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    pub ips_min: Amount,
    pub ips_max: Amount,
    pub rtgs_threshold: Amount,
    pub rtgs_flat: Amount,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            ips_min: Amount::from_decimal(Decimal::from(2)),
            ips_max: Amount::from_decimal(Decimal::from(10)),
            rtgs_threshold: Amount::from_decimal(Decimal::from(2_000_000)),
            rtgs_flat: Amount::from_decimal(Decimal::from(100)),
        }
    }
}

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: ReconConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.5..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::Invalid(format!(
                "similarity_threshold must be within 0.5..=1.0, got {}",
                self.similarity_threshold
            )));
        }
        let t = &self.tolerance;
        for (name, value) in [
            ("ips_min", t.ips_min),
            ("ips_max", t.ips_max),
            ("rtgs_threshold", t.rtgs_threshold),
            ("rtgs_flat", t.rtgs_flat),
        ] {
            if value < Amount::zero() {
                return Err(ConfigError::Invalid(format!(
                    "tolerance.{name} must not be negative, got {value}"
                )));
            }
        }
        if t.ips_min > t.ips_max {
            return Err(ConfigError::Invalid(format!(
                "tolerance.ips_min ({}) exceeds tolerance.ips_max ({})",
                t.ips_min, t.ips_max
            )));
        }
        Ok(())
    }
}
