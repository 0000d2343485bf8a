//! # CLI Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MIDWAY_TAX_RATE=8.25                                               │
//! │     MIDWAY_TAX_TITLE="County Tax"                                      │
//! │     MIDWAY_DEFAULT_STATION=window                                      │
//! │     MIDWAY_LOG=debug                                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, else                                              │
//! │     ~/.config/midway-pos/midway.toml (Linux)                           │
//! │     ~/Library/Application Support/com.midway.pos/midway.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     8.25% "Sales Tax", station "pickup"                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # midway.toml
//! log = "info,midway=debug"
//!
//! [pricing]
//! tax_rate = 825            # basis points
//! tax_title = "Sales Tax"
//! auto_fulfilled_categories = ["drinks", "merchandise"]
//! default_station = "pickup"
//! wildcard_class = 255000
//! unmerged_categories = ["food"]
//! ```

use std::path::PathBuf;

use midway_core::validation::validate_rate_bps;
use midway_core::{PricingConfig, Rate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CliError, CliResult};

fn default_log() -> String {
    "info,midway=debug".to_string()
}

/// Everything the harness needs to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log")]
    pub log: String,

    /// Venue pricing settings handed to the core.
    #[serde(default)]
    pub pricing: PricingConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            log: default_log(),
            pricing: PricingConfig::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (midway.toml)
    /// 3. Environment variables
    ///
    /// An explicit `config_path` must exist; the platform default may not.
    pub fn load(config_path: Option<PathBuf>) -> CliResult<Self> {
        let mut config = match config_path {
            Some(path) => {
                info!(?path, "Loading config from file");
                Self::from_toml(&std::fs::read_to_string(&path)?)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => {
                    info!(?path, "Loading config from file");
                    Self::from_toml(&std::fs::read_to_string(&path)?)?
                }
                path => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml(contents: &str) -> CliResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CliResult<()> {
        validate_rate_bps(self.pricing.tax_rate.bps())
            .map_err(|e| CliError::InvalidConfig(format!("tax_rate: {}", e)))?;

        if self.pricing.tax_title.trim().is_empty() {
            return Err(CliError::InvalidConfig("tax_title must not be empty".into()));
        }
        if self.pricing.default_station.trim().is_empty() {
            return Err(CliError::InvalidConfig(
                "default_station must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    ///
    /// `lookup` is `std::env::var` outside tests.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(rate) = lookup("MIDWAY_TAX_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(pct) if pct >= 0.0 => {
                    debug!(rate = %rate, "Overriding tax rate from environment");
                    self.pricing.tax_rate = Rate::from_percentage(pct);
                }
                _ => warn!(rate = %rate, "Ignoring unreadable MIDWAY_TAX_RATE"),
            }
        }

        if let Some(title) = lookup("MIDWAY_TAX_TITLE") {
            self.pricing.tax_title = title;
        }

        if let Some(station) = lookup("MIDWAY_DEFAULT_STATION") {
            debug!(station = %station, "Overriding default station from environment");
            self.pricing.default_station = station;
        }

        if let Some(log) = lookup("MIDWAY_LOG") {
            self.log = log;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "midway", "pos")
            .map(|dirs| dirs.config_dir().join("midway.toml"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.pricing.tax_rate.bps(), 825);
        assert_eq!(config.log, "info,midway=debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CliConfig::from_toml(
            r#"
            [pricing]
            tax_rate = 700
            unmerged_categories = ["food", "pizza"]
            "#,
        )
        .unwrap();

        assert_eq!(config.pricing.tax_rate.bps(), 700);
        assert_eq!(config.pricing.tax_title, "Sales Tax");
        assert_eq!(config.pricing.unmerged_categories.len(), 2);
        assert_eq!(config.log, "info,midway=debug");
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = CliConfig::from_toml("[pricing]\ntax_rate = \"lots\"").unwrap_err();
        assert!(matches!(err, CliError::ConfigParse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CliConfig::default();
        config.apply_env_overrides(env(&[
            ("MIDWAY_TAX_RATE", "6.5"),
            ("MIDWAY_TAX_TITLE", "County Tax"),
            ("MIDWAY_DEFAULT_STATION", "window"),
            ("MIDWAY_LOG", "trace"),
        ]));

        assert_eq!(config.pricing.tax_rate.bps(), 650);
        assert_eq!(config.pricing.tax_title, "County Tax");
        assert_eq!(config.pricing.default_station, "window");
        assert_eq!(config.log, "trace");
    }

    #[test]
    fn test_unreadable_env_rate_is_ignored() {
        let mut config = CliConfig::default();
        config.apply_env_overrides(env(&[("MIDWAY_TAX_RATE", "eight")]));
        assert_eq!(config.pricing.tax_rate.bps(), 825);
    }

    #[test]
    fn test_config_validation() {
        let mut config = CliConfig::default();
        config.pricing.tax_rate = Rate::from_bps(12_000);
        assert!(config.validate().is_err());

        config.pricing.tax_rate = Rate::from_bps(825);
        config.pricing.default_station = " ".to_string();
        assert!(config.validate().is_err());
    }
}
