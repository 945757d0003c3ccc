//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading reconciliation
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineSettings, ReconConfig, RemarkRulesConfig};

/// Loads and provides access to reconciliation configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml        # Thresholds, trend settings, correction policy
/// └── remark_rules.yaml  # Ordered remark catalogue
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_recon::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Anomaly threshold: {}", loader.config().thresholds().anomaly_threshold);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: ReconConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - Either file is missing
    /// - Either file contains invalid YAML or misses a required field
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let rules = Self::load_yaml::<RemarkRulesConfig>(&path.join("remark_rules.yaml"))?;

        if rules.rules.is_empty() {
            return Err(EngineError::ConfigParseError {
                path: path.join("remark_rules.yaml").display().to_string(),
                message: "no remark rules defined".to_string(),
            });
        }

        let config = ReconConfig::new(
            settings.thresholds,
            settings.trend,
            settings.correction_policy,
            rules.rules,
        );

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> ReconConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CorrectionPolicy, RuleCategory};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/default"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
    }

    #[test]
    fn test_shipped_configuration_matches_defaults() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(loader.config(), &ReconConfig::default());
    }

    #[test]
    fn test_thresholds_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let thresholds = loader.config().thresholds();

        assert_eq!(thresholds.confidence_threshold, dec("0.95"));
        assert_eq!(thresholds.anomaly_threshold, dec("0.15"));
        assert_eq!(thresholds.working_days_per_month, 22);
        assert_eq!(thresholds.extra_zero_band.low, dec("9.5"));
    }

    #[test]
    fn test_remark_rules_keep_file_order() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let rules = loader.config().remark_rules();

        assert_eq!(rules[0].category, RuleCategory::NewHire);
        assert!(rules[0].pattern.contains("(?P<day>"));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("engine.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_yaml_returns_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("engine.yaml"), "thresholds: [unclosed").unwrap();
        fs::write(dir.path().join("remark_rules.yaml"), "rules: []").unwrap();

        let result = ConfigLoader::load(dir.path());
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }

    #[test]
    fn test_empty_rule_catalogue_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::copy(
            Path::new(config_path()).join("engine.yaml"),
            dir.path().join("engine.yaml"),
        )
        .unwrap();
        fs::write(dir.path().join("remark_rules.yaml"), "rules: []").unwrap();

        match ConfigLoader::load(dir.path()) {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("no remark rules"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_policy_defaults_to_apply_all_when_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fs::read_to_string(Path::new(config_path()).join("engine.yaml"))
            .unwrap()
            .lines()
            .filter(|line| !line.starts_with("correction_policy"))
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(dir.path().join("engine.yaml"), engine).unwrap();
        fs::copy(
            Path::new(config_path()).join("remark_rules.yaml"),
            dir.path().join("remark_rules.yaml"),
        )
        .unwrap();

        let loader = ConfigLoader::load(dir.path()).unwrap();
        assert_eq!(loader.config().correction_policy(), CorrectionPolicy::ApplyAll);
    }
}
