//! Configuration loading and management for the reconciliation engine.
//!
//! This module provides functionality to load thresholds, trend settings and
//! the remark rule catalogue from YAML files. [`ReconConfig::default`] carries
//! the same values as the shipped `config/default` directory.
//!
//! # Example
//!
//! ```no_run
//! use payroll_recon::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Rules loaded: {}", config.config().remark_rules().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CorrectionPolicy, EngineSettings, RatioBand, ReconConfig, RemarkRule, RemarkRulesConfig,
    RuleCategory, Thresholds, TrendSettings, default_remark_rules,
};
