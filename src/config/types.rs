//! Configuration types for payroll reconciliation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, along with the built-in
//! defaults used when no configuration directory is supplied.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether corrections below the confidence threshold rewrite the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionPolicy {
    /// Apply every generated correction; `automatic` only labels which ones
    /// met the threshold.
    #[default]
    ApplyAll,
    /// Apply only corrections meeting the threshold; record the rest as
    /// proposals.
    ThresholdOnly,
}

/// An inclusive ratio band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioBand {
    /// Lower bound (inclusive).
    pub low: Decimal,
    /// Upper bound (inclusive).
    pub high: Decimal,
}

impl RatioBand {
    /// Returns true if `ratio` lies within the band.
    pub fn contains(&self, ratio: Decimal) -> bool {
        ratio >= self.low && ratio <= self.high
    }
}

/// Numeric thresholds for corrections and anomaly detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum confidence for a correction to count as automatic.
    pub confidence_threshold: Decimal,
    /// Relative month-over-month change above which a field is anomalous.
    pub anomaly_threshold: Decimal,
    /// Assumed working days in a month for proration.
    pub working_days_per_month: u32,
    /// Minimum relative difference before a proration is applied.
    pub proration_min_difference: Decimal,
    /// Confidence given to digit-shift corrections.
    pub digit_shift_confidence: Decimal,
    /// Confidence given to proration corrections.
    pub proration_confidence: Decimal,
    /// current/prior ratios that indicate an extra zero.
    pub extra_zero_band: RatioBand,
    /// current/prior ratios that indicate a missing zero.
    pub missing_zero_band: RatioBand,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            confidence_threshold: Decimal::new(95, 2),
            anomaly_threshold: Decimal::new(15, 2),
            working_days_per_month: 22,
            proration_min_difference: Decimal::new(10, 2),
            digit_shift_confidence: Decimal::new(98, 2),
            proration_confidence: Decimal::new(90, 2),
            extra_zero_band: RatioBand {
                low: Decimal::new(95, 1),
                high: Decimal::new(105, 1),
            },
            missing_zero_band: RatioBand {
                low: Decimal::new(95, 3),
                high: Decimal::new(105, 3),
            },
        }
    }
}

/// Trend analysis settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSettings {
    /// Number of prior months loaded for trends.
    pub window_months: u32,
    /// Minimum number of data points for a trend.
    pub min_points: usize,
    /// A last delta below this share of the mean is stable.
    pub stable_band: Decimal,
    /// cv at or above this is at least medium volatility.
    pub medium_volatility: Decimal,
    /// cv at or above this is high volatility.
    pub high_volatility: Decimal,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            window_months: 6,
            min_points: 3,
            stable_band: Decimal::new(5, 2),
            medium_volatility: Decimal::new(10, 2),
            high_volatility: Decimal::new(25, 2),
        }
    }
}

/// What a remark rule recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Joining during the month.
    NewHire,
    /// Leaving during the month.
    Departure,
    /// Salary revision.
    SalaryChange,
    /// Bonus mention.
    Bonus,
    /// Proration mention.
    Prorate,
}

/// One entry of the remark catalogue.
///
/// Patterns are matched against the lower-cased remark. A named `day` group,
/// when present, supplies the day of month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemarkRule {
    /// The category the rule recognises.
    pub category: RuleCategory,
    /// The regular expression.
    pub pattern: String,
}

impl RemarkRule {
    /// Creates a rule.
    pub fn new(category: RuleCategory, pattern: impl Into<String>) -> Self {
        Self {
            category,
            pattern: pattern.into(),
        }
    }
}

/// Built-in remark catalogue. Rules capturing a day come first in their
/// category so they win over the bare keyword.
const DEFAULT_RULES: &[(RuleCategory, &str)] = &[
    (
        RuleCategory::NewHire,
        r"(?:embauche|embauché|embauchée|entrée|début|arrivée)\s+(?:le\s+)?(?P<day>\d{1,2})\b",
    ),
    (RuleCategory::NewHire, r"embauch"),
    (
        RuleCategory::NewHire,
        r"nouvel(?:le)?\s+(?:recrue|salariée?|collaborat(?:eur|rice)|employée?)",
    ),
    (RuleCategory::NewHire, r"arrivée"),
    (
        RuleCategory::Departure,
        r"(?:départ|sortie|fin\s+de\s+contrat|fin)\s+(?:le\s+)?(?P<day>\d{1,2})\b",
    ),
    (RuleCategory::Departure, r"départ"),
    (RuleCategory::Departure, r"démission"),
    (RuleCategory::Departure, r"licenciement"),
    (RuleCategory::Departure, r"fin\s+de\s+contrat"),
    (RuleCategory::SalaryChange, r"augmentation"),
    (RuleCategory::SalaryChange, r"nouveau\s+salaire"),
    (RuleCategory::SalaryChange, r"modification\s+(?:du\s+)?salaire"),
    (RuleCategory::SalaryChange, r"revalorisation"),
    (RuleCategory::Bonus, r"\bprimes?\b"),
    (RuleCategory::Bonus, r"bonus"),
    (RuleCategory::Bonus, r"gratification"),
    (RuleCategory::Bonus, r"13\s*(?:e|è|ème|eme)?\s*mois"),
    (RuleCategory::Bonus, r"treizième"),
    (
        RuleCategory::Prorate,
        r"\bdu\s+(?P<day>\d{1,2})\s+au\s+(?P<end_day>\d{1,2})\b",
    ),
    (RuleCategory::Prorate, r"pro\s*-?\s*rata"),
    (RuleCategory::Prorate, r"\bau\s+(?P<end_day>\d{1,2})\b"),
];

/// Returns the built-in remark catalogue.
pub fn default_remark_rules() -> Vec<RemarkRule> {
    DEFAULT_RULES
        .iter()
        .map(|(category, pattern)| RemarkRule::new(*category, *pattern))
        .collect()
}

/// Engine settings file structure (`engine.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Correction policy.
    #[serde(default)]
    pub correction_policy: CorrectionPolicy,
    /// Numeric thresholds.
    pub thresholds: Thresholds,
    /// Trend analysis settings.
    pub trend: TrendSettings,
}

/// Remark catalogue file structure (`remark_rules.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct RemarkRulesConfig {
    /// Ordered rules.
    pub rules: Vec<RemarkRule>,
}

/// The complete reconciliation configuration.
///
/// # Example
///
/// ```
/// use payroll_recon::config::{CorrectionPolicy, ReconConfig};
///
/// let config = ReconConfig::default();
/// assert_eq!(config.thresholds().working_days_per_month, 22);
/// assert_eq!(config.trend().window_months, 6);
/// assert_eq!(config.correction_policy(), CorrectionPolicy::ApplyAll);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconConfig {
    thresholds: Thresholds,
    trend: TrendSettings,
    correction_policy: CorrectionPolicy,
    remark_rules: Vec<RemarkRule>,
}

impl ReconConfig {
    /// Creates a configuration from its component parts.
    pub fn new(
        thresholds: Thresholds,
        trend: TrendSettings,
        correction_policy: CorrectionPolicy,
        remark_rules: Vec<RemarkRule>,
    ) -> Self {
        Self {
            thresholds,
            trend,
            correction_policy,
            remark_rules,
        }
    }

    /// Returns the numeric thresholds.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Returns the trend settings.
    pub fn trend(&self) -> &TrendSettings {
        &self.trend
    }

    /// Returns the correction policy.
    pub fn correction_policy(&self) -> CorrectionPolicy {
        self.correction_policy
    }

    /// Returns the remark catalogue.
    pub fn remark_rules(&self) -> &[RemarkRule] {
        &self.remark_rules
    }

    /// Returns a copy with a different correction policy.
    pub fn with_correction_policy(mut self, policy: CorrectionPolicy) -> Self {
        self.correction_policy = policy;
        self
    }

    /// Returns true if a correction at `confidence` counts as automatic.
    pub fn is_automatic(&self, confidence: Decimal) -> bool {
        confidence >= self.thresholds.confidence_threshold
    }

    /// Returns true if a correction at `confidence` should rewrite the record.
    pub fn should_apply(&self, confidence: Decimal) -> bool {
        match self.correction_policy {
            CorrectionPolicy::ApplyAll => true,
            CorrectionPolicy::ThresholdOnly => self.is_automatic(confidence),
        }
    }
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self::new(
            Thresholds::default(),
            TrendSettings::default(),
            CorrectionPolicy::default(),
            default_remark_rules(),
        )
    }
}
