//! Reconciliation report models.
//!
//! This module contains the [`ReconciliationReport`] type and the entries it
//! aggregates: field corrections, cases flagged for review, unexplained
//! changes and longitudinal trends.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MonitoredField;

/// One field-level correction applied to (or proposed for) a record.
///
/// `automatic` is true exactly when `confidence` meets the configured
/// threshold. `applied` records whether the working record was rewritten,
/// which depends on the correction policy.
///
/// # Example
///
/// ```
/// use payroll_recon::models::{Modification, MonitoredField};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let modification = Modification {
///     employee_id: "M001".to_string(),
///     employee_name: "Martin Claire".to_string(),
///     field: MonitoredField::GrossPay,
///     old_value: Decimal::from(30000),
///     new_value: Decimal::from(3000),
///     reason: "Correction erreur de saisie (zéro en trop)".to_string(),
///     confidence: Decimal::from_str("0.98").unwrap(),
///     automatic: true,
///     applied: true,
///     period: "03-2025".to_string(),
/// };
/// assert!(modification.automatic);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    /// The employee identifier.
    pub employee_id: String,
    /// The employee's display name.
    pub employee_name: String,
    /// The corrected field.
    pub field: MonitoredField,
    /// The value before correction.
    pub old_value: Decimal,
    /// The corrected value.
    pub new_value: Decimal,
    /// Human-readable reason for the correction.
    pub reason: String,
    /// Confidence in [0, 1].
    pub confidence: Decimal,
    /// Confidence meets the auto-apply threshold.
    pub automatic: bool,
    /// The working record was rewritten with `new_value`.
    pub applied: bool,
    /// The period label (MM-YYYY).
    pub period: String,
}

/// Why a case was escalated for human review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// A new hire's remark mentions proration but no start day.
    ProrationDayMissing,
    /// A departure's remark gives no leaving day.
    DepartureDayMissing,
    /// A bonus is mentioned and its amount should be checked.
    BonusReview,
    /// A monitored field moved beyond the anomaly threshold without explanation.
    UnexplainedChange,
    /// A trend series is highly volatile.
    HighVolatility,
}

/// A record or situation requiring human review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedCase {
    /// The employee identifier.
    pub employee_id: String,
    /// The employee's display name.
    pub employee_name: String,
    /// The category of the flag.
    pub kind: FlagKind,
    /// Human-readable reason.
    pub reason: String,
    /// The remark that triggered or accompanies the flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    /// The field concerned, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<MonitoredField>,
    /// The prior month's value, if relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<Decimal>,
    /// The current value, if relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<Decimal>,
    /// The volatility tier, for trend flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<Volatility>,
    /// The period label (MM-YYYY).
    pub period: String,
}

/// An unexplained month-over-month change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    /// The employee identifier.
    pub employee_id: String,
    /// The employee's display name.
    pub employee_name: String,
    /// The field that moved.
    pub field: MonitoredField,
    /// The prior month's value.
    pub previous_value: Decimal,
    /// The current value.
    pub current_value: Decimal,
    /// Absolute change relative to the prior value, on a 0-100 scale.
    pub change_percent: Decimal,
    /// The remark text, empty when none was entered.
    pub remark: String,
    /// The period label (MM-YYYY).
    pub period: String,
}

/// Direction of the most recent month-over-month move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// The last delta is positive and material.
    Increasing,
    /// The last delta is negative and material.
    Decreasing,
    /// The last delta is within the stable band.
    Stable,
}

/// Volatility tier from the coefficient of variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    /// cv below the low bound.
    Low,
    /// cv between the bounds.
    Medium,
    /// cv at or above the high bound.
    High,
}

/// Longitudinal summary of one employee's field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalTrend {
    /// The employee identifier.
    pub employee_id: String,
    /// The employee's display name.
    pub employee_name: String,
    /// The field summarised.
    pub field: MonitoredField,
    /// Period labels, oldest first.
    pub periods: Vec<String>,
    /// Values parallel to `periods`.
    pub values: Vec<Decimal>,
    /// Arithmetic mean of `values`.
    pub mean: Decimal,
    /// Sample standard deviation of `values`.
    pub std_dev: Decimal,
    /// Direction of the last move.
    pub direction: TrendDirection,
    /// Volatility tier.
    pub volatility: Volatility,
}

/// The outcome of one reconciliation run.
///
/// Built once by the reconciler; the counters are derived from the lists at
/// construction time.
///
/// # Example
///
/// ```
/// use payroll_recon::models::ReconciliationReport;
///
/// let report = ReconciliationReport::assemble(3, vec![], vec![], vec![], vec![]);
/// assert_eq!(report.processed_count, 3);
/// assert_eq!(report.automatic_count, 0);
/// assert_eq!(report.flagged_count, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Field corrections, in pipeline order per employee.
    pub modifications: Vec<Modification>,
    /// Cases requiring review.
    pub flagged_cases: Vec<FlaggedCase>,
    /// Unexplained changes.
    pub anomalies: Vec<Anomaly>,
    /// Longitudinal trends.
    pub trends: Vec<HistoricalTrend>,
    /// Number of input records.
    pub processed_count: usize,
    /// Number of automatic modifications.
    pub automatic_count: usize,
    /// Number of flagged cases.
    pub flagged_count: usize,
    /// When the report was assembled.
    pub timestamp: DateTime<Utc>,
}

impl ReconciliationReport {
    /// Assembles a report and derives its counters.
    pub fn assemble(
        processed_count: usize,
        modifications: Vec<Modification>,
        flagged_cases: Vec<FlaggedCase>,
        anomalies: Vec<Anomaly>,
        trends: Vec<HistoricalTrend>,
    ) -> Self {
        let automatic_count = modifications.iter().filter(|m| m.automatic).count();
        let flagged_count = flagged_cases.len();
        Self {
            modifications,
            flagged_cases,
            anomalies,
            trends,
            processed_count,
            automatic_count,
            flagged_count,
            timestamp: Utc::now(),
        }
    }

    /// Modifications that met the confidence threshold.
    pub fn automatic_modifications(&self) -> impl Iterator<Item = &Modification> {
        self.modifications.iter().filter(|m| m.automatic)
    }

    /// Modifications below the threshold, which a reviewer should confirm.
    pub fn modifications_for_review(&self) -> impl Iterator<Item = &Modification> {
        self.modifications.iter().filter(|m| !m.automatic)
    }

    /// Flagged cases for one employee.
    pub fn flags_for<'a>(&'a self, employee_id: &'a str) -> impl Iterator<Item = &'a FlaggedCase> {
        self.flagged_cases
            .iter()
            .filter(move |f| f.employee_id == employee_id)
    }
}
