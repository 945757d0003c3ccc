//! Per-employee accumulation of pipeline findings.
//!
//! Each employee runs through the pipeline with its own [`EmployeeContext`].
//! The reconciler merges a context into the batch only once the employee's
//! pipeline has completed, so a failing employee leaves no partial findings.

use rust_decimal::Decimal;

use crate::config::ReconConfig;
use crate::error::EngineResult;
use crate::models::{
    Anomaly, FlagKind, FlaggedCase, HistoricalTrend, Modification, MonitoredField, PayrollRecord,
    ReconciliationReport,
};

/// Findings produced while reconciling one employee.
#[derive(Debug)]
pub struct EmployeeContext<'a> {
    config: &'a ReconConfig,
    employee_id: String,
    employee_name: String,
    period: String,
    modifications: Vec<Modification>,
    flagged_cases: Vec<FlaggedCase>,
    anomalies: Vec<Anomaly>,
}

impl<'a> EmployeeContext<'a> {
    /// Creates an empty context for one employee.
    pub fn new(
        config: &'a ReconConfig,
        employee_id: impl Into<String>,
        employee_name: impl Into<String>,
        period: impl Into<String>,
    ) -> Self {
        Self {
            config,
            employee_id: employee_id.into(),
            employee_name: employee_name.into(),
            period: period.into(),
            modifications: Vec::new(),
            flagged_cases: Vec::new(),
            anomalies: Vec::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &'a ReconConfig {
        self.config
    }

    /// The employee identifier.
    pub fn employee_id(&self) -> &str {
        &self.employee_id
    }

    /// The period label.
    pub fn period(&self) -> &str {
        &self.period
    }

    /// Records a correction and, when the correction policy allows it,
    /// rewrites the field on the working record.
    ///
    /// Returns whether the record was rewritten.
    pub fn correct(
        &mut self,
        record: &mut PayrollRecord,
        field: MonitoredField,
        old_value: Decimal,
        new_value: Decimal,
        reason: String,
        confidence: Decimal,
    ) -> EngineResult<bool> {
        let applied = self.config.should_apply(confidence);
        if applied {
            record.set_amount(field, new_value)?;
        }

        self.modifications.push(Modification {
            employee_id: self.employee_id.clone(),
            employee_name: self.employee_name.clone(),
            field,
            old_value,
            new_value,
            reason,
            confidence,
            automatic: self.config.is_automatic(confidence),
            applied,
            period: self.period.clone(),
        });

        Ok(applied)
    }

    /// Starts a flagged case for this employee.
    pub fn flag(&self, kind: FlagKind, reason: impl Into<String>) -> FlaggedCase {
        FlaggedCase {
            employee_id: self.employee_id.clone(),
            employee_name: self.employee_name.clone(),
            kind,
            reason: reason.into(),
            remark: None,
            field: None,
            previous_value: None,
            current_value: None,
            volatility: None,
            period: self.period.clone(),
        }
    }

    /// Adds a flagged case.
    pub fn push_flag(&mut self, case: FlaggedCase) {
        self.flagged_cases.push(case);
    }

    /// Records an unexplained change.
    pub fn push_anomaly(
        &mut self,
        field: MonitoredField,
        previous_value: Decimal,
        current_value: Decimal,
        change_percent: Decimal,
        remark: &str,
    ) {
        self.anomalies.push(Anomaly {
            employee_id: self.employee_id.clone(),
            employee_name: self.employee_name.clone(),
            field,
            previous_value,
            current_value,
            change_percent,
            remark: remark.to_string(),
            period: self.period.clone(),
        });
    }

    /// Corrections recorded so far.
    pub fn modifications(&self) -> &[Modification] {
        &self.modifications
    }

    /// Flagged cases recorded so far.
    pub fn flagged_cases(&self) -> &[FlaggedCase] {
        &self.flagged_cases
    }

    /// Anomalies recorded so far.
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }
}

/// Batch-level accumulation of merged employee findings.
#[derive(Debug, Default)]
pub struct BatchFindings {
    modifications: Vec<Modification>,
    flagged_cases: Vec<FlaggedCase>,
    anomalies: Vec<Anomaly>,
}

impl BatchFindings {
    /// Appends a completed employee's findings, keeping their order.
    pub fn merge(&mut self, context: EmployeeContext<'_>) {
        self.modifications.extend(context.modifications);
        self.flagged_cases.extend(context.flagged_cases);
        self.anomalies.extend(context.anomalies);
    }

    /// Appends flags raised outside the per-employee pipeline.
    pub fn extend_flags(&mut self, flags: impl IntoIterator<Item = FlaggedCase>) {
        self.flagged_cases.extend(flags);
    }

    /// Builds the final report.
    pub fn into_report(
        self,
        processed_count: usize,
        trends: Vec<HistoricalTrend>,
    ) -> ReconciliationReport {
        ReconciliationReport::assemble(
            processed_count,
            self.modifications,
            self.flagged_cases,
            self.anomalies,
            trends,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorrectionPolicy;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record() -> PayrollRecord {
        PayrollRecord::new()
            .with("matricule", "M001")
            .with("salaire_brut", 3000)
    }

    #[test]
    fn test_correct_applies_and_labels_automatic() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut r = record();

        let applied = ctx
            .correct(
                &mut r,
                MonitoredField::GrossPay,
                dec("3000"),
                dec("300"),
                "zéro en trop".to_string(),
                dec("0.98"),
            )
            .unwrap();

        assert!(applied);
        assert_eq!(r.amount(MonitoredField::GrossPay), Some(dec("300")));
        let m = &ctx.modifications()[0];
        assert!(m.automatic);
        assert!(m.applied);
        assert_eq!(m.period, "03-2025");
    }

    #[test]
    fn test_apply_all_rewrites_low_confidence_but_not_automatic() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut r = record();

        ctx.correct(
            &mut r,
            MonitoredField::GrossPay,
            dec("3000"),
            dec("1500"),
            "prorata".to_string(),
            dec("0.90"),
        )
        .unwrap();

        assert_eq!(r.amount(MonitoredField::GrossPay), Some(dec("1500")));
        assert!(!ctx.modifications()[0].automatic);
        assert!(ctx.modifications()[0].applied);
    }

    #[test]
    fn test_threshold_only_leaves_record_untouched() {
        let config = ReconConfig::default().with_correction_policy(CorrectionPolicy::ThresholdOnly);
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut r = record();

        let applied = ctx
            .correct(
                &mut r,
                MonitoredField::GrossPay,
                dec("3000"),
                dec("1500"),
                "prorata".to_string(),
                dec("0.90"),
            )
            .unwrap();

        assert!(!applied);
        assert_eq!(r.amount(MonitoredField::GrossPay), Some(dec("3000")));
        assert!(!ctx.modifications()[0].applied);
    }

    #[test]
    fn test_merge_preserves_insertion_order() {
        let config = ReconConfig::default();
        let mut first = EmployeeContext::new(&config, "M001", "A", "03-2025");
        first.push_flag(first.flag(FlagKind::BonusReview, "one"));
        let mut second = EmployeeContext::new(&config, "M002", "B", "03-2025");
        second.push_flag(second.flag(FlagKind::UnexplainedChange, "two"));

        let mut batch = BatchFindings::default();
        batch.merge(first);
        batch.merge(second);
        let report = batch.into_report(2, vec![]);

        assert_eq!(report.flagged_cases[0].employee_id, "M001");
        assert_eq!(report.flagged_cases[1].employee_id, "M002");
        assert_eq!(report.flagged_count, 2);
    }
}
