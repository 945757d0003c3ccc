//! The per-employee reconciliation pipeline.
//!
//! Each employee's record runs through
//! `raw -> remark_classified -> proration_applied -> error_corrected ->
//! period_compared -> done` on a working copy with its own
//! [`EmployeeContext`]. Trend analysis then runs over the processed batch and
//! the report is assembled once.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ReconConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollRecord, Period, ReconciliationReport};

use super::context::{BatchFindings, EmployeeContext};
use super::data_entry::correct_data_entry_errors;
use super::period_comparison::compare_with_prior;
use super::proration::{apply_proration, review_bonus};
use super::remark_parser::RemarkParser;
use super::snapshot::PeriodSnapshot;
use super::store::PeriodStore;
use super::trend_analysis::analyze_employee_trends;

/// The last state an employee's record reached in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Nothing has run yet.
    Raw,
    /// The remark has been classified.
    RemarkClassified,
    /// Proration and bonus review have run.
    ProrationApplied,
    /// Digit-shift errors have been corrected.
    ErrorCorrected,
    /// The record has been compared with last month. This is the last stage.
    PeriodCompared,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Raw => "raw",
            PipelineStage::RemarkClassified => "remark_classified",
            PipelineStage::ProrationApplied => "proration_applied",
            PipelineStage::ErrorCorrected => "error_corrected",
            PipelineStage::PeriodCompared => "period_compared",
        };
        f.write_str(name)
    }
}

/// Why one employee's pipeline stopped.
#[derive(Debug)]
pub struct EmployeeFailure {
    /// The last stage completed before the failure.
    pub stage: PipelineStage,
    /// The underlying error.
    pub error: EngineError,
}

/// The processed record set and its report.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationOutcome {
    /// Records in input order, corrected where corrections were applied.
    pub records: Vec<PayrollRecord>,
    /// The reconciliation report.
    pub report: ReconciliationReport,
}

/// Runs reconciliation batches against a period store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use payroll_recon::config::ReconConfig;
/// use payroll_recon::models::{PayrollRecord, Period};
/// use payroll_recon::reconciliation::{InMemoryPeriodStore, Reconciler};
///
/// let march = Period::new(3, 2025).unwrap();
/// let store = InMemoryPeriodStore::new().with_period(
///     "ACME",
///     march.previous(),
///     vec![PayrollRecord::new().with("matricule", "M001").with("salaire_brut", 3000)],
/// );
/// let reconciler = Reconciler::new(ReconConfig::default(), Arc::new(store)).unwrap();
///
/// let outcome = reconciler
///     .reconcile(
///         "ACME",
///         march,
///         vec![PayrollRecord::new().with("matricule", "M001").with("salaire_brut", 30000)],
///     )
///     .unwrap();
///
/// assert_eq!(outcome.report.automatic_count, 1);
/// assert_eq!(outcome.records[0].get("salaire_brut"), Some(&serde_json::json!(3000)));
/// ```
pub struct Reconciler {
    config: ReconConfig,
    parser: RemarkParser,
    store: Arc<dyn PeriodStore>,
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .field("rules", &self.parser.rule_count())
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a reconciler, compiling the configured remark catalogue.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if a remark rule does not compile.
    pub fn new(config: ReconConfig, store: Arc<dyn PeriodStore>) -> EngineResult<Self> {
        let parser = RemarkParser::new(config.remark_rules())?;
        Ok(Self {
            config,
            parser,
            store,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// The remark parser.
    pub fn parser(&self) -> &RemarkParser {
        &self.parser
    }

    /// Reconciles one company's batch for `period`.
    ///
    /// Per-employee failures are logged and leave the employee's original
    /// record in place; they never fail the batch.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the period store fails.
    pub fn reconcile(
        &self,
        company: &str,
        period: Period,
        records: Vec<PayrollRecord>,
    ) -> EngineResult<ReconciliationOutcome> {
        let start_time = Instant::now();
        info!(
            company,
            period = %period,
            records = records.len(),
            "Starting reconciliation"
        );

        let prior_period = period.previous();
        let prior = self.load_snapshot(company, prior_period)?;
        if prior.is_none() {
            warn!(
                company,
                period = %prior_period,
                "No prior period data; month-over-month checks skipped"
            );
        }

        let window = self.config.trend().window_months;
        let mut history = Vec::new();
        for month in period.trailing(window) {
            if month == prior_period {
                continue;
            }
            if let Some(snapshot) = self.load_snapshot(company, month)? {
                history.push(snapshot);
            }
        }
        if window > 0 {
            if let Some(snapshot) = &prior {
                history.push(snapshot.clone());
            }
        }

        let period_label = period.label();
        let processed_count = records.len();
        let mut findings = BatchFindings::default();
        let mut output = Vec::with_capacity(records.len());

        for record in records {
            match self.process_employee(&record, prior.as_ref(), &period_label) {
                Ok((processed, context)) => {
                    findings.merge(context);
                    output.push(processed);
                }
                Err(failure) => {
                    warn!(
                        employee_id = %record.employee_id().unwrap_or_default(),
                        stage = %failure.stage,
                        error = %failure.error,
                        "Employee reconciliation failed; original record kept"
                    );
                    output.push(record);
                }
            }
        }

        let mut trends = Vec::new();
        for record in &output {
            let Some(employee_id) = record.employee_id() else {
                continue;
            };
            match analyze_employee_trends(
                record,
                &employee_id,
                &record.employee_name(),
                &history,
                period,
                self.config.trend(),
            ) {
                Ok((employee_trends, flags)) => {
                    trends.extend(employee_trends);
                    findings.extend_flags(flags);
                }
                Err(error) => {
                    warn!(
                        employee_id = %employee_id,
                        error = %error,
                        "Trend analysis failed; employee skipped"
                    );
                }
            }
        }

        let report = findings.into_report(processed_count, trends);
        info!(
            company,
            period = %period,
            processed = report.processed_count,
            modifications = report.modifications.len(),
            automatic = report.automatic_count,
            flagged = report.flagged_count,
            anomalies = report.anomalies.len(),
            duration_us = start_time.elapsed().as_micros(),
            "Reconciliation completed"
        );

        Ok(ReconciliationOutcome {
            records: output,
            report,
        })
    }

    /// Runs one employee through the pipeline on a working copy.
    fn process_employee<'a>(
        &'a self,
        record: &PayrollRecord,
        prior: Option<&PeriodSnapshot>,
        period_label: &str,
    ) -> Result<(PayrollRecord, EmployeeContext<'a>), EmployeeFailure> {
        let mut stage = PipelineStage::Raw;
        let fail = |stage: PipelineStage| move |error: EngineError| EmployeeFailure { stage, error };

        let employee_id = record.employee_id().ok_or_else(|| EmployeeFailure {
            stage,
            error: EngineError::InvalidRecord {
                employee_id: String::new(),
                message: "missing employee identifier".to_string(),
            },
        })?;
        let mut working = record.clone();
        let mut ctx = EmployeeContext::new(
            &self.config,
            employee_id.as_str(),
            record.employee_name(),
            period_label,
        );

        let classification = self.parser.parse(working.remark());
        stage = PipelineStage::RemarkClassified;

        apply_proration(&mut working, &classification, &mut ctx).map_err(fail(stage))?;
        review_bonus(&classification, &mut ctx);
        stage = PipelineStage::ProrationApplied;

        let prior_record = prior.and_then(|snapshot| snapshot.get(&employee_id));
        if prior_record.is_none() {
            debug!(employee_id = %employee_id, "No prior record for employee");
        }

        if let Some(prior_record) = prior_record {
            correct_data_entry_errors(&mut working, prior_record, &mut ctx).map_err(fail(stage))?;
        }
        stage = PipelineStage::ErrorCorrected;

        if let Some(prior_record) = prior_record {
            compare_with_prior(&working, prior_record, &classification, &mut ctx)
                .map_err(fail(stage))?;
        }
        stage = PipelineStage::PeriodCompared;

        debug!(
            employee_id = %employee_id,
            last_stage = %stage,
            case_type = ?classification.case_type,
            modifications = ctx.modifications().len(),
            flags = ctx.flagged_cases().len(),
            "Employee reconciled"
        );

        Ok((working, ctx))
    }

    fn load_snapshot(&self, company: &str, period: Period) -> EngineResult<Option<PeriodSnapshot>> {
        Ok(self
            .store
            .load(company, period)?
            .filter(|records| !records.is_empty())
            .map(|records| PeriodSnapshot::from_records(period, records)))
    }
}
