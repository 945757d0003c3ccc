//! Reconciliation pipeline for monthly payroll batches.
//!
//! This module contains the individual pipeline stages and the
//! [`Reconciler`] that runs them:
//!
//! - `remark_parser`: free-text remark classification
//! - `proration`: partial-month salary proration and bonus review
//! - `data_entry`: digit-shift (x10, /10) error correction
//! - `period_comparison`: month-over-month anomaly detection
//! - `trend_analysis`: multi-month statistics and volatility
//! - `store`: the period store supplying historical months

mod context;
mod data_entry;
mod orchestrator;
mod period_comparison;
mod proration;
mod remark_parser;
mod snapshot;
mod store;
mod trend_analysis;

pub use context::{BatchFindings, EmployeeContext};
pub use data_entry::{DigitShift, DigitShiftCorrection, correct_data_entry_errors, detect_digit_shift};
pub use orchestrator::{EmployeeFailure, PipelineStage, ReconciliationOutcome, Reconciler};
pub use period_comparison::{compare_with_prior, relative_change};
pub use proration::{ProrationFactor, apply_proration, proration_factor, review_bonus};
pub use remark_parser::RemarkParser;
pub use snapshot::PeriodSnapshot;
pub use store::{InMemoryPeriodStore, JsonDirectoryStore, PeriodStore};
pub use trend_analysis::{SeriesStats, analyze_employee_trends, summarize_series};
