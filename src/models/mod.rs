//! Core data models for the reconciliation engine.
//!
//! This module contains all the domain models used throughout the engine.

mod period;
mod record;
mod remark;
mod report;

pub use period::Period;
pub use record::{
    EMPLOYEE_ID_COLUMN, FIRST_NAME_COLUMN, LAST_NAME_COLUMN, MonitoredField, PayrollRecord,
    REMARK_COLUMN,
};
pub use remark::{CaseType, RemarkClassification, RemarkDetails};
pub use report::{
    Anomaly, FlagKind, FlaggedCase, HistoricalTrend, Modification, ReconciliationReport,
    TrendDirection, Volatility,
};
