//! Request types for the reconciliation API.
//!
//! This module defines the JSON request structure for the `/reconcile` endpoint.

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{PayrollRecord, Period};

/// Request body for the `/reconcile` endpoint.
///
/// Records keep whatever columns the caller sends; only the well-known
/// columns are read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileRequest {
    /// The company whose history the period store holds.
    pub company: String,
    /// The month being reconciled (1-12).
    pub month: u32,
    /// The year being reconciled.
    pub year: i32,
    /// The current month's records.
    pub records: Vec<PayrollRecord>,
}

impl ReconcileRequest {
    /// The validated period.
    pub fn period(&self) -> EngineResult<Period> {
        Period::new(self.month, self.year)
    }
}
