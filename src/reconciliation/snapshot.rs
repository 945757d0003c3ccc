//! Indexed view of one period's records.

use std::collections::HashMap;

use crate::models::{PayrollRecord, Period};

/// One month of records, indexed by employee identifier.
///
/// When an identifier appears more than once, the first record wins. Records
/// without an identifier are not indexed.
#[derive(Debug, Clone)]
pub struct PeriodSnapshot {
    period: Period,
    by_employee: HashMap<String, PayrollRecord>,
}

impl PeriodSnapshot {
    /// Indexes a period's records.
    pub fn from_records(period: Period, records: Vec<PayrollRecord>) -> Self {
        let mut by_employee = HashMap::with_capacity(records.len());
        for record in records {
            if let Some(id) = record.employee_id() {
                by_employee.entry(id).or_insert(record);
            }
        }
        Self {
            period,
            by_employee,
        }
    }

    /// The period these records belong to.
    pub fn period(&self) -> Period {
        self.period
    }

    /// The record for one employee.
    pub fn get(&self, employee_id: &str) -> Option<&PayrollRecord> {
        self.by_employee.get(employee_id)
    }

    /// Number of indexed employees.
    pub fn len(&self) -> usize {
        self.by_employee.len()
    }

    /// Returns true if no employee is indexed.
    pub fn is_empty(&self) -> bool {
        self.by_employee.is_empty()
    }
}
