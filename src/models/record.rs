//! Payroll record model and the monitored field set.
//!
//! A [`PayrollRecord`] is one employee's row for one period. It keeps the
//! caller's column layout untouched: the engine only reads well-known columns
//! and rewrites the numeric ones it corrects.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{EngineError, EngineResult};

/// Column holding the employee identifier.
pub const EMPLOYEE_ID_COLUMN: &str = "matricule";
/// Column holding the employee's last name.
pub const LAST_NAME_COLUMN: &str = "nom";
/// Column holding the employee's first name.
pub const FIRST_NAME_COLUMN: &str = "prenom";
/// Column holding the free-text remark entered by the payroll operator.
pub const REMARK_COLUMN: &str = "remarques";

/// A payroll figure tracked for anomaly and trend purposes.
///
/// Serializes as the column name used in payroll records.
///
/// # Example
///
/// ```
/// use payroll_recon::models::MonitoredField;
///
/// assert_eq!(MonitoredField::GrossPay.column(), "salaire_brut");
/// assert_eq!(MonitoredField::ALL.len(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MonitoredField {
    /// Gross pay.
    #[serde(rename = "salaire_brut")]
    GrossPay,
    /// Net pay.
    #[serde(rename = "salaire_net")]
    NetPay,
    /// Total employee social contributions.
    #[serde(rename = "total_charges_salariales")]
    EmployeeContributions,
    /// Total employer social contributions.
    #[serde(rename = "total_charges_patronales")]
    EmployerContributions,
    /// Hours worked in the period.
    #[serde(rename = "heures_travaillees")]
    HoursWorked,
    /// Contractual base hours.
    #[serde(rename = "base_heures")]
    BaseHours,
}

impl MonitoredField {
    /// Every monitored field, in comparison order.
    pub const ALL: [MonitoredField; 6] = [
        MonitoredField::GrossPay,
        MonitoredField::NetPay,
        MonitoredField::EmployeeContributions,
        MonitoredField::EmployerContributions,
        MonitoredField::HoursWorked,
        MonitoredField::BaseHours,
    ];

    /// Salary fields subject to proration.
    pub const SALARY: [MonitoredField; 2] = [MonitoredField::GrossPay, MonitoredField::NetPay];

    /// Fields followed by trend analysis.
    pub const TREND: [MonitoredField; 3] = [
        MonitoredField::GrossPay,
        MonitoredField::NetPay,
        MonitoredField::HoursWorked,
    ];

    /// Returns the record column name for this field.
    pub fn column(self) -> &'static str {
        match self {
            MonitoredField::GrossPay => "salaire_brut",
            MonitoredField::NetPay => "salaire_net",
            MonitoredField::EmployeeContributions => "total_charges_salariales",
            MonitoredField::EmployerContributions => "total_charges_patronales",
            MonitoredField::HoursWorked => "heures_travaillees",
            MonitoredField::BaseHours => "base_heures",
        }
    }
}

impl std::fmt::Display for MonitoredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// One employee's payroll row for one period.
///
/// Numeric columns may hold JSON numbers or numeric strings. `null` and blank
/// strings read as zero for month-over-month checks, while any other text is
/// treated as malformed and skipped.
///
/// # Example
///
/// ```
/// use payroll_recon::models::{MonitoredField, PayrollRecord};
/// use rust_decimal::Decimal;
/// use serde_json::json;
///
/// let record: PayrollRecord = serde_json::from_value(json!({
///     "matricule": "M001",
///     "nom": "Martin",
///     "prenom": "Claire",
///     "salaire_brut": 3000,
/// }))
/// .unwrap();
///
/// assert_eq!(record.employee_id().as_deref(), Some("M001"));
/// assert_eq!(record.employee_name(), "Martin Claire");
/// assert_eq!(record.amount(MonitoredField::GrossPay), Some(Decimal::from(3000)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayrollRecord {
    fields: Map<String, Value>,
}

impl PayrollRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column, returning the record for chaining.
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(column.to_string(), value.into());
        self
    }

    /// Sets a column.
    pub fn insert(&mut self, column: &str, value: impl Into<Value>) {
        self.fields.insert(column.to_string(), value.into());
    }

    /// Returns the raw value of a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Returns true if the column is present, whatever its value.
    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Returns the employee identifier, if present and non-blank.
    pub fn employee_id(&self) -> Option<String> {
        match self.fields.get(EMPLOYEE_ID_COLUMN)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Returns "nom prenom", tolerating missing parts.
    pub fn employee_name(&self) -> String {
        let part = |column: &str| match self.fields.get(column) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        format!("{} {}", part(LAST_NAME_COLUMN), part(FIRST_NAME_COLUMN))
            .trim()
            .to_string()
    }

    /// Returns the free-text remark, if any.
    pub fn remark(&self) -> Option<&str> {
        match self.fields.get(REMARK_COLUMN)? {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Reads a monitored field for month-over-month checks.
    ///
    /// Returns `None` when the column is absent or malformed. `null` and blank
    /// strings read as zero.
    pub fn amount(&self, field: MonitoredField) -> Option<Decimal> {
        match self.fields.get(field.column())? {
            Value::Null => Some(Decimal::ZERO),
            Value::String(s) if s.trim().is_empty() => Some(Decimal::ZERO),
            value => parse_decimal(value),
        }
    }

    /// Reads a monitored field for a trend series.
    ///
    /// Unlike [`PayrollRecord::amount`], unpopulated values (`null`, blank)
    /// are `None` rather than zero.
    pub fn populated_amount(&self, field: MonitoredField) -> Option<Decimal> {
        parse_decimal(self.fields.get(field.column())?)
    }

    /// Writes a corrected amount back as a JSON number.
    ///
    /// Whole values are stored as integers; anything else goes through `f64`,
    /// which is the precision payroll exports carry anyway.
    pub fn set_amount(&mut self, field: MonitoredField, value: Decimal) -> EngineResult<()> {
        let number = if value.fract().is_zero() {
            value.to_i64().map(Number::from)
        } else {
            None
        };
        let number = match number {
            Some(n) => n,
            None => value
                .to_f64()
                .and_then(Number::from_f64)
                .ok_or_else(|| EngineError::CalculationError {
                    message: format!("{} cannot be stored in '{}'", value, field.column()),
                })?,
        };
        self.fields
            .insert(field.column().to_string(), Value::Number(number));
        Ok(())
    }
}

impl From<Map<String, Value>> for PayrollRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
