//! Digit-shift data-entry error detection.
//!
//! Operators re-keying monthly figures regularly type one zero too many or too
//! few. A value sitting at roughly ten times (or a tenth of) last month's value
//! is corrected back at high confidence.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::Thresholds;
use crate::error::{EngineError, EngineResult};
use crate::models::{MonitoredField, PayrollRecord};

use super::context::EmployeeContext;

/// The kind of digit shift detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitShift {
    /// The current value carries an extra zero.
    ExtraZero,
    /// The current value is missing a zero.
    MissingZero,
}

impl DigitShift {
    /// The human-readable reason recorded on the modification.
    pub fn reason(self) -> &'static str {
        match self {
            DigitShift::ExtraZero => {
                "Correction erreur de saisie (zéro en trop) - valeur 10x supérieure au mois précédent"
            }
            DigitShift::MissingZero => {
                "Correction erreur de saisie (zéro manquant) - valeur 10x inférieure au mois précédent"
            }
        }
    }
}

/// A proposed digit-shift correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitShiftCorrection {
    /// The kind of shift.
    pub shift: DigitShift,
    /// The corrected value.
    pub new_value: Decimal,
    /// Confidence in the correction.
    pub confidence: Decimal,
}

/// Compares a current value with last month's and proposes a digit-shift fix.
///
/// Returns `Ok(None)` when the prior value is zero or the ratio lies outside
/// both bands.
///
/// # Errors
///
/// Returns `CalculationError` if the ratio or the corrected value overflows.
///
/// # Example
///
/// ```
/// use payroll_recon::config::Thresholds;
/// use payroll_recon::reconciliation::{DigitShift, detect_digit_shift};
/// use rust_decimal::Decimal;
///
/// let fix = detect_digit_shift(Decimal::from(30000), Decimal::from(3000), &Thresholds::default())
///     .unwrap()
///     .unwrap();
/// assert_eq!(fix.shift, DigitShift::ExtraZero);
/// assert_eq!(fix.new_value, Decimal::from(3000));
/// ```
pub fn detect_digit_shift(
    current: Decimal,
    prior: Decimal,
    thresholds: &Thresholds,
) -> EngineResult<Option<DigitShiftCorrection>> {
    if prior.is_zero() {
        return Ok(None);
    }

    let ratio = current
        .checked_div(prior)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("ratio {} / {} overflows", current, prior),
        })?;

    let ten = Decimal::TEN;
    let correction = if thresholds.extra_zero_band.contains(ratio) {
        Some((DigitShift::ExtraZero, current / ten))
    } else if thresholds.missing_zero_band.contains(ratio) {
        let new_value = current
            .checked_mul(ten)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("{} x 10 overflows", current),
            })?;
        Some((DigitShift::MissingZero, new_value))
    } else {
        None
    };

    Ok(correction.map(|(shift, new_value)| DigitShiftCorrection {
        shift,
        new_value,
        confidence: thresholds.digit_shift_confidence,
    }))
}

/// Runs digit-shift detection over every monitored field present in both the
/// working record and last month's record, correcting in place.
pub fn correct_data_entry_errors(
    record: &mut PayrollRecord,
    prior: &PayrollRecord,
    ctx: &mut EmployeeContext<'_>,
) -> EngineResult<()> {
    let thresholds = ctx.config().thresholds();

    for field in MonitoredField::ALL {
        if !record.contains(field.column()) || !prior.contains(field.column()) {
            continue;
        }
        let (Some(current), Some(previous)) = (record.amount(field), prior.amount(field)) else {
            continue;
        };

        if let Some(fix) = detect_digit_shift(current, previous, thresholds)? {
            debug!(
                employee_id = ctx.employee_id(),
                field = %field,
                current = %current,
                previous = %previous,
                shift = ?fix.shift,
                "Digit-shift error detected"
            );
            ctx.correct(
                record,
                field,
                current,
                fix.new_value,
                fix.shift.reason().to_string(),
                fix.confidence,
            )?;
        }
    }

    Ok(())
}
