//! Month-over-month comparison against the prior period.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{FlagKind, MonitoredField, PayrollRecord, RemarkClassification};

use super::context::EmployeeContext;

/// Relative change from `previous` to `current`, as a fraction.
///
/// Returns `Ok(None)` when `previous` is zero.
pub fn relative_change(current: Decimal, previous: Decimal) -> EngineResult<Option<Decimal>> {
    if previous.is_zero() {
        return Ok(None);
    }
    let delta = current
        .checked_sub(previous)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("{} - {} overflows", current, previous),
        })?;
    let change = delta
        .checked_div(previous)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("{} / {} overflows", delta, previous),
        })?;
    Ok(Some(change.abs()))
}

/// Compares every monitored field with last month's record and reports
/// changes beyond the anomaly threshold that the remark does not explain.
pub fn compare_with_prior(
    record: &PayrollRecord,
    prior: &PayrollRecord,
    classification: &RemarkClassification,
    ctx: &mut EmployeeContext<'_>,
) -> EngineResult<()> {
    if classification.case_type.explains_change() {
        return Ok(());
    }
    let threshold = ctx.config().thresholds().anomaly_threshold;

    for field in MonitoredField::ALL {
        if !record.contains(field.column()) || !prior.contains(field.column()) {
            continue;
        }
        let (Some(current), Some(previous)) = (record.amount(field), prior.amount(field)) else {
            continue;
        };
        let Some(change) = relative_change(current, previous)? else {
            continue;
        };
        if change <= threshold {
            continue;
        }

        let percent = change
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("{} x 100 overflows", change),
            })?;
        debug!(
            employee_id = ctx.employee_id(),
            field = %field,
            change_percent = %percent,
            "Unexplained change"
        );

        ctx.push_anomaly(field, previous, current, percent, &classification.raw);

        let rounded = percent.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        let mut case = ctx.flag(
            FlagKind::UnexplainedChange,
            format!(
                "Variation importante de {}: {:.1}% sans explication",
                field, rounded
            ),
        );
        case.field = Some(field);
        case.previous_value = Some(previous);
        case.current_value = Some(current);
        if !classification.raw.is_empty() {
            case.remark = Some(classification.raw.clone());
        }
        ctx.push_flag(case);
    }

    Ok(())
}
