//! Multi-month trend analysis.
//!
//! For each trend field the analyzer builds the employee's series over the
//! loaded history plus the current month, then summarises it with the mean,
//! the sample standard deviation, the direction of the last move and a
//! volatility tier taken from the coefficient of variation (`std_dev / mean`).

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use tracing::debug;

use crate::config::TrendSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    FlagKind, FlaggedCase, HistoricalTrend, MonitoredField, PayrollRecord, Period, TrendDirection,
    Volatility,
};

use super::snapshot::PeriodSnapshot;

/// Summary statistics of a value series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStats {
    /// Arithmetic mean.
    pub mean: Decimal,
    /// Sample standard deviation (n - 1 denominator).
    pub std_dev: Decimal,
    /// Coefficient of variation, zero when the mean is not positive.
    pub cv: Decimal,
    /// Direction of the last move.
    pub direction: TrendDirection,
    /// Volatility tier.
    pub volatility: Volatility,
}

/// Summarises a series. Series shorter than two points have a zero standard
/// deviation and are stable.
///
/// # Errors
///
/// Returns `CalculationError` if an intermediate sum overflows.
///
/// # Example
///
/// ```
/// use payroll_recon::config::TrendSettings;
/// use payroll_recon::models::{TrendDirection, Volatility};
/// use payroll_recon::reconciliation::summarize_series;
/// use rust_decimal::Decimal;
///
/// let values: Vec<Decimal> = [100, 102, 98, 101, 150].into_iter().map(Decimal::from).collect();
/// let stats = summarize_series(&values, &TrendSettings::default()).unwrap();
/// assert_eq!(stats.direction, TrendDirection::Increasing);
/// assert_eq!(stats.volatility, Volatility::Medium);
/// ```
pub fn summarize_series(values: &[Decimal], settings: &TrendSettings) -> EngineResult<SeriesStats> {
    let overflow = || EngineError::CalculationError {
        message: format!("trend statistics overflow over {} values", values.len()),
    };

    if values.is_empty() {
        return Ok(SeriesStats {
            mean: Decimal::ZERO,
            std_dev: Decimal::ZERO,
            cv: Decimal::ZERO,
            direction: TrendDirection::Stable,
            volatility: Volatility::Low,
        });
    }

    let count = Decimal::from(values.len());
    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or_else(overflow)?;
    let mean = sum / count;

    let std_dev = if values.len() < 2 {
        Decimal::ZERO
    } else {
        let squares = values
            .iter()
            .try_fold(Decimal::ZERO, |acc, v| {
                let deviation = v.checked_sub(mean)?;
                acc.checked_add(deviation.checked_mul(deviation)?)
            })
            .ok_or_else(overflow)?;
        let variance = squares / (count - Decimal::ONE);
        variance.sqrt().ok_or_else(overflow)?
    };

    let direction = match values {
        [.., previous, last] => {
            let delta = last.checked_sub(*previous).ok_or_else(overflow)?;
            if delta.abs() < mean.abs() * settings.stable_band {
                TrendDirection::Stable
            } else if delta.is_sign_positive() {
                TrendDirection::Increasing
            } else {
                TrendDirection::Decreasing
            }
        }
        _ => TrendDirection::Stable,
    };

    let cv = if mean > Decimal::ZERO {
        std_dev.checked_div(mean).ok_or_else(overflow)?
    } else {
        Decimal::ZERO
    };
    let volatility = if cv < settings.medium_volatility {
        Volatility::Low
    } else if cv < settings.high_volatility {
        Volatility::Medium
    } else {
        Volatility::High
    };

    Ok(SeriesStats {
        mean,
        std_dev,
        cv,
        direction,
        volatility,
    })
}

/// Builds one employee's trends over `history` (oldest first) and the current
/// record, and flags highly volatile fields.
pub fn analyze_employee_trends(
    current: &PayrollRecord,
    employee_id: &str,
    employee_name: &str,
    history: &[PeriodSnapshot],
    current_period: Period,
    settings: &TrendSettings,
) -> EngineResult<(Vec<HistoricalTrend>, Vec<FlaggedCase>)> {
    let mut trends = Vec::new();
    let mut flags = Vec::new();
    let period_label = current_period.label();

    for field in MonitoredField::TREND {
        let mut periods = Vec::with_capacity(history.len() + 1);
        let mut values = Vec::with_capacity(history.len() + 1);

        for snapshot in history {
            if let Some(value) = snapshot
                .get(employee_id)
                .and_then(|record| record.populated_amount(field))
            {
                periods.push(snapshot.period().label());
                values.push(value);
            }
        }
        if let Some(value) = current.populated_amount(field) {
            periods.push(period_label.clone());
            values.push(value);
        }

        if values.len() < settings.min_points {
            continue;
        }

        let stats = summarize_series(&values, settings)?;
        debug!(
            employee_id,
            field = %field,
            points = values.len(),
            cv = %stats.cv,
            volatility = ?stats.volatility,
            "Trend computed"
        );

        if stats.volatility == Volatility::High {
            let std_dev = stats
                .std_dev
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            flags.push(FlaggedCase {
                employee_id: employee_id.to_string(),
                employee_name: employee_name.to_string(),
                kind: FlagKind::HighVolatility,
                reason: format!(
                    "Volatilité élevée détectée sur {} (écart-type: {:.2})",
                    field, std_dev
                ),
                remark: None,
                field: Some(field),
                previous_value: None,
                current_value: values.last().copied(),
                volatility: Some(stats.volatility),
                period: period_label.clone(),
            });
        }

        trends.push(HistoricalTrend {
            employee_id: employee_id.to_string(),
            employee_name: employee_name.to_string(),
            field,
            periods,
            values,
            mean: stats.mean,
            std_dev: stats.std_dev,
            direction: stats.direction,
            volatility: stats.volatility,
        });
    }

    Ok((trends, flags))
}
