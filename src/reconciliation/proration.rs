//! Partial-month proration for new hires and departures.
//!
//! Working days are counted against a fixed month of
//! [`Thresholds::working_days_per_month`](crate::config::Thresholds) days:
//!
//! - New hire on day d: `max(1, days - d + 1)` worked days
//! - Departure on day d: `min(d, days)` worked days
//!
//! Salary fields are scaled by `worked / days` when the result differs from the
//! entered value by more than the minimum difference.

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{CaseType, FlagKind, MonitoredField, PayrollRecord, RemarkClassification};

use super::context::EmployeeContext;

/// The share of the month an employee was present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProrationFactor {
    /// Days worked in the month.
    pub worked_days: u32,
    /// Working days in a full month.
    pub total_days: u32,
    /// `worked_days / total_days`.
    pub factor: Decimal,
}

/// Computes the proration factor for a partial-month case.
///
/// Returns `None` for cases that are not partial months, or when the month
/// has no working days.
///
/// # Example
///
/// ```
/// use payroll_recon::models::CaseType;
/// use payroll_recon::reconciliation::proration_factor;
///
/// let hire = proration_factor(CaseType::NewHire, 15, 22).unwrap();
/// assert_eq!(hire.worked_days, 8);
///
/// let departure = proration_factor(CaseType::Departure, 30, 22).unwrap();
/// assert_eq!(departure.worked_days, 22);
/// ```
pub fn proration_factor(case_type: CaseType, day: u32, working_days: u32) -> Option<ProrationFactor> {
    if working_days == 0 {
        return None;
    }

    let total = i64::from(working_days);
    let day = i64::from(day);
    let worked = match case_type {
        CaseType::NewHire => (total - day + 1).max(1),
        CaseType::Departure => day.min(total),
        _ => return None,
    };
    let worked_days = u32::try_from(worked).ok()?;

    Some(ProrationFactor {
        worked_days,
        total_days: working_days,
        factor: Decimal::from(worked_days) / Decimal::from(working_days),
    })
}

/// Prorates the salary fields of a new hire or departure, or flags the case
/// when the remark gives no usable day.
pub fn apply_proration(
    record: &mut PayrollRecord,
    classification: &RemarkClassification,
    ctx: &mut EmployeeContext<'_>,
) -> EngineResult<()> {
    let case_type = classification.case_type;
    if !case_type.is_partial_month() {
        return Ok(());
    }

    let details = &classification.details;
    let Some(day) = details.proration_day(case_type) else {
        let (kind, reason) = match case_type {
            CaseType::NewHire if details.implies_proration() => (
                FlagKind::ProrationDayMissing,
                "Nouvelle embauche - jour de début non spécifié dans remarques",
            ),
            CaseType::Departure => (
                FlagKind::DepartureDayMissing,
                "Départ - jour de sortie non spécifié dans remarques",
            ),
            _ => return Ok(()),
        };
        let mut case = ctx.flag(kind, reason);
        case.remark = Some(classification.raw.clone());
        ctx.push_flag(case);
        return Ok(());
    };

    let thresholds = ctx.config().thresholds();
    let Some(proration) = proration_factor(case_type, day, thresholds.working_days_per_month)
    else {
        return Ok(());
    };
    let label = if case_type == CaseType::NewHire {
        "embauche"
    } else {
        "départ"
    };
    let min_difference = thresholds.proration_min_difference;
    let confidence = thresholds.proration_confidence;

    for field in MonitoredField::SALARY {
        let Some(old_value) = record.amount(field) else {
            continue;
        };
        if old_value.is_zero() {
            continue;
        }

        let new_value = old_value
            .checked_mul(proration.factor)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("{} x {} overflows", old_value, proration.factor),
            })?;
        let difference = ((old_value - new_value) / old_value).abs();
        if difference <= min_difference {
            continue;
        }

        debug!(
            employee_id = ctx.employee_id(),
            field = %field,
            day,
            worked_days = proration.worked_days,
            "Prorating salary field"
        );
        ctx.correct(
            record,
            field,
            old_value,
            new_value,
            format!(
                "Proratisation {} le {} ({}/{} jours)",
                label, day, proration.worked_days, proration.total_days
            ),
            confidence,
        )?;
    }

    Ok(())
}

/// Flags a bonus month so the amount is checked by hand.
pub fn review_bonus(classification: &RemarkClassification, ctx: &mut EmployeeContext<'_>) {
    if classification.case_type != CaseType::Bonus {
        return;
    }
    let mut case = ctx.flag(FlagKind::BonusReview, "Prime mentionnée - vérifier le montant");
    case.remark = Some(classification.raw.clone());
    ctx.push_flag(case);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconConfig;
    use crate::models::RemarkDetails;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn classification(case_type: CaseType, details: RemarkDetails, raw: &str) -> RemarkClassification {
        RemarkClassification {
            case_type,
            details,
            raw: raw.to_string(),
        }
    }

    fn with_day(day: u32) -> RemarkDetails {
        RemarkDetails {
            day: Some(day),
            ..Default::default()
        }
    }

    fn salaried() -> PayrollRecord {
        PayrollRecord::new()
            .with("matricule", "M001")
            .with("salaire_brut", 3000)
            .with("salaire_net", 2400)
    }

    /// PR-001: new hire mid-month
    #[test]
    fn test_new_hire_day_fifteen_works_eight_days() {
        let factor = proration_factor(CaseType::NewHire, 15, 22).unwrap();
        assert_eq!(factor.worked_days, 8);
        assert_eq!(factor.factor, dec("8") / dec("22"));
    }

    #[test]
    fn test_new_hire_late_in_month_works_at_least_one_day() {
        assert_eq!(proration_factor(CaseType::NewHire, 31, 22).unwrap().worked_days, 1);
        assert_eq!(proration_factor(CaseType::NewHire, 22, 22).unwrap().worked_days, 1);
    }

    #[test]
    fn test_new_hire_first_day_is_full_month() {
        let factor = proration_factor(CaseType::NewHire, 1, 22).unwrap();
        assert_eq!(factor.worked_days, 22);
        assert_eq!(factor.factor, Decimal::ONE);
    }

    #[test]
    fn test_departure_caps_at_working_days() {
        assert_eq!(proration_factor(CaseType::Departure, 10, 22).unwrap().worked_days, 10);
        assert_eq!(proration_factor(CaseType::Departure, 28, 22).unwrap().worked_days, 22);
    }

    #[test]
    fn test_other_cases_have_no_factor() {
        assert!(proration_factor(CaseType::SalaryChange, 10, 22).is_none());
        assert!(proration_factor(CaseType::NewHire, 10, 0).is_none());
    }

    /// PR-002: gross 3000 on day 15 becomes ~1090.91
    #[test]
    fn test_apply_proration_scales_salary_fields() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut record = salaried();
        let remark = classification(CaseType::NewHire, with_day(15), "Nouvelle embauche le 15");

        apply_proration(&mut record, &remark, &mut ctx).unwrap();

        assert_eq!(ctx.modifications().len(), 2);
        let gross = &ctx.modifications()[0];
        assert_eq!(gross.field, MonitoredField::GrossPay);
        assert_eq!(gross.new_value.round_dp(2), dec("1090.91"));
        assert_eq!(gross.confidence, dec("0.90"));
        assert!(!gross.automatic);
        assert!(gross.applied);
        assert_eq!(gross.reason, "Proratisation embauche le 15 (8/22 jours)");
        assert_eq!(
            record.amount(MonitoredField::GrossPay).unwrap().round_dp(2),
            dec("1090.91")
        );
    }

    #[test]
    fn test_departure_reason_and_factor() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut record = salaried();
        let remark = classification(CaseType::Departure, with_day(11), "Départ le 11");

        apply_proration(&mut record, &remark, &mut ctx).unwrap();

        assert_eq!(record.amount(MonitoredField::GrossPay), Some(dec("1500")));
        assert_eq!(ctx.modifications()[0].reason, "Proratisation départ le 11 (11/22 jours)");
    }

    #[test]
    fn test_small_difference_is_not_corrected() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut record = salaried();
        // 20/22 is within 10% of the full month
        let remark = classification(CaseType::Departure, with_day(20), "Départ le 20");

        apply_proration(&mut record, &remark, &mut ctx).unwrap();

        assert!(ctx.modifications().is_empty());
        assert_eq!(record.amount(MonitoredField::GrossPay), Some(dec("3000")));
    }

    #[test]
    fn test_zero_and_absent_salaries_are_skipped() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut record = PayrollRecord::new().with("salaire_brut", 0);
        let remark = classification(CaseType::NewHire, with_day(15), "Embauche le 15");

        apply_proration(&mut record, &remark, &mut ctx).unwrap();

        assert!(ctx.modifications().is_empty());
    }

    #[test]
    fn test_prorate_day_is_used_when_case_rule_has_none() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut record = salaried();
        let details = RemarkDetails {
            prorate: true,
            prorate_day: Some(15),
            ..Default::default()
        };
        let remark = classification(CaseType::NewHire, details, "Arrivée, prorata du 15 au 31");

        apply_proration(&mut record, &remark, &mut ctx).unwrap();

        assert_eq!(ctx.modifications().len(), 2);
        assert!(ctx.flagged_cases().is_empty());
    }

    #[test]
    fn test_departure_range_prorates_to_last_day() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut record = salaried();
        let details = RemarkDetails {
            prorate: true,
            prorate_day: Some(1),
            prorate_end_day: Some(15),
            ..Default::default()
        };
        let remark = classification(CaseType::Departure, details, "Départ, payé du 1 au 15");

        apply_proration(&mut record, &remark, &mut ctx).unwrap();

        let gross = &ctx.modifications()[0];
        assert_eq!(gross.reason, "Proratisation départ le 15 (15/22 jours)");
        assert_eq!(gross.new_value.round_dp(2), dec("2045.45"));
        assert!(ctx.flagged_cases().is_empty());
    }

    #[test]
    fn test_departure_au_day_prorates_on_that_day() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut record = salaried();
        let details = RemarkDetails {
            prorate: true,
            prorate_end_day: Some(11),
            ..Default::default()
        };
        let remark = classification(CaseType::Departure, details, "Départ au 11");

        apply_proration(&mut record, &remark, &mut ctx).unwrap();

        assert_eq!(record.amount(MonitoredField::GrossPay), Some(dec("1500")));
        assert_eq!(ctx.modifications()[0].reason, "Proratisation départ le 11 (11/22 jours)");
    }

    #[test]
    fn test_new_hire_with_only_end_day_is_flagged() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut record = salaried();
        let details = RemarkDetails {
            prorate: true,
            prorate_end_day: Some(31),
            ..Default::default()
        };
        let remark = classification(CaseType::NewHire, details, "Embauche, payé au 31");

        apply_proration(&mut record, &remark, &mut ctx).unwrap();

        assert!(ctx.modifications().is_empty());
        assert_eq!(ctx.flagged_cases()[0].kind, FlagKind::ProrationDayMissing);
    }

    #[test]
    fn test_new_hire_prorata_without_day_is_flagged_not_corrected() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut record = salaried();
        let details = RemarkDetails {
            prorate: true,
            ..Default::default()
        };
        let remark = classification(CaseType::NewHire, details, "Embauche au prorata");

        apply_proration(&mut record, &remark, &mut ctx).unwrap();

        assert!(ctx.modifications().is_empty());
        let flag = &ctx.flagged_cases()[0];
        assert_eq!(flag.kind, FlagKind::ProrationDayMissing);
        assert_eq!(flag.remark.as_deref(), Some("Embauche au prorata"));
    }

    #[test]
    fn test_new_hire_without_any_hint_is_left_alone() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut record = salaried();
        let remark = classification(CaseType::NewHire, RemarkDetails::default(), "Embauché ce mois");

        apply_proration(&mut record, &remark, &mut ctx).unwrap();

        assert!(ctx.modifications().is_empty());
        assert!(ctx.flagged_cases().is_empty());
    }

    #[test]
    fn test_departure_without_day_is_flagged() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut record = salaried();
        let remark = classification(CaseType::Departure, RemarkDetails::default(), "Démission");

        apply_proration(&mut record, &remark, &mut ctx).unwrap();

        assert!(ctx.modifications().is_empty());
        assert_eq!(ctx.flagged_cases()[0].kind, FlagKind::DepartureDayMissing);
    }

    #[test]
    fn test_salary_change_is_never_prorated() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let mut record = salaried();
        let remark = classification(CaseType::SalaryChange, with_day(10), "Augmentation au 10");

        apply_proration(&mut record, &remark, &mut ctx).unwrap();

        assert!(ctx.modifications().is_empty());
        assert!(ctx.flagged_cases().is_empty());
    }

    #[test]
    fn test_review_bonus_flags_bonus_case_only() {
        let config = ReconConfig::default();
        let mut ctx = EmployeeContext::new(&config, "M001", "Martin Claire", "03-2025");
        let bonus = RemarkDetails {
            has_bonus: true,
            ..Default::default()
        };

        review_bonus(&classification(CaseType::NewHire, bonus.clone(), "Embauche, prime"), &mut ctx);
        assert!(ctx.flagged_cases().is_empty());

        review_bonus(&classification(CaseType::Bonus, bonus, "Prime annuelle"), &mut ctx);
        let flag = &ctx.flagged_cases()[0];
        assert_eq!(flag.kind, FlagKind::BonusReview);
        assert_eq!(flag.reason, "Prime mentionnée - vérifier le montant");
    }
}
