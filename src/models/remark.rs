//! Remark classification model.
//!
//! This module contains the [`RemarkClassification`] produced by the remark
//! parser for each record's free-text remark.

use serde::{Deserialize, Serialize};

/// The situation a remark describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    /// The employee joined during the month.
    NewHire,
    /// The employee left during the month.
    Departure,
    /// The employee's salary was revised.
    SalaryChange,
    /// A bonus was paid this month.
    Bonus,
    /// Nothing recognised.
    #[default]
    None,
}

impl CaseType {
    /// Returns true if this case accounts for a large month-over-month change.
    pub fn explains_change(self) -> bool {
        !matches!(self, CaseType::None)
    }

    /// Returns true for the partial-month cases that may need proration.
    pub fn is_partial_month(self) -> bool {
        matches!(self, CaseType::NewHire | CaseType::Departure)
    }
}

/// Structured hints extracted from a remark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemarkDetails {
    /// Day of month captured by a new-hire or departure rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    /// The remark mentions proration.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub prorate: bool,
    /// First day of a proration range ("du X au Y").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prorate_day: Option<u32>,
    /// Last day of a proration range, or the day in "au N".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prorate_end_day: Option<u32>,
    /// The remark mentions a bonus.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_bonus: bool,
}

impl RemarkDetails {
    /// Returns true if no hint was extracted.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The proration day for a partial-month case, preferring the case rule's
    /// own capture.
    ///
    /// A new hire starts on the first day of a range; a departure leaves on
    /// its last day. Other cases have no proration day.
    pub fn proration_day(&self, case_type: CaseType) -> Option<u32> {
        match case_type {
            CaseType::NewHire => self.day.or(self.prorate_day),
            CaseType::Departure => self.day.or(self.prorate_end_day).or(self.prorate_day),
            _ => None,
        }
    }

    /// Returns true if the remark implies a partial-month adjustment.
    pub fn implies_proration(&self) -> bool {
        self.prorate || self.day.is_some()
    }
}

/// The result of parsing one record's remark.
///
/// # Example
///
/// ```
/// use payroll_recon::models::{CaseType, RemarkClassification};
///
/// let empty = RemarkClassification::none();
/// assert_eq!(empty.case_type, CaseType::None);
/// assert!(empty.details.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemarkClassification {
    /// The recognised case.
    pub case_type: CaseType,
    /// Extracted hints.
    pub details: RemarkDetails,
    /// The remark as entered.
    pub raw: String,
}

impl RemarkClassification {
    /// A classification for an empty or absent remark.
    pub fn none() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_none_leaves_changes_unexplained() {
        assert!(!CaseType::None.explains_change());
        for case in [
            CaseType::NewHire,
            CaseType::Departure,
            CaseType::SalaryChange,
            CaseType::Bonus,
        ] {
            assert!(case.explains_change(), "{:?} should explain", case);
        }
    }

    #[test]
    fn test_partial_month_cases() {
        assert!(CaseType::NewHire.is_partial_month());
        assert!(CaseType::Departure.is_partial_month());
        assert!(!CaseType::Bonus.is_partial_month());
    }

    #[test]
    fn test_proration_day_prefers_case_day() {
        let details = RemarkDetails {
            day: Some(12),
            prorate: true,
            prorate_day: Some(1),
            prorate_end_day: Some(20),
            has_bonus: false,
        };
        assert_eq!(details.proration_day(CaseType::NewHire), Some(12));
        assert_eq!(details.proration_day(CaseType::Departure), Some(12));
    }

    #[test]
    fn test_proration_day_picks_range_end_by_case() {
        let range = RemarkDetails {
            prorate: true,
            prorate_day: Some(1),
            prorate_end_day: Some(15),
            ..Default::default()
        };
        assert_eq!(range.proration_day(CaseType::NewHire), Some(1));
        assert_eq!(range.proration_day(CaseType::Departure), Some(15));
        assert_eq!(range.proration_day(CaseType::Bonus), None);

        let end_only = RemarkDetails {
            prorate: true,
            prorate_end_day: Some(15),
            ..Default::default()
        };
        assert_eq!(end_only.proration_day(CaseType::NewHire), None);
        assert_eq!(end_only.proration_day(CaseType::Departure), Some(15));
    }

    #[test]
    fn test_case_type_serialization() {
        let json = serde_json::to_string(&CaseType::SalaryChange).unwrap();
        assert_eq!(json, "\"salary_change\"");
        let case: CaseType = serde_json::from_str("\"new_hire\"").unwrap();
        assert_eq!(case, CaseType::NewHire);
    }

    #[test]
    fn test_empty_details_serialize_to_empty_object() {
        let json = serde_json::to_string(&RemarkDetails::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
