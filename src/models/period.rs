//! Monthly payroll period.
//!
//! This module contains the [`Period`] type used to address a company's
//! monthly record sets and to label report entries.

use std::fmt;

use serde::Serialize;

use crate::error::{EngineError, EngineResult};

/// A calendar month of payroll.
///
/// Periods are labelled `MM-YYYY` in reports.
///
/// # Example
///
/// ```
/// use payroll_recon::models::Period;
///
/// let period = Period::new(1, 2025).unwrap();
/// assert_eq!(period.label(), "01-2025");
/// assert_eq!(period.previous().label(), "12-2024");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a period, rejecting months outside 1..=12 and years outside
    /// 1..=9999.
    pub fn new(month: u32, year: i32) -> EngineResult<Self> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(EngineError::InvalidPeriod { month, year });
        }
        Ok(Self { year, month })
    }

    /// The month number (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The report label, `MM-YYYY`.
    pub fn label(&self) -> String {
        format!("{:02}-{}", self.month, self.year)
    }

    /// The immediately preceding month.
    pub fn previous(&self) -> Self {
        self.months_back(1)
    }

    /// The period `n` months before this one.
    pub fn months_back(&self, n: u32) -> Self {
        let index = i64::from(self.year) * 12 + i64::from(self.month) - 1 - i64::from(n);
        Self {
            // |index| / 12 stays well inside i32 for any u32 `n`
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// The `n` months preceding this one, oldest first.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_recon::models::Period;
    ///
    /// let labels: Vec<String> = Period::new(2, 2025)
    ///     .unwrap()
    ///     .trailing(3)
    ///     .iter()
    ///     .map(|p| p.label())
    ///     .collect();
    /// assert_eq!(labels, ["11-2024", "12-2024", "01-2025"]);
    /// ```
    pub fn trailing(&self, n: u32) -> Vec<Self> {
        (1..=n).rev().map(|back| self.months_back(back)).collect()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{}", self.month, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(month: u32, year: i32) -> Period {
        Period::new(month, year).unwrap()
    }

    #[test]
    fn test_rejects_month_zero_and_thirteen() {
        assert!(matches!(
            Period::new(0, 2025),
            Err(EngineError::InvalidPeriod { month: 0, year: 2025 })
        ));
        assert!(Period::new(13, 2025).is_err());
    }

    #[test]
    fn test_rejects_years_outside_calendar_range() {
        assert!(matches!(
            Period::new(3, i32::MAX),
            Err(EngineError::InvalidPeriod { month: 3, year: i32::MAX })
        ));
        assert!(Period::new(3, 0).is_err());
        assert!(Period::new(3, -2025).is_err());
        assert!(Period::new(12, 9999).is_ok());
        assert!(Period::new(1, 1).is_ok());
    }

    #[test]
    fn test_months_back_far_past_does_not_overflow() {
        let p = period(1, 1).months_back(u32::MAX);
        assert!(p.year() < 0);
        assert!((1..=12).contains(&p.month()));
    }

    #[test]
    fn test_previous_within_year() {
        assert_eq!(period(6, 2025).previous(), period(5, 2025));
    }

    #[test]
    fn test_previous_wraps_january() {
        assert_eq!(period(1, 2025).previous(), period(12, 2024));
    }

    #[test]
    fn test_months_back_spans_years() {
        assert_eq!(period(3, 2025).months_back(15), period(12, 2023));
    }

    #[test]
    fn test_trailing_six_is_oldest_first() {
        let window = period(3, 2025).trailing(6);
        assert_eq!(window.len(), 6);
        assert_eq!(window[0], period(9, 2024));
        assert_eq!(window[5], period(2, 2025));
    }

    #[test]
    fn test_trailing_zero_is_empty() {
        assert!(period(3, 2025).trailing(0).is_empty());
    }

    #[test]
    fn test_label_and_display_agree() {
        let p = period(9, 2024);
        assert_eq!(p.label(), "09-2024");
        assert_eq!(p.to_string(), p.label());
    }

    #[test]
    fn test_ordering_is_chronological() {
        assert!(period(12, 2024) < period(1, 2025));
    }
}
