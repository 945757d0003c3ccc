//! Remark classification.
//!
//! Payroll operators describe partial months, raises and bonuses in a free-text
//! remark column. This module turns that text into a [`RemarkClassification`]
//! by running an ordered catalogue of regular expressions over the lower-cased
//! remark.

use regex::Regex;
use tracing::debug;

use crate::config::{RemarkRule, RuleCategory, default_remark_rules};
use crate::error::{EngineError, EngineResult};
use crate::models::{CaseType, RemarkClassification, RemarkDetails};

/// Case categories in priority order. Bonus and proration are matched
/// independently of these.
const CASE_PRIORITY: [(RuleCategory, CaseType); 3] = [
    (RuleCategory::NewHire, CaseType::NewHire),
    (RuleCategory::Departure, CaseType::Departure),
    (RuleCategory::SalaryChange, CaseType::SalaryChange),
];

#[derive(Debug, Clone)]
struct CompiledRule {
    category: RuleCategory,
    regex: Regex,
}

/// A rule hit with the valid days it captured.
struct RuleMatch {
    day: Option<u32>,
    end_day: Option<u32>,
}

/// Classifies free-text remarks against a compiled rule catalogue.
///
/// # Example
///
/// ```
/// use payroll_recon::models::CaseType;
/// use payroll_recon::reconciliation::RemarkParser;
///
/// let parser = RemarkParser::default();
///
/// let hire = parser.parse(Some("Nouvelle embauche le 15"));
/// assert_eq!(hire.case_type, CaseType::NewHire);
/// assert_eq!(hire.details.day, Some(15));
///
/// let empty = parser.parse(None);
/// assert_eq!(empty.case_type, CaseType::None);
/// assert!(empty.details.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct RemarkParser {
    rules: Vec<CompiledRule>,
}

impl RemarkParser {
    /// Compiles a rule catalogue.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` for the first rule that is not a valid regex.
    pub fn new(rules: &[RemarkRule]) -> EngineResult<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                Regex::new(&rule.pattern)
                    .map(|regex| CompiledRule {
                        category: rule.category,
                        regex,
                    })
                    .map_err(|e| EngineError::InvalidPattern {
                        pattern: rule.pattern.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Classifies a remark. Empty or absent remarks yield `CaseType::None`
    /// with no details.
    pub fn parse(&self, remark: Option<&str>) -> RemarkClassification {
        let raw = match remark {
            Some(text) if !text.trim().is_empty() => text,
            _ => return RemarkClassification::none(),
        };

        let text = raw.to_lowercase();
        let mut case_type = CaseType::None;
        let mut details = RemarkDetails::default();

        for (category, case) in CASE_PRIORITY {
            if let Some(hit) = self.first_match(category, &text) {
                case_type = case;
                details.day = hit.day;
                break;
            }
        }

        if self.first_match(RuleCategory::Bonus, &text).is_some() {
            details.has_bonus = true;
            if case_type == CaseType::None {
                case_type = CaseType::Bonus;
            }
        }

        if let Some(hit) = self.first_match(RuleCategory::Prorate, &text) {
            details.prorate = true;
            details.prorate_day = hit.day;
            details.prorate_end_day = hit.end_day;
        }

        debug!(remark = raw, case_type = ?case_type, "Remark classified");

        RemarkClassification {
            case_type,
            details,
            raw: raw.to_string(),
        }
    }

    /// Returns the number of compiled rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn first_match(&self, category: RuleCategory, text: &str) -> Option<RuleMatch> {
        self.rules
            .iter()
            .filter(|rule| rule.category == category)
            .find_map(|rule| {
                let caps = rule.regex.captures(text)?;
                let day_of = |name: &str| {
                    caps.name(name)
                        .and_then(|m| m.as_str().parse::<u32>().ok())
                        .filter(|day| (1..=31).contains(day))
                };
                Some(RuleMatch {
                    day: day_of("day"),
                    end_day: day_of("end_day"),
                })
            })
    }
}

impl Default for RemarkParser {
    /// A parser over the built-in French payroll catalogue.
    fn default() -> Self {
        Self::new(&default_remark_rules()).expect("built-in remark rules are valid regexes")
    }
}
