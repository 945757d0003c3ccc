//! Error types for the payroll reconciliation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while reconciling a payroll batch.

use thiserror::Error;

/// The main error type for the reconciliation engine.
///
/// Per-employee failures never escape a batch run; they are logged and the
/// employee's original record is kept. The variants that do reach callers are
/// configuration errors, invalid periods and period store failures.
///
/// # Example
///
/// ```
/// use payroll_recon::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A remark rule pattern is not a valid regular expression.
    #[error("Invalid remark pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// The regex compiler's message.
        message: String,
    },

    /// A payroll period was out of range.
    #[error("Invalid period {month}/{year}")]
    InvalidPeriod {
        /// The month that was supplied.
        month: u32,
        /// The year that was supplied.
        year: i32,
    },

    /// A payroll record could not be processed.
    #[error("Invalid payroll record '{employee_id}': {message}")]
    InvalidRecord {
        /// The employee identifier, or an empty string when it is missing.
        employee_id: String,
        /// A description of what made the record invalid.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// The period data store failed to answer.
    #[error("Period store failed for '{company}' {period}: {message}")]
    StoreError {
        /// The company whose data was requested.
        company: String,
        /// The period label (MM-YYYY).
        period: String,
        /// A description of the store failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_invalid_pattern_displays_pattern() {
        let error = EngineError::InvalidPattern {
            pattern: "(embauche".to_string(),
            message: "unclosed group".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid remark pattern '(embauche': unclosed group"
        );
    }

    #[test]
    fn test_invalid_period_displays_month_and_year() {
        let error = EngineError::InvalidPeriod {
            month: 13,
            year: 2025,
        };
        assert_eq!(error.to_string(), "Invalid period 13/2025");
    }

    #[test]
    fn test_invalid_record_displays_id_and_message() {
        let error = EngineError::InvalidRecord {
            employee_id: "M042".to_string(),
            message: "missing employee identifier".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid payroll record 'M042': missing employee identifier"
        );
    }

    #[test]
    fn test_store_error_displays_company_and_period() {
        let error = EngineError::StoreError {
            company: "ACME".to_string(),
            period: "02-2025".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Period store failed for 'ACME' 02-2025: connection refused"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_store_error() -> EngineResult<()> {
            Err(EngineError::StoreError {
                company: "ACME".to_string(),
                period: "01-2025".to_string(),
                message: "offline".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_store_error()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
