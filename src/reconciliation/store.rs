//! Period stores supplying prior months to the reconciler.
//!
//! The reconciler never decides where payroll history lives: it asks a
//! [`PeriodStore`] for one company's records for one month. `Ok(None)` and an
//! empty set both mean "no data for that month".

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollRecord, Period};

/// Source of historical payroll record sets.
pub trait PeriodStore: Send + Sync {
    /// Loads a company's records for one period.
    ///
    /// # Errors
    ///
    /// Implementations return `StoreError` when the data exists but cannot be
    /// read.
    fn load(&self, company: &str, period: Period) -> EngineResult<Option<Vec<PayrollRecord>>>;
}

/// A store backed by a map, for fixtures and callers that already hold their
/// history in memory.
///
/// # Example
///
/// ```
/// use payroll_recon::models::{PayrollRecord, Period};
/// use payroll_recon::reconciliation::{InMemoryPeriodStore, PeriodStore};
///
/// let period = Period::new(2, 2025).unwrap();
/// let store = InMemoryPeriodStore::new()
///     .with_period("ACME", period, vec![PayrollRecord::new().with("matricule", "M001")]);
///
/// assert_eq!(store.load("ACME", period).unwrap().unwrap().len(), 1);
/// assert!(store.load("ACME", period.previous()).unwrap().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryPeriodStore {
    periods: HashMap<(String, Period), Vec<PayrollRecord>>,
}

impl InMemoryPeriodStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a period, replacing any previous set.
    pub fn insert(&mut self, company: &str, period: Period, records: Vec<PayrollRecord>) {
        self.periods.insert((company.to_string(), period), records);
    }

    /// Stores a period, returning the store for chaining.
    pub fn with_period(mut self, company: &str, period: Period, records: Vec<PayrollRecord>) -> Self {
        self.insert(company, period, records);
        self
    }
}

impl PeriodStore for InMemoryPeriodStore {
    fn load(&self, company: &str, period: Period) -> EngineResult<Option<Vec<PayrollRecord>>> {
        Ok(self.periods.get(&(company.to_string(), period)).cloned())
    }
}

/// A store reading JSON arrays of records from
/// `<root>/<company>/<YYYY>-<MM>.json`.
///
/// # Directory Structure
///
/// ```text
/// history/
/// └── ACME/
///     ├── 2025-01.json
///     └── 2025-02.json
/// ```
#[derive(Debug, Clone)]
pub struct JsonDirectoryStore {
    root: PathBuf,
}

impl JsonDirectoryStore {
    /// Creates a store rooted at `root`.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file holding a company's records for a period.
    pub fn period_path(&self, company: &str, period: Period) -> PathBuf {
        self.root
            .join(company)
            .join(format!("{}-{:02}.json", period.year(), period.month()))
    }
}

impl PeriodStore for JsonDirectoryStore {
    fn load(&self, company: &str, period: Period) -> EngineResult<Option<Vec<PayrollRecord>>> {
        let store_error = |message: String| EngineError::StoreError {
            company: company.to_string(),
            period: period.label(),
            message,
        };

        if company.is_empty()
            || company == "."
            || company == ".."
            || company.contains(['/', '\\'])
        {
            return Err(store_error("invalid company name".to_string()));
        }

        let path = self.period_path(company, period);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No stored period");
                return Ok(None);
            }
            Err(e) => return Err(store_error(format!("{}: {}", path.display(), e))),
        };

        let records: Vec<PayrollRecord> = serde_json::from_str(&content)
            .map_err(|e| store_error(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), records = records.len(), "Loaded stored period");
        Ok(Some(records))
    }
}
