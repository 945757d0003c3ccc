//! Application state for the reconciliation API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::reconciliation::Reconciler;

/// Shared application state.
///
/// Holds the reconciler, which owns the configuration, the compiled remark
/// catalogue and the period store.
#[derive(Clone)]
pub struct AppState {
    reconciler: Arc<Reconciler>,
}

impl AppState {
    /// Creates a new application state around a reconciler.
    pub fn new(reconciler: Reconciler) -> Self {
        Self {
            reconciler: Arc::new(reconciler),
        }
    }

    /// Returns a shared handle to the reconciler.
    pub fn reconciler(&self) -> Arc<Reconciler> {
        Arc::clone(&self.reconciler)
    }
}
