//! HTTP API module for the payroll reconciliation engine.
//!
//! This module provides the REST endpoint that reconciles a month of payroll
//! records against the stored history.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::ReconcileRequest;
pub use response::{ApiError, ReconcileResponse};
pub use state::AppState;
