//! Payroll Reconciliation Engine
//!
//! This crate reconciles a company's monthly payroll records against prior
//! months: it interprets free-text remarks, corrects digit-shift entry errors,
//! prorates partial months, flags unexplained month-over-month changes and
//! summarises multi-month trends.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod reconciliation;
pub mod summary;
