//! HTTP request handlers for the reconciliation API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::summary::ReportSummary;

use super::request::ReconcileRequest;
use super::response::{ApiError, ApiErrorResponse, ReconcileResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/reconcile", post(reconcile_handler))
        .with_state(state)
}

/// Handler for POST /reconcile endpoint.
///
/// Reconciles the submitted month against the stored history and returns the
/// processed records, the report and its summary.
async fn reconcile_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReconcileRequest>, JsonRejection>,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing reconciliation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error,
            }
            .into_response();
        }
    };

    let period = match request.period() {
        Ok(period) => period,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Invalid period"
            );
            return ApiErrorResponse::from(err).into_response();
        }
    };

    let ReconcileRequest {
        company, records, ..
    } = request;
    let record_count = records.len();
    let reconciler = state.reconciler();
    let task_company = company.clone();

    let result = tokio::task::spawn_blocking(move || {
        reconciler.reconcile(&task_company, period, records)
    })
    .await;

    match result {
        Ok(Ok(outcome)) => {
            info!(
                correlation_id = %correlation_id,
                company = %company,
                period = %period,
                records = record_count,
                automatic = outcome.report.automatic_count,
                flagged = outcome.report.flagged_count,
                "Reconciliation request completed"
            );
            let summary = ReportSummary::from_report(&outcome.report);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(ReconcileResponse {
                    records: outcome.records,
                    report: outcome.report,
                    summary,
                }),
            )
                .into_response()
        }
        Ok(Err(err)) => {
            warn!(
                correlation_id = %correlation_id,
                company = %company,
                error = %err,
                "Reconciliation failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
        Err(join_error) => {
            warn!(
                correlation_id = %correlation_id,
                error = %join_error,
                "Reconciliation task aborted"
            );
            ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::internal("Reconciliation task aborted"),
            }
            .into_response()
        }
    }
}
