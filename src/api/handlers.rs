//! HTTP request handlers for the crew pay API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{RosterContext, allocate_by_duty_type, process_roster, recompute_month};
use crate::error::EngineError;
use crate::models::BucketMonth;
use crate::replacement::{DutyRepository, ReplacementRequest, ReplacementWorkflow};

use super::request::{BreakdownRequest, PayrollQuery, ReplaceRosterRequest, RosterRequest};
use super::response::{
    ApiError, ApiErrorResponse, BreakdownResponse, PayrollResponse, RosterResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/roster/process", post(process_roster_handler))
        .route("/payroll/breakdown", post(breakdown_handler))
        .route(
            "/users/:user_id/rosters/:year/:month",
            put(replace_roster_handler),
        )
        .route("/users/:user_id/payroll/:year/:month", get(payroll_handler))
        .with_state(state)
}

fn json_ok<T: Serialize>(body: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Maps a JSON body rejection to an API error.
fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> ApiErrorResponse {
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
    ApiErrorResponse::new(StatusCode::BAD_REQUEST, error)
}

/// Validates path parameters into a user id and bucket.
fn month_path(
    correlation_id: Uuid,
    path: Result<Path<(String, i32, u32)>, PathRejection>,
) -> Result<(String, BucketMonth), ApiErrorResponse> {
    let Path((user_id, year, month)) = path.map_err(|rejection| {
        warn!(correlation_id = %correlation_id, error = %rejection, "Invalid path");
        ApiErrorResponse::new(
            StatusCode::BAD_REQUEST,
            ApiError::validation_error(rejection.body_text()),
        )
    })?;
    let bucket = BucketMonth::new(month, year).ok_or_else(|| {
        warn!(correlation_id = %correlation_id, month, year, "Invalid payroll month");
        ApiErrorResponse::new(StatusCode::BAD_REQUEST, ApiError::invalid_month(month, year))
    })?;
    Ok((user_id, bucket))
}

/// Handler for POST /roster/process.
///
/// Runs the pipeline over the submitted rows and returns the outcome with
/// totals for every bucket present.
async fn process_roster_handler(
    State(state): State<AppState>,
    payload: Result<Json<RosterRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing roster request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection).into_response(),
    };

    let config = state.config().config();
    let ctx = request.context();
    let start_time = Instant::now();
    let outcome = process_roster(&request.rows, &ctx, config);

    let totals: Result<Vec<_>, EngineError> = outcome
        .buckets()
        .into_iter()
        .map(|bucket| outcome.totals_for(&ctx, bucket, config))
        .collect();

    match totals {
        Ok(totals) => {
            info!(
                correlation_id = %correlation_id,
                user_id = %ctx.user_id,
                rows = request.rows.len(),
                duties = outcome.duties.len(),
                rejected = outcome.rejected.len(),
                pairs = outcome.pairs.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Roster processed"
            );
            json_ok(RosterResponse { outcome, totals })
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Totals calculation failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Handler for POST /payroll/breakdown.
///
/// Returns the month's totals with the display-only allocation beside them.
async fn breakdown_handler(
    State(state): State<AppState>,
    payload: Result<Json<BreakdownRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing breakdown request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection).into_response(),
    };
    let Some(bucket) = BucketMonth::new(request.month, request.year) else {
        return ApiErrorResponse::new(
            StatusCode::BAD_REQUEST,
            ApiError::invalid_month(request.month, request.year),
        )
        .into_response();
    };

    let config = state.config().config();
    let ctx = RosterContext::new(request.user_id.clone(), request.position)
        .with_bucket_override(bucket);
    let outcome = process_roster(&request.rows, &ctx, config);

    match outcome.totals_for(&ctx, bucket, config) {
        Ok(totals) => {
            let allocation = allocate_by_duty_type(&totals, &outcome.duties, &outcome.pairs);
            info!(
                correlation_id = %correlation_id,
                user_id = %ctx.user_id,
                bucket = %bucket,
                total_salary = %totals.total_salary,
                "Breakdown calculated"
            );
            json_ok(BreakdownResponse {
                totals,
                allocation,
                diagnostics: outcome.diagnostics,
            })
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Breakdown failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Handler for PUT /users/:user_id/rosters/:year/:month.
///
/// Replaces the stored month with the submitted roster.
async fn replace_roster_handler(
    State(state): State<AppState>,
    path: Result<Path<(String, i32, u32)>, PathRejection>,
    payload: Result<Json<ReplaceRosterRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing roster replacement");

    let (user_id, bucket) = match month_path(correlation_id, path) {
        Ok(parts) => parts,
        Err(err) => return err.into_response(),
    };
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection).into_response(),
    };

    let mut workflow = ReplacementWorkflow::new(state.repository(), state.config().config());
    let result = workflow
        .replace_month(ReplacementRequest {
            user_id: user_id.clone(),
            position: request.position,
            bucket,
            rows: request.rows,
        })
        .await;

    match result {
        Ok(receipt) => {
            info!(
                correlation_id = %correlation_id,
                user_id = %user_id,
                bucket = %bucket,
                deleted = receipt.deleted_count,
                saved = receipt.saved_count,
                "Roster replaced"
            );
            json_ok(receipt)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                user_id = %user_id,
                bucket = %bucket,
                critical = err.is_critical(),
                error = %err,
                "Roster replacement failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Handler for GET /users/:user_id/payroll/:year/:month.
///
/// Recomputes the month from stored duties. The neighbouring months are
/// loaded as well so that layovers crossing a month boundary pair up.
async fn payroll_handler(
    State(state): State<AppState>,
    path: Result<Path<(String, i32, u32)>, PathRejection>,
    query: Result<Query<PayrollQuery>, QueryRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll request");

    let (user_id, bucket) = match month_path(correlation_id, path) {
        Ok(parts) => parts,
        Err(err) => return err.into_response(),
    };
    let position = match query {
        Ok(Query(q)) => q.position,
        Err(rejection) => {
            return ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(rejection.body_text()),
            )
            .into_response();
        }
    };

    let stored = match state.repository().list_window(&user_id, bucket).await {
        Ok(stored) => stored,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Could not load stored duties"
            );
            return ApiErrorResponse::from(err).into_response();
        }
    };

    let month = match recompute_month(&user_id, position, bucket, &stored, state.config().config())
    {
        Ok(month) => month,
        Err(err) => return ApiErrorResponse::from(err).into_response(),
    };

    info!(
        correlation_id = %correlation_id,
        user_id = %user_id,
        bucket = %bucket,
        total_salary = %month.totals.total_salary,
        "Payroll recomputed"
    );

    json_ok(PayrollResponse {
        totals: month.totals,
        duties: month.duties,
        pairs: month.pairs,
        unpaired: month.unpaired,
    })
}
