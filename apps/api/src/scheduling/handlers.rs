//! Axum route handlers for the shift-generation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::scheduling::calendar::{build_business_calendar, TargetMonth};
use crate::scheduling::constraints::extract_closed_weekdays;
use crate::scheduling::generator::{generate_schedule, GenerateShiftRequest, GeneratedSchedule};
use crate::scheduling::models::BusinessDay;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Success envelope shared by every route.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BusinessCalendarRequest {
    pub target_month: String,
    #[serde(default)]
    pub constraints: String,
}

#[derive(Debug, Serialize)]
pub struct BusinessCalendarResponse {
    pub closed_weekdays: Vec<u32>,
    pub business_days: Vec<BusinessDay>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate-shift
///
/// Runs the full pipeline. Malformed bodies (including non-UUID employee or
/// pattern ids) are a 400 in the standard error envelope.
pub async fn handle_generate_shift(
    State(state): State<AppState>,
    body: Result<Json<GenerateShiftRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<GeneratedSchedule>>, AppError> {
    let Json(request) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    info!(
        "Generating shifts for {}: {} employees, {} patterns, {} leave requests",
        request.target_month,
        request.employees.len(),
        request.shift_patterns.len(),
        request.leave_requests.len()
    );

    let schedule = generate_schedule(state.generator.as_ref(), request).await?;
    Ok(ApiResponse::ok(schedule))
}

/// POST /api/business-calendar
///
/// Preview of the closed weekdays and business days a generation run would
/// use. Never calls the workflow service.
pub async fn handle_business_calendar(
    body: Result<Json<BusinessCalendarRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BusinessCalendarResponse>>, AppError> {
    let Json(request) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    let month = TargetMonth::parse(&request.target_month).ok_or_else(|| {
        AppError::Validation(format!(
            "target_month must be YYYY-MM, got '{}'",
            request.target_month
        ))
    })?;

    let closed_weekdays = extract_closed_weekdays(&request.constraints);
    let business_days = build_business_calendar(month, &closed_weekdays);

    Ok(ApiResponse::ok(BusinessCalendarResponse {
        closed_weekdays,
        business_days,
    }))
}
