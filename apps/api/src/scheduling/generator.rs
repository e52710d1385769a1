//! Shift generation: orchestrates the full pipeline for one request.
//!
//! Flow: closed weekdays → business calendar → compose context →
//!       workflow call (streamed) → extract/recover → remap ids →
//!       business rules → workload report.
//!
//! Only configuration, upstream and transport failures abort the request.
//! Everything after the workflow call degrades into a smaller result with
//! warnings instead.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::scheduling::calendar::{build_business_calendar, TargetMonth};
use crate::scheduling::composer::GenerationContext;
use crate::scheduling::constraints::extract_closed_weekdays;
use crate::scheduling::extraction::{parse_generation_output, preview};
use crate::scheduling::models::{
    Employee, ExtractedPlan, LeaveRequest, ShiftPattern, ShiftSummary, ValidatedShift,
};
use crate::scheduling::remap::remap_shifts;
use crate::scheduling::validator::validate_shifts;
use crate::scheduling::workload::{summarize_workload, WorkloadEntry};
use crate::workflow_client::ShiftGenerator;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Request body for shift generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateShiftRequest {
    pub target_month: String,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub leave_requests: Vec<LeaveRequest>,
    #[serde(default)]
    pub shift_patterns: Vec<ShiftPattern>,
    #[serde(default)]
    pub constraints: String,
}

/// Validated schedule plus the diagnostics the caller needs to judge it.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedSchedule {
    pub shifts: Vec<ValidatedShift>,
    pub summary: ShiftSummary,
    pub workload: Vec<WorkloadEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_result: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Validates the request and builds the immutable context for one run.
pub fn build_context(request: GenerateShiftRequest) -> Result<GenerationContext, AppError> {
    let target_month = TargetMonth::parse(&request.target_month).ok_or_else(|| {
        AppError::Validation(format!(
            "target_month must be YYYY-MM, got '{}'",
            request.target_month
        ))
    })?;

    let closed_weekdays = extract_closed_weekdays(&request.constraints);
    info!("Detected closed days: {:?}", closed_weekdays);

    let business_days = build_business_calendar(target_month, &closed_weekdays);
    info!(
        "Business calendar generated: {} days for {}",
        business_days.len(),
        target_month
    );

    Ok(GenerationContext {
        target_month,
        business_days,
        employees: request.employees,
        leave_requests: request.leave_requests,
        shift_patterns: request.shift_patterns,
        constraints: request.constraints,
    })
}

/// Runs the whole pipeline against `generator`.
pub async fn generate_schedule(
    generator: &dyn ShiftGenerator,
    request: GenerateShiftRequest,
) -> Result<GeneratedSchedule, AppError> {
    generator.ensure_configured()?;

    let context = build_context(request)?;
    let inputs = context
        .to_inputs()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize inputs: {e}")))?;

    let text = generator.generate(&inputs).await?;
    info!(
        "Workflow text: {} chars, preview: {}",
        text.chars().count(),
        preview(&text, 500)
    );

    let extracted = parse_generation_output(&text);
    Ok(finalize(extracted, &context))
}

/// Remaps, validates and summarizes an extracted plan. Never fails.
pub fn finalize(extracted: ExtractedPlan, context: &GenerationContext) -> GeneratedSchedule {
    let ExtractedPlan {
        shifts,
        mut summary,
        raw_result,
    } = extracted;
    let proposed = shifts.len();

    let mapped = remap_shifts(shifts, &context.employee_ids(), &context.pattern_ids());
    let outcome = validate_shifts(mapped, &context.employees);

    let removed = proposed - outcome.accepted.len();
    if removed > 0 {
        summary.warnings.push(format!("{removed}件のシフトを除外しました"));
    }

    let workload = summarize_workload(
        &outcome.accepted,
        &context.employees,
        &context.shift_patterns,
    );
    for entry in workload.iter().filter(|w| w.exceeds_monthly_hours) {
        summary.warnings.push(format!(
            "{}の勤務時間が月上限を超えています ({}h / {}h)",
            entry.name, entry.total_hours, entry.max_hours_per_month
        ));
    }

    summary.total_shifts = outcome.accepted.len();
    info!(
        "Original shifts: {}, after validation: {} (removed {}, {} by business rules)",
        proposed,
        outcome.accepted.len(),
        removed,
        outcome.rejections.len()
    );

    GeneratedSchedule {
        shifts: outcome.accepted,
        summary,
        workload,
        raw_result,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
