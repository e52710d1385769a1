//! Record shapes shared by every stage of the shift-generation pipeline.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Input records (supplied by the record providers)
// ────────────────────────────────────────────────────────────────────────────

/// An employee as exposed to the generator. Unknown fields are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    /// Weekday short names the employee can work, e.g. `["月", "火"]`.
    /// Absent means no weekday restriction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_days: Option<Vec<String>>,
    pub max_days_per_week: u32,
    pub max_hours_per_month: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hours_per_week: Option<f64>,
}

impl Employee {
    /// Matches `月`, `月曜` and `月曜日` style entries against a weekday short name.
    /// An employee without an availability list can work any day.
    pub fn is_available_on(&self, weekday_name: &str) -> bool {
        match &self.available_days {
            Some(days) => days.iter().any(|day| day.trim().starts_with(weekday_name)),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: String,
    pub employee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftPattern {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_staff: Option<u32>,
}

impl ShiftPattern {
    /// Paid hours for one shift of this pattern.
    ///
    /// Preference order: `work_minutes`, `working_hours`, then the span between
    /// `start_time` and `end_time` minus `break_minutes`. Unknown is 0.
    pub fn hours(&self) -> f64 {
        if let Some(minutes) = self.work_minutes {
            return minutes as f64 / 60.0;
        }
        if let Some(hours) = self.working_hours {
            return hours;
        }
        let span = self
            .start_time
            .as_deref()
            .and_then(parse_clock)
            .zip(self.end_time.as_deref().and_then(parse_clock))
            .map(|(start, end)| (end - start).num_minutes())
            .unwrap_or(0);
        let worked = span - self.break_minutes.unwrap_or(0) as i64;
        worked.max(0) as f64 / 60.0
    }
}

fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline records
// ────────────────────────────────────────────────────────────────────────────

/// A calendar date within the target month that is not a closed weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessDay {
    pub date: NaiveDate,
    pub weekday_name: &'static str,
    pub day_number: u32,
}

/// A candidate assignment pulled out of the generator's text.
/// Identifiers are whatever the model wrote: placeholders or real ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposedShift {
    pub date: String,
    pub employee_id: String,
    pub shift_pattern_id: String,
    pub notes: String,
}

/// A proposed shift whose identifiers resolved to real records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedShift {
    pub date: String,
    pub employee_id: Uuid,
    pub shift_pattern_id: Uuid,
    pub notes: String,
}

/// Terminal output of the pipeline, handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedShift {
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub shift_pattern_id: Uuid,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShiftSummary {
    pub total_shifts: usize,
    pub warnings: Vec<String>,
}

/// What the extraction stage managed to read out of the generator text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedPlan {
    pub shifts: Vec<ProposedShift>,
    pub summary: ShiftSummary,
    /// Full generator text, attached only when nothing could be extracted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_result: Option<String>,
}
