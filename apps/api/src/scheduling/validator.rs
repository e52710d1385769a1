//! Business-rule filter over remapped shifts.
//!
//! Three passes, each logged with its removal count:
//! 1. calendar validity of the date,
//! 2. the employee's weekday availability,
//! 3. the employee's weekly quota (Monday-start weeks, first-seen wins).
//!
//! Rejections are logged and collected, never raised.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::scheduling::calendar::{week_start, weekday_name};
use crate::scheduling::models::{Employee, MappedShift, ValidatedShift};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    InvalidDate,
    UnknownEmployee,
    UnavailableWeekday,
    QuotaExceeded,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RejectionReason::InvalidDate => "invalid date",
            RejectionReason::UnknownEmployee => "unknown employee",
            RejectionReason::UnavailableWeekday => "unavailable weekday",
            RejectionReason::QuotaExceeded => "weekly quota exceeded",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub employee_id: Uuid,
    pub date: String,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub accepted: Vec<ValidatedShift>,
    pub rejections: Vec<Rejection>,
}

/// Parses `YYYY-MM-DD` by components and rejects dates that do not exist,
/// such as `2025-09-31` or `2025-02-29`.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().split('-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Applies every rule in order and returns the survivors in input order.
pub fn validate_shifts(shifts: Vec<MappedShift>, employees: &[Employee]) -> ValidationOutcome {
    let roster: HashMap<Uuid, &Employee> = employees.iter().map(|e| (e.id, e)).collect();
    let mut rejections = Vec::new();
    let mut reject = |shift: &MappedShift, reason: RejectionReason| {
        let name = roster
            .get(&shift.employee_id)
            .map(|e| e.name.as_str())
            .unwrap_or("unknown");
        warn!("Removed shift for {} on {}: {}", name, shift.date, reason);
        rejections.push(Rejection {
            employee_id: shift.employee_id,
            date: shift.date.clone(),
            reason,
        });
    };
    let proposed = shifts.len();

    // 1. Date validity
    let dated: Vec<(MappedShift, NaiveDate)> = shifts
        .into_iter()
        .filter_map(|shift| match parse_calendar_date(&shift.date) {
            Some(date) => Some((shift, date)),
            None => {
                reject(&shift, RejectionReason::InvalidDate);
                None
            }
        })
        .collect();
    info!("Date check: removed {}", proposed - dated.len());

    // 2. Weekday availability
    let before = dated.len();
    let available: Vec<(MappedShift, NaiveDate, &Employee)> = dated
        .into_iter()
        .filter_map(|(shift, date)| match roster.get(&shift.employee_id) {
            None => {
                reject(&shift, RejectionReason::UnknownEmployee);
                None
            }
            Some(employee) if !employee.is_available_on(weekday_name(date)) => {
                reject(&shift, RejectionReason::UnavailableWeekday);
                None
            }
            Some(employee) => Some((shift, date, *employee)),
        })
        .collect();
    info!("Availability check: removed {}", before - available.len());

    // 3. Weekly quota, in input order
    let before = available.len();
    let mut weekly_counts: HashMap<(Uuid, NaiveDate), u32> = HashMap::new();
    let mut accepted = Vec::with_capacity(available.len());
    for (shift, date, employee) in available {
        let count = weekly_counts
            .entry((employee.id, week_start(date)))
            .or_insert(0);
        if *count >= employee.max_days_per_week {
            reject(&shift, RejectionReason::QuotaExceeded);
            continue;
        }
        *count += 1;
        accepted.push(ValidatedShift {
            employee_id: shift.employee_id,
            date,
            shift_pattern_id: shift.shift_pattern_id,
            notes: shift.notes,
        });
    }
    info!("Weekly quota check: removed {}", before - accepted.len());

    info!(
        "After validation: {} of {} shifts kept",
        accepted.len(),
        proposed
    );

    ValidationOutcome {
        accepted,
        rejections,
    }
}
