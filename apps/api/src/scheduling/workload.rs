//! Per-employee workload over a validated schedule. Advisory only.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::scheduling::models::{Employee, ShiftPattern, ValidatedShift};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadEntry {
    pub employee_id: Uuid,
    pub name: String,
    pub total_days: usize,
    pub total_hours: f64,
    pub max_days_per_week: u32,
    pub max_hours_per_month: f64,
    pub exceeds_monthly_hours: bool,
}

/// One entry per employee, in roster order. Unknown patterns count 0 hours.
pub fn summarize_workload(
    shifts: &[ValidatedShift],
    employees: &[Employee],
    patterns: &[ShiftPattern],
) -> Vec<WorkloadEntry> {
    let hours_by_pattern: HashMap<Uuid, f64> =
        patterns.iter().map(|p| (p.id, p.hours())).collect();

    employees
        .iter()
        .map(|employee| {
            let own: Vec<&ValidatedShift> = shifts
                .iter()
                .filter(|s| s.employee_id == employee.id)
                .collect();
            let hours: f64 = own
                .iter()
                .map(|s| hours_by_pattern.get(&s.shift_pattern_id).copied().unwrap_or(0.0))
                .sum();
            let total_hours = (hours * 10.0).round() / 10.0;

            WorkloadEntry {
                employee_id: employee.id,
                name: employee.name.clone(),
                total_days: own.len(),
                total_hours,
                max_days_per_week: employee.max_days_per_week,
                max_hours_per_month: employee.max_hours_per_month,
                exceeds_monthly_hours: total_hours > employee.max_hours_per_month,
            }
        })
        .collect()
}
