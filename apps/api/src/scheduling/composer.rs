//! Builds the generation context and the workflow inputs derived from it.

use serde_json::json;

use crate::scheduling::calendar::TargetMonth;
use crate::scheduling::models::{BusinessDay, Employee, LeaveRequest, ShiftPattern};
use crate::scheduling::remap::IdMap;
use crate::workflow_client::WorkflowInputs;

/// Heading of the calendar block: "business days (only these dates may be used)".
pub const CALENDAR_HEADING: &str = "営業日一覧（この日付のみ使用可能）:";

/// Everything one generation run sends to the workflow. Immutable once built.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub target_month: TargetMonth,
    pub business_days: Vec<BusinessDay>,
    pub employees: Vec<Employee>,
    pub leave_requests: Vec<LeaveRequest>,
    pub shift_patterns: Vec<ShiftPattern>,
    pub constraints: String,
}

impl GenerationContext {
    /// Placeholder table for employees, in the order they are sent.
    pub fn employee_ids(&self) -> IdMap {
        IdMap::from_ids(self.employees.iter().map(|e| e.id))
    }

    /// Placeholder table for shift patterns, in the order they are sent.
    pub fn pattern_ids(&self) -> IdMap {
        IdMap::from_ids(self.shift_patterns.iter().map(|p| p.id))
    }

    /// Plain newline-joined dates under a heading. Plain text keeps the
    /// generator from reinterpreting structured calendar fields.
    pub fn calendar_text(&self) -> String {
        let dates: Vec<String> = self
            .business_days
            .iter()
            .map(|d| d.date.format("%Y-%m-%d").to_string())
            .collect();
        format!("{CALENDAR_HEADING}\n{}", dates.join("\n"))
    }

    pub fn to_inputs(&self) -> Result<WorkflowInputs, serde_json::Error> {
        let employees = self
            .employees
            .iter()
            .enumerate()
            .map(|(index, e)| {
                json!({
                    "id": index + 1,
                    "uuid": e.id,
                    "name": e.name,
                    "employment_type": e.employment_type,
                    "job_type": e.job_type,
                    "available_days": e.available_days,
                    "max_days_per_week": e.max_days_per_week,
                    "max_hours_per_month": e.max_hours_per_month,
                    "max_hours_per_week": e.max_hours_per_week,
                })
            })
            .collect::<Vec<_>>();

        let shift_patterns = self
            .shift_patterns
            .iter()
            .enumerate()
            .map(|(index, p)| {
                json!({
                    "id": index + 1,
                    "uuid": p.id,
                    "name": p.name,
                    "symbol": p.symbol,
                    "start_time": p.start_time,
                    "end_time": p.end_time,
                    "working_hours": p.hours(),
                    "required_staff": p.required_staff,
                })
            })
            .collect::<Vec<_>>();

        Ok(WorkflowInputs {
            target_month: self.target_month.to_string(),
            calendar: self.calendar_text(),
            employees: serde_json::to_string_pretty(&employees)?,
            leave_requests: serde_json::to_string_pretty(&self.leave_requests)?,
            shift_patterns: serde_json::to_string_pretty(&shift_patterns)?,
            constraints: self.constraints.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::calendar::build_business_calendar;
    use serde_json::Value;
    use uuid::Uuid;

    fn context() -> GenerationContext {
        let month = TargetMonth {
            year: 2025,
            month: 8,
        };
        GenerationContext {
            target_month: month,
            business_days: build_business_calendar(month, &[0, 3]),
            employees: vec![Employee {
                id: Uuid::new_v4(),
                name: "田中".to_string(),
                employment_type: Some("常勤".to_string()),
                job_type: None,
                available_days: Some(vec!["月".to_string(), "火".to_string()]),
                max_days_per_week: 4,
                max_hours_per_month: 140.0,
                max_hours_per_week: None,
            }],
            leave_requests: vec![LeaveRequest {
                id: "leave-1".to_string(),
                employee_id: "1".to_string(),
                date: Some("2025-08-12".to_string()),
                start_date: None,
                end_date: None,
                leave_type: Some("希望休".to_string()),
                reason: None,
                status: Some("承認".to_string()),
            }],
            shift_patterns: vec![ShiftPattern {
                id: Uuid::new_v4(),
                name: "常勤平日".to_string(),
                symbol: Some("○".to_string()),
                start_time: Some("09:00".to_string()),
                end_time: Some("18:00".to_string()),
                work_minutes: Some(480),
                working_hours: None,
                break_minutes: Some(60),
                required_staff: Some(2),
            }],
            constraints: "水曜と日曜は休診".to_string(),
        }
    }

    #[test]
    fn test_calendar_text_is_plain_dates() {
        let text = context().calendar_text();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CALENDAR_HEADING));
        assert_eq!(lines.next(), Some("2025-08-01"));
        assert_eq!(text.lines().count(), 1 + 22);
        assert!(!text.contains("2025-08-06"));
    }

    #[test]
    fn test_inputs_annotate_placeholders_and_real_ids() {
        let ctx = context();
        let inputs = ctx.to_inputs().unwrap();

        assert_eq!(inputs.target_month, "2025-08");
        assert_eq!(inputs.constraints, "水曜と日曜は休診");

        let employees: Value = serde_json::from_str(&inputs.employees).unwrap();
        assert_eq!(employees[0]["id"], 1);
        assert_eq!(employees[0]["uuid"], ctx.employees[0].id.to_string());
        assert_eq!(employees[0]["max_days_per_week"], 4);

        let patterns: Value = serde_json::from_str(&inputs.shift_patterns).unwrap();
        assert_eq!(patterns[0]["id"], 1);
        assert_eq!(patterns[0]["uuid"], ctx.shift_patterns[0].id.to_string());
        assert_eq!(patterns[0]["working_hours"], 8.0);

        let leave: Value = serde_json::from_str(&inputs.leave_requests).unwrap();
        assert_eq!(leave[0]["date"], "2025-08-12");
        assert!(leave[0].get("start_date").is_none());

        // Pretty-printed blocks, not single-line JSON.
        assert!(inputs.employees.contains('\n'));
    }

    #[test]
    fn test_id_maps_follow_list_order() {
        let ctx = context();
        assert_eq!(ctx.employee_ids().resolve("1"), Some(ctx.employees[0].id));
        assert_eq!(ctx.pattern_ids().resolve("1"), Some(ctx.shift_patterns[0].id));
        assert_eq!(ctx.pattern_ids().resolve("2"), None);
    }
}
