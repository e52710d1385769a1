//! Business calendar for a target month.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};

use crate::scheduling::models::BusinessDay;

/// Weekday short names indexed by days-from-Sunday (0=日 .. 6=土).
pub const WEEKDAY_NAMES: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];

/// A `YYYY-MM` month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetMonth {
    pub year: i32,
    pub month: u32,
}

impl TargetMonth {
    /// Parses `YYYY-MM`. Returns `None` for anything else, including month 0 or 13.
    pub fn parse(raw: &str) -> Option<Self> {
        let (year, month) = raw.trim().split_once('-')?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return None;
        }
        let year = year.parse::<i32>().ok()?;
        let month = month.parse::<u32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { year, month })
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Last calendar day: the day before the 1st of the following month.
    pub fn last_day(&self) -> Option<NaiveDate> {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
    }
}

impl fmt::Display for TargetMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAY_NAMES[date.weekday().num_days_from_sunday() as usize]
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Every day of `month` whose weekday (0=Sunday) is not in `closed_weekdays`.
pub fn build_business_calendar(month: TargetMonth, closed_weekdays: &[u32]) -> Vec<BusinessDay> {
    let (Some(first), Some(last)) = (month.first_day(), month.last_day()) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|date| *date <= last)
        .filter(|date| !closed_weekdays.contains(&date.weekday().num_days_from_sunday()))
        .map(|date| BusinessDay {
            date,
            weekday_name: weekday_name(date),
            day_number: date.day(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> TargetMonth {
        TargetMonth { year, month }
    }

    #[test]
    fn test_parse_target_month() {
        assert_eq!(TargetMonth::parse("2025-08"), Some(month(2025, 8)));
        assert_eq!(TargetMonth::parse(" 2025-12 "), Some(month(2025, 12)));
        assert_eq!(TargetMonth::parse("2025-13"), None);
        assert_eq!(TargetMonth::parse("2025-00"), None);
        assert_eq!(TargetMonth::parse("25-08"), None);
        assert_eq!(TargetMonth::parse("2025/08"), None);
        assert_eq!(TargetMonth::parse(""), None);
    }

    #[test]
    fn test_display_pads_month() {
        assert_eq!(month(2025, 3).to_string(), "2025-03");
    }

    #[test]
    fn test_last_day_handles_december_and_leap_years() {
        assert_eq!(month(2025, 12).last_day(), NaiveDate::from_ymd_opt(2025, 12, 31));
        assert_eq!(month(2024, 2).last_day(), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(month(2025, 2).last_day(), NaiveDate::from_ymd_opt(2025, 2, 28));
        assert_eq!(month(2025, 9).last_day(), NaiveDate::from_ymd_opt(2025, 9, 30));
    }

    #[test]
    fn test_full_month_without_closures() {
        let days = build_business_calendar(month(2025, 8), &[]);
        assert_eq!(days.len(), 31);
        assert_eq!(days[0].day_number, 1);
        assert_eq!(days[0].weekday_name, "金");
        assert_eq!(days[30].date, NaiveDate::from_ymd_opt(2025, 8, 31).unwrap());
    }

    #[test]
    fn test_closed_wednesdays_and_sundays_are_excluded() {
        // August 2025: four Wednesdays, five Sundays.
        let days = build_business_calendar(month(2025, 8), &[0, 3]);
        assert_eq!(days.len(), 31 - 4 - 5);
        assert!(days
            .iter()
            .all(|d| d.weekday_name != "日" && d.weekday_name != "水"));
    }

    #[test]
    fn test_length_matches_count_for_every_month_of_a_year() {
        let closed = [0, 6];
        for m in 1..=12 {
            let target = month(2024, m);
            let first = target.first_day().unwrap();
            let last = target.last_day().unwrap();
            let expected = first
                .iter_days()
                .take_while(|d| *d <= last)
                .filter(|d| !closed.contains(&d.weekday().num_days_from_sunday()))
                .count();
            assert_eq!(build_business_calendar(target, &closed).len(), expected);
        }
    }

    #[test]
    fn test_week_start_is_monday() {
        let sunday = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();
        assert_eq!(week_start(sunday), monday);
        assert_eq!(week_start(monday), monday);
        // Week spanning a month boundary.
        let friday = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        assert_eq!(week_start(friday), NaiveDate::from_ymd_opt(2025, 7, 28).unwrap());
    }

    #[test]
    fn test_weekday_name() {
        assert_eq!(weekday_name(NaiveDate::from_ymd_opt(2025, 8, 6).unwrap()), "水");
        assert_eq!(weekday_name(NaiveDate::from_ymd_opt(2025, 8, 10).unwrap()), "日");
    }
}
