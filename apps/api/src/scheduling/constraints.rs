//! Closed-weekday detection in free-text constraints.
//!
//! This is a co-occurrence heuristic, not a grammar: a weekday counts as closed
//! when its name and the closure keyword both appear anywhere in the text.
//! `水曜日は休診` therefore also marks Sunday closed, because `日` is present.

/// Literal closure keyword ("clinic closed").
pub const CLOSURE_KEYWORD: &str = "休診";

/// Weekday display names (full and abbreviated) and their day-from-Sunday number.
const WEEKDAY_TABLE: &[(&str, u32)] = &[
    ("日曜", 0),
    ("日", 0),
    ("月曜", 1),
    ("月", 1),
    ("火曜", 2),
    ("火", 2),
    ("水曜", 3),
    ("水", 3),
    ("木曜", 4),
    ("木", 4),
    ("金曜", 5),
    ("金", 5),
    ("土曜", 6),
    ("土", 6),
];

/// Returns the closed weekday numbers in table order, without duplicates.
pub fn extract_closed_weekdays(constraints: &str) -> Vec<u32> {
    if !constraints.contains(CLOSURE_KEYWORD) {
        return Vec::new();
    }

    let mut closed = Vec::new();
    for &(name, weekday) in WEEKDAY_TABLE {
        if constraints.contains(name) && !closed.contains(&weekday) {
            closed.push(weekday);
        }
    }
    closed
}
