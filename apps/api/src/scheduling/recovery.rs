//! Tolerant fragment scanner for generator output that is not valid JSON.
//!
//! The scanner walks the text for brace-free `{ ... }` spans and, inside each
//! span, looks for the three shift fields in any order. A span yields a shift
//! only when all three fields are present and the date is `YYYY-MM-DD`.

use crate::scheduling::models::ProposedShift;

/// Recovers every well-formed shift fragment in document order.
pub fn recover_shifts(text: &str) -> Vec<ProposedShift> {
    object_fragments(text)
        .into_iter()
        .filter_map(scan_fragment)
        .collect()
}

/// Innermost `{...}` spans: an opening brace restarts the span, a closing
/// brace ends it.
fn object_fragments(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut open: Option<usize> = None;

    for (index, c) in text.char_indices() {
        match c {
            '{' => open = Some(index),
            '}' => {
                if let Some(start) = open.take() {
                    fragments.push(&text[start..=index]);
                }
            }
            _ => {}
        }
    }
    fragments
}

fn scan_fragment(fragment: &str) -> Option<ProposedShift> {
    let employee_id = field_value(fragment, "employee_id")?;
    let date = field_value(fragment, "date")?;
    let shift_pattern_id = field_value(fragment, "shift_pattern_id")?;

    if !is_iso_date_shape(&date) {
        return None;
    }

    Some(ProposedShift {
        date,
        employee_id,
        shift_pattern_id,
        notes: String::new(),
    })
}

#[derive(Debug, Clone, Copy)]
enum ValueScan {
    SeekColon,
    SeekValue,
    InValue { quoted: bool },
}

/// First usable value of `"key"` in the fragment.
fn field_value(fragment: &str, key: &str) -> Option<String> {
    let needle = format!("\"{key}\"");
    let mut from = 0;
    while let Some(offset) = fragment[from..].find(&needle) {
        let after = from + offset + needle.len();
        if let Some(value) = read_value(&fragment[after..]) {
            return Some(value);
        }
        from = after;
    }
    None
}

/// Reads `: value` or `: "value"` where value is a run of token characters.
/// A quoted value containing anything else is rejected.
fn read_value(rest: &str) -> Option<String> {
    let mut state = ValueScan::SeekColon;
    let mut token = String::new();

    for c in rest.chars() {
        state = match state {
            ValueScan::SeekColon if c == ':' => ValueScan::SeekValue,
            ValueScan::SeekColon if c.is_whitespace() => state,
            ValueScan::SeekColon => return None,

            ValueScan::SeekValue if c == '"' => ValueScan::InValue { quoted: true },
            ValueScan::SeekValue if c.is_whitespace() => state,
            ValueScan::SeekValue if is_token_char(c) => {
                token.push(c);
                ValueScan::InValue { quoted: false }
            }
            ValueScan::SeekValue => return None,

            ValueScan::InValue { .. } if is_token_char(c) => {
                token.push(c);
                state
            }
            ValueScan::InValue { quoted: true } if c != '"' => return None,
            ValueScan::InValue { .. } => break,
        };
    }

    (!token.is_empty()).then_some(token)
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

fn is_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_fragments_from_broken_json() {
        let text = r#"{"shifts": [
            {"employee_id": 1, "date": "2025-08-01", "shift_pattern_id": 2, "notes": "午前"},
            {"employee_id": "2", "date": "2025-08-02", "shift_pattern_id": "1"
            ,{"date": "2025-08-04", "shift_pattern_id": 3, "employee_id": 3}
        "#;
        let shifts = recover_shifts(text);
        assert_eq!(shifts.len(), 2);
        assert_eq!(shifts[0].employee_id, "1");
        assert_eq!(shifts[0].shift_pattern_id, "2");
        assert_eq!(shifts[0].notes, "");
        assert_eq!(shifts[1].date, "2025-08-04");
        assert_eq!(shifts[1].employee_id, "3");
    }

    #[test]
    fn test_fragment_missing_a_field_is_rejected() {
        assert!(recover_shifts(r#"{"employee_id": 1, "date": "2025-08-01"}"#).is_empty());
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let text = r#"{"employee_id": 1, "date": "2025-8-1", "shift_pattern_id": 2}"#;
        assert!(recover_shifts(text).is_empty());
        let text = r#"{"employee_id": 1, "date": "2025/08/01", "shift_pattern_id": 2}"#;
        assert!(recover_shifts(text).is_empty());
    }

    #[test]
    fn test_uuid_values_are_accepted() {
        let text = r#"{"employee_id":"67e55044-10b1-426f-9247-bb680e5fe0c8","date":"2025-08-01","shift_pattern_id":"1"}"#;
        let shifts = recover_shifts(text);
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].employee_id, "67e55044-10b1-426f-9247-bb680e5fe0c8");
    }

    #[test]
    fn test_similar_keys_do_not_match() {
        // `start_date` must not satisfy `date`.
        let text = r#"{"employee_id": 1, "start_date": "2025-08-01", "shift_pattern_id": 2}"#;
        assert!(recover_shifts(text).is_empty());
    }

    #[test]
    fn test_only_innermost_spans_are_scanned() {
        let fragments = object_fragments(r#"{"a": {"b": 1}, "c": {"d": 2}}"#);
        assert_eq!(fragments, vec![r#"{"b": 1}"#, r#"{"d": 2}"#]);
    }

    #[test]
    fn test_read_value_variants() {
        assert_eq!(read_value(r#" : "12""#), Some("12".to_string()));
        assert_eq!(read_value(":7,"), Some("7".to_string()));
        assert_eq!(read_value(r#": "a b""#), None);
        assert_eq!(read_value(" 12"), None);
        assert_eq!(read_value(": null"), Some("null".to_string()));
    }

    #[test]
    fn test_iso_date_shape() {
        assert!(is_iso_date_shape("2025-08-31"));
        assert!(is_iso_date_shape("2025-02-30")); // shape only; calendar check is later
        assert!(!is_iso_date_shape("2025-08-3"));
        assert!(!is_iso_date_shape("２０２５-08-31"));
    }
}
