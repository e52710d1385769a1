//! Payload extraction from free-form generator text.
//!
//! Degrade ladder: locate + sanitize + strict parse, then the tolerant
//! fragment scanner, then an empty result carrying the raw text. Nothing in
//! here returns an error to the caller.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::scheduling::models::{ExtractedPlan, ProposedShift, ShiftSummary};
use crate::scheduling::recovery::recover_shifts;

pub const PARTIAL_RECOVERY_WARNING: &str = "部分的に復元";
pub const PARSE_ERROR_WARNING: &str = "JSONパースエラー";

lazy_static! {
    static ref FENCED_JSON: Regex =
        Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("valid fenced-json regex");
    static ref SHIFTS_OBJECT: Regex =
        Regex::new(r#"(?s)(\{.*"shifts".*\})"#).expect("valid shifts-object regex");
    static ref LINE_COMMENT: Regex = Regex::new(r"(?m)//.*$").expect("valid line-comment regex");
    static ref BLOCK_COMMENT: Regex =
        Regex::new(r"(?s)/\*.*?\*/").expect("valid block-comment regex");
    static ref CONTROL_CHARS: Regex =
        Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").expect("valid control-char regex");
}

#[derive(Debug, Error)]
enum StrictParseError {
    #[error("JSON data not found in response")]
    NotFound,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct RawShift {
    #[serde(default, deserialize_with = "loose_string")]
    date: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    employee_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    shift_pattern_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    notes: Option<String>,
}

/// Accepts a JSON string or number; anything else reads as absent.
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Finds the JSON candidate: a ```json fenced block, else the widest
/// `{ ... "shifts" ... }` span.
pub fn locate_payload(text: &str) -> Option<&str> {
    FENCED_JSON
        .captures(text)
        .or_else(|| SHIFTS_OBJECT.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Strips `//` line comments, `/* */` block comments and control characters.
pub fn sanitize(json: &str) -> String {
    let without_lines = LINE_COMMENT.replace_all(json, "");
    let without_blocks = BLOCK_COMMENT.replace_all(&without_lines, "");
    CONTROL_CHARS.replace_all(&without_blocks, "").into_owned()
}

/// Turns the accumulated generator text into proposed shifts.
pub fn parse_generation_output(text: &str) -> ExtractedPlan {
    match parse_strict(text) {
        Ok(plan) => {
            info!("Parsed shift data: {} shifts", plan.shifts.len());
            plan
        }
        Err(e) => {
            warn!("JSON parse error: {e}");
            debug!("Full text: {text}");
            recover(text)
        }
    }
}

fn parse_strict(text: &str) -> Result<ExtractedPlan, StrictParseError> {
    let candidate = locate_payload(text).ok_or(StrictParseError::NotFound)?;
    let sanitized = sanitize(candidate);
    debug!(
        "Sanitized JSON ({} chars): {}",
        sanitized.len(),
        preview(&sanitized, 500)
    );

    // Only syntax errors fail here. Loosely typed parts are read leniently.
    let payload: Value = serde_json::from_str(&sanitized)?;

    let shifts: Vec<ProposedShift> = match payload.get("shifts") {
        Some(Value::Array(entries)) => entries.iter().filter_map(into_proposed).collect(),
        other => {
            warn!("Payload has no shifts array: {:?}", other);
            Vec::new()
        }
    };
    let warnings = match payload.pointer("/summary/warnings") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|w| w.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    Ok(ExtractedPlan {
        summary: ShiftSummary {
            total_shifts: shifts.len(),
            warnings,
        },
        shifts,
        raw_result: None,
    })
}

fn into_proposed(entry: &Value) -> Option<ProposedShift> {
    if !entry.is_object() {
        warn!("Skipping non-object shift entry: {entry}");
        return None;
    }
    let raw = match RawShift::deserialize(entry) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Skipping unreadable shift entry: {e}");
            return None;
        }
    };
    match (raw.date, raw.employee_id, raw.shift_pattern_id) {
        (Some(date), Some(employee_id), Some(shift_pattern_id)) => Some(ProposedShift {
            date,
            employee_id,
            shift_pattern_id,
            notes: raw.notes.unwrap_or_default(),
        }),
        (date, employee_id, shift_pattern_id) => {
            warn!(
                "Shift entry missing fields (skipped): date={:?} employee_id={:?} shift_pattern_id={:?}",
                date, employee_id, shift_pattern_id
            );
            None
        }
    }
}

fn recover(text: &str) -> ExtractedPlan {
    info!("Attempting to extract partial data from broken JSON...");
    let shifts = recover_shifts(text);

    if shifts.is_empty() {
        warn!("No shifts could be extracted");
        return ExtractedPlan {
            shifts,
            summary: ShiftSummary {
                total_shifts: 0,
                warnings: vec![PARSE_ERROR_WARNING.to_string()],
            },
            raw_result: Some(text.to_string()),
        };
    }

    info!("Extracted {} shifts from broken JSON", shifts.len());
    ExtractedPlan {
        summary: ShiftSummary {
            total_shifts: shifts.len(),
            warnings: vec![PARTIAL_RECOVERY_WARNING.to_string()],
        },
        shifts,
        raw_result: None,
    }
}

/// First `max_chars` characters, never splitting a character.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
