//! Placeholder → real identifier remapping.
//!
//! The generator refers to employees and patterns by their 1-based position in
//! the lists it was given. Those short tokens are mapped back to record ids
//! here; anything that does not end up as a real id is dropped.

use std::collections::HashMap;

use tracing::{info, warn};
use uuid::Uuid;

use crate::scheduling::models::{MappedShift, ProposedShift};

/// Lookup table from placeholder (`"1"`, `"2"`, ...) to real identifier.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    by_placeholder: HashMap<String, Uuid>,
}

impl IdMap {
    /// Placeholders are assigned by position, starting at 1.
    pub fn from_ids(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            by_placeholder: ids
                .into_iter()
                .enumerate()
                .map(|(index, id)| ((index + 1).to_string(), id))
                .collect(),
        }
    }

    pub fn placeholder_count(&self) -> usize {
        self.by_placeholder.len()
    }

    /// Resolves a placeholder; a token that already is a real id passes through.
    pub fn resolve(&self, raw: &str) -> Option<Uuid> {
        let raw = raw.trim();
        self.by_placeholder
            .get(raw)
            .copied()
            .or_else(|| parse_real_identifier(raw))
    }
}

/// Format check standing in for "is a storage identifier".
pub fn parse_real_identifier(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// Rewrites ids to real identifiers, dropping every shift where either id fails to resolve.
pub fn remap_shifts(
    shifts: Vec<ProposedShift>,
    employees: &IdMap,
    patterns: &IdMap,
) -> Vec<MappedShift> {
    let proposed = shifts.len();

    let mapped: Vec<MappedShift> = shifts
        .into_iter()
        .filter_map(|shift| {
            let employee_id = employees.resolve(&shift.employee_id);
            let shift_pattern_id = patterns.resolve(&shift.shift_pattern_id);
            match (employee_id, shift_pattern_id) {
                (Some(employee_id), Some(shift_pattern_id)) => Some(MappedShift {
                    date: shift.date,
                    employee_id,
                    shift_pattern_id,
                    notes: shift.notes,
                }),
                _ => {
                    warn!(
                        "Invalid shift (skipped): employee_id={} shift_pattern_id={} date={}",
                        shift.employee_id, shift.shift_pattern_id, shift.date
                    );
                    None
                }
            }
        })
        .collect();

    info!(
        "Remapped {} of {} proposed shifts ({} employees, {} patterns in lookup)",
        mapped.len(),
        proposed,
        employees.placeholder_count(),
        patterns.placeholder_count()
    );
    mapped
}
