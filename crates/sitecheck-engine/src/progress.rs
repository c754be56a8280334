//! Progress derivation
//!
//! Pure functions over record sets; the execution tracker and the
//! reporting aggregator both derive their percentages here so the
//! formula exists exactly once: `round(100 * done / total)`, with 0 when
//! the set is empty.

use sitecheck_model::{ChecklistItem, LocationKey, RecordKey, VerificationRecord};
use std::collections::HashMap;

/// Completion percentage, rounded to the nearest integer
///
/// Returns 0 for an empty set; never divides by zero.
#[inline]
#[must_use]
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        0
    } else {
        ((done as f64 / total as f64) * 100.0).round() as u8
    }
}

/// Checklist-wide progress over all materialized records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverallProgress {
    pub percent: u8,
    /// Records that left `Pending`
    pub done: usize,
    pub total: usize,
}

/// Progress over every record of a checklist
#[must_use]
pub fn overall_progress<'a, I>(records: I) -> OverallProgress
where
    I: IntoIterator<Item = &'a VerificationRecord>,
{
    let mut done = 0;
    let mut total = 0;
    for record in records {
        total += 1;
        if record.status.is_done() {
            done += 1;
        }
    }
    OverallProgress {
        percent: percent(done, total),
        done,
        total,
    }
}

/// Per-location progress, used for navigation affordances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationProgress {
    pub percent: u8,
    pub done: usize,
    /// Items scoped to this location's level
    pub total: usize,
    /// `NotOk` results at this location, for visual escalation
    pub non_conforming: usize,
}

/// Progress of a single location over the items scoped to its level
///
/// A missing record counts as not done. Returns `None` when the checklist
/// has no items at the location's level.
#[must_use]
pub fn location_progress(
    items: &[ChecklistItem],
    records: &HashMap<RecordKey, VerificationRecord>,
    location: &LocationKey,
) -> Option<LocationProgress> {
    let level = location.scope();
    let scoped: Vec<_> = items.iter().filter(|i| i.scope == level).collect();
    if scoped.is_empty() {
        return None;
    }

    let mut done = 0;
    let mut non_conforming = 0;
    for item in &scoped {
        if let Some(record) = records.get(&RecordKey::new(item.id, location)) {
            if record.status.is_done() {
                done += 1;
            }
            if record.status.is_non_conforming() {
                non_conforming += 1;
            }
        }
    }

    Some(LocationProgress {
        percent: percent(done, scoped.len()),
        done,
        total: scoped.len(),
        non_conforming,
    })
}
