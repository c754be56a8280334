//! Reporting aggregator
//!
//! Read-only projection of a checklist's execution state: status counts,
//! overall completion, a pendency worklist grouped by unit, and a
//! per-floor detail matrix. An optional status filter narrows the detail
//! matrix only; summary counts are always computed over the full record
//! set.

use crate::error::EngineError;
use crate::hierarchy::SiteHierarchy;
use crate::progress::percent;
use serde::Serialize;
use sitecheck_backend::Persistence;
use sitecheck_model::{
    Checklist, ChecklistId, ChecklistItem, Floor, ItemScope, LocationRef, RecordKey, RecordStatus,
    Unit, VerificationRecord,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Record tallies per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub ok: usize,
    pub not_ok: usize,
    pub not_applicable: usize,
}

impl StatusCounts {
    /// Tally a record set
    #[must_use]
    pub fn tally<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a VerificationRecord>,
    {
        let mut counts = Self::default();
        for record in records {
            match record.status {
                RecordStatus::Pending => counts.pending += 1,
                RecordStatus::Ok => counts.ok += 1,
                RecordStatus::NotOk => counts.not_ok += 1,
                RecordStatus::NotApplicable => counts.not_applicable += 1,
            }
        }
        counts
    }

    /// All records
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.pending + self.ok + self.not_ok + self.not_applicable
    }

    /// Records that left `Pending`
    #[inline]
    #[must_use]
    pub fn done(&self) -> usize {
        self.ok + self.not_ok + self.not_applicable
    }
}

/// A unit needing attention: non-conforming or still-pending items
#[derive(Debug, Clone, Serialize)]
pub struct PendencyEntry {
    pub unit: Unit,
    /// Parent floor, when the reference resolves
    pub floor: Option<Floor>,
    /// Unit-scope items verified `NotOk` at this unit
    pub not_ok: Vec<ChecklistItem>,
    /// Unit-scope items still pending (or never materialized) here
    pub pending: Vec<ChecklistItem>,
}

/// One row of the detail matrix: an item across a floor's units
#[derive(Debug, Clone, Serialize)]
pub struct DetailRow {
    pub item: ChecklistItem,
    /// One cell per unit of the floor, `None` when no record exists
    pub cells: Vec<Option<VerificationRecord>>,
}

/// Detail matrix of one floor: unit-scope items × the floor's units
#[derive(Debug, Clone, Serialize)]
pub struct FloorSection {
    pub floor: Floor,
    pub units: Vec<Unit>,
    pub rows: Vec<DetailRow>,
}

/// Aggregated execution report of a checklist
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub checklist: Checklist,
    /// Tallies over the full record set, never filtered
    pub counts: StatusCounts,
    /// `round(100 * done / total)`, 0 when no records exist
    pub overall_percent: u8,
    /// Units with at least one non-conforming or pending item
    pub pendencies: Vec<PendencyEntry>,
    /// Per-floor detail, narrowed by the status filter if one was given
    pub sections: Vec<FloorSection>,
    /// The filter the detail matrix was built with
    pub filter: Option<RecordStatus>,
}

/// Builds execution reports; reads, never mutates
#[derive(Clone)]
pub struct ReportBuilder {
    db: Arc<dyn Persistence>,
}

impl ReportBuilder {
    /// New builder over a persistence collaborator
    #[inline]
    #[must_use]
    pub fn new(db: Arc<dyn Persistence>) -> Self {
        Self { db }
    }

    /// Build the report for a checklist
    ///
    /// `filter` narrows the detail matrix to rows with at least one
    /// matching cell (`Pending` also matches cells with no record);
    /// summary counts and pendencies are unaffected by it.
    pub async fn build(
        &self,
        checklist_id: ChecklistId,
        filter: Option<RecordStatus>,
    ) -> Result<Report, EngineError> {
        let checklist = self
            .db
            .checklist(checklist_id)
            .await?
            .ok_or(EngineError::ChecklistNotFound(checklist_id))?;
        let items = self.db.items_for_checklist(checklist_id).await?;
        let records = self.db.records_for_checklist(checklist_id).await?;
        let site = SiteHierarchy::load(self.db.as_ref(), checklist.project_id).await?;

        let counts = StatusCounts::tally(&records);
        let overall_percent = percent(counts.done(), counts.total());
        tracing::debug!(
            checklist = %checklist_id,
            records = counts.total(),
            overall_percent,
            "building report"
        );

        let by_key: HashMap<RecordKey, &VerificationRecord> =
            records.iter().map(|r| (RecordKey::of(r), r)).collect();
        let unit_items: Vec<&ChecklistItem> =
            items.iter().filter(|i| i.scope == ItemScope::Unit).collect();

        let pendencies = build_pendencies(&site, &unit_items, &by_key);
        let sections = build_sections(&site, &unit_items, &by_key, filter);

        Ok(Report {
            checklist,
            counts,
            overall_percent,
            pendencies,
            sections,
            filter,
        })
    }
}

fn unit_record<'a>(
    by_key: &HashMap<RecordKey, &'a VerificationRecord>,
    item: &ChecklistItem,
    unit: &Unit,
) -> Option<&'a VerificationRecord> {
    by_key
        .get(&RecordKey {
            item_id: item.id,
            location: LocationRef::Unit(unit.id),
        })
        .copied()
}

fn build_pendencies(
    site: &SiteHierarchy,
    unit_items: &[&ChecklistItem],
    by_key: &HashMap<RecordKey, &VerificationRecord>,
) -> Vec<PendencyEntry> {
    let mut entries = Vec::new();
    for unit in site.units() {
        let not_ok: Vec<ChecklistItem> = unit_items
            .iter()
            .filter(|item| {
                unit_record(by_key, item, unit)
                    .is_some_and(|r| r.status.is_non_conforming())
            })
            .map(|item| (*item).clone())
            .collect();
        let pending: Vec<ChecklistItem> = unit_items
            .iter()
            .filter(|item| match unit_record(by_key, item, unit) {
                Some(record) => record.status == RecordStatus::Pending,
                None => true,
            })
            .map(|item| (*item).clone())
            .collect();

        if not_ok.is_empty() && pending.is_empty() {
            continue;
        }
        entries.push(PendencyEntry {
            unit: unit.clone(),
            floor: site.floor_of(unit).cloned(),
            not_ok,
            pending,
        });
    }
    entries
}

fn build_sections(
    site: &SiteHierarchy,
    unit_items: &[&ChecklistItem],
    by_key: &HashMap<RecordKey, &VerificationRecord>,
    filter: Option<RecordStatus>,
) -> Vec<FloorSection> {
    site.floors()
        .iter()
        .map(|floor| {
            let units: Vec<Unit> = site.units_of(floor.id).cloned().collect();
            let rows = unit_items
                .iter()
                .filter_map(|item| {
                    let cells: Vec<Option<VerificationRecord>> = units
                        .iter()
                        .map(|unit| unit_record(by_key, item, unit).cloned())
                        .collect();
                    if let Some(wanted) = filter {
                        let any_match = cells.iter().any(|cell| cell_matches(wanted, cell.as_ref()));
                        if !any_match {
                            return None;
                        }
                    }
                    Some(DetailRow {
                        item: (*item).clone(),
                        cells,
                    })
                })
                .collect();
            FloorSection {
                floor: floor.clone(),
                units,
                rows,
            }
        })
        .collect()
}

/// An absent record reads as pending for filtering purposes
fn cell_matches(wanted: RecordStatus, cell: Option<&VerificationRecord>) -> bool {
    match cell {
        Some(record) => record.status == wanted,
        None => wanted == RecordStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationEngine;
    use crate::execution::ExecutionTracker;
    use pretty_assertions::assert_eq;
    use sitecheck_backend::MemoryBackend;
    use sitecheck_model::{ItemId, LocationKey, ProjectId};

    struct Fixture {
        backend: Arc<MemoryBackend>,
        checklist_id: ChecklistId,
        item_id: ItemId,
        locations: Vec<LocationKey>,
    }

    /// One floor, five units, one unit-scope item, activated.
    async fn fixture() -> Fixture {
        let backend = Arc::new(MemoryBackend::new());
        let project = ProjectId::new();
        let checklist = backend.add_checklist(project, "plumbing handover");
        let item = backend.add_item(checklist.id, "no leaks under sink", ItemScope::Unit);
        let floor = backend.add_floor(project, "ground");
        let locations = (1..=5)
            .map(|n| {
                let unit = backend.add_unit(floor.id, &format!("00{n}"));
                LocationKey::Unit {
                    floor_id: floor.id,
                    unit_id: unit.id,
                }
            })
            .collect();

        ActivationEngine::new(backend.clone())
            .activate(checklist.id)
            .await
            .unwrap();
        Fixture {
            backend,
            checklist_id: checklist.id,
            item_id: item.id,
            locations,
        }
    }

    async fn set_statuses(fx: &Fixture, statuses: &[(usize, RecordStatus)]) {
        let mut session = ExecutionTracker::load(
            fx.backend.clone(),
            fx.backend.clone(),
            fx.backend.clone(),
            fx.checklist_id,
        )
        .await
        .unwrap();
        for (idx, status) in statuses {
            session
                .set_status(fx.item_id, &fx.locations[*idx], *status)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn counts_and_percent_over_mixed_statuses() {
        let fx = fixture().await;
        set_statuses(
            &fx,
            &[
                (0, RecordStatus::Ok),
                (1, RecordStatus::Ok),
                (2, RecordStatus::Ok),
                (3, RecordStatus::NotOk),
            ],
        )
        .await;

        let report = ReportBuilder::new(fx.backend.clone())
            .build(fx.checklist_id, None)
            .await
            .unwrap();

        assert_eq!(report.counts.ok, 3);
        assert_eq!(report.counts.not_ok, 1);
        assert_eq!(report.counts.pending, 1);
        assert_eq!(report.counts.total(), 5);
        assert_eq!(report.overall_percent, 80);
    }

    #[tokio::test]
    async fn pendencies_list_not_ok_and_pending_units() {
        let fx = fixture().await;
        set_statuses(
            &fx,
            &[
                (0, RecordStatus::Ok),
                (1, RecordStatus::Ok),
                (2, RecordStatus::Ok),
                (3, RecordStatus::NotOk),
            ],
        )
        .await;

        let report = ReportBuilder::new(fx.backend.clone())
            .build(fx.checklist_id, None)
            .await
            .unwrap();

        // Unit 4 failed, unit 5 is untouched; the three OK units are omitted.
        assert_eq!(report.pendencies.len(), 2);
        let failed = &report.pendencies[0];
        assert_eq!(failed.not_ok.len(), 1);
        assert!(failed.pending.is_empty());
        assert!(failed.floor.is_some());
        let untouched = &report.pendencies[1];
        assert!(untouched.not_ok.is_empty());
        assert_eq!(untouched.pending.len(), 1);
    }

    #[tokio::test]
    async fn filter_narrows_detail_but_not_summary() {
        let fx = fixture().await;
        set_statuses(&fx, &[(0, RecordStatus::Ok)]).await;

        let builder = ReportBuilder::new(fx.backend.clone());
        let filtered = builder
            .build(fx.checklist_id, Some(RecordStatus::NotOk))
            .await
            .unwrap();

        // No cell is NotOk, so the only row is filtered out...
        assert!(filtered.sections[0].rows.is_empty());
        // ...while the summary still covers all five records.
        assert_eq!(filtered.counts.total(), 5);
        assert_eq!(filtered.overall_percent, 20);

        let pending_view = builder
            .build(fx.checklist_id, Some(RecordStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending_view.sections[0].rows.len(), 1);
    }

    #[tokio::test]
    async fn empty_checklist_reports_zero_without_panicking() {
        let backend = Arc::new(MemoryBackend::new());
        let checklist = backend.add_checklist(ProjectId::new(), "never activated");

        let report = ReportBuilder::new(backend.clone())
            .build(checklist.id, None)
            .await
            .unwrap();
        assert_eq!(report.overall_percent, 0);
        assert_eq!(report.counts.total(), 0);
        assert!(report.pendencies.is_empty());
        assert!(report.sections.is_empty());
    }

    #[tokio::test]
    async fn floor_scope_checklists_have_no_unit_pendencies() {
        let backend = Arc::new(MemoryBackend::new());
        let project = ProjectId::new();
        let checklist = backend.add_checklist(project, "facade inspection");
        backend.add_item(checklist.id, "render intact", ItemScope::Floor);
        let floor = backend.add_floor(project, "ground");
        backend.add_unit(floor.id, "001");

        ActivationEngine::new(backend.clone())
            .activate(checklist.id)
            .await
            .unwrap();

        let report = ReportBuilder::new(backend.clone())
            .build(checklist.id, None)
            .await
            .unwrap();
        // The worklist tracks unit-scope items only.
        assert!(report.pendencies.is_empty());
        assert_eq!(report.counts.pending, 1);
    }

    #[test]
    fn tally_roundtrips_through_serde() {
        let counts = StatusCounts {
            pending: 1,
            ok: 2,
            not_ok: 3,
            not_applicable: 4,
        };
        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["not_ok"], 3);
    }
}
