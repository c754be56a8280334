//! Checklist activation
//!
//! Expands a checklist's items against the current location hierarchy
//! into pending verification-record skeletons, one per (item, location)
//! pair at the item's scope, and persists them in sequential batches.
//!
//! Activation is idempotent and resumable: duplicate-key conflicts are
//! swallowed as evidence of a prior partial activation, so concurrent or
//! retried runs converge to the same final record set. Any other write
//! error aborts without flipping the checklist status; rows written by
//! earlier batches stay in place and are picked up by the retry.

use crate::error::EngineError;
use crate::hierarchy::SiteHierarchy;
use sitecheck_backend::Persistence;
use sitecheck_model::{
    ChecklistId, ChecklistItem, ChecklistStatus, ItemScope, LocationKey, NewVerificationRecord,
};
use std::sync::Arc;

/// Rows per insert batch, issued sequentially to bound peak load
const INSERT_BATCH_SIZE: usize = 500;

/// Result of an activation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationOutcome {
    /// Records the expansion produced, computed before writing
    pub planned: usize,
    /// Records newly persisted by this run
    pub inserted: usize,
    /// Records skipped because the (item, location) pair already existed
    pub skipped: usize,
    /// Checklist status after the run
    pub status: ChecklistStatus,
}

/// Expand items against the hierarchy into pending record skeletons
///
/// Floor-scope items produce one row per floor; unit-scope per unit;
/// room-scope per room. Locations with a dangling parent chain are
/// silently skipped: that is a data-integrity issue in the surrounding
/// CRUD screens, not a reason to fail the activation.
#[must_use]
pub fn plan_expansion(
    checklist_id: ChecklistId,
    items: &[ChecklistItem],
    site: &SiteHierarchy,
) -> Vec<NewVerificationRecord> {
    let mut rows = Vec::new();

    for item in items.iter().filter(|i| i.scope == ItemScope::Floor) {
        for floor in site.floors() {
            rows.push(NewVerificationRecord::pending(
                checklist_id,
                item.id,
                &LocationKey::Floor(floor.id),
            ));
        }
    }

    for item in items.iter().filter(|i| i.scope == ItemScope::Unit) {
        for unit in site.units() {
            let Some(floor) = site.floor_of(unit) else {
                tracing::warn!(unit = %unit.id, "skipping unit with dangling floor reference");
                continue;
            };
            rows.push(NewVerificationRecord::pending(
                checklist_id,
                item.id,
                &LocationKey::Unit {
                    floor_id: floor.id,
                    unit_id: unit.id,
                },
            ));
        }
    }

    for item in items.iter().filter(|i| i.scope == ItemScope::Room) {
        for room in site.rooms() {
            let Some((floor, unit)) = site.parents_of(room) else {
                tracing::warn!(room = %room.id, "skipping room with dangling parent chain");
                continue;
            };
            rows.push(NewVerificationRecord::pending(
                checklist_id,
                item.id,
                &LocationKey::Room {
                    floor_id: floor.id,
                    unit_id: unit.id,
                    room_id: room.id,
                },
            ));
        }
    }

    rows
}

/// Expands a checklist into verification records and flips it to active
#[derive(Clone)]
pub struct ActivationEngine {
    db: Arc<dyn Persistence>,
}

impl ActivationEngine {
    /// New engine over a persistence collaborator
    #[inline]
    #[must_use]
    pub fn new(db: Arc<dyn Persistence>) -> Self {
        Self { db }
    }

    /// Activate a checklist
    ///
    /// Preconditions, checked before any write:
    /// 1. the checklist exists and has at least one item;
    /// 2. any unit-scope item requires at least one unit in the project;
    /// 3. any room-scope item requires at least one room.
    ///
    /// The status flips `Draft -> Active` only when the expansion was
    /// non-empty and no fatal write error occurred. Re-activating an
    /// already-active checklist re-expands against the current item list
    /// and hierarchy, relying on duplicate-skip; its status is left
    /// untouched. There is no deactivate operation.
    pub async fn activate(&self, checklist_id: ChecklistId) -> Result<ActivationOutcome, EngineError> {
        let checklist = self
            .db
            .checklist(checklist_id)
            .await?
            .ok_or(EngineError::ChecklistNotFound(checklist_id))?;

        let items = self.db.items_for_checklist(checklist_id).await?;
        if items.is_empty() {
            return Err(EngineError::EmptyChecklist);
        }

        let site = SiteHierarchy::load(self.db.as_ref(), checklist.project_id).await?;
        if items.iter().any(|i| i.scope == ItemScope::Unit) && site.units().is_empty() {
            return Err(EngineError::NoUnitsDefined);
        }
        if items.iter().any(|i| i.scope == ItemScope::Room) && site.rooms().is_empty() {
            return Err(EngineError::NoRoomsDefined);
        }

        let rows = plan_expansion(checklist_id, &items, &site);
        let planned = rows.len();
        tracing::info!(
            checklist = %checklist_id,
            items = items.len(),
            planned,
            "activating checklist"
        );

        let mut inserted = 0usize;
        let mut skipped = 0usize;
        for batch in rows.chunks(INSERT_BATCH_SIZE) {
            match self.db.insert_records(batch.to_vec()).await {
                Ok(persisted) => {
                    skipped += batch.len() - persisted.len();
                    inserted += persisted.len();
                }
                Err(e) if e.is_duplicate() => {
                    // Evidence of a prior partial activation; the pairs
                    // in this batch are already materialized.
                    tracing::debug!(batch = batch.len(), "batch conflicted, skipping");
                    skipped += batch.len();
                }
                Err(e) => {
                    tracing::warn!(error = %e, inserted, "activation aborted mid-batch");
                    return Err(e.into());
                }
            }
        }

        let status = if checklist.status.is_draft() && planned > 0 {
            self.db
                .update_checklist_status(checklist_id, ChecklistStatus::Active)
                .await?
                .status
        } else {
            checklist.status
        };

        tracing::info!(checklist = %checklist_id, inserted, skipped, %status, "activation finished");
        Ok(ActivationOutcome {
            planned,
            inserted,
            skipped,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sitecheck_model::{Floor, FloorId, ItemId, ProjectId, Room, RoomId, Unit, UnitId};
    use std::collections::HashSet;

    fn item(checklist_id: ChecklistId, scope: ItemScope, position: u32) -> ChecklistItem {
        ChecklistItem {
            id: ItemId::new(),
            checklist_id,
            name: format!("item {position}"),
            position,
            scope,
        }
    }

    fn site(floors: usize, units_per_floor: usize, rooms_per_unit: usize) -> SiteHierarchy {
        let project = ProjectId::new();
        let mut floor_rows = Vec::new();
        let mut unit_rows = Vec::new();
        let mut room_rows = Vec::new();
        for f in 0..floors {
            let floor = Floor {
                id: FloorId::new(),
                project_id: project,
                name: format!("floor {f}"),
                position: f as u32,
            };
            for u in 0..units_per_floor {
                let unit = Unit {
                    id: UnitId::new(),
                    floor_id: floor.id,
                    name: format!("unit {f}{u}"),
                    position: u as u32,
                };
                for r in 0..rooms_per_unit {
                    room_rows.push(Room {
                        id: RoomId::new(),
                        unit_id: unit.id,
                        name: format!("room {r}"),
                    });
                }
                unit_rows.push(unit);
            }
            floor_rows.push(floor);
        }
        SiteHierarchy::from_rows(floor_rows, unit_rows, room_rows)
    }

    #[test]
    fn expansion_count_per_scope() {
        let checklist_id = ChecklistId::new();
        let site = site(3, 2, 1); // 3 floors, 6 units, 6 rooms
        let items = vec![
            item(checklist_id, ItemScope::Floor, 0),
            item(checklist_id, ItemScope::Unit, 1),
            item(checklist_id, ItemScope::Room, 2),
        ];
        let rows = plan_expansion(checklist_id, &items, &site);
        assert_eq!(rows.len(), 3 + 6 + 6);
    }

    #[test]
    fn expansion_populates_parent_chain() {
        let checklist_id = ChecklistId::new();
        let site = site(1, 1, 1);
        let items = vec![item(checklist_id, ItemScope::Room, 0)];
        let rows = plan_expansion(checklist_id, &items, &site);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.floor_id, site.floors()[0].id);
        assert_eq!(row.unit_id, Some(site.units()[0].id));
        assert_eq!(row.room_id, Some(site.rooms()[0].id));
    }

    #[test]
    fn orphaned_locations_are_skipped() {
        let checklist_id = ChecklistId::new();
        let project = ProjectId::new();
        let floor = Floor {
            id: FloorId::new(),
            project_id: project,
            name: "ground".into(),
            position: 0,
        };
        let good_unit = Unit {
            id: UnitId::new(),
            floor_id: floor.id,
            name: "001".into(),
            position: 0,
        };
        let orphan_unit = Unit {
            id: UnitId::new(),
            floor_id: FloorId::new(), // dangling
            name: "???".into(),
            position: 1,
        };
        let orphan_room = Room {
            id: RoomId::new(),
            unit_id: orphan_unit.id, // resolvable unit, dangling floor
            name: "kitchen".into(),
        };
        let site = SiteHierarchy::from_rows(
            vec![floor],
            vec![good_unit, orphan_unit],
            vec![orphan_room],
        );

        let items = vec![
            item(checklist_id, ItemScope::Unit, 0),
            item(checklist_id, ItemScope::Room, 1),
        ];
        let rows = plan_expansion(checklist_id, &items, &site);

        // Only the resolvable unit expands; the orphans are dropped.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].unit_id, Some(site.units()[0].id));
    }

    #[test]
    fn empty_hierarchy_plans_nothing() {
        let checklist_id = ChecklistId::new();
        let items = vec![item(checklist_id, ItemScope::Floor, 0)];
        let rows = plan_expansion(checklist_id, &items, &SiteHierarchy::default());
        assert!(rows.is_empty());
    }

    proptest! {
        #[test]
        fn plan_matches_scope_location_sum(
            floors in 0usize..4,
            units_per_floor in 0usize..3,
            rooms_per_unit in 0usize..3,
            scopes in prop::collection::vec(0u8..3, 1..6),
        ) {
            let checklist_id = ChecklistId::new();
            let site = site(floors, units_per_floor, rooms_per_unit);
            let items: Vec<_> = scopes
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let scope = match s {
                        0 => ItemScope::Floor,
                        1 => ItemScope::Unit,
                        _ => ItemScope::Room,
                    };
                    item(checklist_id, scope, i as u32)
                })
                .collect();

            let rows = plan_expansion(checklist_id, &items, &site);

            let expected: usize = items
                .iter()
                .map(|i| site.location_count(i.scope))
                .sum();
            prop_assert_eq!(rows.len(), expected);

            // Every (item, location) pair is planned at most once.
            let keys: HashSet<_> = rows.iter().map(|r| r.key()).collect();
            prop_assert_eq!(keys.len(), rows.len());
        }
    }
}
