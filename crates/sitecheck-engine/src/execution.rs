//! Execution tracking
//!
//! Records pass/fail/not-applicable results, notes and photos against an
//! activated checklist. Every operation is an upsert keyed by
//! `(item, location)`: update the materialized record when it exists,
//! otherwise lazily create it. The lazy path is a repair mechanism for
//! structure that grew after activation; the activation engine remains
//! the sole intended bulk creator.

use crate::error::EngineError;
use crate::progress::{location_progress, overall_progress, LocationProgress, OverallProgress};
use chrono::Utc;
use sitecheck_backend::{BlobStorage, Identity, Persistence};
use sitecheck_model::{
    Checklist, ChecklistId, ChecklistItem, ItemId, LocationKey, NewVerificationRecord, RecordKey,
    RecordStatus, RecordUpdate, VerificationRecord,
};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

/// Photo bytes to attach to a verification
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Per-checklist execution session
///
/// Holds an in-memory index of the checklist's records keyed by
/// [`RecordKey`]; the index is always refreshed with the authoritative
/// row returned by the write, never with the locally-built payload.
pub struct ExecutionTracker {
    db: Arc<dyn Persistence>,
    identity: Arc<dyn Identity>,
    storage: Arc<dyn BlobStorage>,
    checklist: Checklist,
    items: Vec<ChecklistItem>,
    records: HashMap<RecordKey, VerificationRecord>,
}

impl ExecutionTracker {
    /// Load a checklist's items and records into a tracking session
    pub async fn load(
        db: Arc<dyn Persistence>,
        identity: Arc<dyn Identity>,
        storage: Arc<dyn BlobStorage>,
        checklist_id: ChecklistId,
    ) -> Result<Self, EngineError> {
        let checklist = db
            .checklist(checklist_id)
            .await?
            .ok_or(EngineError::ChecklistNotFound(checklist_id))?;
        let items = db.items_for_checklist(checklist_id).await?;
        let rows = db.records_for_checklist(checklist_id).await?;
        tracing::debug!(checklist = %checklist_id, records = rows.len(), "loaded execution session");

        let records = rows.into_iter().map(|r| (RecordKey::of(&r), r)).collect();
        Ok(Self {
            db,
            identity,
            storage,
            checklist,
            items,
            records,
        })
    }

    /// The checklist under execution
    #[inline]
    #[must_use]
    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    /// Items of the checklist, in display order
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    /// All indexed records
    pub fn records(&self) -> impl Iterator<Item = &VerificationRecord> {
        self.records.values()
    }

    /// Record for an (item, location) pair, if materialized
    #[must_use]
    pub fn record(&self, item_id: ItemId, location: &LocationKey) -> Option<&VerificationRecord> {
        self.records.get(&RecordKey::new(item_id, location))
    }

    /// Set the execution status of a verification
    ///
    /// Stamps `verified_at` and `verified_by`: explicit status-setting is
    /// what counts as "verifying".
    pub async fn set_status(
        &mut self,
        item_id: ItemId,
        location: &LocationKey,
        status: RecordStatus,
    ) -> Result<&VerificationRecord, EngineError> {
        let verified_by = self.identity.current_actor().await;
        let update = RecordUpdate::Status {
            status,
            verified_at: Utc::now(),
            verified_by,
        };
        self.apply(item_id, location, update).await
    }

    /// Set or clear the free-text note; attribution is left untouched
    pub async fn set_note(
        &mut self,
        item_id: ItemId,
        location: &LocationKey,
        note: Option<String>,
    ) -> Result<&VerificationRecord, EngineError> {
        self.apply(item_id, location, RecordUpdate::Note(note)).await
    }

    /// Upload a photo and persist its public URL on the verification;
    /// attribution is left untouched
    pub async fn attach_photo(
        &mut self,
        item_id: ItemId,
        location: &LocationKey,
        photo: PhotoUpload,
    ) -> Result<&VerificationRecord, EngineError> {
        let path = format!(
            "{}/{}_{}",
            self.checklist.id,
            Utc::now().timestamp_millis(),
            photo.file_name
        );
        let stored = self.storage.upload(&path, photo.bytes).await?;
        let url = self.storage.public_url(&stored);
        tracing::debug!(item = %item_id, url, "photo uploaded");
        self.apply(item_id, location, RecordUpdate::Photo(url)).await
    }

    /// Checklist-wide completion over the materialized records
    #[must_use]
    pub fn overall_progress(&self) -> OverallProgress {
        overall_progress(self.records.values())
    }

    /// Completion of one location over the items scoped to its level
    #[must_use]
    pub fn location_progress(&self, location: &LocationKey) -> Option<LocationProgress> {
        location_progress(&self.items, &self.records, location)
    }

    /// Upsert shape shared by all three operations: update the record if
    /// the pair is materialized, otherwise insert a merged skeleton.
    async fn apply(
        &mut self,
        item_id: ItemId,
        location: &LocationKey,
        update: RecordUpdate,
    ) -> Result<&VerificationRecord, EngineError> {
        let key = RecordKey::new(item_id, location);
        let existing = self.records.get(&key).map(|r| r.id);

        let persisted = match existing {
            Some(record_id) => self.db.update_record(record_id, update).await?,
            None => {
                // Repair path: the pair was never materialized (structure
                // grew after activation, or activation was abandoned).
                tracing::debug!(item = %item_id, "no record for pair, creating lazily");
                let row = NewVerificationRecord::pending(self.checklist.id, item_id, location)
                    .with_update(update);
                self.db.insert_record(row).await?
            }
        };

        match self.records.entry(key) {
            Entry::Occupied(mut entry) => {
                entry.insert(persisted);
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => Ok(entry.insert(persisted)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationEngine;
    use pretty_assertions::assert_eq;
    use sitecheck_backend::MemoryBackend;
    use sitecheck_model::{ActorId, ItemScope, ProjectId, UnitId};

    struct Fixture {
        backend: Arc<MemoryBackend>,
        checklist_id: ChecklistId,
        item_id: ItemId,
        locations: Vec<LocationKey>,
    }

    /// One floor, two units, one unit-scope item, activated.
    async fn fixture() -> Fixture {
        let backend = Arc::new(MemoryBackend::new());
        let project = ProjectId::new();
        let checklist = backend.add_checklist(project, "electrical handover");
        let item = backend.add_item(checklist.id, "sockets wired", ItemScope::Unit);
        let floor = backend.add_floor(project, "ground");
        let units = vec![
            backend.add_unit(floor.id, "001"),
            backend.add_unit(floor.id, "002"),
        ];

        let engine = ActivationEngine::new(backend.clone());
        engine.activate(checklist.id).await.unwrap();

        let locations = units
            .iter()
            .map(|u| LocationKey::Unit {
                floor_id: floor.id,
                unit_id: u.id,
            })
            .collect();
        Fixture {
            backend,
            checklist_id: checklist.id,
            item_id: item.id,
            locations,
        }
    }

    async fn tracker(fx: &Fixture) -> ExecutionTracker {
        ExecutionTracker::load(
            fx.backend.clone(),
            fx.backend.clone(),
            fx.backend.clone(),
            fx.checklist_id,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn status_upsert_updates_in_place() {
        let fx = fixture().await;
        let actor = ActorId::new();
        fx.backend.set_actor(Some(actor));
        let mut session = tracker(&fx).await;

        let rec = session
            .set_status(fx.item_id, &fx.locations[0], RecordStatus::Ok)
            .await
            .unwrap();
        assert_eq!(rec.status, RecordStatus::Ok);
        assert_eq!(rec.verified_by, Some(actor));
        assert!(rec.verified_at.is_some());
        let first_id = rec.id;

        let rec = session
            .set_status(fx.item_id, &fx.locations[0], RecordStatus::NotOk)
            .await
            .unwrap();
        // Same record mutated, no duplicate created.
        assert_eq!(rec.id, first_id);
        assert_eq!(fx.backend.record_count(fx.checklist_id), 2);
    }

    #[tokio::test]
    async fn note_and_photo_leave_status_and_attribution_alone() {
        let fx = fixture().await;
        fx.backend.set_actor(Some(ActorId::new()));
        let mut session = tracker(&fx).await;

        let rec = session
            .set_note(fx.item_id, &fx.locations[0], Some("switch loose".into()))
            .await
            .unwrap();
        assert_eq!(rec.status, RecordStatus::Pending);
        assert!(rec.verified_at.is_none());
        assert!(rec.verified_by.is_none());

        let rec = session
            .attach_photo(
                fx.item_id,
                &fx.locations[0],
                PhotoUpload {
                    file_name: "socket.jpg".into(),
                    bytes: vec![0xFF, 0xD8],
                },
            )
            .await
            .unwrap();
        assert_eq!(rec.status, RecordStatus::Pending);
        assert!(rec.verified_by.is_none());
        assert!(rec.photo_url.is_some());
    }

    #[tokio::test]
    async fn status_does_not_clear_note_or_photo() {
        let fx = fixture().await;
        let mut session = tracker(&fx).await;

        session
            .set_note(fx.item_id, &fx.locations[0], Some("hairline crack".into()))
            .await
            .unwrap();
        let rec = session
            .set_status(fx.item_id, &fx.locations[0], RecordStatus::NotOk)
            .await
            .unwrap();
        assert_eq!(rec.note.as_deref(), Some("hairline crack"));
        assert_eq!(rec.status, RecordStatus::NotOk);
    }

    #[tokio::test]
    async fn photo_url_uses_checklist_scoped_path() {
        let fx = fixture().await;
        let mut session = tracker(&fx).await;

        let rec = session
            .attach_photo(
                fx.item_id,
                &fx.locations[1],
                PhotoUpload {
                    file_name: "panel.jpg".into(),
                    bytes: vec![1, 2, 3],
                },
            )
            .await
            .unwrap();
        let url = rec.photo_url.as_deref().unwrap();
        assert!(url.contains(&fx.checklist_id.to_string()));
        assert!(url.ends_with("_panel.jpg"));
    }

    #[tokio::test]
    async fn missing_pair_is_created_exactly_once() {
        let fx = fixture().await;
        let mut session = tracker(&fx).await;

        // A unit added after activation has no materialized records.
        let late_unit = LocationKey::Unit {
            floor_id: fx.locations[0].floor_id(),
            unit_id: UnitId::new(),
        };
        assert!(session.record(fx.item_id, &late_unit).is_none());

        session
            .set_status(fx.item_id, &late_unit, RecordStatus::Ok)
            .await
            .unwrap();
        assert_eq!(fx.backend.record_count(fx.checklist_id), 3);

        // Second upsert on the same pair updates, not inserts.
        session
            .set_note(fx.item_id, &late_unit, Some("late addition".into()))
            .await
            .unwrap();
        assert_eq!(fx.backend.record_count(fx.checklist_id), 3);

        let rec = session.record(fx.item_id, &late_unit).unwrap();
        assert_eq!(rec.status, RecordStatus::Ok);
        assert_eq!(rec.note.as_deref(), Some("late addition"));
    }

    #[tokio::test]
    async fn lazy_status_creation_is_not_pending() {
        let fx = fixture().await;
        let mut session = tracker(&fx).await;

        let late_unit = LocationKey::Unit {
            floor_id: fx.locations[0].floor_id(),
            unit_id: UnitId::new(),
        };
        let rec = session
            .set_status(fx.item_id, &late_unit, RecordStatus::NotApplicable)
            .await
            .unwrap();
        assert_eq!(rec.status, RecordStatus::NotApplicable);
        assert!(rec.verified_at.is_some());
    }

    #[tokio::test]
    async fn progress_tracks_status_changes() {
        let fx = fixture().await;
        let mut session = tracker(&fx).await;

        assert_eq!(session.overall_progress().percent, 0);

        session
            .set_status(fx.item_id, &fx.locations[0], RecordStatus::Ok)
            .await
            .unwrap();
        let overall = session.overall_progress();
        assert_eq!(overall.done, 1);
        assert_eq!(overall.total, 2);
        assert_eq!(overall.percent, 50);

        let at_first = session.location_progress(&fx.locations[0]).unwrap();
        assert_eq!(at_first.percent, 100);
        assert_eq!(at_first.non_conforming, 0);

        let at_second = session.location_progress(&fx.locations[1]).unwrap();
        assert_eq!(at_second.percent, 0);
    }
}
