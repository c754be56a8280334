//! In-memory backend
//!
//! Implements all three collaborator contracts over [`DashMap`] tables.
//! Used by the engine's tests and by demos; doubles as the reference
//! semantics for real backends, notably the composite unique key on
//! verification records.

use crate::error::{PersistError, StorageError};
use crate::identity::Identity;
use crate::persistence::Persistence;
use crate::storage::BlobStorage;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sitecheck_model::{
    ActorId, Checklist, ChecklistId, ChecklistItem, ChecklistStatus, Floor, FloorId, ItemId,
    ItemScope, NewVerificationRecord, ProjectId, RecordId, RecordKey, RecordUpdate, Room, RoomId,
    Unit, UnitId, VerificationRecord,
};
use std::collections::HashSet;
use std::sync::Mutex;

/// In-memory persistence, blob storage and identity in one struct
#[derive(Debug, Default)]
pub struct MemoryBackend {
    checklists: DashMap<ChecklistId, Checklist>,
    items: DashMap<ItemId, ChecklistItem>,
    floors: DashMap<FloorId, Floor>,
    units: DashMap<UnitId, Unit>,
    rooms: DashMap<RoomId, Room>,
    records: DashMap<RecordId, VerificationRecord>,
    blobs: DashMap<String, Vec<u8>>,
    actor: Mutex<Option<ActorId>>,
    /// Fail whole batches on conflict instead of skipping rows
    batch_conflict_errors: bool,
    /// Number of bulk inserts left before injected failure, if armed
    insert_fault: Mutex<Option<usize>>,
    public_base_url: Option<String>,
}

impl MemoryBackend {
    /// Empty backend with insert-or-ignore conflict semantics
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject a whole batch with `DuplicateKey` when any row conflicts,
    /// matching backends without per-row insert-or-ignore
    #[must_use]
    pub fn with_batch_conflict_errors(mut self) -> Self {
        self.batch_conflict_errors = true;
        self
    }

    /// Base URL prefix used by [`BlobStorage::public_url`]
    #[must_use]
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    /// Arm a fault: the next `ok_batches` bulk inserts succeed, every one
    /// after that fails with a backend error
    pub fn fail_inserts_after(&self, ok_batches: usize) {
        *self.insert_fault.lock().unwrap_or_else(|e| e.into_inner()) = Some(ok_batches);
    }

    /// Set the actor reported by the identity contract
    pub fn set_actor(&self, actor: Option<ActorId>) {
        *self.actor.lock().unwrap_or_else(|e| e.into_inner()) = actor;
    }

    /// Seed a draft checklist
    pub fn add_checklist(&self, project_id: ProjectId, name: &str) -> Checklist {
        let checklist = Checklist {
            id: ChecklistId::new(),
            project_id,
            name: name.to_string(),
            description: None,
            status: ChecklistStatus::Draft,
            created_at: Utc::now(),
        };
        self.checklists.insert(checklist.id, checklist.clone());
        checklist
    }

    /// Seed a checklist item; position is assigned append-style
    pub fn add_item(&self, checklist_id: ChecklistId, name: &str, scope: ItemScope) -> ChecklistItem {
        let position = self
            .items
            .iter()
            .filter(|i| i.checklist_id == checklist_id)
            .count() as u32;
        let item = ChecklistItem {
            id: ItemId::new(),
            checklist_id,
            name: name.to_string(),
            position,
            scope,
        };
        self.items.insert(item.id, item.clone());
        item
    }

    /// Seed a floor; position is assigned append-style
    pub fn add_floor(&self, project_id: ProjectId, name: &str) -> Floor {
        let position = self
            .floors
            .iter()
            .filter(|f| f.project_id == project_id)
            .count() as u32;
        let floor = Floor {
            id: FloorId::new(),
            project_id,
            name: name.to_string(),
            position,
        };
        self.floors.insert(floor.id, floor.clone());
        floor
    }

    /// Seed a unit; position is assigned append-style
    pub fn add_unit(&self, floor_id: FloorId, name: &str) -> Unit {
        let position = self
            .units
            .iter()
            .filter(|u| u.floor_id == floor_id)
            .count() as u32;
        let unit = Unit {
            id: UnitId::new(),
            floor_id,
            name: name.to_string(),
            position,
        };
        self.units.insert(unit.id, unit.clone());
        unit
    }

    /// Seed a room
    pub fn add_room(&self, unit_id: UnitId, name: &str) -> Room {
        let room = Room {
            id: RoomId::new(),
            unit_id,
            name: name.to_string(),
        };
        self.rooms.insert(room.id, room.clone());
        room
    }

    /// Number of persisted records for a checklist
    #[must_use]
    pub fn record_count(&self, checklist_id: ChecklistId) -> usize {
        self.records
            .iter()
            .filter(|r| r.checklist_id == checklist_id)
            .count()
    }

    fn occupied_keys(&self) -> HashSet<RecordKey> {
        self.records.iter().map(|r| RecordKey::of(r.value())).collect()
    }

    fn persist_row(&self, row: NewVerificationRecord) -> VerificationRecord {
        let record = VerificationRecord {
            id: RecordId::new(),
            checklist_id: row.checklist_id,
            item_id: row.item_id,
            floor_id: row.floor_id,
            unit_id: row.unit_id,
            room_id: row.room_id,
            status: row.status,
            note: row.note,
            photo_url: row.photo_url,
            verified_at: row.verified_at,
            verified_by: row.verified_by,
            created_at: Utc::now(),
        };
        self.records.insert(record.id, record.clone());
        record
    }

    fn take_insert_fault(&self) -> Result<(), PersistError> {
        let mut fault = self.insert_fault.lock().unwrap_or_else(|e| e.into_inner());
        match fault.as_mut() {
            Some(0) => Err(PersistError::Backend("injected insert failure".into())),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Persistence for MemoryBackend {
    async fn checklist(&self, id: ChecklistId) -> Result<Option<Checklist>, PersistError> {
        Ok(self.checklists.get(&id).map(|c| c.clone()))
    }

    async fn update_checklist_status(
        &self,
        id: ChecklistId,
        status: ChecklistStatus,
    ) -> Result<Checklist, PersistError> {
        let mut entry = self
            .checklists
            .get_mut(&id)
            .ok_or_else(|| PersistError::NotFound(format!("checklist {id}")))?;
        entry.status = status;
        Ok(entry.clone())
    }

    async fn items_for_checklist(
        &self,
        id: ChecklistId,
    ) -> Result<Vec<ChecklistItem>, PersistError> {
        let mut items: Vec<_> = self
            .items
            .iter()
            .filter(|i| i.checklist_id == id)
            .map(|i| i.clone())
            .collect();
        items.sort_by_key(|i| i.position);
        Ok(items)
    }

    async fn floors_for_project(&self, id: ProjectId) -> Result<Vec<Floor>, PersistError> {
        let mut floors: Vec<_> = self
            .floors
            .iter()
            .filter(|f| f.project_id == id)
            .map(|f| f.clone())
            .collect();
        floors.sort_by_key(|f| f.position);
        Ok(floors)
    }

    async fn units_for_floors(&self, floor_ids: &[FloorId]) -> Result<Vec<Unit>, PersistError> {
        let mut units: Vec<_> = self
            .units
            .iter()
            .filter(|u| floor_ids.contains(&u.floor_id))
            .map(|u| u.clone())
            .collect();
        units.sort_by_key(|u| u.position);
        Ok(units)
    }

    async fn rooms_for_units(&self, unit_ids: &[UnitId]) -> Result<Vec<Room>, PersistError> {
        Ok(self
            .rooms
            .iter()
            .filter(|r| unit_ids.contains(&r.unit_id))
            .map(|r| r.clone())
            .collect())
    }

    async fn records_for_checklist(
        &self,
        id: ChecklistId,
    ) -> Result<Vec<VerificationRecord>, PersistError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.checklist_id == id)
            .map(|r| r.clone())
            .collect())
    }

    async fn insert_records(
        &self,
        rows: Vec<NewVerificationRecord>,
    ) -> Result<Vec<VerificationRecord>, PersistError> {
        self.take_insert_fault()?;
        let occupied = self.occupied_keys();

        if self.batch_conflict_errors && rows.iter().any(|row| occupied.contains(&row.key())) {
            return Err(PersistError::DuplicateKey(
                "verification_records (item_id, location)".into(),
            ));
        }

        let mut inserted = Vec::new();
        let mut seen = occupied;
        for row in rows {
            // Insert-or-ignore on the composite unique key; duplicates
            // within the batch are skipped too.
            if seen.insert(row.key()) {
                inserted.push(self.persist_row(row));
            }
        }
        Ok(inserted)
    }

    async fn insert_record(
        &self,
        row: NewVerificationRecord,
    ) -> Result<VerificationRecord, PersistError> {
        if self.occupied_keys().contains(&row.key()) {
            return Err(PersistError::DuplicateKey(
                "verification_records (item_id, location)".into(),
            ));
        }
        Ok(self.persist_row(row))
    }

    async fn update_record(
        &self,
        id: RecordId,
        update: RecordUpdate,
    ) -> Result<VerificationRecord, PersistError> {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or_else(|| PersistError::NotFound(format!("record {id}")))?;
        match update {
            RecordUpdate::Status {
                status,
                verified_at,
                verified_by,
            } => {
                entry.status = status;
                entry.verified_at = Some(verified_at);
                entry.verified_by = verified_by;
            }
            RecordUpdate::Note(note) => entry.note = note,
            RecordUpdate::Photo(url) => entry.photo_url = Some(url),
        }
        Ok(entry.clone())
    }
}

#[async_trait]
impl BlobStorage for MemoryBackend {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        self.blobs.insert(path.to_string(), bytes);
        Ok(path.to_string())
    }

    fn public_url(&self, stored_path: &str) -> String {
        let base = self.public_base_url.as_deref().unwrap_or("memory://blobs");
        format!("{base}/{stored_path}")
    }
}

#[async_trait]
impl Identity for MemoryBackend {
    async fn current_actor(&self) -> Option<ActorId> {
        *self.actor.lock().unwrap_or_else(|e| e.into_inner())
    }
}
