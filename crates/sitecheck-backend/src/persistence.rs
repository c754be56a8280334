//! Persistence service contract
//!
//! Table-style CRUD over the inspection tables, abstracted from the
//! concrete backend. The engine never talks to storage directly; it
//! consumes this trait and works with whatever rows come back.

use crate::error::PersistError;
use async_trait::async_trait;
use sitecheck_model::{
    Checklist, ChecklistId, ChecklistItem, ChecklistStatus, Floor, FloorId, NewVerificationRecord,
    ProjectId, RecordId, RecordUpdate, Room, Unit, UnitId, VerificationRecord,
};

/// Async persistence collaborator
///
/// Implementations must enforce the composite unique key on verification
/// records: one row per `(item_id, scope-level location id)` pair. Bulk
/// inserts may either skip conflicting rows (insert-or-ignore, preferred
/// where the backend supports it) or fail the whole batch with
/// [`PersistError::DuplicateKey`]; the engine tolerates both.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Fetch a checklist by id
    async fn checklist(&self, id: ChecklistId) -> Result<Option<Checklist>, PersistError>;

    /// Update a checklist's lifecycle status, returning the updated row
    async fn update_checklist_status(
        &self,
        id: ChecklistId,
        status: ChecklistStatus,
    ) -> Result<Checklist, PersistError>;

    /// Items of a checklist, ordered by `position`
    async fn items_for_checklist(
        &self,
        id: ChecklistId,
    ) -> Result<Vec<ChecklistItem>, PersistError>;

    /// Floors of a project, ordered by `position`
    async fn floors_for_project(&self, id: ProjectId) -> Result<Vec<Floor>, PersistError>;

    /// Units belonging to any of the given floors, ordered by `position`
    async fn units_for_floors(&self, floor_ids: &[FloorId]) -> Result<Vec<Unit>, PersistError>;

    /// Rooms belonging to any of the given units
    async fn rooms_for_units(&self, unit_ids: &[UnitId]) -> Result<Vec<Room>, PersistError>;

    /// All verification records of a checklist
    async fn records_for_checklist(
        &self,
        id: ChecklistId,
    ) -> Result<Vec<VerificationRecord>, PersistError>;

    /// Bulk-insert verification records, returning the persisted rows
    async fn insert_records(
        &self,
        rows: Vec<NewVerificationRecord>,
    ) -> Result<Vec<VerificationRecord>, PersistError>;

    /// Insert a single verification record, returning the persisted row
    async fn insert_record(
        &self,
        row: NewVerificationRecord,
    ) -> Result<VerificationRecord, PersistError>;

    /// Apply a partial update to a record, returning the updated row
    async fn update_record(
        &self,
        id: RecordId,
        update: RecordUpdate,
    ) -> Result<VerificationRecord, PersistError>;
}
