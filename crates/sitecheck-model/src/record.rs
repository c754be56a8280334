//! Verification records and their composite keys
//!
//! A verification record is the per-(item, location) unit of tracked
//! state. The central invariant: exactly one record exists per
//! `(item_id, location)` pair, where the location is the floor, unit or
//! room id depending on the item's scope. [`RecordKey`] encodes that pair
//! so that in-memory lookups cannot collide across scope levels.

use crate::checklist::ItemScope;
use crate::ids::{ActorId, ChecklistId, FloorId, ItemId, RecordId, RoomId, UnitId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Execution status of a single verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    Ok,
    NotOk,
    NotApplicable,
}

impl RecordStatus {
    /// A record counts towards completion once it left `Pending`
    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Non-conforming result, surfaced for visual escalation
    #[inline]
    #[must_use]
    pub fn is_non_conforming(&self) -> bool {
        matches!(self, Self::NotOk)
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Ok => "ok",
            Self::NotOk => "not_ok",
            Self::NotApplicable => "not_applicable",
        };
        f.write_str(s)
    }
}

/// Scope-appropriate location tuple used by callers of the execution
/// tracker
///
/// Carries the full parent chain so a missing record can be constructed
/// lazily with every foreign key populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKey {
    /// Floor-scope verification
    Floor(FloorId),
    /// Unit-scope verification
    Unit { floor_id: FloorId, unit_id: UnitId },
    /// Room-scope verification
    Room {
        floor_id: FloorId,
        unit_id: UnitId,
        room_id: RoomId,
    },
}

impl LocationKey {
    /// The hierarchy level this key addresses
    #[inline]
    #[must_use]
    pub fn scope(&self) -> ItemScope {
        match self {
            Self::Floor(_) => ItemScope::Floor,
            Self::Unit { .. } => ItemScope::Unit,
            Self::Room { .. } => ItemScope::Room,
        }
    }

    /// Floor id, set at every scope level
    #[inline]
    #[must_use]
    pub fn floor_id(&self) -> FloorId {
        match self {
            Self::Floor(floor_id) => *floor_id,
            Self::Unit { floor_id, .. } | Self::Room { floor_id, .. } => *floor_id,
        }
    }

    /// Unit id, set for unit- and room-scope keys
    #[inline]
    #[must_use]
    pub fn unit_id(&self) -> Option<UnitId> {
        match self {
            Self::Floor(_) => None,
            Self::Unit { unit_id, .. } | Self::Room { unit_id, .. } => Some(*unit_id),
        }
    }

    /// Room id, set for room-scope keys
    #[inline]
    #[must_use]
    pub fn room_id(&self) -> Option<RoomId> {
        match self {
            Self::Room { room_id, .. } => Some(*room_id),
            _ => None,
        }
    }
}

/// The scope-level location id of a record
///
/// The enum discriminant doubles as the scope prefix, so a unit id and a
/// room id that happen to collide byte-wise still produce distinct keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationRef {
    Floor(FloorId),
    Unit(UnitId),
    Room(RoomId),
}

/// Composite lookup key for a verification record: one per
/// `(item, location)` pair within a checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub item_id: ItemId,
    pub location: LocationRef,
}

impl RecordKey {
    /// Key for an item at a caller-supplied location
    #[inline]
    #[must_use]
    pub fn new(item_id: ItemId, location: &LocationKey) -> Self {
        let location = match location {
            LocationKey::Floor(floor_id) => LocationRef::Floor(*floor_id),
            LocationKey::Unit { unit_id, .. } => LocationRef::Unit(*unit_id),
            LocationKey::Room { room_id, .. } => LocationRef::Room(*room_id),
        };
        Self { item_id, location }
    }

    /// Derive the key of a persisted record
    ///
    /// The deepest populated location id wins: room, then unit, then
    /// floor. This mirrors how records are materialized per item scope.
    #[inline]
    #[must_use]
    pub fn of(record: &VerificationRecord) -> Self {
        let location = if let Some(room_id) = record.room_id {
            LocationRef::Room(room_id)
        } else if let Some(unit_id) = record.unit_id {
            LocationRef::Unit(unit_id)
        } else {
            LocationRef::Floor(record.floor_id)
        };
        Self {
            item_id: record.item_id,
            location,
        }
    }
}

/// A persisted verification record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: RecordId,
    pub checklist_id: ChecklistId,
    pub item_id: ItemId,
    /// Always set, regardless of scope
    pub floor_id: FloorId,
    /// Set iff the item scope is unit or room
    pub unit_id: Option<UnitId>,
    /// Set iff the item scope is room
    pub room_id: Option<RoomId>,
    pub status: RecordStatus,
    pub note: Option<String>,
    pub photo_url: Option<String>,
    /// When the status was last explicitly set
    pub verified_at: Option<DateTime<Utc>>,
    /// Who last explicitly set the status
    pub verified_by: Option<ActorId>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a verification record
///
/// The backend assigns `id` and `created_at` and returns the
/// authoritative row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVerificationRecord {
    pub checklist_id: ChecklistId,
    pub item_id: ItemId,
    pub floor_id: FloorId,
    pub unit_id: Option<UnitId>,
    pub room_id: Option<RoomId>,
    pub status: RecordStatus,
    pub note: Option<String>,
    pub photo_url: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<ActorId>,
}

impl NewVerificationRecord {
    /// Pending skeleton for an item at a location
    #[must_use]
    pub fn pending(checklist_id: ChecklistId, item_id: ItemId, location: &LocationKey) -> Self {
        Self {
            checklist_id,
            item_id,
            floor_id: location.floor_id(),
            unit_id: location.unit_id(),
            room_id: location.room_id(),
            status: RecordStatus::Pending,
            note: None,
            photo_url: None,
            verified_at: None,
            verified_by: None,
        }
    }

    /// Lookup key this row will occupy once inserted
    #[inline]
    #[must_use]
    pub fn key(&self) -> RecordKey {
        let location = if let Some(room_id) = self.room_id {
            LocationRef::Room(room_id)
        } else if let Some(unit_id) = self.unit_id {
            LocationRef::Unit(unit_id)
        } else {
            LocationRef::Floor(self.floor_id)
        };
        RecordKey {
            item_id: self.item_id,
            location,
        }
    }

    /// Merge a partial update into the skeleton (lazy-creation path)
    #[must_use]
    pub fn with_update(mut self, update: RecordUpdate) -> Self {
        match update {
            RecordUpdate::Status {
                status,
                verified_at,
                verified_by,
            } => {
                self.status = status;
                self.verified_at = Some(verified_at);
                self.verified_by = verified_by;
            }
            RecordUpdate::Note(note) => self.note = note,
            RecordUpdate::Photo(url) => self.photo_url = Some(url),
        }
        self
    }
}

/// Typed partial update of a verification record
///
/// Only explicit status-setting counts as "verifying": the `Status`
/// variant is the only one carrying attribution. Note and photo updates
/// leave `verified_at` / `verified_by` untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordUpdate {
    /// Set the execution status and stamp attribution
    Status {
        status: RecordStatus,
        verified_at: DateTime<Utc>,
        verified_by: Option<ActorId>,
    },
    /// Set or clear the free-text note
    Note(Option<String>),
    /// Set the photo URL
    Photo(String),
}
