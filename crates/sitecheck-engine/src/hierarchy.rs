//! Location hierarchy reader
//!
//! Read-only projection of a project's physical structure. Loaded once
//! per operation in three narrowing queries (floors, their units, their
//! rooms); lower levels are skipped entirely when a level comes back
//! empty.

use sitecheck_backend::{PersistError, Persistence};
use sitecheck_model::{Floor, FloorId, ItemScope, ProjectId, Room, RoomId, Unit, UnitId};
use std::collections::HashMap;

/// Snapshot of a project's floor → unit → room structure
///
/// Level slices keep backend order (by `position`). Parent resolution
/// tolerates orphans: a unit whose floor is missing, or a room whose unit
/// or floor is missing, simply resolves to `None`.
#[derive(Debug, Clone, Default)]
pub struct SiteHierarchy {
    floors: Vec<Floor>,
    units: Vec<Unit>,
    rooms: Vec<Room>,
    floor_index: HashMap<FloorId, usize>,
    unit_index: HashMap<UnitId, usize>,
    room_index: HashMap<RoomId, usize>,
}

impl SiteHierarchy {
    /// Load the full hierarchy of a project
    pub async fn load(
        db: &dyn Persistence,
        project_id: ProjectId,
    ) -> Result<Self, PersistError> {
        let floors = db.floors_for_project(project_id).await?;

        let units = if floors.is_empty() {
            Vec::new()
        } else {
            let floor_ids: Vec<_> = floors.iter().map(|f| f.id).collect();
            db.units_for_floors(&floor_ids).await?
        };

        let rooms = if units.is_empty() {
            Vec::new()
        } else {
            let unit_ids: Vec<_> = units.iter().map(|u| u.id).collect();
            db.rooms_for_units(&unit_ids).await?
        };

        Ok(Self::from_rows(floors, units, rooms))
    }

    /// Build a hierarchy from already-loaded rows
    #[must_use]
    pub fn from_rows(floors: Vec<Floor>, units: Vec<Unit>, rooms: Vec<Room>) -> Self {
        let floor_index = floors.iter().enumerate().map(|(i, f)| (f.id, i)).collect();
        let unit_index = units.iter().enumerate().map(|(i, u)| (u.id, i)).collect();
        let room_index = rooms.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
        Self {
            floors,
            units,
            rooms,
            floor_index,
            unit_index,
            room_index,
        }
    }

    /// Floors in display order
    #[inline]
    #[must_use]
    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    /// Units in display order
    #[inline]
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Rooms, backend order
    #[inline]
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Look up a floor by id
    #[must_use]
    pub fn floor(&self, id: FloorId) -> Option<&Floor> {
        self.floor_index.get(&id).map(|&i| &self.floors[i])
    }

    /// Look up a unit by id
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.unit_index.get(&id).map(|&i| &self.units[i])
    }

    /// Look up a room by id
    #[must_use]
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.room_index.get(&id).map(|&i| &self.rooms[i])
    }

    /// Units belonging to a floor, in display order
    pub fn units_of(&self, floor_id: FloorId) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(move |u| u.floor_id == floor_id)
    }

    /// Rooms belonging to a unit
    pub fn rooms_of(&self, unit_id: UnitId) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(move |r| r.unit_id == unit_id)
    }

    /// Parent floor of a unit, `None` if the reference is dangling
    #[must_use]
    pub fn floor_of(&self, unit: &Unit) -> Option<&Floor> {
        self.floor(unit.floor_id)
    }

    /// Parent floor and unit of a room, `None` if either is dangling
    #[must_use]
    pub fn parents_of(&self, room: &Room) -> Option<(&Floor, &Unit)> {
        let unit = self.unit(room.unit_id)?;
        let floor = self.floor_of(unit)?;
        Some((floor, unit))
    }

    /// Number of locations at a scope level
    #[must_use]
    pub fn location_count(&self, scope: ItemScope) -> usize {
        match scope {
            ItemScope::Floor => self.floors.len(),
            ItemScope::Unit => self.units.len(),
            ItemScope::Room => self.rooms.len(),
        }
    }
}
