//! Physical location hierarchy
//!
//! Three levels: floor → unit → room. These rows are owned by the
//! surrounding CRUD screens; the engine only reads and expands against
//! them. `position` fields drive display/iteration order, not identity.

use crate::ids::{FloorId, ProjectId, RoomId, UnitId};
use serde::{Deserialize, Serialize};

/// Top-level physical subdivision of a project (a building story)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub project_id: ProjectId,
    pub name: String,
    /// Display/iteration order within the project
    pub position: u32,
}

/// Subdivision of a floor (an apartment)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub floor_id: FloorId,
    pub name: String,
    /// Display/iteration order within the floor
    pub position: u32,
}

/// Subdivision of a unit (a kitchen, a bathroom)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub unit_id: UnitId,
    pub name: String,
}
