//! SiteCheck Model - domain types for site inspection checklists
//!
//! Defines the shared vocabulary of the workspace:
//! - Typed ids per entity
//! - The physical location hierarchy (floor → unit → room)
//! - Checklist definitions and their scoped items
//! - Verification records, composite record keys and partial updates
//!
//! Pure data, no IO. Collaborator contracts live in `sitecheck-backend`,
//! behavior in `sitecheck-engine`.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod checklist;
pub mod ids;
pub mod record;
pub mod site;

// Re-exports for convenience
pub use checklist::{Checklist, ChecklistItem, ChecklistStatus, ItemScope};
pub use ids::{ActorId, ChecklistId, FloorId, ItemId, ProjectId, RecordId, RoomId, UnitId};
pub use record::{
    LocationKey, LocationRef, NewVerificationRecord, RecordKey, RecordStatus, RecordUpdate,
    VerificationRecord,
};
pub use site::{Floor, Room, Unit};
