//! Typed entity identifiers
//!
//! Every table gets its own id newtype so that a floor id can never be
//! passed where a unit id is expected. All ids are UUIDv4 underneath,
//! matching what the persistence backend assigns.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

entity_id!(
    /// Identifier of a project (a construction site)
    ProjectId
);
entity_id!(
    /// Identifier of a floor within a project
    FloorId
);
entity_id!(
    /// Identifier of a unit within a floor
    UnitId
);
entity_id!(
    /// Identifier of a room within a unit
    RoomId
);
entity_id!(
    /// Identifier of a checklist definition
    ChecklistId
);
entity_id!(
    /// Identifier of a checklist item
    ItemId
);
entity_id!(
    /// Identifier of a verification record
    RecordId
);
entity_id!(
    /// Identifier of the acting user, as reported by the identity service
    ActorId
);
