//! Checklist definitions
//!
//! A checklist is an ordered list of verification items, each tagged with
//! the hierarchy level at which it must be independently verified.

use crate::ids::{ChecklistId, ItemId, ProjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a checklist
///
/// `Draft -> Active` happens exactly once, through activation.
/// `Completed` is terminal and set by the surrounding workflow, never by
/// the engine. No transition returns to `Draft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStatus {
    Draft,
    Active,
    Completed,
}

impl ChecklistStatus {
    /// Whether items may still be freely added or removed
    #[inline]
    #[must_use]
    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl std::fmt::Display for ChecklistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Hierarchy level at which an item is verified: one record per floor,
/// per unit, or per room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemScope {
    Floor,
    Unit,
    Room,
}

impl std::fmt::Display for ItemScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Floor => "floor",
            Self::Unit => "unit",
            Self::Room => "room",
        };
        f.write_str(s)
    }
}

/// A reusable checklist definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    pub id: ChecklistId,
    pub project_id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub status: ChecklistStatus,
    pub created_at: DateTime<Utc>,
}

/// One verification item within a checklist
///
/// Edits after activation affect only future activations, never
/// already-materialized records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: ItemId,
    pub checklist_id: ChecklistId,
    pub name: String,
    /// Display/iteration order within the checklist
    pub position: u32,
    pub scope: ItemScope,
}
