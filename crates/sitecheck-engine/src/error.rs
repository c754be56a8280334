//! Error types for the engine
//!
//! Three families:
//! - Precondition failures: reported before any write, user-correctable
//!   (add items or locations and retry)
//! - Collaborator failures: persistence or storage errors that abort the
//!   current operation; retryable, no checklist status flip
//! - Lookups: the addressed checklist does not exist

use sitecheck_backend::{PersistError, StorageError};
use sitecheck_model::ChecklistId;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No checklist with this id
    #[error("checklist not found: {0}")]
    ChecklistNotFound(ChecklistId),

    /// Activation requires at least one item
    #[error("checklist has no items")]
    EmptyChecklist,

    /// A unit-scope item exists but the project has no units
    #[error("project has no units defined")]
    NoUnitsDefined,

    /// A room-scope item exists but the project has no rooms
    #[error("project has no rooms defined")]
    NoRoomsDefined,

    /// Persistence collaborator failed
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistError),

    /// Blob storage collaborator failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl EngineError {
    /// Precondition failures happen before any write and are corrected by
    /// the user, not by retrying
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::EmptyChecklist | Self::NoUnitsDefined | Self::NoRoomsDefined
        )
    }

    /// Collaborator failures are safe to retry; activation resumes via
    /// duplicate-skip, upserts are idempotent per key
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Storage(_))
    }
}
