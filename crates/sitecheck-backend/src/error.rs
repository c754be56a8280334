//! Error taxonomy for the collaborator contracts
//!
//! Persistence errors are classified so the engine can tell recoverable
//! duplicate-key conflicts (evidence of a prior partial activation) apart
//! from fatal write failures.

/// Persistence service error
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// A row violating the composite unique key already exists
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// The addressed row does not exist
    #[error("row not found: {0}")]
    NotFound(String),

    /// Any other backend failure (connection, constraint, timeout)
    #[error("backend error: {0}")]
    Backend(String),
}

impl PersistError {
    /// Duplicate-key conflicts are recoverable during activation
    #[inline]
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateKey(_))
    }
}

/// Blob storage service error
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Upload was rejected or interrupted
    #[error("upload failed: {0}")]
    UploadFailed(String),
}
