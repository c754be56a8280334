//! SiteCheck Backend - collaborator contracts
//!
//! The engine consumes three narrow async contracts:
//! - [`Persistence`]: table-style CRUD over the inspection tables
//! - [`BlobStorage`]: photo upload returning a stable public URL
//! - [`Identity`]: the current actor's id
//!
//! [`MemoryBackend`] implements all three in-process and powers the
//! workspace's tests; production deployments plug in their own
//! implementations.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod identity;
pub mod memory;
pub mod persistence;
pub mod storage;

// Re-exports for convenience
pub use error::{PersistError, StorageError};
pub use identity::Identity;
pub use memory::MemoryBackend;
pub use persistence::Persistence;
pub use storage::BlobStorage;
