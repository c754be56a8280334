//! Identity service contract

use async_trait::async_trait;
use sitecheck_model::ActorId;

/// Async identity collaborator
///
/// Reports who is performing the current operation; `None` when no actor
/// is authenticated. Used to stamp `verified_by` on status updates.
#[async_trait]
pub trait Identity: Send + Sync {
    /// Id of the current actor, if any
    async fn current_actor(&self) -> Option<ActorId>;
}
