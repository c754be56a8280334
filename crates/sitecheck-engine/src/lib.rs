//! Checklist engine for construction-site inspections
//!
//! The pieces that turn a checklist definition into field work:
//! - Loads the floor → unit → room hierarchy of a project
//! - Activates a checklist by expanding items across matching locations
//! - Tracks verification status, notes and photos during execution
//! - Aggregates progress, pendencies and a per-floor detail report
//!
//! # Example
//!
//! ```rust,ignore
//! use sitecheck_engine::{ActivationEngine, ExecutionTracker, ReportBuilder};
//!
//! # async fn example(db: std::sync::Arc<sitecheck_backend::MemoryBackend>) -> Result<(), Box<dyn std::error::Error>> {
//! # let checklist_id = sitecheck_model::ChecklistId::new();
//! let outcome = ActivationEngine::new(db.clone()).activate(checklist_id).await?;
//! println!("activated {} of {} planned records", outcome.inserted, outcome.planned);
//!
//! let report = ReportBuilder::new(db).build(checklist_id, None).await?;
//! println!("{}% complete", report.overall_percent);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod activation;
pub mod error;
pub mod execution;
pub mod hierarchy;
pub mod progress;
pub mod report;

// Re-exports for convenience
pub use activation::{plan_expansion, ActivationEngine, ActivationOutcome};
pub use error::EngineError;
pub use execution::{ExecutionTracker, PhotoUpload};
pub use hierarchy::SiteHierarchy;
pub use progress::{location_progress, overall_progress, LocationProgress, OverallProgress};
pub use report::{
    DetailRow, FloorSection, PendencyEntry, Report, ReportBuilder, StatusCounts,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the checklist engine
    pub use crate::{
        ActivationEngine, ActivationOutcome, EngineError, ExecutionTracker, PhotoUpload, Report,
        ReportBuilder, SiteHierarchy, StatusCounts,
    };
    pub use sitecheck_model::{
        ChecklistId, ChecklistStatus, ItemScope, LocationKey, RecordStatus,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
