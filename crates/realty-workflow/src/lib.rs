//! Realty Workflow - progress tracking engine
//!
//! Tracks the four wizard workflows of the investor app:
//! - Persists one [`WorkflowState`] per category behind a [`KeyValueStore`]
//! - Derives step status, blocking and progress percentages from the catalog
//! - Applies user actions (go to step, complete, reset) as [`Outcome`]s that
//!   never fail loudly: invalid references become logged diagnostics
//! - Exports and imports progress as JSON documents
//!
//! # Example
//!
//! ```rust
//! use realty_catalog::{Catalog, WorkflowCategory};
//! use realty_workflow::{EngineConfig, MemoryStore, WorkflowEngine};
//!
//! let catalog = Catalog::builtin()?;
//! let mut engine = WorkflowEngine::new(catalog, MemoryStore::new(), EngineConfig::default());
//!
//! let outcome = engine.mark_step_complete("property-data", WorkflowCategory::Tax);
//! assert!(outcome.is_applied());
//!
//! let state = engine.state(WorkflowCategory::Tax);
//! let completed = state.completed_steps();
//! assert!(!engine.is_step_blocked("rental-income", WorkflowCategory::Tax, completed));
//! # Ok::<(), realty_catalog::CatalogError>(())
//! ```

pub mod capability;
pub mod config;
pub mod engine;
pub mod error;
pub mod progress;
pub mod state;
pub mod store;
pub mod transfer;

// Re-exports for convenience
pub use capability::{
    Localizer, Navigator, NoticeLevel, Notifier, RecordingNavigator, StaticLocalizer,
    TracingNotifier,
};
pub use config::EngineConfig;
pub use engine::{CategoryOverview, Outcome, WorkflowEngine};
pub use error::{ConfigError, StoreError, TransferError, WorkflowError};
pub use progress::{StepStatus, StepView};
pub use state::{CompletedSteps, WorkflowState};
pub use store::{FileStore, KeyValueStore, MemoryStore, StateChange, StateStore};
pub use transfer::{export_file_name, CategoryExport, ImportReport};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the workflow engine
    pub use crate::{
        EngineConfig, KeyValueStore, Localizer, Navigator, Notifier, Outcome, StepStatus,
        WorkflowEngine, WorkflowState,
    };
    pub use realty_catalog::{Catalog, WorkflowCategory};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
