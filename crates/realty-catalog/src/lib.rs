//! Realty Catalog - workflow step definitions
//!
//! Declares the four independent workflow wizards of the investor app and
//! their ordered steps:
//! - [`WorkflowCategory`]: the closed set of workflows (tax, property, ...)
//! - [`StepDefinition`]: one step with localized label, path and dependencies
//! - [`Catalog`]: the validated, immutable registry of all categories
//! - [`DependencyGraph`]: per-category dependency DAG backed by petgraph
//!
//! Catalogs are validated once, at construction time. Dangling dependency
//! references, self dependencies and dependency cycles are rejected, so the
//! rest of the workspace can trust every lookup.
//!
//! # Example
//!
//! ```rust
//! use realty_catalog::{Catalog, WorkflowCategory};
//!
//! let catalog = Catalog::builtin()?;
//! let tax = catalog.category(WorkflowCategory::Tax).unwrap();
//! assert!(!tax.steps.is_empty());
//! # Ok::<(), realty_catalog::CatalogError>(())
//! ```

pub mod builder;
pub mod catalog;
pub mod category;
pub mod error;
pub mod graph;
pub mod step;

pub use builder::CatalogBuilder;
pub use catalog::Catalog;
pub use category::WorkflowCategory;
pub use error::CatalogError;
pub use graph::DependencyGraph;
pub use step::{CategoryDefinition, LocalizedText, StepDefinition};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
