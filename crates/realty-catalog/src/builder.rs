//! Catalog builder
//!
//! The only way to construct a [`Catalog`]. Every category is checked once
//! here; a catalog that builds is trusted by all lookups afterwards.

use crate::catalog::{Catalog, CategoryEntry};
use crate::category::WorkflowCategory;
use crate::error::CatalogError;
use crate::graph::DependencyGraph;
use crate::step::CategoryDefinition;
use std::collections::BTreeMap;

/// Builder for validated catalogs
///
/// Usage:
/// ```rust
/// use realty_catalog::{CatalogBuilder, CategoryDefinition, StepDefinition, WorkflowCategory};
///
/// let catalog = CatalogBuilder::new()
///     .category(
///         CategoryDefinition::new(WorkflowCategory::Tax)
///             .with_step(StepDefinition::new("income", "/tax/income"))
///             .with_step(
///                 StepDefinition::new("summary", "/tax/summary").with_dependencies(["income"]),
///             ),
///     )
///     .build()?;
/// assert_eq!(catalog.category(WorkflowCategory::Tax).unwrap().len(), 2);
/// # Ok::<(), realty_catalog::CatalogError>(())
/// ```
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    definitions: Vec<CategoryDefinition>,
    require_all: bool,
}

impl CatalogBuilder {
    /// Create an empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category definition
    #[must_use]
    pub fn category(mut self, definition: CategoryDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Fail the build unless every [`WorkflowCategory`] is defined
    #[must_use]
    pub fn require_all_categories(mut self) -> Self {
        self.require_all = true;
        self
    }

    /// Number of categories added so far
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if no category was added
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Validate all categories and produce the catalog
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] found: duplicate or missing
    /// categories, bad step ids, dangling dependencies or cycles.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut entries = BTreeMap::new();

        for definition in self.definitions {
            let category = definition.category;
            if entries.contains_key(&category) {
                return Err(CatalogError::DuplicateCategory(category));
            }
            let graph = DependencyGraph::build(category, &definition.steps)?;
            entries.insert(category, CategoryEntry { definition, graph });
        }

        if self.require_all {
            if let Some(missing) = WorkflowCategory::ALL
                .into_iter()
                .find(|c| !entries.contains_key(c))
            {
                return Err(CatalogError::MissingCategory(missing));
            }
        }

        Ok(Catalog::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepDefinition;

    #[test]
    fn test_rejects_duplicate_category() {
        let err = CatalogBuilder::new()
            .category(CategoryDefinition::new(WorkflowCategory::Tax))
            .category(CategoryDefinition::new(WorkflowCategory::Tax))
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCategory(WorkflowCategory::Tax)));
    }

    #[test]
    fn test_require_all_reports_first_missing() {
        let err = CatalogBuilder::new()
            .category(CategoryDefinition::new(WorkflowCategory::Tax))
            .require_all_categories()
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::MissingCategory(WorkflowCategory::Property)));
    }

    #[test]
    fn test_rejects_duplicate_step() {
        let err = CatalogBuilder::new()
            .category(
                CategoryDefinition::new(WorkflowCategory::Financing)
                    .with_step(StepDefinition::new("equity", "/a"))
                    .with_step(StepDefinition::new("equity", "/b")),
            )
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "duplicate step equity in category financing");
    }

    #[test]
    fn test_empty_category_is_valid() {
        let catalog = CatalogBuilder::new()
            .category(CategoryDefinition::new(WorkflowCategory::Analysis))
            .build()
            .unwrap();
        assert!(catalog.category(WorkflowCategory::Analysis).unwrap().is_empty());
        assert!(catalog.category(WorkflowCategory::Tax).is_none());
    }
}
