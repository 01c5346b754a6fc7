//! Validated catalog registry

use crate::builder::CatalogBuilder;
use crate::category::WorkflowCategory;
use crate::error::CatalogError;
use crate::graph::DependencyGraph;
use crate::step::{CategoryDefinition, LocalizedText, StepDefinition};
use serde::Deserialize;
use std::collections::BTreeMap;

const BUILTIN_CATALOG: &str = include_str!("builtin.toml");

#[derive(Debug, Clone)]
pub(crate) struct CategoryEntry {
    pub(crate) definition: CategoryDefinition,
    pub(crate) graph: DependencyGraph,
}

/// Immutable registry of workflow categories and their steps
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: BTreeMap<WorkflowCategory, CategoryEntry>,
}

/// On-disk shape of one category table
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategorySource {
    title: LocalizedText,
    #[serde(default)]
    description: LocalizedText,
    #[serde(default)]
    steps: Vec<StepDefinition>,
}

impl Catalog {
    pub(crate) fn from_entries(entries: BTreeMap<WorkflowCategory, CategoryEntry>) -> Self {
        Self { entries }
    }

    /// The catalog shipped with the application
    ///
    /// # Errors
    ///
    /// Fails only if the embedded document is invalid, which the test suite rules out.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG, true)
    }

    /// Parse a catalog document
    ///
    /// Top-level tables are category names; each holds `title`,
    /// `description` and an array of `steps`. With `require_all`, every
    /// category must be present.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Parse`] for malformed TOML, [`CatalogError::UnknownCategory`]
    /// for unrecognized tables, and any validation error from [`CatalogBuilder`].
    pub fn from_toml_str(source: &str, require_all: bool) -> Result<Self, CatalogError> {
        let tables: BTreeMap<String, CategorySource> = toml::from_str(source)?;

        let mut builder = CatalogBuilder::new();
        for (name, table) in tables {
            let category: WorkflowCategory = name.parse()?;
            builder = builder.category(CategoryDefinition {
                category,
                title: table.title,
                description: table.description,
                steps: table.steps,
            });
        }
        if require_all {
            builder = builder.require_all_categories();
        }
        builder.build()
    }

    /// Definition of `category`, if the catalog has one
    #[inline]
    #[must_use]
    pub fn category(&self, category: WorkflowCategory) -> Option<&CategoryDefinition> {
        self.entries.get(&category).map(|e| &e.definition)
    }

    /// Dependency graph of `category`
    #[inline]
    #[must_use]
    pub fn graph(&self, category: WorkflowCategory) -> Option<&DependencyGraph> {
        self.entries.get(&category).map(|e| &e.graph)
    }

    /// Look up one step
    #[must_use]
    pub fn step(&self, category: WorkflowCategory, step_id: &str) -> Option<&StepDefinition> {
        self.category(category).and_then(|c| c.step(step_id))
    }

    /// Check if `category` is defined
    #[inline]
    #[must_use]
    pub fn contains(&self, category: WorkflowCategory) -> bool {
        self.entries.contains_key(&category)
    }

    /// Defined categories in canonical order
    pub fn categories(&self) -> impl Iterator<Item = &CategoryDefinition> {
        self.entries.values().map(|e| &e.definition)
    }

    /// Total number of steps across all categories
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.entries.values().map(|e| e.definition.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        for category in WorkflowCategory::ALL {
            let def = catalog.category(category).unwrap();
            assert!(!def.is_empty(), "{category} has no steps");
            assert!(def.title.get("en").is_some());
            assert!(def.title.get("de").is_some());
            for step in &def.steps {
                assert!(step.label.get("en").is_some(), "{}/{} lacks en label", category, step.id);
                assert!(step.label.get("de").is_some(), "{}/{} lacks de label", category, step.id);
                assert!(!step.path.is_empty());
            }
        }
    }

    #[test]
    fn test_parse_minimal_document() {
        let source = r#"
            [tax]
            title = { en = "Taxes" }

            [[tax.steps]]
            id = "a"
            path = "/tax/a"
            label = { en = "A" }

            [[tax.steps]]
            id = "b"
            path = "/tax/b"
            estimated_minutes = 5
            dependencies = ["a"]
        "#;
        let catalog = Catalog::from_toml_str(source, false).unwrap();
        let b = catalog.step(WorkflowCategory::Tax, "b").unwrap();
        assert_eq!(b.dependencies, vec!["a"]);
        assert_eq!(b.estimated_minutes, Some(5));
        assert!(b.label.is_empty());
        assert_eq!(catalog.step_count(), 2);
    }

    #[test]
    fn test_parse_rejects_unknown_category() {
        let source = "[insurance]\ntitle = { en = \"x\" }\n";
        let err = Catalog::from_toml_str(source, false).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownCategory(ref name) if name == "insurance"));
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        let err = Catalog::from_toml_str("[tax\n", false).unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
