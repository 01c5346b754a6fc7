//! Catalog construction errors

use crate::category::WorkflowCategory;

/// Reasons a catalog fails validation
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Category name not in the fixed set
    #[error("unknown workflow category: {0}")]
    UnknownCategory(String),

    /// Same category registered twice
    #[error("category {0} is defined more than once")]
    DuplicateCategory(WorkflowCategory),

    /// A required category has no definition
    #[error("category {0} is missing from the catalog")]
    MissingCategory(WorkflowCategory),

    /// Blank step identifier
    #[error("step id must not be empty in category {0}")]
    EmptyStepId(WorkflowCategory),

    /// Two steps share an id
    #[error("duplicate step {step} in category {category}")]
    DuplicateStep {
        /// Category the step belongs to
        category: WorkflowCategory,
        /// Offending step id
        step: String,
    },

    /// A step lists itself as a dependency
    #[error("step {step} in category {category} depends on itself")]
    SelfDependency {
        /// Category the step belongs to
        category: WorkflowCategory,
        /// Offending step id
        step: String,
    },

    /// A dependency points at no step of the category
    #[error("step {step} in category {category} depends on unknown step {dependency}")]
    UnknownDependency {
        /// Category the step belongs to
        category: WorkflowCategory,
        /// Offending step id
        step: String,
        /// The missing dependency id
        dependency: String,
    },

    /// Steps depend on each other transitively
    #[error("dependency cycle in category {category}: {steps:?}")]
    DependencyCycle {
        /// Category containing the cycle
        category: WorkflowCategory,
        /// Steps on the cycle, in catalog order
        steps: Vec<String>,
    },

    /// Catalog document is not valid TOML or has the wrong shape
    #[error("catalog parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_dependency_format() {
        let err = CatalogError::UnknownDependency {
            category: WorkflowCategory::Tax,
            step: "summary".into(),
            dependency: "income".into(),
        };
        assert_eq!(
            err.to_string(),
            "step summary in category tax depends on unknown step income"
        );
    }

    #[test]
    fn test_cycle_format() {
        let err = CatalogError::DependencyCycle {
            category: WorkflowCategory::Analysis,
            steps: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "dependency cycle in category analysis: [\"a\", \"b\"]");
    }
}
