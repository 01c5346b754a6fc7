//! Workflow categories

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One independent workflow wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowCategory {
    /// Tax return preparation for rental properties
    Tax,
    /// Property data capture and valuation
    Property,
    /// Financing and loan comparison
    Financing,
    /// Investment analysis
    Analysis,
}

impl WorkflowCategory {
    /// All categories in canonical order
    pub const ALL: [WorkflowCategory; 4] = [
        WorkflowCategory::Tax,
        WorkflowCategory::Property,
        WorkflowCategory::Financing,
        WorkflowCategory::Analysis,
    ];

    /// Lower-case name used in storage keys and export documents
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            WorkflowCategory::Tax => "tax",
            WorkflowCategory::Property => "property",
            WorkflowCategory::Financing => "financing",
            WorkflowCategory::Analysis => "analysis",
        }
    }
}

impl fmt::Display for WorkflowCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowCategory {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkflowCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for category in WorkflowCategory::ALL {
            assert_eq!(category.as_str().parse::<WorkflowCategory>().unwrap(), category);
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = "insurance".parse::<WorkflowCategory>().unwrap_err();
        assert_eq!(err.to_string(), "unknown workflow category: insurance");
    }

    #[test]
    fn test_serde_uses_lowercase() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            category: WorkflowCategory,
        }

        let text = toml::to_string(&Wrapper { category: WorkflowCategory::Financing }).unwrap();
        assert_eq!(text.trim(), "category = \"financing\"");

        let parsed: Wrapper = toml::from_str("category = \"analysis\"").unwrap();
        assert_eq!(parsed.category, WorkflowCategory::Analysis);
    }
}
