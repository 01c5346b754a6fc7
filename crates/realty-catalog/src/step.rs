//! Step and category definitions

use crate::category::WorkflowCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display text keyed by language code (`"en"`, `"de"`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    /// Create empty text
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a translation
    #[must_use]
    pub fn with(mut self, language: &str, text: &str) -> Self {
        self.0.insert(language.to_string(), text.to_string());
        self
    }

    /// Text for `language`, if present
    #[inline]
    #[must_use]
    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    /// Languages with a translation
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Check if no translation exists
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One step of a workflow
///
/// Catalog documents use snake_case keys; serialized views use camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct StepDefinition {
    /// Identifier, unique within its category
    pub id: String,
    /// Display label per language
    #[serde(default)]
    pub label: LocalizedText,
    /// Optional longer description per language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedText>,
    /// Navigation target, opaque to the engine
    pub path: String,
    /// Estimated duration in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,
    /// Steps of the same category that must be complete first
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl StepDefinition {
    /// Create a step with no label, description or dependencies
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: LocalizedText::new(),
            description: None,
            path: path.into(),
            estimated_minutes: None,
            dependencies: Vec::new(),
        }
    }

    /// With a label translation
    #[must_use]
    pub fn with_label(mut self, language: &str, text: &str) -> Self {
        self.label = self.label.with(language, text);
        self
    }

    /// With a description translation
    #[must_use]
    pub fn with_description(mut self, language: &str, text: &str) -> Self {
        let description = self.description.take().unwrap_or_default();
        self.description = Some(description.with(language, text));
        self
    }

    /// With an estimated duration
    #[must_use]
    pub fn with_estimated_minutes(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    /// With dependency step ids, replacing any previous list
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Check if the step declares any dependency
    #[inline]
    #[must_use]
    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }
}

/// A workflow category with its ordered steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDefinition {
    /// The category this definition belongs to
    pub category: WorkflowCategory,
    /// Display title per language
    pub title: LocalizedText,
    /// Display description per language
    pub description: LocalizedText,
    /// Steps in intended workflow order
    pub steps: Vec<StepDefinition>,
}

impl CategoryDefinition {
    /// Create an empty definition
    pub fn new(category: WorkflowCategory) -> Self {
        Self {
            category,
            title: LocalizedText::new(),
            description: LocalizedText::new(),
            steps: Vec::new(),
        }
    }

    /// With a title translation
    #[must_use]
    pub fn with_title(mut self, language: &str, text: &str) -> Self {
        self.title = self.title.with(language, text);
        self
    }

    /// With a description translation
    #[must_use]
    pub fn with_description(mut self, language: &str, text: &str) -> Self {
        self.description = self.description.with(language, text);
        self
    }

    /// Append a step
    #[must_use]
    pub fn with_step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }

    /// Find a step by id
    #[must_use]
    pub fn step(&self, step_id: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    /// Position of a step in catalog order
    #[must_use]
    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the category has no steps
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
