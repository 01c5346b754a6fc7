//! Persisted per-category workflow state

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Set of completed step ids, kept in completion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletedSteps(IndexSet<String>);

impl CompletedSteps {
    /// Create an empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if `step_id` is completed
    #[inline]
    #[must_use]
    pub fn contains(&self, step_id: &str) -> bool {
        self.0.contains(step_id)
    }

    /// Add a step; returns false if it was already present
    #[inline]
    pub fn insert(&mut self, step_id: impl Into<String>) -> bool {
        self.0.insert(step_id.into())
    }

    /// Remove a step; returns false if it was absent
    #[inline]
    pub fn remove(&mut self, step_id: &str) -> bool {
        self.0.shift_remove(step_id)
    }

    /// Completed ids in completion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of completed ids
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing is completed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CompletedSteps {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// State of one workflow category
///
/// Created lazily with empty defaults and changed only through
/// [`WorkflowEngine`](crate::WorkflowEngine) operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    #[serde(default)]
    completed_steps: CompletedSteps,
    #[serde(default)]
    active_step: Option<String>,
    #[serde(default)]
    data: Map<String, Value>,
}

impl WorkflowState {
    /// Create the empty default state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With completed steps, replacing the current set
    #[must_use]
    pub fn with_completed<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.completed_steps = steps.into_iter().collect();
        self
    }

    /// With an active step
    #[must_use]
    pub fn with_active(mut self, step_id: impl Into<String>) -> Self {
        self.active_step = Some(step_id.into());
        self
    }

    /// Completed step ids
    #[inline]
    #[must_use]
    pub fn completed_steps(&self) -> &CompletedSteps {
        &self.completed_steps
    }

    /// Currently active step id
    #[inline]
    #[must_use]
    pub fn active_step(&self) -> Option<&str> {
        self.active_step.as_deref()
    }

    /// Step-specific saved values
    #[inline]
    #[must_use]
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Check if the state equals the empty default
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed_steps.is_empty() && self.active_step.is_none() && self.data.is_empty()
    }

    pub(crate) fn completed_steps_mut(&mut self) -> &mut CompletedSteps {
        &mut self.completed_steps
    }

    pub(crate) fn set_active_step(&mut self, step_id: Option<String>) {
        self.active_step = step_id;
    }

    pub(crate) fn data_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.data
    }
}
