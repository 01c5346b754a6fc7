//! Derived step views and progress
//!
//! Pure functions over a category definition and its state. Nothing here is
//! stored: a step unlocks the moment its last dependency is completed.

use crate::state::{CompletedSteps, WorkflowState};
use realty_catalog::{CategoryDefinition, StepDefinition};
use serde::Serialize;

/// Derived state of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Some dependency is not completed
    Locked,
    /// Unlocked and not completed
    Open,
    /// Completed, whether or not its dependencies are
    Complete,
}

impl StepStatus {
    /// Status of `step` given `completed`
    #[must_use]
    pub fn of(step: &StepDefinition, completed: &CompletedSteps) -> Self {
        if completed.contains(&step.id) {
            StepStatus::Complete
        } else if step.dependencies.iter().any(|d| !completed.contains(d)) {
            StepStatus::Locked
        } else {
            StepStatus::Open
        }
    }

    /// Short display marker
    #[inline]
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            StepStatus::Locked => "[-]",
            StepStatus::Open => "[ ]",
            StepStatus::Complete => "[x]",
        }
    }
}

/// A step together with its derived status
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView<'a> {
    /// The catalog definition
    #[serde(flatten)]
    pub step: &'a StepDefinition,
    /// Step id is in the completed set
    pub is_complete: bool,
    /// Step is the active step
    pub is_active: bool,
    /// Step has unmet dependencies
    pub is_blocked: bool,
    /// Combined status
    pub status: StepStatus,
}

impl<'a> StepView<'a> {
    /// View of `step` under `state`
    #[must_use]
    pub fn new(step: &'a StepDefinition, state: &WorkflowState) -> Self {
        let completed = state.completed_steps();
        Self {
            step,
            is_complete: completed.contains(&step.id),
            is_active: state.active_step() == Some(step.id.as_str()),
            is_blocked: step.dependencies.iter().any(|d| !completed.contains(d)),
            status: StepStatus::of(step, completed),
        }
    }

    /// Step id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &'a str {
        &self.step.id
    }
}

/// True iff the step declares a dependency that is not completed
///
/// Unknown steps are never blocked. The active step is not consulted.
#[must_use]
pub fn is_step_blocked(
    definition: &CategoryDefinition,
    step_id: &str,
    completed: &CompletedSteps,
) -> bool {
    definition
        .step(step_id)
        .is_some_and(|step| step.dependencies.iter().any(|d| !completed.contains(d)))
}

/// Dependencies of `step_id` not yet completed, in declaration order
#[must_use]
pub fn missing_dependencies<'a>(
    definition: &'a CategoryDefinition,
    step_id: &str,
    completed: &CompletedSteps,
) -> Vec<&'a str> {
    definition
        .step(step_id)
        .map(|step| {
            step.dependencies
                .iter()
                .filter(|d| !completed.contains(d))
                .map(String::as_str)
                .collect()
        })
        .unwrap_or_default()
}

/// Every step in catalog order with its status
#[must_use]
pub fn steps_with_status<'a>(
    definition: &'a CategoryDefinition,
    state: &WorkflowState,
) -> Vec<StepView<'a>> {
    definition
        .steps
        .iter()
        .map(|step| StepView::new(step, state))
        .collect()
}

/// Progress percentage in `[0, 100]`
///
/// Counts completed steps of the category. A `current` step that is not
/// completed yet counts as half done. Empty categories report 0.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn workflow_progress(
    definition: &CategoryDefinition,
    completed: &CompletedSteps,
    current: Option<&str>,
) -> u8 {
    let total = definition.len();
    if total == 0 {
        return 0;
    }

    let done = definition
        .steps
        .iter()
        .filter(|s| completed.contains(&s.id))
        .count() as f64;
    let partial = match current {
        Some(id) if definition.step(id).is_some() && !completed.contains(id) => 0.5,
        _ => 0.0,
    };

    let percent = (100.0 * (done + partial) / total as f64).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Up to `limit` steps strictly after `current`, in catalog order
///
/// Empty if `current` is the last step or not part of the category.
#[must_use]
pub fn next_steps<'a>(
    definition: &'a CategoryDefinition,
    current: &str,
    state: &WorkflowState,
    limit: usize,
) -> Vec<StepView<'a>> {
    let Some(position) = definition.position(current) else {
        return Vec::new();
    };
    definition.steps[position + 1..]
        .iter()
        .take(limit)
        .map(|step| StepView::new(step, state))
        .collect()
}

/// The step immediately before `current`
#[must_use]
pub fn previous_step<'a>(
    definition: &'a CategoryDefinition,
    current: &str,
) -> Option<&'a StepDefinition> {
    match definition.position(current) {
        Some(position) if position > 0 => definition.steps.get(position - 1),
        _ => None,
    }
}

/// First step in catalog order that is neither completed nor blocked
#[must_use]
pub fn next_available_step<'a>(
    definition: &'a CategoryDefinition,
    state: &WorkflowState,
) -> Option<&'a StepDefinition> {
    definition
        .steps
        .iter()
        .find(|step| StepStatus::of(step, state.completed_steps()) == StepStatus::Open)
}

/// Every step of a non-empty category is completed
#[must_use]
pub fn is_workflow_complete(definition: &CategoryDefinition, completed: &CompletedSteps) -> bool {
    !definition.is_empty() && definition.steps.iter().all(|s| completed.contains(&s.id))
}

/// Estimated minutes left over all incomplete steps
#[must_use]
pub fn remaining_minutes(definition: &CategoryDefinition, completed: &CompletedSteps) -> u32 {
    definition
        .steps
        .iter()
        .filter(|s| !completed.contains(&s.id))
        .filter_map(|s| s.estimated_minutes)
        .sum()
}
