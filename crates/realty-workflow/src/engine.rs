//! Workflow engine
//!
//! Owns the catalog and the state store. Read operations are pure over the
//! catalog and a caller-supplied state; mutations load, change and persist
//! one category at a time and report an [`Outcome`] instead of failing.

use crate::capability::Navigator;
use crate::config::EngineConfig;
use crate::error::WorkflowError;
use crate::progress::{self, StepView};
use crate::state::{CompletedSteps, WorkflowState};
use crate::store::{KeyValueStore, StateChange, StateStore};
use realty_catalog::{Catalog, CategoryDefinition, StepDefinition, WorkflowCategory};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Result of a mutating engine operation
#[derive(Debug)]
#[must_use]
pub enum Outcome {
    /// State changed and was persisted
    Applied,
    /// Operation was valid but changed nothing
    Unchanged,
    /// Operation was rejected; the diagnostic has already been logged
    Skipped(WorkflowError),
}

impl Outcome {
    /// Check if state was changed
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Check if the operation was rejected
    #[inline]
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// The diagnostic of a skipped operation
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&WorkflowError> {
        match self {
            Self::Skipped(e) => Some(e),
            _ => None,
        }
    }
}

/// Dashboard summary of one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOverview {
    /// The category
    pub category: WorkflowCategory,
    /// Localized title
    pub title: String,
    /// Completed steps of the category
    pub completed: usize,
    /// Steps in the category
    pub total: usize,
    /// Progress percentage, counting the active step as half done
    pub progress: u8,
    /// All steps completed
    pub is_complete: bool,
    /// Estimated minutes left
    pub remaining_minutes: u32,
    /// Currently active step
    pub active_step: Option<String>,
}

/// Workflow progress tracker
#[derive(Debug)]
pub struct WorkflowEngine<S> {
    catalog: Catalog,
    store: StateStore<S>,
    config: EngineConfig,
}

impl<S: KeyValueStore> WorkflowEngine<S> {
    /// Create an engine over `catalog`, persisting through `backend`
    pub fn new(catalog: Catalog, backend: S, config: EngineConfig) -> Self {
        let store = StateStore::new(backend, config.storage_key_prefix.clone());
        Self {
            catalog,
            store,
            config,
        }
    }

    /// The catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The state store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    /// Receive a notification after every persisted change
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.store.subscribe()
    }

    /// Current persisted state of `category`
    ///
    /// An active step that is not part of the catalog reads as no active step.
    #[must_use]
    pub fn state(&self, category: WorkflowCategory) -> WorkflowState {
        self.load(category)
    }

    /// Catalog definition, logging a diagnostic if absent
    #[must_use]
    pub fn definition(&self, category: WorkflowCategory) -> Option<&CategoryDefinition> {
        let definition = self.catalog.category(category);
        if definition.is_none() {
            warn!("Unknown workflow category: {}", category);
        }
        definition
    }

    /// Look up a step, logging a diagnostic if absent
    #[must_use]
    pub fn step(&self, category: WorkflowCategory, step_id: &str) -> Option<&StepDefinition> {
        let step = self.definition(category)?.step(step_id);
        if step.is_none() {
            warn!("Unknown step {} in workflow {}", step_id, category);
        }
        step
    }

    // ==================== Derived views ====================

    /// True iff the step has a dependency missing from `completed`
    #[must_use]
    pub fn is_step_blocked(
        &self,
        step_id: &str,
        category: WorkflowCategory,
        completed: &CompletedSteps,
    ) -> bool {
        self.definition(category)
            .is_some_and(|d| progress::is_step_blocked(d, step_id, completed))
    }

    /// Dependencies of the step not yet completed
    #[must_use]
    pub fn missing_dependencies(
        &self,
        step_id: &str,
        category: WorkflowCategory,
        completed: &CompletedSteps,
    ) -> Vec<&str> {
        self.definition(category)
            .map(|d| progress::missing_dependencies(d, step_id, completed))
            .unwrap_or_default()
    }

    /// Every step of the category with its status, in catalog order
    #[must_use]
    pub fn steps_with_status(
        &self,
        category: WorkflowCategory,
        state: &WorkflowState,
    ) -> Vec<StepView<'_>> {
        self.definition(category)
            .map(|d| progress::steps_with_status(d, state))
            .unwrap_or_default()
    }

    /// Progress percentage of the category
    #[must_use]
    pub fn workflow_progress(
        &self,
        category: WorkflowCategory,
        completed: &CompletedSteps,
        current: Option<&str>,
    ) -> u8 {
        self.definition(category)
            .map_or(0, |d| progress::workflow_progress(d, completed, current))
    }

    /// Up to `limit` steps after `current`
    #[must_use]
    pub fn next_steps(
        &self,
        current: &str,
        category: WorkflowCategory,
        state: &WorkflowState,
        limit: usize,
    ) -> Vec<StepView<'_>> {
        self.definition(category)
            .map(|d| progress::next_steps(d, current, state, limit))
            .unwrap_or_default()
    }

    /// The step before `current`
    #[must_use]
    pub fn previous_step(
        &self,
        current: &str,
        category: WorkflowCategory,
    ) -> Option<&StepDefinition> {
        self.definition(category)
            .and_then(|d| progress::previous_step(d, current))
    }

    /// First open step, for the "next step" suggestion
    #[must_use]
    pub fn next_available_step(
        &self,
        category: WorkflowCategory,
        state: &WorkflowState,
    ) -> Option<&StepDefinition> {
        self.definition(category)
            .and_then(|d| progress::next_available_step(d, state))
    }

    /// Every step of the category is completed
    #[must_use]
    pub fn is_workflow_complete(
        &self,
        category: WorkflowCategory,
        completed: &CompletedSteps,
    ) -> bool {
        self.definition(category)
            .is_some_and(|d| progress::is_workflow_complete(d, completed))
    }

    /// Estimated minutes left in the category
    #[must_use]
    pub fn remaining_minutes(&self, category: WorkflowCategory, completed: &CompletedSteps) -> u32 {
        self.definition(category)
            .map_or(0, |d| progress::remaining_minutes(d, completed))
    }

    /// Label of the step in `language`, or the raw step id
    #[must_use]
    pub fn step_label(&self, step_id: &str, category: WorkflowCategory, language: &str) -> String {
        self.catalog
            .step(category, step_id)
            .and_then(|s| s.label.get(language))
            .map_or_else(|| step_id.to_string(), str::to_string)
    }

    /// Description of the step in `language`, or an empty string
    #[must_use]
    pub fn step_description(
        &self,
        step_id: &str,
        category: WorkflowCategory,
        language: &str,
    ) -> String {
        self.catalog
            .step(category, step_id)
            .and_then(|s| s.description.as_ref())
            .and_then(|d| d.get(language))
            .unwrap_or_default()
            .to_string()
    }

    /// Title of the category in `language`, or its name
    #[must_use]
    pub fn category_title(&self, category: WorkflowCategory, language: &str) -> String {
        self.catalog
            .category(category)
            .and_then(|d| d.title.get(language))
            .map_or_else(|| category.to_string(), str::to_string)
    }

    /// Summary of every category in the catalog
    #[must_use]
    pub fn overview(&self, language: &str) -> Vec<CategoryOverview> {
        self.catalog
            .categories()
            .map(|definition| {
                let category = definition.category;
                let state = self.load(category);
                let completed = state.completed_steps();
                CategoryOverview {
                    category,
                    title: self.category_title(category, language),
                    completed: definition
                        .steps
                        .iter()
                        .filter(|s| completed.contains(&s.id))
                        .count(),
                    total: definition.len(),
                    progress: progress::workflow_progress(
                        definition,
                        completed,
                        state.active_step(),
                    ),
                    is_complete: progress::is_workflow_complete(definition, completed),
                    remaining_minutes: progress::remaining_minutes(definition, completed),
                    active_step: state.active_step().map(str::to_string),
                }
            })
            .collect()
    }

    // ==================== Mutations ====================

    /// Make `step_id` the active step
    ///
    /// Skipped if the step is unknown or blocked. Does not navigate; use
    /// [`open_step`](Self::open_step) for that.
    pub fn go_to_step(&mut self, step_id: &str, category: WorkflowCategory) -> Outcome {
        let mut state = self.load(category);
        if let Err(e) = self.check_reachable(step_id, category, state.completed_steps()) {
            return skip(e);
        }
        if state.active_step() == Some(step_id) {
            return Outcome::Unchanged;
        }

        state.set_active_step(Some(step_id.to_string()));
        info!("Workflow {}: active step {}", category, step_id);
        self.persist(category, &state)
    }

    /// Add `step_id` to the completed set
    ///
    /// Idempotent. Dependencies do not have to be complete.
    pub fn mark_step_complete(&mut self, step_id: &str, category: WorkflowCategory) -> Outcome {
        if let Err(e) = self.check_step(step_id, category) {
            return skip(e);
        }
        let mut state = self.load(category);
        if !state.completed_steps_mut().insert(step_id) {
            return Outcome::Unchanged;
        }

        info!("Workflow {}: completed {}", category, step_id);
        self.log_unlocked(step_id, category, state.completed_steps());
        self.persist(category, &state)
    }

    /// Remove `step_id` from the completed set
    ///
    /// Idempotent. Dependent steps that were completed stay completed. An id
    /// the catalog does not know is logged and still removed if present.
    pub fn mark_step_incomplete(&mut self, step_id: &str, category: WorkflowCategory) -> Outcome {
        match self.check_step(step_id, category) {
            Ok(()) => {}
            Err(e @ WorkflowError::UnknownStep { .. }) => warn!("{}", e),
            Err(e) => return skip(e),
        }
        let mut state = self.load(category);
        if !state.completed_steps_mut().remove(step_id) {
            return Outcome::Unchanged;
        }

        info!("Workflow {}: reopened {}", category, step_id);
        self.persist(category, &state)
    }

    /// Reset the category to the empty default state
    pub fn reset_workflow(&mut self, category: WorkflowCategory) -> Outcome {
        if self.definition(category).is_none() {
            return skip(WorkflowError::UnknownCategory(category));
        }
        info!("Workflow {}: reset", category);
        self.persist(category, &WorkflowState::default())
    }

    /// Store a step-specific value under `key`
    pub fn save_data(&mut self, category: WorkflowCategory, key: &str, value: Value) -> Outcome {
        if self.definition(category).is_none() {
            return skip(WorkflowError::UnknownCategory(category));
        }
        let mut state = self.load(category);
        if state.data().get(key) == Some(&value) {
            return Outcome::Unchanged;
        }

        state.data_mut().insert(key.to_string(), value);
        debug!("Workflow {}: saved data {}", category, key);
        self.persist(category, &state)
    }

    /// Value stored under `key`, if any
    #[must_use]
    pub fn get_data(&self, category: WorkflowCategory, key: &str) -> Option<Value> {
        self.load(category).data().get(key).cloned()
    }

    /// Go to `step_id` and, if that succeeded, navigate to its path
    pub fn open_step(
        &mut self,
        step_id: &str,
        category: WorkflowCategory,
        navigator: &mut dyn Navigator,
    ) -> Outcome {
        let outcome = self.go_to_step(step_id, category);
        if !outcome.is_skipped() {
            if let Some(step) = self.catalog.step(category, step_id) {
                navigator.navigate(&step.path);
            }
        }
        outcome
    }

    /// Complete `step_id`, then open the next available step if there is one
    ///
    /// Returns the outcome of the completion.
    pub fn complete_and_advance(
        &mut self,
        step_id: &str,
        category: WorkflowCategory,
        navigator: &mut dyn Navigator,
    ) -> Outcome {
        let outcome = self.mark_step_complete(step_id, category);
        if outcome.is_skipped() {
            return outcome;
        }

        let state = self.load(category);
        let next = self
            .catalog
            .category(category)
            .and_then(|d| progress::next_available_step(d, &state))
            .map(|s| s.id.clone());
        match next {
            Some(next) => {
                let _ = self.open_step(&next, category, navigator);
            }
            None => debug!("Workflow {}: no open step left", category),
        }
        outcome
    }

    // ==================== Internals ====================

    pub(crate) fn store_mut(&mut self) -> &mut StateStore<S> {
        &mut self.store
    }

    /// Persisted state with an active step the catalog does not know cleared
    fn load(&self, category: WorkflowCategory) -> WorkflowState {
        let mut state = self.store.load(category);
        if let Some(active) = state.active_step() {
            if self.catalog.step(category, active).is_none() {
                debug!("Workflow {}: dropping unknown active step {}", category, active);
                state.set_active_step(None);
            }
        }
        state
    }

    fn check_step(&self, step_id: &str, category: WorkflowCategory) -> Result<(), WorkflowError> {
        if self.definition(category).is_none() {
            return Err(WorkflowError::UnknownCategory(category));
        }
        if self.catalog.step(category, step_id).is_none() {
            return Err(WorkflowError::UnknownStep {
                category,
                step: step_id.to_string(),
            });
        }
        Ok(())
    }

    fn check_reachable(
        &self,
        step_id: &str,
        category: WorkflowCategory,
        completed: &CompletedSteps,
    ) -> Result<(), WorkflowError> {
        self.check_step(step_id, category)?;
        let missing = self.missing_dependencies(step_id, category, completed);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(WorkflowError::Blocked {
                category,
                step: step_id.to_string(),
                missing: missing.into_iter().map(str::to_string).collect(),
            })
        }
    }

    fn log_unlocked(&self, step_id: &str, category: WorkflowCategory, completed: &CompletedSteps) {
        let (Some(graph), Some(definition)) =
            (self.catalog.graph(category), self.catalog.category(category))
        else {
            return;
        };
        for dependent in graph.dependents(step_id) {
            if !progress::is_step_blocked(definition, dependent, completed) {
                debug!("Workflow {}: {} unlocked {}", category, step_id, dependent);
            }
        }
    }

    fn persist(&mut self, category: WorkflowCategory, state: &WorkflowState) -> Outcome {
        match self.store.save(category, state) {
            Ok(()) => Outcome::Applied,
            Err(e) => {
                error!("Failed to persist workflow {}: {}", category, e);
                Outcome::Skipped(e.into())
            }
        }
    }
}

fn skip(error: WorkflowError) -> Outcome {
    warn!("{}", error);
    Outcome::Skipped(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::RecordingNavigator;
    use crate::store::MemoryStore;
    use realty_catalog::CatalogBuilder;
    use serde_json::json;

    fn engine() -> WorkflowEngine<MemoryStore> {
        let catalog = CatalogBuilder::new()
            .category(
                CategoryDefinition::new(WorkflowCategory::Tax)
                    .with_title("en", "Taxes")
                    .with_step(StepDefinition::new("a", "/tax/a").with_label("en", "Income"))
                    .with_step(StepDefinition::new("b", "/tax/b").with_dependencies(["a"]))
                    .with_step(StepDefinition::new("c", "/tax/c").with_dependencies(["b"])),
            )
            .build()
            .unwrap();
        WorkflowEngine::new(catalog, MemoryStore::new(), EngineConfig::default())
    }

    #[test]
    fn test_go_to_blocked_step_is_skipped() {
        let mut engine = engine();
        let outcome = engine.go_to_step("b", WorkflowCategory::Tax);
        assert!(matches!(
            outcome.error(),
            Some(WorkflowError::Blocked { missing, .. }) if missing == &vec!["a".to_string()]
        ));
        assert_eq!(engine.state(WorkflowCategory::Tax).active_step(), None);
    }

    #[test]
    fn test_go_to_unknown_step_is_skipped() {
        let mut engine = engine();
        let outcome = engine.go_to_step("zz", WorkflowCategory::Tax);
        assert!(outcome.error().is_some_and(WorkflowError::is_invalid_reference));
    }

    #[test]
    fn test_unknown_category_degrades() {
        let mut engine = engine();
        let empty = CompletedSteps::new();
        assert!(!engine.is_step_blocked("a", WorkflowCategory::Financing, &empty));
        assert_eq!(engine.workflow_progress(WorkflowCategory::Financing, &empty, None), 0);
        assert!(engine
            .steps_with_status(WorkflowCategory::Financing, &WorkflowState::new())
            .is_empty());
        assert!(engine.reset_workflow(WorkflowCategory::Financing).is_skipped());
        assert!(engine.save_data(WorkflowCategory::Financing, "k", json!(1)).is_skipped());
    }

    #[test]
    fn test_data_bag() {
        let mut engine = engine();
        assert!(engine.save_data(WorkflowCategory::Tax, "taxAmount", json!(4200)).is_applied());
        assert!(matches!(
            engine.save_data(WorkflowCategory::Tax, "taxAmount", json!(4200)),
            Outcome::Unchanged
        ));
        assert_eq!(engine.get_data(WorkflowCategory::Tax, "taxAmount"), Some(json!(4200)));
        assert_eq!(engine.get_data(WorkflowCategory::Tax, "missing"), None);
    }

    #[test]
    fn test_complete_and_advance_opens_next() {
        let mut engine = engine();
        let mut nav = RecordingNavigator::new();

        assert!(engine.complete_and_advance("a", WorkflowCategory::Tax, &mut nav).is_applied());
        assert_eq!(nav.current(), Some("/tax/b"));
        assert_eq!(engine.state(WorkflowCategory::Tax).active_step(), Some("b"));
    }

    #[test]
    fn test_labels_fall_back() {
        let engine = engine();
        assert_eq!(engine.step_label("a", WorkflowCategory::Tax, "en"), "Income");
        assert_eq!(engine.step_label("a", WorkflowCategory::Tax, "de"), "a");
        assert_eq!(engine.step_label("ghost", WorkflowCategory::Tax, "en"), "ghost");
        assert_eq!(engine.step_description("a", WorkflowCategory::Tax, "en"), "");
        assert_eq!(engine.category_title(WorkflowCategory::Tax, "en"), "Taxes");
        assert_eq!(engine.category_title(WorkflowCategory::Property, "en"), "property");
    }
}
