//! Testing utilities for the realty workflow workspace
//!
//! Shared catalogs, engines and recording collaborators.

#![allow(missing_docs)]

use realty_catalog::{Catalog, CatalogBuilder, CategoryDefinition, StepDefinition, WorkflowCategory};
use realty_workflow::{
    EngineConfig, KeyValueStore, MemoryStore, NoticeLevel, Notifier, StoreError, WorkflowEngine,
};
use std::cell::RefCell;

/// Tax workflow `A -> B -> C`
pub fn tax_chain_catalog() -> Catalog {
    CatalogBuilder::new()
        .category(tax_chain())
        .build()
        .unwrap()
}

pub fn tax_chain() -> CategoryDefinition {
    CategoryDefinition::new(WorkflowCategory::Tax)
        .with_title("en", "Tax return")
        .with_step(
            StepDefinition::new("A", "/workflows/tax/a")
                .with_label("en", "Property data")
                .with_label("de", "Objektdaten")
                .with_estimated_minutes(10),
        )
        .with_step(
            StepDefinition::new("B", "/workflows/tax/b")
                .with_label("en", "Rental income")
                .with_dependencies(["A"])
                .with_estimated_minutes(15),
        )
        .with_step(
            StepDefinition::new("C", "/workflows/tax/c")
                .with_label("en", "Summary")
                .with_dependencies(["B"]),
        )
}

/// Property workflow with four independent steps
pub fn four_step_category() -> CategoryDefinition {
    ["basics", "location", "condition", "valuation"]
        .into_iter()
        .fold(CategoryDefinition::new(WorkflowCategory::Property), |def, id| {
            def.with_step(StepDefinition::new(id, format!("/workflows/property/{id}")))
        })
}

/// Both test categories in one catalog
pub fn mixed_catalog() -> Catalog {
    CatalogBuilder::new()
        .category(tax_chain())
        .category(four_step_category())
        .build()
        .unwrap()
}

pub fn memory_engine(catalog: Catalog) -> WorkflowEngine<MemoryStore> {
    WorkflowEngine::new(catalog, MemoryStore::new(), EngineConfig::default())
}

pub fn builtin_engine() -> WorkflowEngine<MemoryStore> {
    memory_engine(Catalog::builtin().unwrap())
}

/// [`Notifier`] that keeps every notice
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.borrow().clone()
    }

    pub fn last_level(&self) -> Option<NoticeLevel> {
        self.notices.borrow().last().map(|(level, _)| *level)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices.borrow_mut().push((level, message.to_string()));
    }
}

/// [`MemoryStore`] whose `n`-th write (1-based) fails; every other write succeeds
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_on: usize,
    writes: usize,
}

impl FailingStore {
    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on: n,
            ..Self::default()
        }
    }

    /// Writes attempted so far, including the failed one
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.writes += 1;
        if self.writes == self.fail_on {
            return Err(std::io::Error::other("disk full").into());
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}

pub fn failing_engine(catalog: Catalog, fail_on: usize) -> WorkflowEngine<FailingStore> {
    WorkflowEngine::new(catalog, FailingStore::failing_on(fail_on), EngineConfig::default())
}
