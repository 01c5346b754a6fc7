//! Engine behaviour over in-memory stores

use pretty_assertions::assert_eq;
use realty_catalog::WorkflowCategory;
use realty_test_utils::{
    builtin_engine, failing_engine, memory_engine, mixed_catalog, tax_chain_catalog,
};
use realty_workflow::{
    CompletedSteps, EngineConfig, KeyValueStore, MemoryStore, Outcome, RecordingNavigator,
    StateChange, StepStatus, WorkflowEngine, WorkflowError,
};

const TAX: WorkflowCategory = WorkflowCategory::Tax;
const PROPERTY: WorkflowCategory = WorkflowCategory::Property;

fn completed(ids: &[&str]) -> CompletedSteps {
    ids.iter().copied().collect()
}

/// Tax chain engine whose store already holds `json` for the tax workflow
fn seeded_engine(json: &str) -> WorkflowEngine<MemoryStore> {
    let mut backend = MemoryStore::new();
    backend.set("workflow_tax", json.to_string()).unwrap();
    WorkflowEngine::new(tax_chain_catalog(), backend, EngineConfig::default())
}

#[test]
fn test_dependency_chain_unlocks_step_by_step() {
    let mut engine = memory_engine(tax_chain_catalog());

    let state = engine.state(TAX);
    assert!(!engine.is_step_blocked("A", TAX, state.completed_steps()));
    assert!(engine.is_step_blocked("B", TAX, state.completed_steps()));

    assert!(engine.mark_step_complete("A", TAX).is_applied());
    let state = engine.state(TAX);
    assert!(!engine.is_step_blocked("B", TAX, state.completed_steps()));
    assert!(engine.is_step_blocked("C", TAX, state.completed_steps()));

    assert!(engine.mark_step_complete("B", TAX).is_applied());
    let state = engine.state(TAX);
    assert!(!engine.is_step_blocked("C", TAX, state.completed_steps()));
    assert_eq!(engine.workflow_progress(TAX, state.completed_steps(), None), 67);
    assert!(!engine.is_workflow_complete(TAX, state.completed_steps()));
}

#[test]
fn test_progress_examples() {
    let engine = memory_engine(mixed_catalog());

    assert_eq!(engine.workflow_progress(PROPERTY, &completed(&[]), None), 0);
    assert_eq!(
        engine.workflow_progress(PROPERTY, &completed(&["basics", "location"]), None),
        50
    );
    assert_eq!(
        engine.workflow_progress(PROPERTY, &completed(&["basics"]), Some("location")),
        38
    );
    assert_eq!(
        engine.workflow_progress(
            PROPERTY,
            &completed(&["basics", "location", "condition", "valuation"]),
            None
        ),
        100
    );
}

#[test]
fn test_complete_is_idempotent_and_reversible() {
    let mut engine = memory_engine(tax_chain_catalog());
    assert!(engine.mark_step_complete("A", TAX).is_applied());
    let before = engine.state(TAX);

    assert!(matches!(engine.mark_step_complete("A", TAX), Outcome::Unchanged));
    assert_eq!(engine.state(TAX), before);

    assert!(engine.mark_step_complete("B", TAX).is_applied());
    assert!(engine.mark_step_incomplete("B", TAX).is_applied());
    assert_eq!(engine.state(TAX).completed_steps(), before.completed_steps());
    assert!(matches!(engine.mark_step_incomplete("B", TAX), Outcome::Unchanged));
}

#[test]
fn test_out_of_order_completion_is_allowed() {
    let mut engine = memory_engine(tax_chain_catalog());
    assert!(engine.mark_step_complete("C", TAX).is_applied());

    let state = engine.state(TAX);
    let views = engine.steps_with_status(TAX, &state);
    assert_eq!(views[2].status, StepStatus::Complete);
    // Still blocked for navigation
    assert!(views[2].is_blocked);
    assert!(engine.go_to_step("C", TAX).is_skipped());
}

#[test]
fn test_unknown_step_completion_is_skipped() {
    let mut engine = memory_engine(tax_chain_catalog());
    let outcome = engine.mark_step_complete("Z", TAX);
    assert!(matches!(outcome, Outcome::Skipped(WorkflowError::UnknownStep { .. })));
    assert!(engine.state(TAX).completed_steps().is_empty());
}

#[test]
fn test_reset_clears_status() {
    let mut engine = memory_engine(tax_chain_catalog());
    let _ = engine.mark_step_complete("A", TAX);
    let _ = engine.go_to_step("B", TAX);
    let _ = engine.save_data(TAX, "taxAmount", serde_json::json!(812));

    assert!(engine.reset_workflow(TAX).is_applied());
    let state = engine.state(TAX);
    assert!(state.is_empty());
    for view in engine.steps_with_status(TAX, &state) {
        assert!(!view.is_complete, "{} still complete", view.id());
        assert!(!view.is_active, "{} still active", view.id());
    }
    assert_eq!(engine.get_data(TAX, "taxAmount"), None);
}

#[test]
fn test_steps_with_status_follow_catalog_order() {
    let mut engine = memory_engine(tax_chain_catalog());
    let _ = engine.mark_step_complete("A", TAX);
    let _ = engine.go_to_step("B", TAX);

    let state = engine.state(TAX);
    let summary: Vec<(&str, StepStatus, bool)> = engine
        .steps_with_status(TAX, &state)
        .iter()
        .map(|v| (v.id(), v.status, v.is_active))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("A", StepStatus::Complete, false),
            ("B", StepStatus::Open, true),
            ("C", StepStatus::Locked, false),
        ]
    );
}

#[test]
fn test_next_and_previous() {
    let engine = memory_engine(tax_chain_catalog());
    let state = engine.state(TAX);

    let next: Vec<&str> = engine.next_steps("A", TAX, &state, 3).iter().map(|v| v.id()).collect();
    assert_eq!(next, vec!["B", "C"]);
    assert!(engine.next_steps("C", TAX, &state, 3).is_empty());
    assert_eq!(engine.previous_step("B", TAX).map(|s| s.id.as_str()), Some("A"));
    assert!(engine.previous_step("A", TAX).is_none());
}

#[test]
fn test_label_falls_back_to_raw_id() {
    let engine = memory_engine(tax_chain_catalog());
    assert_eq!(engine.step_label("A", TAX, "de"), "Objektdaten");
    assert_eq!(engine.step_label("B", TAX, "de"), "B");
    assert_eq!(engine.step_label("unknown-step", TAX, "en"), "unknown-step");
}

#[test]
fn test_open_step_navigates_only_when_applied() {
    let mut engine = memory_engine(tax_chain_catalog());
    let mut nav = RecordingNavigator::new();

    assert!(engine.open_step("B", TAX, &mut nav).is_skipped());
    assert!(nav.visited().is_empty());

    assert!(engine.open_step("A", TAX, &mut nav).is_applied());
    // Reopening the active step navigates again but changes nothing
    assert!(matches!(engine.open_step("A", TAX, &mut nav), Outcome::Unchanged));
    assert_eq!(nav.visited(), ["/workflows/tax/a", "/workflows/tax/a"]);
}

#[test]
fn test_saves_broadcast_changes() {
    let mut engine = memory_engine(mixed_catalog());
    let mut rx = engine.subscribe();

    let _ = engine.mark_step_complete("basics", PROPERTY);
    let _ = engine.mark_step_complete("basics", PROPERTY);
    let _ = engine.reset_workflow(TAX);

    assert_eq!(rx.try_recv().unwrap(), StateChange { category: PROPERTY });
    assert_eq!(rx.try_recv().unwrap(), StateChange { category: TAX });
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_categories_are_independent() {
    let mut engine = memory_engine(mixed_catalog());
    let _ = engine.mark_step_complete("basics", PROPERTY);
    let _ = engine.mark_step_complete("A", TAX);
    let _ = engine.reset_workflow(TAX);

    assert!(engine.state(TAX).is_empty());
    assert!(engine.state(PROPERTY).completed_steps().contains("basics"));
}

#[test]
fn test_builtin_overview_and_advance() {
    let mut engine = builtin_engine();
    let mut nav = RecordingNavigator::new();

    let _ = engine.complete_and_advance("property-data", TAX, &mut nav);
    assert_eq!(nav.current(), Some("/workflows/tax/rental-income"));

    let overview = engine.overview("de");
    assert_eq!(overview.len(), 4);
    let tax = overview.iter().find(|o| o.category == TAX).unwrap();
    assert_eq!(tax.title, "Steuererklärung");
    assert_eq!((tax.completed, tax.total), (1, 5));
    // One completed plus the active step at half credit: 1.5 / 5
    assert_eq!(tax.progress, 30);
    assert_eq!(tax.active_step.as_deref(), Some("rental-income"));
    assert_eq!(tax.remaining_minutes, 50);
    assert!(!tax.is_complete);
}

#[test]
fn test_unknown_active_step_reads_as_none() {
    let mut engine = seeded_engine(r#"{"completedSteps":["A","ghost"],"activeStep":"ghost"}"#);

    let state = engine.state(TAX);
    assert_eq!(state.active_step(), None);
    assert!(state.completed_steps().contains("A"));

    let tax = engine.overview("en").into_iter().find(|o| o.category == TAX).unwrap();
    assert_eq!(tax.active_step, None);
    // A alone, no half credit for the dropped step: 1 / 3
    assert_eq!(tax.progress, 33);

    // The next write persists the cleaned state
    assert!(engine.mark_step_complete("B", TAX).is_applied());
    let raw = engine.store().backend().get("workflow_tax").unwrap();
    assert!(raw.contains(r#""activeStep":null"#), "{raw}");
}

#[test]
fn test_uncomplete_unknown_step_removes_stray_id() {
    let mut engine = seeded_engine(r#"{"completedSteps":["A","ghost"]}"#);

    assert!(engine.mark_step_incomplete("ghost", TAX).is_applied());
    assert_eq!(engine.state(TAX).completed_steps().iter().collect::<Vec<_>>(), vec!["A"]);
    assert!(matches!(engine.mark_step_incomplete("ghost", TAX), Outcome::Unchanged));
    assert!(matches!(
        engine.mark_step_incomplete("basics", PROPERTY),
        Outcome::Skipped(WorkflowError::UnknownCategory(PROPERTY))
    ));
}

#[test]
fn test_failed_write_is_skipped_and_leaves_state() {
    let mut engine = failing_engine(tax_chain_catalog(), 1);

    let outcome = engine.mark_step_complete("A", TAX);
    assert!(matches!(outcome, Outcome::Skipped(WorkflowError::Store(_))));
    assert!(engine.state(TAX).is_empty());

    // Only the first write fails
    assert!(engine.mark_step_complete("A", TAX).is_applied());
    assert!(engine.state(TAX).completed_steps().contains("A"));
}
