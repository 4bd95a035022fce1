use serverless_workflow::core::workflow::{
    EventState, TriggerEvent, WorkflowController, WorkflowMapper,
};
use std::fs;
use std::path::Path;

fn controller() -> WorkflowController {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/expressions/eventstatestriggers.json");
    let text = fs::read_to_string(path).unwrap();
    WorkflowController::from_json(&text, &WorkflowMapper::new()).unwrap()
}

fn trigger<'a>(controller: &'a WorkflowController, name: &str) -> &'a TriggerEvent {
    controller.unique_trigger_events()[name]
}

fn event_state<'a>(controller: &'a WorkflowController, name: &str) -> &'a EventState {
    controller.state_by_name(name).and_then(|state| state.as_event()).unwrap()
}

fn ids<'a>(items: impl IntoIterator<Item = Option<&'a str>>) -> Vec<&'a str> {
    items.into_iter().map(|id| id.unwrap()).collect()
}

#[test]
fn test_fixture_is_valid() {
    let controller = controller();
    assert!(controller.is_valid(), "{}", controller.display_validation_errors());
    assert!(controller.has_triggers());
    assert!(controller.has_states());
}

#[test]
fn test_unique_lookups_are_keyed_by_name() {
    let controller = controller();
    let triggers: Vec<String> = controller.unique_trigger_events().keys().cloned().collect();
    assert_eq!(triggers, vec!["order-created", "order-paid", "order-lost"]);
    let states: Vec<String> = controller.unique_states().keys().cloned().collect();
    assert_eq!(states, vec!["await creation", "await payment"]);
}

#[test]
fn test_event_states_for_each_trigger() {
    let controller = controller();

    let created = controller.event_states_for_trigger(trigger(&controller, "order-created"));
    assert_eq!(ids(created.iter().map(|s| s.id.as_deref())), vec!["5", "6"]);

    let paid = controller.event_states_for_trigger(trigger(&controller, "order-paid"));
    assert_eq!(ids(paid.iter().map(|s| s.id.as_deref())), vec!["6"]);

    let lost = controller.event_states_for_trigger(trigger(&controller, "order-lost"));
    assert!(lost.is_empty());
}

#[test]
fn test_trigger_events_for_each_event_state() {
    let controller = controller();

    let creation = controller.trigger_events_for_event_state(event_state(&controller, "await creation"));
    assert_eq!(ids(creation.iter().map(|t| t.id.as_deref())), vec!["2"]);

    let payment = controller.trigger_events_for_event_state(event_state(&controller, "await payment"));
    assert_eq!(ids(payment.iter().map(|t| t.id.as_deref())), vec!["2", "3"]);
}

#[test]
fn test_all_associated_trigger_events_are_deduplicated() {
    let controller = controller();
    let associated = controller.all_trigger_events_associated_with_event_states();
    assert_eq!(ids(associated.iter().map(|t| t.id.as_deref())), vec!["2", "3"]);
}

#[test]
fn test_actions_and_functions_for_event_states() {
    let controller = controller();
    let creation = event_state(&controller, "await creation");
    let payment = event_state(&controller, "await payment");

    assert_eq!(controller.all_actions_for_event_state(creation).len(), 1);
    assert_eq!(controller.all_actions_for_event_state(payment).len(), 3);

    let actions = controller.all_actions_for_event_states(&[creation, payment]);
    assert_eq!(actions.len(), 4);

    let functions = controller.all_functions_for_actions(&actions);
    let names: Vec<&str> = functions
        .iter()
        .map(|function| function.name.as_deref().unwrap())
        .collect();
    assert_eq!(names, vec!["log", "charge", "never"]);
    assert_eq!(
        controller.all_functions_for_event_states(&[creation, payment]),
        functions
    );
}

#[test]
fn test_custom_evaluator_replaces_rhai() {
    let controller = controller()
        .with_expression_evaluator(|_expression: &str, trigger: &str| trigger == "order-lost");
    let lost = controller.event_states_for_trigger(trigger(&controller, "order-lost"));
    assert_eq!(ids(lost.iter().map(|s| s.id.as_deref())), vec!["5", "6"]);
    let created = controller.event_states_for_trigger(trigger(&controller, "order-created"));
    assert!(created.is_empty());
}

#[test]
fn test_start_state_lookup() {
    let controller = controller();
    assert_eq!(controller.start_state().and_then(|s| s.name()), Some("await creation"));
    assert!(!controller.has_end_state());
    assert!(controller.state_by_name("missing").is_none());
}
