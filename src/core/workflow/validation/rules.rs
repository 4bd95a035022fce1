use super::ValidationError;
use crate::core::config::ValidationSettings;
use crate::core::workflow::model::Workflow;
use crate::core::workflow::state::State;
use std::collections::HashSet;

/// Structural check over a materialized workflow. Rules look at the
/// top-level states and trigger definitions only.
pub trait WorkflowRule: Send + Sync {
    fn check(&self, workflow: &Workflow, settings: &ValidationSettings) -> Vec<ValidationError>;
}

pub fn built_in_rules() -> Vec<Box<dyn WorkflowRule>> {
    vec![
        Box::new(WorkflowNameRule),
        Box::new(StatesPresentRule),
        Box::new(StateNamesRule),
        Box::new(StartStateRule),
        Box::new(TransitionTargetsRule),
        Box::new(EndStateRule),
        Box::new(TriggerEventsRule),
    ]
}

/// Names that occur more than once, each reported once in first-seen order.
fn duplicates<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        if !seen.insert(name) && reported.insert(name) {
            out.push(name);
        }
    }
    out
}

/// Absent or zero-length. Whitespace-only text counts as set.
fn is_missing(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

struct WorkflowNameRule;

impl WorkflowRule for WorkflowNameRule {
    fn check(&self, workflow: &Workflow, _settings: &ValidationSettings) -> Vec<ValidationError> {
        if workflow.name.is_empty() {
            vec![ValidationError::workflow("Workflow name should not be empty")]
        } else {
            Vec::new()
        }
    }
}

struct StatesPresentRule;

impl WorkflowRule for StatesPresentRule {
    fn check(&self, workflow: &Workflow, _settings: &ValidationSettings) -> Vec<ValidationError> {
        if workflow.has_states() {
            Vec::new()
        } else {
            vec![ValidationError::workflow("No states found.")]
        }
    }
}

struct StateNamesRule;

impl WorkflowRule for StateNamesRule {
    fn check(&self, workflow: &Workflow, _settings: &ValidationSettings) -> Vec<ValidationError> {
        let mut out: Vec<ValidationError> = workflow
            .states
            .iter()
            .filter(|state| state.name().is_some_and(str::is_empty))
            .map(|_| ValidationError::workflow("State name should not be empty."))
            .collect();

        let named = workflow
            .states
            .iter()
            .filter_map(State::name)
            .filter(|name| !name.is_empty());
        out.extend(duplicates(named).into_iter().map(|name| {
            ValidationError::workflow(format!("State does not have a unique name: {}", name))
        }));
        out
    }
}

struct StartStateRule;

impl WorkflowRule for StartStateRule {
    fn check(&self, workflow: &Workflow, _settings: &ValidationSettings) -> Vec<ValidationError> {
        match workflow.states.iter().filter(|state| state.is_start()).count() {
            0 => vec![ValidationError::workflow("No start state found.")],
            1 => Vec::new(),
            _ => vec![ValidationError::workflow("Multiple start states found.")],
        }
    }
}

struct TransitionTargetsRule;

impl WorkflowRule for TransitionTargetsRule {
    fn check(&self, workflow: &Workflow, _settings: &ValidationSettings) -> Vec<ValidationError> {
        let mut out = Vec::new();
        for state in &workflow.states {
            match state {
                State::Operation(_) | State::Delay(_) | State::Parallel(_) => {
                    if is_missing(state.next_state()) {
                        out.push(ValidationError::workflow("Next state should not be empty."));
                    }
                }
                State::Switch(switch) => {
                    if is_missing(switch.default.as_deref()) {
                        out.push(ValidationError::workflow(
                            "Default state should not be empty.",
                        ));
                    }
                }
                State::Event(_) | State::End(_) | State::Default(_) => {}
            }
        }
        out
    }
}

/// Exactly one end state, only enforced in strict mode.
struct EndStateRule;

impl WorkflowRule for EndStateRule {
    fn check(&self, workflow: &Workflow, settings: &ValidationSettings) -> Vec<ValidationError> {
        if !settings.strict_mode {
            return Vec::new();
        }
        match workflow.end_states().count() {
            0 => vec![ValidationError::workflow("No end state found.")],
            1 => Vec::new(),
            _ => vec![ValidationError::workflow("Multiple end states found.")],
        }
    }
}

struct TriggerEventsRule;

impl WorkflowRule for TriggerEventsRule {
    fn check(&self, workflow: &Workflow, _settings: &ValidationSettings) -> Vec<ValidationError> {
        let mut out = Vec::new();
        for trigger in &workflow.trigger_defs {
            if is_missing(trigger.name.as_deref()) {
                out.push(ValidationError::workflow("Trigger Event has no name"));
            }
            if is_missing(trigger.event_id.as_deref()) {
                out.push(ValidationError::workflow("Trigger Event has no event id"));
            }
        }

        let names = workflow
            .trigger_defs
            .iter()
            .filter_map(|trigger| trigger.name.as_deref())
            .filter(|name| !name.is_empty());
        out.extend(duplicates(names).into_iter().map(|name| {
            ValidationError::workflow(format!("Trigger Event does not have unique name: {}", name))
        }));

        let event_ids = workflow
            .trigger_defs
            .iter()
            .filter_map(|trigger| trigger.event_id.as_deref())
            .filter(|event_id| !event_id.is_empty());
        out.extend(duplicates(event_ids).into_iter().map(|event_id| {
            ValidationError::workflow(format!(
                "Trigger Event does not have unique event id: {}",
                event_id
            ))
        }));
        out
    }
}
