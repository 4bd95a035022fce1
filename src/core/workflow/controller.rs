#![allow(clippy::result_large_err)]

use crate::core::config::ValidationSettings;
use crate::core::error::AppError;
use crate::core::workflow::expression::{ExpressionEvaluator, RhaiExpressionEvaluator};
use crate::core::workflow::mapper::WorkflowMapper;
use crate::core::workflow::model::{Action, Function, TriggerEvent, Workflow};
use crate::core::workflow::state::{EventState, State};
use crate::core::workflow::validation::{
    render_validation_errors, ValidationError, WorkflowValidator,
};
use indexmap::IndexMap;

/// Entry point for working with one workflow: validation, serialization, and
/// trigger/event-state association through an injected expression evaluator.
pub struct WorkflowController {
    workflow: Workflow,
    raw: Option<String>,
    validator: WorkflowValidator,
    evaluator: Box<dyn ExpressionEvaluator>,
}

impl WorkflowController {
    pub fn for_workflow(workflow: Workflow) -> Self {
        Self {
            workflow,
            raw: None,
            validator: WorkflowValidator::new(),
            evaluator: Box::new(RhaiExpressionEvaluator::new()),
        }
    }

    /// Parse JSON text; the text is kept for schema validation.
    pub fn from_json(text: &str, mapper: &WorkflowMapper) -> Result<Self, AppError> {
        let workflow = mapper.read_json(text)?;
        Ok(Self::for_workflow(workflow).with_raw(text))
    }

    /// Parse YAML text; the text is kept for schema validation.
    pub fn from_yaml(text: &str, mapper: &WorkflowMapper) -> Result<Self, AppError> {
        let workflow = mapper.read_yaml(text)?;
        Ok(Self::for_workflow(workflow).with_raw(text))
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    pub fn with_expression_evaluator(mut self, evaluator: impl ExpressionEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn with_validation_settings(mut self, settings: ValidationSettings) -> Self {
        self.validator = WorkflowValidator::with_settings(settings);
        self
    }

    pub fn with_validation_enabled(mut self, enabled: bool) -> Self {
        self.validator = self.validator.with_enabled(enabled);
        self
    }

    pub fn with_schema_validation(mut self, schema_validation: bool) -> Self {
        self.validator = self.validator.with_schema_validation(schema_validation);
        self
    }

    pub fn with_strict_validation(mut self, strict_mode: bool) -> Self {
        self.validator = self.validator.with_strict_mode(strict_mode);
        self
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn validation_errors(&self) -> Vec<ValidationError> {
        self.validator
            .validate(Some(&self.workflow), self.raw.as_deref())
    }

    pub fn is_valid(&self) -> bool {
        self.validation_errors().is_empty()
    }

    pub fn display_validation_errors(&self) -> String {
        render_validation_errors(&self.validation_errors())
    }

    pub fn to_json_string(&self) -> Result<String, AppError> {
        WorkflowMapper::new().write_json(&self.workflow)
    }

    pub fn has_triggers(&self) -> bool {
        self.workflow.has_triggers()
    }

    pub fn has_states(&self) -> bool {
        self.workflow.has_states()
    }

    /// Trigger definitions keyed by name. Later duplicates replace earlier
    /// ones in place; unnamed triggers are skipped.
    pub fn unique_trigger_events(&self) -> IndexMap<String, &TriggerEvent> {
        self.workflow
            .trigger_defs
            .iter()
            .filter_map(|trigger| trigger.name.clone().map(|name| (name, trigger)))
            .collect()
    }

    /// Top-level states keyed by name, with the same duplicate handling.
    pub fn unique_states(&self) -> IndexMap<String, &State> {
        self.workflow
            .states
            .iter()
            .filter_map(|state| state.name().map(|name| (name.to_string(), state)))
            .collect()
    }

    fn activates(&self, event_state: &EventState, trigger: &TriggerEvent) -> bool {
        event_state.events.iter().any(|event| {
            let expression = event.event_expression.as_deref().unwrap_or("");
            self.evaluator.evaluate(expression, trigger.name_or_empty())
        })
    }

    /// Event states with at least one event whose expression matches the trigger.
    pub fn event_states_for_trigger(&self, trigger: &TriggerEvent) -> Vec<&EventState> {
        self.workflow
            .event_states()
            .filter(|event_state| self.activates(event_state, trigger))
            .collect()
    }

    /// Trigger definitions that activate the given event state.
    pub fn trigger_events_for_event_state(&self, event_state: &EventState) -> Vec<&TriggerEvent> {
        self.workflow
            .trigger_defs
            .iter()
            .filter(|trigger| self.activates(event_state, trigger))
            .collect()
    }

    /// Every trigger that activates some event state, deduplicated by name and
    /// ordered by first association (event states outer, triggers inner).
    pub fn all_trigger_events_associated_with_event_states(&self) -> Vec<&TriggerEvent> {
        let mut associated: IndexMap<&str, &TriggerEvent> = IndexMap::new();
        for event_state in self.workflow.event_states() {
            for trigger in &self.workflow.trigger_defs {
                if self.activates(event_state, trigger) {
                    associated.entry(trigger.name_or_empty()).or_insert(trigger);
                }
            }
        }
        associated.into_values().collect()
    }

    pub fn all_actions_for_event_state<'a>(&self, event_state: &'a EventState) -> Vec<&'a Action> {
        event_state
            .events
            .iter()
            .flat_map(|event| event.actions.iter())
            .collect()
    }

    pub fn all_actions_for_event_states<'a>(
        &self,
        event_states: &[&'a EventState],
    ) -> Vec<&'a Action> {
        event_states
            .iter()
            .copied()
            .flat_map(|event_state| self.all_actions_for_event_state(event_state))
            .collect()
    }

    /// Functions referenced by the actions; actions without one are skipped.
    pub fn all_functions_for_actions<'a>(&self, actions: &[&'a Action]) -> Vec<&'a Function> {
        actions
            .iter()
            .copied()
            .filter_map(|action| action.function.as_ref())
            .collect()
    }

    pub fn all_functions_for_event_states<'a>(
        &self,
        event_states: &[&'a EventState],
    ) -> Vec<&'a Function> {
        let actions = self.all_actions_for_event_states(event_states);
        self.all_functions_for_actions(&actions)
    }

    pub fn start_state(&self) -> Option<&State> {
        self.workflow.start_state()
    }

    pub fn state_by_name(&self, name: &str) -> Option<&State> {
        self.workflow.state_by_name(name)
    }

    pub fn has_end_state(&self) -> bool {
        self.workflow.has_end_state()
    }
}
