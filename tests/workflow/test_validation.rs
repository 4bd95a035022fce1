use serverless_workflow::core::config::ValidationSettings;
use serverless_workflow::core::workflow::{
    DelayState, EndState, EndStatus, EventState, OperationState, SwitchState, TriggerEvent,
    ValidationError, ValidationErrorType, Workflow, WorkflowController, WorkflowMapper,
    WorkflowValidator,
};
use std::fs;
use std::path::Path;

fn read_fixture(relative: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(relative);
    fs::read_to_string(path).unwrap()
}

fn controller_for(relative: &str) -> WorkflowController {
    WorkflowController::from_json(&read_fixture(relative), &WorkflowMapper::new()).unwrap()
}

fn messages(errors: &[ValidationError]) -> Vec<&str> {
    errors.iter().map(|error| error.message.as_str()).collect()
}

#[test]
fn test_complete_workflow_is_valid() {
    let controller = controller_for("basic/allstates.json");
    assert!(controller.is_valid(), "{}", controller.display_validation_errors());
}

#[test]
fn test_yaml_workflow_is_valid_against_schema() {
    let text = read_fixture("basic/allstates.yaml");
    let controller = WorkflowController::from_yaml(&text, &WorkflowMapper::new()).unwrap();
    assert!(controller.is_valid(), "{}", controller.display_validation_errors());
}

#[test]
fn test_strict_mode_rejects_multiple_end_states() {
    let controller = controller_for("basic/allstates.json").with_strict_validation(true);
    let errors = controller.validation_errors();
    assert_eq!(messages(&errors), vec!["Multiple end states found."]);
    assert_eq!(errors[0].kind, ValidationErrorType::WorkflowValidation);
}

#[test]
fn test_empty_workflow_reports_missing_states() {
    let errors = controller_for("basic/emptyworkflow.json").validation_errors();
    assert_eq!(
        messages(&errors),
        vec!["No states found.", "No start state found."]
    );
}

#[test]
fn test_multiple_start_states() {
    let errors = controller_for("validation/multiplestartstates.json").validation_errors();
    assert_eq!(messages(&errors), vec!["Multiple start states found."]);
}

#[test]
fn test_multiple_end_states_only_flagged_in_strict_mode() {
    let lenient = controller_for("validation/multipleendstates.json").validation_errors();
    assert_eq!(messages(&lenient), vec!["No start state found."]);

    let strict = controller_for("validation/multipleendstates.json")
        .with_strict_validation(true)
        .validation_errors();
    assert_eq!(
        messages(&strict),
        vec!["No start state found.", "Multiple end states found."]
    );
}

#[test]
fn test_duplicate_trigger_names() {
    let errors = controller_for("validation/invalidtriggerproperties.json").validation_errors();
    assert_eq!(
        messages(&errors),
        vec![
            "No states found.",
            "No start state found.",
            "Trigger Event does not have unique name: testtriggerevent"
        ]
    );
}

#[test]
fn test_invalid_enumerations_reported_by_schema() {
    let errors = WorkflowValidator::new().validate_json(&read_fixture("validation/invalidenums.json"));
    assert_eq!(errors.len(), 3, "{:?}", errors);
    assert!(errors
        .iter()
        .all(|error| error.kind == ValidationErrorType::SchemaValidation));
    let messages = messages(&errors);
    assert_eq!(messages[0], "#: 2 schema violations found");
    assert!(messages.contains(&"#/states/0/type: Invalid state type: WAIT"));
    assert!(messages.contains(&"#/states/1/status: Invalid status: DONE"));
}

#[test]
fn test_missing_states_key_is_a_schema_error() {
    let raw = r#"{"name":"no states"}"#;
    let controller = WorkflowController::from_json(raw, &WorkflowMapper::new()).unwrap();
    let errors = controller.validation_errors();
    assert_eq!(errors[0], ValidationError::schema("#: required key [states] not found"));
    assert_eq!(
        messages(&errors[1..]),
        vec!["No states found.", "No start state found."]
    );
}

#[test]
fn test_schema_errors_precede_structural_errors() {
    let raw = r#"{"name":"mixed","states":[{"name":"op","type":"OPERATION","action-mode":"RANDOM"}]}"#;
    let validator = WorkflowValidator::new();
    let workflow = Workflow::new("mixed").with_state(OperationState::new().with_name("op"));
    let errors = validator.validate(Some(&workflow), Some(raw));
    assert_eq!(
        errors,
        vec![
            ValidationError::schema("#/states/0/action-mode: Invalid action mode: RANDOM"),
            ValidationError::workflow("No start state found."),
            ValidationError::workflow("Next state should not be empty."),
        ]
    );
}

#[test]
fn test_disabling_schema_validation_skips_raw_checks() {
    let raw = r#"{"name":"no states"}"#;
    let controller = WorkflowController::from_json(raw, &WorkflowMapper::new())
        .unwrap()
        .with_schema_validation(false);
    assert_eq!(
        messages(&controller.validation_errors()),
        vec!["No states found.", "No start state found."]
    );
}

#[test]
fn test_disabled_validation_reports_nothing() {
    let controller = controller_for("basic/emptyworkflow.json").with_validation_enabled(false);
    assert!(controller.is_valid());

    let settings = ValidationSettings {
        enabled: false,
        ..ValidationSettings::default()
    };
    let validator = WorkflowValidator::with_settings(settings);
    assert!(validator.validate_workflow(&Workflow::default()).is_empty());
}

#[test]
fn test_unreadable_raw_document() {
    let errors = WorkflowValidator::new().validate_json("- just\n- a list\n");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.starts_with("#: unable to read document:"));
}

#[test]
fn test_validation_without_inputs_is_empty() {
    assert!(WorkflowValidator::new().validate(None, None).is_empty());
}

#[test]
fn test_workflow_built_in_code_is_validated() {
    let workflow = Workflow::new("")
        .with_trigger_defs(vec![
            TriggerEvent::new("paid").with_event_id("e1"),
            TriggerEvent::default().with_event_id("e1"),
        ])
        .with_state(EventState::new().with_name("wait").with_start(true))
        .with_state(DelayState::new().with_name("pause").with_time_delay(5))
        .with_state(SwitchState::new().with_name("route"))
        .with_state(EndState::new().with_name("wait").with_status(EndStatus::Success));

    let errors = WorkflowValidator::new()
        .with_strict_mode(true)
        .validate_workflow(&workflow);
    assert_eq!(
        messages(&errors),
        vec![
            "Workflow name should not be empty",
            "State does not have a unique name: wait",
            "Next state should not be empty.",
            "Default state should not be empty.",
            "Trigger Event has no name",
            "Trigger Event does not have unique event id: e1",
        ]
    );
}

#[test]
fn test_validator_is_reusable() {
    let validator = WorkflowValidator::new();
    let invalid = Workflow::new("first");
    let valid = Workflow::new("second")
        .with_state(EndState::new().with_name("done"))
        .with_state(EventState::new().with_name("wait").with_start(true));
    assert_eq!(validator.validate_workflow(&invalid).len(), 2);
    assert!(validator.validate_workflow(&valid).is_empty());
    assert_eq!(validator.validate_workflow(&invalid).len(), 2);
}

#[test]
fn test_display_renders_json_error_list() {
    let rendered = controller_for("validation/multiplestartstates.json").display_validation_errors();
    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!([
            { "type": "WORKFLOW_VALIDATION", "message": "Multiple start states found." }
        ])
    );
}
