use serde_json::json;
use serverless_workflow::core::config::ResolverSettings;
use serverless_workflow::core::workflow::{
    EndStatus, InitContext, State, ValueResolver, WorkflowMapper,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(relative)
}

fn read_fixture(relative: &str) -> String {
    fs::read_to_string(fixture(relative)).unwrap()
}

#[test]
fn test_context_and_properties_substitute_workflow_values() {
    let settings = ResolverSettings {
        properties_file: Some(fixture("context/substitutions.properties")),
        context_file: Some(fixture("context/orders.json")),
        workflow_name: None,
    };
    let resolver = ValueResolver::from_settings(&settings).unwrap();
    let workflow = WorkflowMapper::with_resolver(resolver)
        .read_json(&read_fixture("context/contextworkflow.json"))
        .unwrap();

    assert_eq!(workflow.name, "Orders Workflow");
    assert_eq!(workflow.owner.as_deref(), Some("fulfilment team"));
    match &workflow.states[0] {
        State::Delay(delay) => {
            assert_eq!(delay.name.as_deref(), Some("await order"));
            assert_eq!(delay.next_state.as_deref(), Some("$$.orders.missing"));
        }
        other => panic!("expected delay state, got {:?}", other),
    }
    match &workflow.states[1] {
        State::End(end) => assert_eq!(end.status, Some(EndStatus::Failure)),
        other => panic!("expected end state, got {:?}", other),
    }
}

#[test]
fn test_properties_context_scoped_to_workflow_name() {
    let context = InitContext::from_path(&fixture("context/orders.properties"), Some("orders"))
        .unwrap();
    assert_eq!(context.workflow_name(), Some("orders"));
    assert_eq!(
        context.document(),
        &json!({
            "orders": {
                "name": "Orders Workflow",
                "owner": "fulfilment",
                "states": { "first": "await order" }
            }
        })
    );

    let resolver = ValueResolver::new().with_context(context);
    assert_eq!(resolver.resolve("$$.orders.owner"), "fulfilment");
    assert_eq!(resolver.resolve("$$.billing.name"), "$$.billing.name");
}

#[test]
fn test_properties_context_without_workflow_name_keeps_everything() {
    let context = InitContext::from_path(&fixture("context/orders.properties"), None).unwrap();
    let resolver = ValueResolver::new().with_context(context);
    assert_eq!(resolver.resolve("$$.billing.name"), "Billing");
    assert_eq!(resolver.resolve("$$.orders.states.first"), "await order");
}

#[test]
fn test_numeric_context_values_become_text() {
    let context = InitContext::from_path(&fixture("context/orders.json"), None).unwrap();
    let resolver = ValueResolver::new().with_context(context);
    assert_eq!(resolver.resolve("$$.orders.delay"), "45");
    assert_eq!(resolver.resolve("  $$.orders.name  "), "Orders Workflow");
}

#[test]
fn test_non_scalar_and_invalid_queries_are_left_unchanged() {
    let context = InitContext::from_path(&fixture("context/orders.json"), None).unwrap();
    let resolver = ValueResolver::new().with_context(context);
    assert_eq!(resolver.resolve("$$.orders.states"), "$$.orders.states");
    assert_eq!(resolver.resolve("$$.orders[?"), "$$.orders[?");
    assert_eq!(resolver.resolve("$$.orders.*"), "$$.orders.*");
}

#[test]
fn test_yaml_context_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("context.yaml");
    fs::write(&path, "orders:\n  name: From Yaml\n").unwrap();

    let context = InitContext::from_path(&path, None).unwrap();
    let resolver = ValueResolver::new().with_context(context);
    assert_eq!(resolver.resolve("$$.orders.name"), "From Yaml");
}

#[test]
fn test_missing_context_file_is_an_io_error() {
    let settings = ResolverSettings {
        context_file: Some(PathBuf::from("/nonexistent/context.json")),
        ..ResolverSettings::default()
    };
    let err = ValueResolver::from_settings(&settings).unwrap_err();
    assert_eq!(err.code, "WF-IO-001");
}

#[test]
fn test_malformed_context_document_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("context.json");
    fs::write(&path, "{ not json").unwrap();
    let err = InitContext::from_path(&path, None).unwrap_err();
    assert_eq!(err.code, "WF-CONTEXT-001");
}

#[test]
fn test_property_lookup_is_verbatim() {
    let resolver = ValueResolver::new().with_properties([("owner.placeholder", "team")]);
    assert_eq!(resolver.resolve("owner.placeholder"), "team");
    assert_eq!(resolver.resolve(" owner.placeholder"), " owner.placeholder");
    assert_eq!(resolver.resolve("OWNER.PLACEHOLDER"), "OWNER.PLACEHOLDER");
}

#[test]
fn test_context_marker_without_context_falls_back_to_properties() {
    let resolver = ValueResolver::new().with_properties([("$$.orders.name", "literal key")]);
    assert_eq!(resolver.resolve("$$.orders.name"), "literal key");
}

#[test]
fn test_default_settings_build_a_passthrough_resolver() {
    let resolver = ValueResolver::from_settings(&ResolverSettings::default()).unwrap();
    assert!(resolver.is_passthrough());
    assert!(resolver.context().is_none());

    let workflow = WorkflowMapper::with_resolver(resolver)
        .read_json(&read_fixture("context/contextworkflow.json"))
        .unwrap();
    assert_eq!(workflow.name, "$$.orders.name");
}

#[test]
fn test_resolve_tree_rewrites_only_string_leaves() {
    let resolver = ValueResolver::new().with_properties([("key", "value"), ("1", "one")]);
    let mut tree = json!({
        "key": "key",
        "list": ["key", 1, true, null],
        "nested": { "inner": "key" }
    });
    resolver.resolve_tree(&mut tree);
    assert_eq!(
        tree,
        json!({
            "key": "value",
            "list": ["value", 1, true, null],
            "nested": { "inner": "value" }
        })
    );
}
