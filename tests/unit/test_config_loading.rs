use insta::assert_debug_snapshot;
use serverless_workflow::core::config::{ConfigLoader, LogFormat, WorkflowSettings};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_swf_env() {
    for v in &[
        "SWF_VALIDATION_ENABLED",
        "SWF_SCHEMA_VALIDATION",
        "SWF_STRICT_MODE",
        "SWF_PROPERTIES_FILE",
        "SWF_CONTEXT_FILE",
        "SWF_WORKFLOW_NAME",
        "SWF_LOG_LEVEL",
        "SWF_LOG_FORMAT",
    ] {
        env::remove_var(v);
    }
}

#[test]
#[serial]
fn test_missing_config_file_uses_defaults() {
    clear_swf_env();
    let temp_dir = TempDir::new().unwrap();

    let settings = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    assert_eq!(settings, WorkflowSettings::default());
    assert!(ConfigLoader::load_from_file(&temp_dir.path().join("swf.toml"))
        .unwrap()
        .is_none());
}

#[test]
#[serial]
fn test_config_file_sections() {
    clear_swf_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("swf.toml"),
        r#"
[validation]
strict_mode = true

[resolver]
workflow_name = "orders"

[logging]
default_level = "debug"
format = "json"
"#,
    )
    .unwrap();

    let settings = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    assert_debug_snapshot!(settings, @r###"
    WorkflowSettings {
        validation: ValidationSettings {
            enabled: true,
            schema_validation: true,
            strict_mode: true,
        },
        resolver: ResolverSettings {
            properties_file: None,
            context_file: None,
            workflow_name: Some(
                "orders",
            ),
        },
        logging: LoggingSettings {
            default_level: "debug",
            format: Json,
        },
    }
    "###);
}

#[test]
#[serial]
fn test_env_overrides_config_file() {
    clear_swf_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(
        &config_path,
        r#"
[validation]
enabled = true
schema_validation = true

[resolver]
context_file = "from-file.json"
"#,
    )
    .unwrap();

    env::set_var("SWF_SCHEMA_VALIDATION", "false");
    env::set_var("SWF_STRICT_MODE", "true");
    env::set_var("SWF_CONTEXT_FILE", "from-env.json");
    env::set_var("SWF_PROPERTIES_FILE", "values.properties");
    env::set_var("SWF_WORKFLOW_NAME", "billing");
    env::set_var("SWF_LOG_LEVEL", "warn");
    env::set_var("SWF_LOG_FORMAT", "JSON");

    let settings = ConfigLoader::load(&config_path).unwrap();
    clear_swf_env();

    assert!(settings.validation.enabled);
    assert!(!settings.validation.schema_validation);
    assert!(settings.validation.strict_mode);
    assert_eq!(
        settings.resolver.context_file,
        Some(PathBuf::from("from-env.json"))
    );
    assert_eq!(
        settings.resolver.properties_file,
        Some(PathBuf::from("values.properties"))
    );
    assert_eq!(settings.resolver.workflow_name.as_deref(), Some("billing"));
    assert_eq!(settings.logging.default_level, "warn");
    assert_eq!(settings.logging.format, LogFormat::Json);
}

#[test]
#[serial]
fn test_unparseable_env_values_are_ignored() {
    clear_swf_env();
    let temp_dir = TempDir::new().unwrap();

    env::set_var("SWF_VALIDATION_ENABLED", "maybe");
    env::set_var("SWF_LOG_FORMAT", "xml");
    env::set_var("SWF_LOG_LEVEL", "   ");

    let settings = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    clear_swf_env();

    assert!(settings.validation.enabled);
    assert_eq!(settings.logging.format, LogFormat::Text);
    assert_eq!(settings.logging.default_level, "info");
}

#[test]
#[serial]
fn test_invalid_toml_is_a_config_error() {
    clear_swf_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("swf.toml"), "[validation\nenabled = ").unwrap();

    let err = ConfigLoader::load_from_dir(temp_dir.path()).unwrap_err();
    assert_eq!(err.code, "WF-CONFIG-001");
}

#[test]
#[serial]
fn test_wrong_value_type_is_a_config_error() {
    clear_swf_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("swf.toml"),
        "[validation]\nstrict_mode = \"sometimes\"\n",
    )
    .unwrap();

    let err = ConfigLoader::load_from_dir(temp_dir.path()).unwrap_err();
    assert_eq!(err.code, "WF-CONFIG-001");
}
