use crate::{
    cli::args::{ConvertArgs, GlobalArgs, ReportFormat, TriggersArgs, ValidateArgs},
    core::{
        config::{ConfigLoader, WorkflowSettings, DEFAULT_CONFIG_FILE},
        workflow::{
            render_validation_errors, ValueResolver, WorkflowController, WorkflowMapper,
        },
    },
    Result,
};
use anyhow::{anyhow, Context};
use std::path::{Path, PathBuf};

/// Load settings from `--config` (or ./swf.toml), then let the
/// substitution flags override the resolver section.
pub fn load_settings(global: &GlobalArgs) -> Result<WorkflowSettings> {
    let config_path = global
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if global.config.is_some() && !config_path.exists() {
        return Err(anyhow!("config file {} not found", config_path.display()));
    }

    let mut settings = ConfigLoader::load(&config_path)?;
    if let Some(properties) = &global.properties {
        settings.resolver.properties_file = Some(properties.clone());
    }
    if let Some(context) = &global.context {
        settings.resolver.context_file = Some(context.clone());
    }
    if let Some(workflow_name) = &global.workflow_name {
        settings.resolver.workflow_name = Some(workflow_name.clone());
    }
    Ok(settings)
}

fn load_controller(path: &Path, settings: &WorkflowSettings) -> Result<WorkflowController> {
    let resolver = ValueResolver::from_settings(&settings.resolver)
        .context("failed to prepare value substitution")?;
    let mapper = WorkflowMapper::with_resolver(resolver);
    let (workflow, raw) = mapper
        .read_path(path)
        .with_context(|| format!("failed to read workflow {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        workflow = %workflow.name,
        states = workflow.states.len(),
        triggers = workflow.trigger_defs.len(),
        "loaded workflow"
    );
    Ok(WorkflowController::for_workflow(workflow)
        .with_raw(raw)
        .with_validation_settings(settings.validation))
}

pub fn validate(args: ValidateArgs, settings: &WorkflowSettings) -> Result<()> {
    let mut controller = load_controller(&args.file, settings)?;
    if args.strict {
        controller = controller.with_strict_validation(true);
    }
    if args.no_schema {
        controller = controller.with_schema_validation(false);
    }

    let errors = controller.validation_errors();
    match args.format {
        ReportFormat::Json => println!("{}", render_validation_errors(&errors)),
        ReportFormat::Text => {
            if errors.is_empty() {
                println!("{}: valid", args.file.display());
            }
            for error in &errors {
                println!("{}", error);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(
            "{} validation error(s) in {}",
            errors.len(),
            args.file.display()
        ))
    }
}

pub fn convert(args: ConvertArgs, settings: &WorkflowSettings) -> Result<()> {
    let controller = load_controller(&args.file, settings)?;
    let output = WorkflowMapper::new()
        .write_str(controller.workflow(), args.to.into())
        .context("failed to write workflow")?;
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

pub fn triggers(args: TriggersArgs, settings: &WorkflowSettings) -> Result<()> {
    let controller = load_controller(&args.file, settings)?;
    if !controller.has_triggers() {
        println!("No trigger events defined.");
        return Ok(());
    }

    for (name, trigger) in controller.unique_trigger_events() {
        let states: Vec<&str> = controller
            .event_states_for_trigger(trigger)
            .into_iter()
            .map(|state| state.name.as_deref().unwrap_or("<unnamed>"))
            .collect();
        let event_id = trigger.event_id.as_deref().unwrap_or("-");
        if states.is_empty() {
            println!("{} ({}): no event states", name, event_id);
        } else {
            println!("{} ({}): {}", name, event_id, states.join(", "));
        }
    }
    Ok(())
}
