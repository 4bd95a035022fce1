pub mod args;
pub mod commands;

pub use args::{ConvertArgs, GlobalArgs, ReportFormat, TargetFormat, TriggersArgs, ValidateArgs};
pub use commands::load_settings;

use crate::core::config::WorkflowSettings;
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
WORKFLOW COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "swf")]
#[command(version = crate::VERSION)]
#[command(about = "Serverless workflow definition tooling")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: validate a definition, convert it between JSON and YAML, then inspect which trigger events activate which event states."
)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Validate a workflow definition",
        long_about = "Validate parses the definition, checks the raw document against the bundled JSON Schema, and runs the structural rules. Exits non-zero when any error is reported.",
        after_help = "Example:\n    swf validate ./orders.json --strict --format json"
    )]
    Validate(ValidateArgs),
    #[command(
        about = "Convert a workflow definition between JSON and YAML",
        long_about = "Convert parses the definition and writes the normalized document: generated ids, canonical state types, and default state names are filled in.",
        after_help = "Example:\n    swf convert ./orders.yaml --to json"
    )]
    Convert(ConvertArgs),
    #[command(
        about = "List trigger events and the event states they activate",
        long_about = "Triggers evaluates every event expression against every trigger event name and prints the resulting associations.",
        after_help = "Example:\n    swf triggers ./orders.json"
    )]
    Triggers(TriggersArgs),
}

pub fn run(args: Args, settings: &WorkflowSettings) -> crate::Result<()> {
    match args.command {
        Command::Validate(validate_args) => commands::validate(validate_args, settings),
        Command::Convert(convert_args) => commands::convert(convert_args, settings),
        Command::Triggers(triggers_args) => commands::triggers(triggers_args, settings),
    }
}
