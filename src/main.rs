use anyhow::Result;
use clap::Parser;
use serverless_workflow::{cli, logging};

fn main() -> Result<()> {
    let args = cli::Args::parse();
    let settings = cli::load_settings(&args.global)?;
    logging::init(&settings.logging, args.global.verbose)?;
    cli::run(args, &settings)
}
