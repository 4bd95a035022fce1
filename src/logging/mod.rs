use crate::core::config::{LogFormat, LoggingSettings};
use crate::Result;
use anyhow::{anyhow, Context};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;

static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

const VERBOSE_LEVEL: &str = "debug";

/// Pick the filter directive: `RUST_LOG` wins, then `--verbose`, then the
/// configured default level.
pub fn build_filter(settings: &LoggingSettings, verbose: bool) -> Result<EnvFilter> {
    let fallback = if verbose {
        VERBOSE_LEVEL
    } else {
        settings.default_level.as_str()
    };
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .context("failed to configure tracing level")
}

/// Install the stderr subscriber for the `swf` binary.
///
/// Errors when invoked more than once per process.
pub fn init(settings: &LoggingSettings, verbose: bool) -> Result<()> {
    if LOGGER_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(anyhow!("logging already initialized"));
    }

    let env_filter = build_filter(settings, verbose)?;
    let registry = tracing_subscriber::registry().with(env_filter);
    match settings.format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr),
            )
            .try_init(),
    }
    .context("failed to install tracing subscriber")?;
    Ok(())
}

#[cfg(test)]
/// Reset the initialization guard so tests can reconfigure logging multiple times.
pub fn reset_for_tests() {
    LOGGER_INITIALIZED.store(false, Ordering::SeqCst);
}
