// SPDX-License-Identifier: MIT OR Apache-2.0
//! `vecspace` - command-line front end for the reactive vector-space graph.
//!
//! Builds, inspects, converts and edits graph snapshots:
//! - `demo` writes a sample graph
//! - `inspect` prints every node's ports, producers first
//! - `convert` re-encodes between RON and JSON
//! - `set` writes one input and reports the cascade
//!
//! Settings are read from `vecspace.ron` in the working directory, or from
//! the file named by `VECSPACE_SETTINGS`.

mod commands;
mod error;
mod settings;

use clap::Parser;
use commands::{Cli, Command};
use settings::{AppSettings, SETTINGS_FILE_NAME};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings_path = std::env::var_os("VECSPACE_SETTINGS")
        .map_or_else(|| PathBuf::from(SETTINGS_FILE_NAME), PathBuf::from);
    let settings = match AppSettings::load(&settings_path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {e}", settings_path.display());
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&settings.log_filter);
    tracing::debug!("Starting vecspace v{}", env!("CARGO_PKG_VERSION"));

    match run(&cli.command, settings, &settings_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the configured filter
fn init_tracing(log_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(command: &Command, mut settings: AppSettings, settings_path: &Path) -> error::Result<()> {
    let stdout = std::io::stdout();
    commands::run(command, &mut settings, &mut stdout.lock())?;

    if command.written_file().is_some() {
        settings.save(settings_path)?;
    }
    Ok(())
}
