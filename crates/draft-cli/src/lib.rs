//! Drafting script runner
//!
//! Replays a RON script of document operations against a fresh
//! [`draft_core::Document`] and prints the resulting recompute reports.

mod args;
pub mod config;
pub mod report;
pub mod script;

pub use args::Args;
pub use config::{CliConfig, ConfigError, ConfigManager, SharedConfig, create_shared_config};
pub use script::{Command, Script, ScriptError};

use std::io::Write;

use thiserror::Error;

/// Top-level CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// Run the script named in `args`, writing output to `out`
pub fn run(args: &Args, config: &SharedConfig, out: &mut impl Write) -> Result<(), CliError> {
    if args.save_config {
        let mut manager = config.write();
        manager.save()?;
        writeln!(out, "saved config to {}", manager.config_file_path().display())
            .map_err(ScriptError::Io)?;
    }

    let engine = config.read().config().engine.clone();
    let script = Script::load(&args.script)?;
    let doc = script.run(engine, out)?;

    let failed = doc.features().filter(|f| f.status().is_error()).count();
    tracing::info!(
        "Finished '{}': {} feature(s), {} in error",
        doc.name,
        doc.len(),
        failed
    );
    Ok(())
}
