//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

/// Replay a drafting script and print recompute reports
#[derive(Parser, Debug)]
#[command(name = "draft", author, version, about, long_about = None)]
pub struct Args {
    /// Path to the RON script
    pub script: PathBuf,

    /// Path to the configuration file (RON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the effective configuration back to the config file
    #[arg(long)]
    pub save_config: bool,
}
