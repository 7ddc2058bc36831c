use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Simple, file-backed task tracker CLI.
/// Storage defaults to ~/.zentask/tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "zt", version, about = "Personal task tracker with notifications and AI analysis")]
pub struct Cli {
    /// Path to the JSON task database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
