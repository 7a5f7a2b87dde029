use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Sticky-note task board for the terminal.
/// Data defaults to ~/.corkboard or the directory passed via --dir.
#[derive(Parser)]
#[command(name = "cork", version, about = "Sticky-note task board")]
pub struct Cli {
    /// Directory holding the board, config.yaml and cork.log.
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `corkboard=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
