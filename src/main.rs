//! # cork - sticky-note task board
//!
//! Tasks live as tilted sticky notes on a corkboard in your terminal. Drag a
//! note with the mouse to move it (it jumps in front of the others), click
//! its checkbox to mark it done, and drop it on the trash to get rid of it.
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the board
//! cork
//!
//! # Pin a note from the shell
//! cork add "Essay" --priority 1 --deadline 2025-06-01T10:00
//!
//! # List notes, front-most first
//! cork list
//! ```
//!
//! The board is saved to `~/.corkboard/todos.json` after every change.

use anyhow::Result;
use clap::Parser;

use corkboard::board::Board;
use corkboard::cli::Cli;
use corkboard::cmd::*;
use corkboard::config::{resolve_data_dir, Config};
use corkboard::logging::{self, LogTarget};
use corkboard::storage::FileStore;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Ui);

    let data_dir = resolve_data_dir(cli.dir.as_deref());
    let config = Config::load(&data_dir)?;
    let level = logging::resolve_level(cli.log_level.as_deref(), config.log_level.as_deref());
    let target = match command {
        Commands::Ui => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    logging::init(&level, target, &data_dir)?;
    tracing::debug!(dir = %data_dir.display(), "using data directory");

    let settings = config.board_settings();
    let open_board = || Board::open(FileStore::new(&data_dir), settings);
    match command {
        Commands::Ui => cmd_ui(&data_dir, settings),
        Commands::Add { name, priority, deadline, desc } => {
            cmd_add(&mut open_board(), name, priority, deadline, desc)
        }
        Commands::List => {
            cmd_list(&open_board());
            Ok(())
        }
        Commands::Toggle { id } => cmd_toggle(&mut open_board(), &id),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}
