//! Terminal board entry point and setup.

use std::{io, path::Path};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tracing::info;

use crate::board::{Board, BoardSettings};
use crate::storage::FileStore;
use crate::tui::app::App;

/// Initialise and run the terminal board until the user quits.
pub fn run_tui(data_dir: &Path, settings: BoardSettings) -> io::Result<()> {
    let board = Board::open(FileStore::new(data_dir), settings);
    info!(tasks = board.len(), dir = %data_dir.display(), "opening board");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(board);
    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("board closed");
    result
}
