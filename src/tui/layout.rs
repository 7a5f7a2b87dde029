//! Mapping between board pixels and terminal cells.
//!
//! One cell is 8px wide and 16px tall, so a 256x192 note covers 32x12 cells.
//! The trash target is placed relative to the current terminal size, so it
//! must be recomputed whenever it is needed rather than remembered.

use ratatui::layout::{Constraint, Direction, Layout, Rect as CellRect};

use crate::board::{NOTE_HEIGHT, NOTE_WIDTH};
use crate::geometry::{Point, Rect};
use crate::task::Task;

pub const PX_PER_COL: f64 = 8.0;
pub const PX_PER_ROW: f64 = 16.0;

const TRASH_WIDTH: u16 = 16;
const TRASH_HEIGHT: u16 = 6;
const TRASH_MARGIN_X: u16 = 4;
const TRASH_MARGIN_Y: u16 = 1;

/// Split the frame into the board and the one-line status bar.
pub fn split_frame(frame: CellRect) -> (CellRect, CellRect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame);
    (chunks[0], chunks[1])
}

/// Board pixel position of the centre of a cell.
pub fn cell_to_board(board: CellRect, column: u16, row: u16) -> Point {
    Point::new(
        (column.saturating_sub(board.x) as f64 + 0.5) * PX_PER_COL,
        (row.saturating_sub(board.y) as f64 + 0.5) * PX_PER_ROW,
    )
}

/// Cell covering a board pixel position.
pub fn board_to_cell(board: CellRect, p: Point) -> (u16, u16) {
    let col = (p.x.max(0.0) / PX_PER_COL).round() as u32;
    let row = (p.y.max(0.0) / PX_PER_ROW).round() as u32;
    (
        (board.x as u32 + col).min(u16::MAX as u32) as u16,
        (board.y as u32 + row).min(u16::MAX as u32) as u16,
    )
}

/// Cells a note at `origin` covers, clipped to the visible board.
pub fn note_cells(board: CellRect, origin: Point) -> CellRect {
    let (x, y) = board_to_cell(board, origin);
    let w = (NOTE_WIDTH / PX_PER_COL) as u16;
    let h = (NOTE_HEIGHT / PX_PER_ROW) as u16;
    CellRect::new(x, y, w, h).intersection(board)
}

/// Cell of the checkbox `[ ]` on a rendered note: first content row,
/// pushed down one row when a status badge is shown.
pub fn checkbox_cell(note: CellRect, has_badge: bool) -> (u16, u16) {
    (note.x + 1, note.y + 1 + u16::from(has_badge))
}

/// Whether a click at (column, row) lands on the note's checkbox.
pub fn hits_checkbox(note: CellRect, has_badge: bool, column: u16, row: u16) -> bool {
    let (x, y) = checkbox_cell(note, has_badge);
    row == y && column >= x && column < x + 3 && column < note.right()
}

/// Trash target in cells: bottom-right corner of the board.
pub fn trash_cells(board: CellRect) -> CellRect {
    let w = TRASH_WIDTH.min(board.width);
    let h = TRASH_HEIGHT.min(board.height);
    let x = board.right().saturating_sub(w + TRASH_MARGIN_X).max(board.x);
    let y = board.bottom().saturating_sub(h + TRASH_MARGIN_Y).max(board.y);
    CellRect::new(x, y, w, h)
}

/// Trash target in board pixels, for hit-testing a release point.
pub fn trash_bounds(board: CellRect) -> Rect {
    let t = trash_cells(board);
    Rect::new(
        (t.x - board.x) as f64 * PX_PER_COL,
        (t.y - board.y) as f64 * PX_PER_ROW,
        t.width as f64 * PX_PER_COL,
        t.height as f64 * PX_PER_ROW,
    )
}

/// Front-most task whose note covers the cell, given tasks in paint order.
pub fn topmost_at<'a>(
    board: CellRect,
    paint_order: &[&'a Task],
    column: u16,
    row: u16,
) -> Option<&'a Task> {
    paint_order.iter().rev().copied().find(|t| {
        let r = note_cells(board, t.position());
        column >= r.x && column < r.right() && row >= r.y && row < r.bottom()
    })
}

/// Column offset of the pin along the top edge; tilt pushes it sideways.
pub fn pin_offset(note: CellRect, rotate: f64) -> u16 {
    let centre = note.width as i32 / 2;
    let shift = (rotate / 2.5).round() as i32;
    (centre + shift).clamp(1, (note.width as i32 - 2).max(1)) as u16
}

/// Helper function to create a centered rect using up certain percentage of the available rect.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: CellRect) -> CellRect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
