//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which draws the corkboard, routes
//! keyboard input to the add form and help screen, and turns mouse gestures
//! into board operations: press picks a note up, motion drags it, release
//! drops it (into the trash, or pinned at its new spot).

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{debug, warn};

use crate::board::{Board, BoardEvent, NOTE_HEIGHT, NOTE_WIDTH};
use crate::error::BoardError;
use crate::fields::Priority;
use crate::geometry::Point;
use crate::storage::KeyValueStore;
use crate::task::{format_deadline, Task, TaskId};
use crate::tui::colors::{note_paper, CORK, FORM_BG, INK, NOTE_DONE, OVERDUE, TRASH_HOT, TRASH_IDLE};
use crate::tui::enums::{AppState, FormField};
use crate::tui::layout::{
    cell_to_board, centered_rect, hits_checkbox, note_cells, pin_offset, split_frame, topmost_at,
    trash_cells, trash_bounds,
};
use crate::tui::note_form::NoteForm;

/// A note currently held by the pointer.
#[derive(Debug, Clone, PartialEq)]
struct Drag {
    id: TaskId,
    /// Pointer position relative to the note's top-left corner when grabbed.
    grab: Point,
    /// Where the note would be pinned if released now.
    position: Point,
}

/// Main application state for the terminal user interface.
pub struct App<S: KeyValueStore> {
    state: AppState,
    board: Board<S>,
    form: NoteForm,
    drag: Option<Drag>,
    status_message: String,
    events: Rc<RefCell<Vec<BoardEvent>>>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(mut board: Board<S>) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        board.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        App {
            state: AppState::Board,
            board,
            form: NoteForm::new(),
            drag: None,
            status_message: String::new(),
            events,
        }
    }

    pub fn board(&self) -> &Board<S> {
        &self.board
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    /// Turn board notifications into a status line.
    fn drain_board_events(&mut self) {
        let events: Vec<BoardEvent> = self.events.borrow_mut().drain(..).collect();
        for event in events {
            let msg = match &event {
                BoardEvent::Created(id) => self.task_label(id).map(|n| format!("Pinned '{n}'")),
                BoardEvent::Toggled { id, is_done: true } => {
                    self.task_label(id).map(|n| format!("'{n}' done"))
                }
                BoardEvent::Toggled { id, is_done: false } => {
                    self.task_label(id).map(|n| format!("'{n}' reopened"))
                }
                BoardEvent::Deleted(_) => Some("Note thrown away".to_string()),
                BoardEvent::Raised { renormalized: true, .. } => {
                    debug!("stack renormalized");
                    None
                }
                BoardEvent::Raised { .. } | BoardEvent::Moved(_) => None,
            };
            if let Some(msg) = msg {
                self.set_status_message(msg);
            }
        }
    }

    fn task_label(&self, id: &TaskId) -> Option<String> {
        self.board.get(id).map(|t| t.name.clone())
    }

    fn report(&mut self, result: Result<(), BoardError>) {
        if let Err(e) = result {
            warn!(error = %e, "board operation failed");
            self.set_status_message(format!("Error saving: {}", e));
        }
    }

    /// Board area for the current terminal size.
    fn current_board_area() -> io::Result<Rect> {
        let (w, h) = terminal::size()?;
        Ok(split_frame(Rect::new(0, 0, w, h)).0)
    }

    /// Handle a key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        match self.state {
            AppState::Board => self.handle_board_key(key.code),
            AppState::AddTask => {
                self.handle_form_key(key);
                false
            }
            AppState::Help => {
                self.state = AppState::Board;
                false
            }
        }
    }

    fn handle_board_key(&mut self, code: KeyCode) -> bool {
        self.clear_status_message();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('a') | KeyCode::Char('n') => {
                self.state = AppState::AddTask;
            }
            KeyCode::Char('h') | KeyCode::Char('?') => {
                self.state = AppState::Help;
            }
            _ => {}
        }
        false
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        if self.form.field() == FormField::Description && is_newline_key(&key) {
            self.form.description.handle_char('\n');
            return;
        }
        match key.code {
            KeyCode::Esc => {
                self.state = AppState::Board;
            }
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Left => match self.form.active_input_mut() {
                Some(input) => input.move_cursor_left(),
                None => self.form.priority = self.form.priority.prev(),
            },
            KeyCode::Right => match self.form.active_input_mut() {
                Some(input) => input.move_cursor_right(),
                None => self.form.priority = self.form.priority.next(),
            },
            KeyCode::Backspace => {
                if let Some(input) = self.form.active_input_mut() {
                    input.handle_backspace();
                }
            }
            KeyCode::Delete => {
                if let Some(input) = self.form.active_input_mut() {
                    input.handle_delete();
                }
            }
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => {}
            KeyCode::Char(c) => match self.form.active_input_mut() {
                Some(input) => input.handle_char(c),
                None => {
                    if let Some(p) = c.to_digit(10).and_then(|d| Priority::from_level(d as u8)) {
                        self.form.priority = p;
                    }
                }
            },
            _ => {}
        }
    }

    /// Submit the add form. An empty name is ignored without a word; the form
    /// keeps what was typed.
    fn submit_form(&mut self) {
        let new = match self.form.to_new_task() {
            Ok(new) => new,
            Err(e) => {
                self.set_status_message(e.to_string());
                return;
            }
        };
        match self.board.create(new) {
            Ok(_) => {
                self.form.reset();
                self.state = AppState::Board;
            }
            Err(BoardError::EmptyName) => {}
            Err(e) => {
                self.form.reset();
                self.state = AppState::Board;
                self.report(Err(e));
            }
        }
    }

    /// Handle a mouse event against the board laid out in `area`.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        if self.state != AppState::Board {
            return;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.press(mouse.column, mouse.row, area),
            MouseEventKind::Drag(MouseButton::Left) => self.drag_to(mouse.column, mouse.row, area),
            MouseEventKind::Up(MouseButton::Left) => self.release(mouse.column, mouse.row, area),
            _ => {}
        }
    }

    fn press(&mut self, column: u16, row: u16, area: Rect) {
        self.clear_status_message();
        let now = Utc::now();
        let hit = {
            let order = self.board.paint_order();
            topmost_at(area, &order, column, row).map(|t| {
                let cells = note_cells(area, t.position());
                let on_checkbox = hits_checkbox(cells, has_badge(t, now), column, row);
                (t.id.clone(), t.position(), on_checkbox)
            })
        };
        let Some((id, origin, on_checkbox)) = hit else {
            return;
        };

        if on_checkbox {
            let result = self.board.toggle_done(&id).map(|_| ());
            self.report(result);
            return;
        }

        self.board.begin_drag(&id);
        let pointer = cell_to_board(area, column, row);
        self.drag = Some(Drag {
            id,
            grab: Point::new(pointer.x - origin.x, pointer.y - origin.y),
            position: origin,
        });
    }

    fn drag_to(&mut self, column: u16, row: u16, area: Rect) {
        let bounds = self.board.settings().bounds;
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let pointer = cell_to_board(area, column, row);
        let wanted = Point::new(pointer.x - drag.grab.x, pointer.y - drag.grab.y);
        drag.position = bounds.clamp_origin(wanted, (NOTE_WIDTH, NOTE_HEIGHT));
    }

    fn release(&mut self, column: u16, row: u16, area: Rect) {
        self.drag_to(column, row, area);
        let Some(drag) = self.drag.take() else {
            return;
        };
        let release = cell_to_board(area, column, row);
        let trash = trash_bounds(area);
        if let Err(e) = self.board.end_drag(&drag.id, release, drag.position, trash) {
            self.report(Err(e));
        }
    }

    /// Poll for and handle terminal events. Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if self.handle_key(key) {
                        return Ok(true);
                    }
                }
                Event::Mouse(mouse) => {
                    let area = Self::current_board_area()?;
                    self.handle_mouse(mouse, area);
                }
                _ => {}
            }
        }
        self.drain_board_events();
        Ok(false)
    }

    /// Render one note.
    fn render_note(&self, f: &mut Frame, area: Rect, task: &Task, origin: Point, held: bool, now: DateTime<Utc>) {
        let cells = note_cells(area, origin);
        if cells.width < 4 || cells.height < 3 {
            return;
        }
        let overdue = task.is_overdue(now);
        let paper = if task.is_done { NOTE_DONE } else { note_paper(task.priority) };
        let ink = Style::default().fg(INK).bg(paper);

        let mut lines = Vec::new();
        if task.is_done {
            lines.push(Line::from(Span::styled(
                " ☺ Done ",
                Style::default().fg(Color::White).bg(Color::DarkGray),
            )));
        } else if overdue {
            lines.push(Line::from(Span::styled(
                " ⚠ Overdue ",
                Style::default().fg(Color::White).bg(OVERDUE),
            )));
        }

        let mut name_style = ink.add_modifier(Modifier::BOLD);
        if task.is_done {
            name_style = name_style.add_modifier(Modifier::CROSSED_OUT);
        }
        lines.push(Line::from(vec![
            Span::styled(if task.is_done { "[x] " } else { "[ ] " }, ink),
            Span::styled(task.name.clone(), name_style),
            Span::styled(format!(" {}", task.priority.stars()), Style::default().fg(OVERDUE).bg(paper)),
        ]));

        if let Some(deadline) = task.deadline {
            let mut style = ink;
            if task.is_done {
                style = style.add_modifier(Modifier::CROSSED_OUT);
            }
            lines.push(Line::from(Span::styled(format!("◷ Due {}", format_deadline(deadline)), style)));
        }
        if !task.description.is_empty() {
            lines.push(Line::from(""));
            for part in task.description.lines() {
                lines.push(Line::from(Span::styled(part.to_string(), ink)));
            }
        }

        let border_style = if overdue {
            Style::default().fg(OVERDUE).bg(paper).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray).bg(paper)
        };
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(if held { BorderType::Double } else { BorderType::Rounded })
            .border_style(border_style)
            .style(Style::default().bg(paper));
        let pin = pin_offset(cells, task.rotate) as usize;
        block = block.title(Line::from(format!("{}●", "─".repeat(pin.saturating_sub(1)))));

        let mut paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
        if task.is_done {
            paragraph = paragraph.style(Style::default().add_modifier(Modifier::DIM));
        }

        f.render_widget(Clear, cells);
        f.render_widget(paragraph, cells);
    }

    fn render_board(&self, f: &mut Frame, area: Rect) {
        f.render_widget(Block::default().style(Style::default().bg(CORK)), area);

        if self.board.is_empty() {
            let empty = Paragraph::new("No tasks on the board. Press 'a' to pin one.")
                .style(Style::default().fg(Color::White).bg(CORK))
                .alignment(Alignment::Center);
            f.render_widget(empty, Rect { y: area.y + 2, height: 1, ..area });
        }

        let now = Utc::now();
        for task in self.board.paint_order() {
            let (origin, held) = match &self.drag {
                Some(d) if d.id == task.id => (d.position, true),
                _ => (task.position(), false),
            };
            self.render_note(f, area, task, origin, held, now);
        }

        self.render_trash(f, area);
    }

    fn render_trash(&self, f: &mut Frame, area: Rect) {
        let cells = trash_cells(area);
        let hot = self.drag.is_some();
        let colour = if hot { TRASH_HOT } else { TRASH_IDLE };
        let label = if hot { "Drop to delete" } else { "Trash" };
        let trash = Paragraph::new(vec![Line::from(""), Line::from("🗑"), Line::from(label)])
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::White).bg(colour).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
        f.render_widget(Clear, cells);
        f.render_widget(trash, cells);
    }

    fn render_form(&self, f: &mut Frame, area: Rect) {
        let popup = Rect {
            x: area.x + 2,
            y: area.y + 1,
            width: 44.min(area.width.saturating_sub(2)),
            height: (14 + self.form.description.value.matches('\n').count() as u16)
                .min(area.height.saturating_sub(1)),
        };
        let focused = self.form.field();
        let field_line = |field: FormField, value: String| {
            let style = if field == focused {
                Style::default().fg(INK).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(INK)
            };
            let mut lines = vec![Line::from(Span::styled(
                format!("{}:", field.label()),
                Style::default().fg(Color::DarkGray),
            ))];
            lines.extend(value.split('\n').map(|part| Line::from(Span::styled(part.to_string(), style))));
            lines
        };
        let text_value = |field: FormField, input: &crate::tui::input::InputField| {
            if field == focused { input.with_caret() } else { input.value.clone() }
        };

        let mut lines = Vec::new();
        lines.extend(field_line(FormField::Name, text_value(FormField::Name, &self.form.name)));
        lines.extend(field_line(FormField::Priority, format!("◀ {} ▶", self.form.priority.label())));
        lines.extend(field_line(FormField::Deadline, text_value(FormField::Deadline, &self.form.deadline)));
        lines.extend(field_line(
            FormField::Description,
            text_value(FormField::Description, &self.form.description),
        ));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter: Add  Alt+Enter: New line  Tab: Next  Esc: Cancel",
            Style::default().fg(Color::DarkGray),
        )));

        let form = Paragraph::new(lines)
            .style(Style::default().bg(FORM_BG))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(" New note ")
                    .title_alignment(Alignment::Center),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(Clear, popup);
        f.render_widget(form, popup);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 60, area);
        let lines = vec![
            Line::from(Span::styled("Corkboard", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("a          Add a note"),
            Line::from("drag       Move a note (it comes to the front)"),
            Line::from("[ ] click  Mark done / not done"),
            Line::from("drop on 🗑  Delete the note, no undo"),
            Line::from("Alt+Enter  New line in a description"),
            Line::from("h, ?       This help"),
            Line::from("q, Esc     Quit"),
            Line::from(""),
            Line::from("Press any key to return"),
        ];
        let help = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Help "))
            .style(Style::default().bg(Color::Black).fg(Color::White))
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, popup);
        f.render_widget(help, popup);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::Board => format!(
                    "Tasks: {} | Overdue: {} | a: Add | drag: Move | drop on trash: Delete | h: Help | q: Quit",
                    self.board.len(),
                    self.board.overdue_count()
                ),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::Help => "Help".to_string(),
            }
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(Color::Rgb(120, 53, 15)).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function.
    pub fn render(&self, f: &mut Frame) {
        let (board_area, status_area) = split_frame(f.area());
        self.render_board(f, board_area);
        match self.state {
            AppState::Board => {}
            AppState::AddTask => self.render_form(f, board_area),
            AppState::Help => self.render_help(f, board_area),
        }
        self.render_status_bar(f, status_area);
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Alt+Enter, Shift+Enter or Ctrl+J break the line in the description.
fn is_newline_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SHIFT),
        KeyCode::Char('j') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Done and overdue notes carry a badge line above the checkbox.
fn has_badge(task: &Task, now: DateTime<Utc>) -> bool {
    task.is_done || task.is_overdue(now)
}
