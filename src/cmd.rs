//! Command implementations for the CLI.
//!
//! Each `cmd_*` function opens nothing itself: it is handed the loaded board
//! and performs exactly one operation, printing a short confirmation.

use std::path::Path;

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::board::{Board, BoardSettings};
use crate::cli::Cli;
use crate::error::BoardError;
use crate::fields::Priority;
use crate::storage::KeyValueStore;
use crate::task::{format_deadline, parse_deadline_input, NewTask, Task, TaskId};

#[derive(Subcommand)]
pub enum Commands {
    /// Open the board (default).
    Ui,

    /// Pin a new note.
    Add {
        /// Note text.
        name: String,
        /// 1 (highest) to 4 (lowest).
        #[arg(short, long, value_enum, default_value = "2")]
        priority: Priority,
        /// Deadline, e.g. 2025-06-01T10:00 (local time).
        #[arg(short, long)]
        deadline: Option<String>,
        /// Longer description.
        #[arg(long)]
        desc: Option<String>,
    },

    /// List notes front to back.
    List,

    /// Mark a note done, or not done again.
    Toggle {
        /// Task id or a unique prefix of it.
        id: String,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal board.
pub fn cmd_ui(data_dir: &Path, settings: BoardSettings) -> Result<()> {
    crate::tui::run::run_tui(data_dir, settings)?;
    Ok(())
}

pub fn cmd_add<S: KeyValueStore>(
    board: &mut Board<S>,
    name: String,
    priority: Priority,
    deadline: Option<String>,
    desc: Option<String>,
) -> Result<()> {
    let deadline = match deadline {
        Some(text) => parse_deadline_input(&text)?,
        None => None,
    };
    let new = NewTask::new(name)
        .with_priority(priority)
        .with_deadline(deadline)
        .with_description(desc.unwrap_or_default());
    match board.create(new) {
        Ok(id) => {
            println!("Pinned {}", id.short());
            Ok(())
        }
        Err(BoardError::EmptyName) => bail!("task name must not be empty"),
        Err(e) => Err(e.into()),
    }
}

pub fn cmd_list<S: KeyValueStore>(board: &Board<S>) {
    if board.is_empty() {
        println!("No tasks on the board.");
        return;
    }
    let mut tasks = board.paint_order();
    tasks.reverse();
    print_table(&tasks);
}

pub fn cmd_toggle<S: KeyValueStore>(board: &mut Board<S>, id: &str) -> Result<()> {
    let id = resolve_task_identifier(id, board.tasks()).map_err(|e| anyhow!(e))?;
    board.toggle_done(&id)?;
    let done = board.get(&id).is_some_and(|t| t.is_done);
    println!("{} marked {}", id.short(), if done { "done" } else { "open" });
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

/// Print tasks as a table, one per line.
pub fn print_table(tasks: &[&Task]) {
    println!("{:<9} {:<4} {:<4} {:<17} {}", "ID", "Done", "Pri", "Deadline", "Name");
    let now = Utc::now();
    for t in tasks {
        let deadline = t.deadline.map(format_deadline).unwrap_or_else(|| "-".into());
        let flag = if t.is_overdue(now) { " (overdue)" } else { "" };
        println!(
            "{:<9} {:<4} {:<4} {:<17} {}{}",
            t.id.short(),
            if t.is_done { "x" } else { "" },
            t.priority.stars(),
            deadline,
            truncate(&t.name, 40),
            flag
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Resolve a full id or unique id prefix to a task id.
pub fn resolve_task_identifier(identifier: &str, tasks: &[Task]) -> Result<TaskId, String> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err("No task id given".to_string());
    }
    if let Some(t) = tasks.iter().find(|t| t.id.as_str() == identifier) {
        return Ok(t.id.clone());
    }
    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.id.as_str().starts_with(identifier))
        .collect();
    match matches.len() {
        0 => Err(format!("No task found with id '{}'", identifier)),
        1 => Ok(matches[0].id.clone()),
        _ => {
            let mut error_msg = format!("Multiple tasks match '{}':\n", identifier);
            for task in matches {
                error_msg.push_str(&format!("  {}: {}\n", task.id, task.name));
            }
            error_msg.push_str("Please use a longer prefix.");
            Err(error_msg)
        }
    }
}
