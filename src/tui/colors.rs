//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Priority;

// Note paper, one per priority

/// Priority 1
pub const NOTE_RED: Color = Color::Rgb(252, 165, 165);
/// Priority 2
pub const NOTE_YELLOW: Color = Color::Rgb(254, 240, 138);
/// Priority 3
pub const NOTE_GREEN: Color = Color::Rgb(187, 247, 208);
/// Priority 4
pub const NOTE_BLUE: Color = Color::Rgb(191, 219, 254);
/// Completed notes
pub const NOTE_DONE: Color = Color::Rgb(209, 213, 219);

/// Board background
pub const CORK: Color = Color::Rgb(150, 111, 72);
/// Ink on note paper
pub const INK: Color = Color::Rgb(30, 41, 59);
/// Overdue border and badge
pub const OVERDUE: Color = Color::Rgb(234, 88, 12);
/// Trash target, idle and while a note is held
pub const TRASH_IDLE: Color = Color::Rgb(156, 163, 175);
pub const TRASH_HOT: Color = Color::Rgb(239, 68, 68);
/// Form panel
pub const FORM_BG: Color = Color::Rgb(254, 243, 199);

/// Paper colour of an open note.
pub fn note_paper(priority: Priority) -> Color {
    match priority {
        Priority::Highest => NOTE_RED,
        Priority::High => NOTE_YELLOW,
        Priority::Medium => NOTE_GREEN,
        Priority::Low => NOTE_BLUE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_priority_has_its_own_paper() {
        let mut papers: Vec<String> = Priority::ALL.iter().map(|p| format!("{:?}", note_paper(*p))).collect();
        papers.sort();
        papers.dedup();
        assert_eq!(papers.len(), 4);
        assert_eq!(note_paper(Priority::Highest), NOTE_RED);
    }
}
