//! Enumerations for TUI state management.

/// Which screen has the keyboard.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    Board,
    AddTask,
    Help,
}

/// Fields of the add form, in tab order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormField {
    Name,
    Priority,
    Deadline,
    Description,
}

impl FormField {
    pub const ORDER: [FormField; 4] = [
        FormField::Name,
        FormField::Priority,
        FormField::Deadline,
        FormField::Description,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Task name",
            FormField::Priority => "Priority",
            FormField::Deadline => "Deadline (optional)",
            FormField::Description => "Description (optional)",
        }
    }
}
