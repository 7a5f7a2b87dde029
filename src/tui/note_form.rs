//! The add-note form.
//!
//! Holds the raw text of each field until submit. A submit that the board
//! rejects leaves every field exactly as typed.

use crate::error::BoardError;
use crate::fields::Priority;
use crate::task::{parse_deadline_input, NewTask};
use crate::tui::enums::FormField;
use crate::tui::input::InputField;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteForm {
    pub name: InputField,
    pub priority: Priority,
    pub deadline: InputField,
    pub description: InputField,
    pub current_field: Option<FormField>,
}

impl NoteForm {
    pub fn new() -> Self {
        NoteForm {
            current_field: Some(FormField::Name),
            ..Default::default()
        }
    }

    pub fn field(&self) -> FormField {
        self.current_field.unwrap_or(FormField::Name)
    }

    pub fn next_field(&mut self) {
        self.current_field = Some(self.field().next());
    }

    pub fn prev_field(&mut self) {
        self.current_field = Some(self.field().prev());
    }

    /// The text input under focus, or `None` on the priority selector.
    pub fn active_input_mut(&mut self) -> Option<&mut InputField> {
        match self.field() {
            FormField::Name => Some(&mut self.name),
            FormField::Priority => None,
            FormField::Deadline => Some(&mut self.deadline),
            FormField::Description => Some(&mut self.description),
        }
    }

    /// Read the fields into a new task. The name is passed through untouched;
    /// the board decides whether it is acceptable.
    pub fn to_new_task(&self) -> Result<NewTask, BoardError> {
        let deadline = parse_deadline_input(&self.deadline.value)?;
        Ok(NewTask::new(self.name.value.clone())
            .with_priority(self.priority)
            .with_deadline(deadline)
            .with_description(self.description.value.trim().to_string()))
    }

    /// Back to a blank form, priority 2, focus on the name.
    pub fn reset(&mut self) {
        *self = NoteForm::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_form_defaults_to_high_priority() {
        let form = NoteForm::new();
        assert_eq!(form.priority, Priority::High);
        assert_eq!(form.field(), FormField::Name);
    }

    #[test]
    fn tab_order_wraps() {
        let mut form = NoteForm::new();
        form.prev_field();
        assert_eq!(form.field(), FormField::Description);
        form.next_field();
        form.next_field();
        assert_eq!(form.field(), FormField::Priority);
        assert!(form.active_input_mut().is_none());
    }

    #[test]
    fn bad_deadline_is_reported() {
        let mut form = NoteForm::new();
        form.name.value = "Essay".into();
        form.deadline.value = "soon".into();
        assert!(matches!(form.to_new_task(), Err(BoardError::InvalidDeadline(_))));
    }

    #[test]
    fn builds_new_task() {
        let mut form = NoteForm::new();
        form.name.value = "Essay".into();
        form.priority = Priority::Highest;
        form.deadline.value = "2025-06-01T10:00".into();
        let new = form.to_new_task().unwrap();
        assert_eq!(new.name, "Essay");
        assert_eq!(new.priority, Priority::Highest);
        assert!(new.deadline.is_some());
        form.reset();
        assert_eq!(form, NoteForm::new());
    }
}
