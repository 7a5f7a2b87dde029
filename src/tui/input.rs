//! Input field handling for the terminal user interface.

/// A single-line text input with a character-indexed cursor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputField {
    pub value: String,
    /// Cursor position in characters, not bytes.
    pub cursor: usize,
}

impl InputField {
    pub fn new() -> Self {
        Self::default()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    /// Insert a character at the current cursor position.
    pub fn handle_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_index(self.cursor - 1);
            self.value.remove(at);
            self.cursor -= 1;
        }
    }

    /// Delete the character at the cursor position.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Text with a caret marker at the cursor, for rendering the focused field.
    pub fn with_caret(&self) -> String {
        let at = self.byte_index(self.cursor);
        format!("{}▏{}", &self.value[..at], &self.value[at..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_multibyte_text_by_character() {
        let mut f = InputField::new();
        for c in "宿題x".chars() {
            f.handle_char(c);
        }
        f.handle_backspace();
        assert_eq!(f.value, "宿題");
        f.move_cursor_left();
        f.handle_char('の');
        assert_eq!(f.value, "宿の題");
        f.handle_delete();
        assert_eq!(f.value, "宿の");
        assert_eq!(f.with_caret(), "宿の▏");
    }
}
