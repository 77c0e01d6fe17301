use crossterm::event::KeyCode;

/// Manages list selection and scrolling state
#[derive(Debug, Clone)]
pub struct ListState {
    selected: Option<usize>,
    scroll_offset: usize,
    scroll_off: usize, // Rows from edge before scrolling (like vim scrolloff)
    wrap_around: bool,
}

impl Default for ListState {
    fn default() -> Self {
        Self::new()
    }
}

impl ListState {
    pub fn new() -> Self {
        Self {
            selected: None,
            scroll_offset: 0,
            scroll_off: 3,
            wrap_around: true,
        }
    }

    pub fn with_scroll_off(mut self, scroll_off: usize) -> Self {
        self.scroll_off = scroll_off;
        self
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Keep the selection inside a list that may have shrunk after a refresh
    pub fn clamp(&mut self, item_count: usize) {
        self.selected = match self.selected {
            _ if item_count == 0 => None,
            Some(sel) => Some(sel.min(item_count - 1)),
            None => Some(0),
        };
        self.scroll_offset = self.scroll_offset.min(item_count.saturating_sub(1));
    }

    /// Handle navigation key, returns true if handled
    pub fn handle_key(&mut self, key: KeyCode, item_count: usize, visible_height: usize) -> bool {
        if item_count == 0 {
            return false;
        }

        match key {
            KeyCode::Up | KeyCode::Char('k') => self.move_up(item_count),
            KeyCode::Down | KeyCode::Char('j') => self.move_down(item_count),
            KeyCode::PageUp => {
                let sel = self.selected.unwrap_or(0);
                self.selected = Some(sel.saturating_sub(visible_height));
            }
            KeyCode::PageDown => {
                let sel = self.selected.unwrap_or(0);
                self.selected = Some((sel + visible_height).min(item_count - 1));
            }
            KeyCode::Home => self.selected = Some(0),
            KeyCode::End => self.selected = Some(item_count - 1),
            _ => return false,
        }

        self.update_scroll(visible_height, item_count);
        true
    }

    fn move_up(&mut self, item_count: usize) {
        self.selected = match self.selected {
            Some(0) if self.wrap_around => Some(item_count - 1),
            Some(sel) => Some(sel.saturating_sub(1)),
            None => Some(0),
        };
    }

    fn move_down(&mut self, item_count: usize) {
        self.selected = match self.selected {
            Some(sel) if sel + 1 < item_count => Some(sel + 1),
            Some(_) if self.wrap_around => Some(0),
            Some(sel) => Some(sel),
            None => Some(0),
        };
    }

    /// Update scroll offset based on selection and visible height
    pub fn update_scroll(&mut self, visible_height: usize, item_count: usize) {
        if let Some(sel) = self.selected {
            let min_scroll = sel.saturating_sub(visible_height.saturating_sub(self.scroll_off + 1));
            let max_scroll = sel.saturating_sub(self.scroll_off);

            if self.scroll_offset < min_scroll {
                self.scroll_offset = min_scroll;
            } else if self.scroll_offset > max_scroll {
                self.scroll_offset = max_scroll;
            }

            let max_offset = item_count.saturating_sub(visible_height);
            self.scroll_offset = self.scroll_offset.min(max_offset);
        }
    }
}

/// Single-line text input with a cursor
#[derive(Debug, Clone, Default)]
pub struct TextInputField {
    value: String,
    cursor: usize, // in chars
    masked: bool,
}

impl TextInputField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input whose value is shown as bullets
    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_value(value.into());
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cursor is positioned at the end of the value
    pub fn set_value(&mut self, value: String) {
        self.cursor = value.chars().count();
        self.value = value;
    }

    pub fn clear(&mut self) {
        self.set_value(String::new());
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text to draw, masked when the field holds a secret
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Apply an editing key; returns true if the value or cursor changed
    pub fn handle_key(&mut self, key: KeyCode, max_length: Option<usize>) -> bool {
        let len = self.value.chars().count();
        match key {
            KeyCode::Char(c) => {
                if max_length.is_some_and(|max| len >= max) {
                    return false;
                }
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                let at = self.byte_index(self.cursor - 1);
                self.value.remove(at);
                self.cursor -= 1;
            }
            KeyCode::Delete if self.cursor < len => {
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
            }
            KeyCode::Left if self.cursor > 0 => self.cursor -= 1,
            KeyCode::Right if self.cursor < len => self.cursor += 1,
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len,
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_wraps_around() {
        let mut list = ListState::new();
        list.handle_key(KeyCode::Down, 3, 10);
        assert_eq!(list.selected(), Some(0));
        list.handle_key(KeyCode::Up, 3, 10);
        assert_eq!(list.selected(), Some(2));
        list.handle_key(KeyCode::Down, 3, 10);
        assert_eq!(list.selected(), Some(0));
    }

    #[test]
    fn test_list_scroll_follows_selection() {
        let mut list = ListState::new().with_scroll_off(1);
        list.handle_key(KeyCode::End, 50, 10);
        assert_eq!(list.selected(), Some(49));
        assert_eq!(list.scroll_offset(), 40);
        list.handle_key(KeyCode::Home, 50, 10);
        assert_eq!(list.scroll_offset(), 0);
    }

    #[test]
    fn test_list_clamp_after_shrink() {
        let mut list = ListState::new();
        list.handle_key(KeyCode::End, 10, 5);
        list.clamp(4);
        assert_eq!(list.selected(), Some(3));
        list.clamp(0);
        assert_eq!(list.selected(), None);
    }

    #[test]
    fn test_empty_list_ignores_keys() {
        let mut list = ListState::new();
        assert!(!list.handle_key(KeyCode::Down, 0, 5));
    }

    #[test]
    fn test_text_input_editing() {
        let mut field = TextInputField::new();
        for c in "10.0.0.1".chars() {
            field.handle_key(KeyCode::Char(c), None);
        }
        field.handle_key(KeyCode::Home, None);
        field.handle_key(KeyCode::Delete, None);
        assert_eq!(field.value(), "0.0.0.1");
        field.handle_key(KeyCode::End, None);
        field.handle_key(KeyCode::Backspace, None);
        assert_eq!(field.value(), "0.0.0.");
    }

    #[test]
    fn test_text_input_max_length_and_unicode() {
        let mut field = TextInputField::new().with_value("ré");
        assert!(!field.handle_key(KeyCode::Char('x'), Some(2)));
        field.handle_key(KeyCode::Left, None);
        field.handle_key(KeyCode::Char('o'), None);
        assert_eq!(field.value(), "roé");
    }

    #[test]
    fn test_masked_display() {
        let field = TextInputField::masked().with_value("abc");
        assert_eq!(field.display(), "•••");
        assert_eq!(field.value(), "abc");
    }
}
