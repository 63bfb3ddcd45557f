//! A single outline node: text buffer, style flags and tree links.

use super::EntryId;

/// One outline node.
///
/// Text is addressed by character offset; `len` caches the character count so wrap
/// arithmetic never rescans the buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    text: String,
    len: usize,
    crossed: bool,
    bold: bool,

    pub(super) parent: Option<EntryId>,
    pub(super) prev: Option<EntryId>,
    pub(super) next: Option<EntryId>,
    pub(super) child: Option<EntryId>,
}

impl Entry {
    /// Empty, unlinked entry with room for `capacity` bytes of text.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text length in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn crossed(&self) -> bool {
        self.crossed
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn parent(&self) -> Option<EntryId> {
        self.parent
    }

    pub fn prev(&self) -> Option<EntryId> {
        self.prev
    }

    pub fn next(&self) -> Option<EntryId> {
        self.next
    }

    pub fn child(&self) -> Option<EntryId> {
        self.child
    }

    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.len = self.text.chars().count();
    }

    pub fn set_crossed(&mut self, crossed: bool) {
        self.crossed = crossed;
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.bold = bold;
    }

    pub fn toggle_crossed(&mut self) {
        self.crossed = !self.crossed;
    }

    pub fn toggle_bold(&mut self) {
        self.bold = !self.bold;
    }

    fn byte_offset(&self, offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(offset)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }

    /// Insert `ch` before character `offset`, clamped to the text length.
    pub fn insert_char(&mut self, offset: usize, ch: char) {
        let at = self.byte_offset(offset.min(self.len));
        self.text.insert(at, ch);
        self.len += 1;
    }

    /// Remove the character at `offset`.
    ///
    /// # Returns
    /// The removed character, or `None` when `offset` is at or past the end.
    pub fn remove_char(&mut self, offset: usize) -> Option<char> {
        if offset >= self.len {
            return None;
        }
        let at = self.byte_offset(offset);
        let removed = self.text.remove(at);
        self.len -= 1;
        Some(removed)
    }
}
