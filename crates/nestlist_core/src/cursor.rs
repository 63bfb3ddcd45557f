//! Caret arithmetic for text wrapped inside a fixed column width.

/// Wrap parameters of the entry being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrap {
    /// Text length in characters.
    pub len: usize,
    /// Column width, at least one.
    pub width: usize,
    /// Wrapped line count, at least one.
    pub lines: usize,
}

impl Wrap {
    pub fn new(len: usize, width: usize, lines: usize) -> Self {
        Self {
            len,
            width: width.max(1),
            lines: lines.max(1),
        }
    }
}

/// Edit-mode caret: a character offset plus its derived wrapped line and column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    offset: usize,
    line: usize,
    col: usize,
}

impl Cursor {
    /// Caret at `offset`, clamped to the text length.
    pub fn at(offset: usize, wrap: Wrap) -> Self {
        let mut cursor = Self::default();
        cursor.place(offset, wrap);
        cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Wrapped line holding the caret, 0-based.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Column within the wrapped line. Equals the width after the last character of a
    /// full last line.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Move to `offset` and recompute line and column.
    pub fn place(&mut self, offset: usize, wrap: Wrap) {
        self.offset = offset.min(wrap.len);
        self.line = (self.offset / wrap.width).min(wrap.lines - 1);
        self.col = self.offset - self.line * wrap.width;
    }

    /// Recompute line and column after the text or geometry changed.
    pub fn refresh(&mut self, wrap: Wrap) {
        self.place(self.offset, wrap);
    }

    pub fn home(&mut self, wrap: Wrap) -> bool {
        self.step_to(0, wrap)
    }

    pub fn end(&mut self, wrap: Wrap) -> bool {
        self.step_to(wrap.len, wrap)
    }

    pub fn left(&mut self, wrap: Wrap) -> bool {
        match self.offset.checked_sub(1) {
            Some(offset) => self.step_to(offset, wrap),
            None => false,
        }
    }

    pub fn right(&mut self, wrap: Wrap) -> bool {
        if self.offset >= wrap.len {
            return false;
        }
        self.step_to(self.offset + 1, wrap)
    }

    /// One wrapped line up, keeping the column.
    ///
    /// From the end of a full last line the caret lands on the last character above.
    pub fn up(&mut self, wrap: Wrap) -> bool {
        if self.line == 0 {
            return false;
        }
        let col = self.col.min(wrap.width - 1);
        self.step_to((self.line - 1) * wrap.width + col, wrap)
    }

    /// One wrapped line down, keeping the column where the last line is long enough.
    pub fn down(&mut self, wrap: Wrap) -> bool {
        if self.line + 1 >= wrap.lines {
            return false;
        }
        self.step_to((self.offset + wrap.width).min(wrap.len), wrap)
    }

    fn step_to(&mut self, offset: usize, wrap: Wrap) -> bool {
        let before = *self;
        self.place(offset, wrap);
        *self != before
    }
}
