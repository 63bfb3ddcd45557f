//! Edit-mode actions on the current entry's text.

use super::{Mode, Session, Update};
use crate::cursor::{Cursor, Wrap};
use crate::error::{OutlineError, TreeError};

/// Which side of the caret [`Session::remove_char`] erases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Erase {
    /// Character under the caret (delete key).
    Forward,
    /// Character before the caret (backspace).
    Backward,
}

impl Session {
    /// Enter edit mode with the caret after the last character.
    pub fn enter_edit(&mut self) -> Update {
        self.mode = Mode::Edit;
        let wrap = self.wrap();
        self.cursor = Cursor::at(wrap.len, wrap);
        self.follow_caret();
        Update::Current
    }

    /// Return to browse mode.
    pub fn leave_edit(&mut self) -> Update {
        if self.mode == Mode::Browse {
            return Update::None;
        }
        self.mode = Mode::Browse;
        Update::Current
    }

    pub fn cursor_home(&mut self) -> Update {
        self.move_caret(Cursor::home)
    }

    pub fn cursor_end(&mut self) -> Update {
        self.move_caret(Cursor::end)
    }

    pub fn cursor_left(&mut self) -> Update {
        self.move_caret(Cursor::left)
    }

    pub fn cursor_right(&mut self) -> Update {
        self.move_caret(Cursor::right)
    }

    pub fn cursor_up(&mut self) -> Update {
        self.move_caret(Cursor::up)
    }

    pub fn cursor_down(&mut self) -> Update {
        self.move_caret(Cursor::down)
    }

    /// Insert `ch` at the caret and advance it.
    ///
    /// Returns [`Update::All`] when the entry gained a wrapped line, so the rows below move.
    /// Line breaks are refused with [`Update::None`]: entry text is a single persisted line.
    ///
    /// # Errors
    /// Projection bookkeeping failures only.
    pub fn insert_char(&mut self, ch: char) -> Result<Update, OutlineError> {
        if matches!(ch, '\n' | '\r') {
            tracing::debug!("line break refused in entry text");
            return Ok(Update::None);
        }
        let c = self.current_entry();
        let offset = self.cursor.offset();
        let entry = self.doc.get_mut(c).ok_or(TreeError::UnknownEntry)?;
        entry.insert_char(offset, ch);
        self.after_text_change(offset + 1)
    }

    /// Erase one character next to the caret. A no-op at the matching end of the text.
    ///
    /// # Errors
    /// Projection bookkeeping failures only.
    pub fn remove_char(&mut self, erase: Erase) -> Result<Update, OutlineError> {
        let c = self.current_entry();
        let offset = match erase {
            Erase::Forward => self.cursor.offset(),
            Erase::Backward => match self.cursor.offset().checked_sub(1) {
                Some(offset) => offset,
                None => return Ok(Update::None),
            },
        };
        let entry = self.doc.get_mut(c).ok_or(TreeError::UnknownEntry)?;
        if entry.remove_char(offset).is_none() {
            return Ok(Update::None);
        }
        self.after_text_change(offset)
    }

    fn after_text_change(&mut self, offset: usize) -> Result<Update, OutlineError> {
        let before = self.current_lines();
        let (len, depth) = {
            let row = self.current_row_data().ok_or(TreeError::UnknownEntry)?;
            let len = self
                .doc
                .get(row.entry())
                .map(|entry| entry.len())
                .unwrap_or(0);
            (len, row.depth())
        };
        let after = self.geometry().wrapped_lines(len, depth);
        let update = if after != before {
            let to = self.projection.next(self.current);
            self.projection
                .rebuild(&self.doc, &mut self.store, self.current, to)?;
            tracing::debug!(before, after, "wrapped line count changed");
            Update::All
        } else {
            self.projection.refresh_row(&self.doc, self.current)?;
            Update::Current
        };
        self.cursor.place(offset, self.wrap());
        self.sync_partial();
        self.follow_caret();
        Ok(update)
    }

    fn move_caret(&mut self, step: fn(&mut Cursor, Wrap) -> bool) -> Update {
        if self.mode != Mode::Edit {
            return Update::None;
        }
        let wrap = self.wrap();
        if !step(&mut self.cursor, wrap) {
            return Update::None;
        }
        let offset = self.partial.offset();
        self.follow_caret();
        if self.partial.offset() != offset {
            Update::All
        } else {
            Update::Current
        }
    }

    fn follow_caret(&mut self) {
        let height = self.geometry().screen_height;
        self.partial.follow(self.cursor.line(), height);
    }
}
