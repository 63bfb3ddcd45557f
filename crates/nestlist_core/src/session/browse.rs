//! Browse-mode actions: navigation, folding and structural edits.

use super::{DeletedEntry, Mode, Restore, Session, Update};
use crate::constants::DEFAULT_ENTRY_CAPACITY;
use crate::cursor::Cursor;
use crate::error::{OutlineError, TreeError};
use crate::projection::{RowId, SearchDirection};
use crate::tree::{EntryId, Indent, MoveDirection, Placement};

impl Session {
    /// Insert an empty sibling after the current entry and start editing it.
    ///
    /// # Errors
    /// Projection bookkeeping failures only.
    pub fn insert_after(&mut self) -> Result<Update, OutlineError> {
        let c = self.current_entry();
        let to = self.row_after(self.doc.following(c));
        let id = self.doc.insert(c, Placement::After, DEFAULT_ENTRY_CAPACITY)?;
        self.projection
            .rebuild(&self.doc, &mut self.store, self.current, to)?;
        self.focus_entry(self.current, id, SearchDirection::Forward)?;
        self.mode = Mode::Edit;
        self.cursor = Cursor::default();
        Ok(Update::All)
    }

    /// Flip the struck-through flag of the current entry.
    pub fn toggle_crossed(&mut self) -> Update {
        let c = self.current_entry();
        match self.doc.get_mut(c) {
            Some(entry) => {
                entry.toggle_crossed();
                Update::Current
            }
            None => Update::None,
        }
    }

    /// Flip the emphasized flag of the current entry.
    pub fn toggle_bold(&mut self) -> Update {
        let c = self.current_entry();
        match self.doc.get_mut(c) {
            Some(entry) => {
                entry.toggle_bold();
                Update::Current
            }
            None => Update::None,
        }
    }

    /// Delete the current entry and remember it for [`Session::undo_delete`].
    ///
    /// # Errors
    /// [`TreeError::HasChildren`] and [`TreeError::LastNode`] refusals, which leave the
    /// session untouched.
    pub fn delete(&mut self) -> Result<Update, OutlineError> {
        let c = self.current_entry();
        let (text, crossed, bold, parent, prev, next) = {
            let entry = self.doc.get(c).ok_or(TreeError::UnknownEntry)?;
            (
                entry.text().to_string(),
                entry.crossed(),
                entry.bold(),
                entry.parent(),
                entry.prev(),
                entry.next(),
            )
        };
        let anchor = self.projection.prev(self.current);
        let to = self.projection.next(self.current);

        let fallback = match self.doc.delete(c) {
            Ok(fallback) => fallback,
            Err(err) => {
                tracing::warn!(entry = %c, %err, "delete refused");
                return Err(err.into());
            }
        };
        self.store.forget(c);
        let restore = match (prev, parent, next) {
            (Some(prev), _, _) => Restore::After(prev),
            (None, Some(parent), _) => Restore::FirstChildOf(parent),
            (None, None, Some(next)) => Restore::Before(next),
            (None, None, None) => unreachable!("delete succeeded on the only entry"),
        };
        self.undo = Some(DeletedEntry {
            text,
            crossed,
            bold,
            restore,
        });

        let last = self
            .projection
            .rebuild_span(&self.doc, &mut self.store, anchor, to)?;
        self.current = anchor.unwrap_or(last);
        self.focus_entry(self.current, fallback, SearchDirection::Backward)?;
        Ok(Update::All)
    }

    /// Put back the most recently deleted entry.
    ///
    /// Returns [`Update::None`] when there is nothing to restore or its anchor is gone.
    ///
    /// # Errors
    /// Projection bookkeeping failures only.
    pub fn undo_delete(&mut self) -> Result<Update, OutlineError> {
        let Some(deleted) = self.undo.take() else {
            return Ok(Update::None);
        };
        let inserted = match deleted.restore {
            Restore::After(prev) => self.doc.insert(prev, Placement::After, deleted.text.len()),
            Restore::FirstChildOf(parent) => {
                self.doc.insert_first_child(parent, deleted.text.len())
            }
            Restore::Before(next) => self.doc.insert(next, Placement::Before, deleted.text.len()),
        };
        let id = match inserted {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(%err, "deleted entry lost its anchor");
                return Ok(Update::None);
            }
        };
        if let Some(entry) = self.doc.get_mut(id) {
            entry.set_text(&deleted.text);
            entry.set_crossed(deleted.crossed);
            entry.set_bold(deleted.bold);
        }

        let mut hidden = false;
        let mut ancestor = self.doc.parent(id);
        while let Some(parent) = ancestor {
            if !self.store.is_expanded(parent) {
                self.store.set(parent, true);
                hidden = true;
            }
            ancestor = self.doc.parent(parent);
        }

        if hidden {
            self.projection.set_root(&self.doc, &mut self.store);
        } else {
            let anchor = self.row_before(self.doc.prev(id).or(self.doc.parent(id)));
            let to = self.row_after(self.doc.following(id));
            self.projection
                .rebuild_span(&self.doc, &mut self.store, anchor, to)?;
        }
        let start = self.projection.head().ok_or(TreeError::UnknownEntry)?;
        self.focus_entry(start, id, SearchDirection::Forward)?;
        Ok(Update::All)
    }

    /// Collapse the current entry, or move to its parent when already collapsed.
    ///
    /// # Errors
    /// Projection bookkeeping failures only.
    pub fn collapse_or_parent(&mut self) -> Result<Update, OutlineError> {
        let c = self.current_entry();
        if self.store.is_expanded(c) {
            let to = self.row_after(self.doc.following(c));
            self.store.set(c, false);
            self.projection
                .rebuild(&self.doc, &mut self.store, self.current, to)?;
            self.sync_partial();
            return Ok(Update::All);
        }
        match self.doc.parent(c) {
            Some(parent) => {
                self.focus_entry(self.current, parent, SearchDirection::Backward)?;
                Ok(Update::All)
            }
            None => Ok(Update::None),
        }
    }

    /// Expand the current entry, or move to its first child when already expanded.
    ///
    /// # Errors
    /// Projection bookkeeping failures only.
    pub fn expand_or_child(&mut self) -> Result<Update, OutlineError> {
        let c = self.current_entry();
        if self.store.is_expanded(c) {
            return Ok(match self.projection.next(self.current) {
                Some(next) => {
                    self.focus(next);
                    Update::All
                }
                None => Update::None,
            });
        }
        if !self.doc.has_children(c) {
            return Ok(Update::None);
        }
        let to = self.projection.next(self.current);
        self.store.set(c, true);
        self.projection
            .rebuild(&self.doc, &mut self.store, self.current, to)?;
        Ok(Update::All)
    }

    /// Scroll an over-long row down, else move to the next sibling (or the parent's next).
    pub fn next_sibling(&mut self) -> Update {
        if self.partial.is_active() && self.partial.scroll_down() {
            return Update::Current;
        }
        let c = self.current_entry();
        let target = self
            .doc
            .next(c)
            .or_else(|| self.doc.parent(c).and_then(|parent| self.doc.next(parent)));
        match self.row_after(target) {
            Some(row) => {
                self.focus(row);
                Update::All
            }
            None => Update::None,
        }
    }

    /// Scroll an over-long row up, else move to the previous sibling (or the parent).
    pub fn prev_sibling(&mut self) -> Update {
        if self.partial.is_active() && self.partial.scroll_up() {
            return Update::Current;
        }
        let c = self.current_entry();
        let target = self.doc.prev(c).or_else(|| self.doc.parent(c));
        match self.row_before(target) {
            Some(row) => {
                self.focus(row);
                Update::All
            }
            None => Update::None,
        }
    }

    /// Move to the next visible row.
    pub fn next_row(&mut self) -> Update {
        match self.projection.next(self.current) {
            Some(row) => {
                self.focus(row);
                Update::All
            }
            None => Update::None,
        }
    }

    /// Move to the previous visible row.
    pub fn prev_row(&mut self) -> Update {
        match self.projection.prev(self.current) {
            Some(row) => {
                self.focus(row);
                Update::All
            }
            None => Update::None,
        }
    }

    /// Make the current entry the next sibling of its parent.
    ///
    /// # Errors
    /// Projection bookkeeping failures only.
    pub fn promote(&mut self) -> Result<Update, OutlineError> {
        let c = self.current_entry();
        let Some(parent) = self.doc.parent(c) else {
            tracing::warn!(entry = %c, "promote refused: already top level");
            return Ok(Update::None);
        };
        let anchor = self
            .row_before(Some(parent))
            .ok_or(TreeError::UnknownEntry)?;
        let to = self.row_after(self.doc.following(parent));
        if !self.doc.indent(c, Indent::Outward) {
            return Ok(Update::None);
        }
        self.projection
            .rebuild(&self.doc, &mut self.store, anchor, to)?;
        self.focus_entry(anchor, c, SearchDirection::Forward)?;
        Ok(Update::All)
    }

    /// Make the current entry the last child of its previous sibling, expanding that sibling.
    ///
    /// # Errors
    /// Projection bookkeeping failures only.
    pub fn demote(&mut self) -> Result<Update, OutlineError> {
        let c = self.current_entry();
        let Some(prev) = self.doc.prev(c) else {
            tracing::warn!(entry = %c, "demote refused: no previous sibling");
            return Ok(Update::None);
        };
        let anchor = self.row_before(Some(prev)).ok_or(TreeError::UnknownEntry)?;
        let to = self.row_after(self.doc.following(c));
        if !self.doc.indent(c, Indent::Inward) {
            return Ok(Update::None);
        }
        self.store.set(prev, true);
        self.projection
            .rebuild(&self.doc, &mut self.store, anchor, to)?;
        self.focus_entry(anchor, c, SearchDirection::Forward)?;
        Ok(Update::All)
    }

    /// Swap the current entry with its next sibling.
    ///
    /// # Errors
    /// Projection bookkeeping failures only.
    pub fn move_down(&mut self) -> Result<Update, OutlineError> {
        let c = self.current_entry();
        let Some(next) = self.doc.next(c) else {
            tracing::warn!(entry = %c, "move refused: already last");
            return Ok(Update::None);
        };
        let anchor = self.projection.prev(self.current);
        let to = self.row_after(self.doc.following(next));
        self.reorder(c, MoveDirection::Down, anchor, to)
    }

    /// Swap the current entry with its previous sibling.
    ///
    /// # Errors
    /// Projection bookkeeping failures only.
    pub fn move_up(&mut self) -> Result<Update, OutlineError> {
        let c = self.current_entry();
        let Some(prev) = self.doc.prev(c) else {
            tracing::warn!(entry = %c, "move refused: already first");
            return Ok(Update::None);
        };
        let prev_row = self.row_before(Some(prev)).ok_or(TreeError::UnknownEntry)?;
        let anchor = self.projection.prev(prev_row);
        let to = self.row_after(self.doc.following(c));
        self.reorder(c, MoveDirection::Up, anchor, to)
    }

    fn reorder(
        &mut self,
        c: EntryId,
        direction: MoveDirection,
        anchor: Option<RowId>,
        to: Option<RowId>,
    ) -> Result<Update, OutlineError> {
        if !self.doc.move_entry(c, direction) {
            return Ok(Update::None);
        }
        let last = self
            .projection
            .rebuild_span(&self.doc, &mut self.store, anchor, to)?;
        let start = match anchor {
            Some(anchor) => anchor,
            None => self.projection.head().unwrap_or(last),
        };
        self.focus_entry(start, c, SearchDirection::Forward)?;
        Ok(Update::All)
    }

    /// Collapse every entry and move to the current entry's top-level ancestor.
    ///
    /// # Errors
    /// Projection bookkeeping failures only.
    pub fn collapse_all(&mut self) -> Result<Update, OutlineError> {
        let mut top = self.current_entry();
        while let Some(parent) = self.doc.parent(top) {
            top = parent;
        }
        self.store.set_range(&self.doc, false, None, None);
        self.projection.set_root(&self.doc, &mut self.store);
        let start = self.projection.head().ok_or(TreeError::UnknownEntry)?;
        self.focus_entry(start, top, SearchDirection::Forward)?;
        Ok(Update::All)
    }

    /// Expand every entry that has children, keeping the current entry.
    ///
    /// # Errors
    /// Projection bookkeeping failures only.
    pub fn expand_all(&mut self) -> Result<Update, OutlineError> {
        let c = self.current_entry();
        self.store.materialize(&self.doc);
        self.store.set_range(&self.doc, true, None, None);
        self.projection.set_root(&self.doc, &mut self.store);
        let start = self.projection.head().ok_or(TreeError::UnknownEntry)?;
        self.focus_entry(start, c, SearchDirection::Forward)?;
        Ok(Update::All)
    }
}
