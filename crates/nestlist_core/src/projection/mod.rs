//! Visible projection: the expanded part of the tree flattened into drawable rows.
//!
//! Rows form a doubly-linked chain in expand-aware pre-order. Structural edits only
//! regenerate the rows between two boundary rows; everything outside the span keeps its
//! [`RowId`].

#[cfg(test)]
mod tests;

use crate::constants::{BULLET_WIDTH, DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH, MIN_COLUMN_WIDTH};
use crate::error::ProjectionError;
use crate::expand::ExpandStore;
use crate::tree::{Document, EntryId};
use std::collections::HashMap;
use std::fmt;

fn div_ceil(value: usize, divisor: usize) -> usize {
    if value == 0 {
        0
    } else {
        (value - 1) / divisor + 1
    }
}

/// Stable handle of a projected row. Ids are never reused within a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Direction for [`Projection::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Backward,
    Forward,
}

/// Fixed character-grid geometry shared by every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub screen_width: usize,
    pub screen_height: usize,
    pub bullet_width: usize,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            screen_width: DEFAULT_SCREEN_WIDTH,
            screen_height: DEFAULT_SCREEN_HEIGHT,
            bullet_width: BULLET_WIDTH,
        }
    }
}

impl Geometry {
    pub fn new(screen_width: usize, screen_height: usize) -> Self {
        Self {
            screen_width,
            screen_height,
            ..Self::default()
        }
    }

    /// Text columns available at `depth`, never below one.
    pub fn column_width(&self, depth: usize) -> usize {
        self.screen_width
            .saturating_sub((depth + 1).saturating_mul(self.bullet_width))
            .max(MIN_COLUMN_WIDTH)
    }

    /// Screen column of the bullet glyph.
    pub fn indent(&self, depth: usize) -> usize {
        depth.saturating_mul(self.bullet_width)
    }

    /// Screen column where the text starts.
    pub fn text_column(&self, depth: usize) -> usize {
        self.indent(depth) + self.bullet_width
    }

    /// Wrapped line count of `len` characters at `depth`; at least one.
    pub fn wrapped_lines(&self, len: usize, depth: usize) -> usize {
        div_ceil(len, self.column_width(depth)).max(1)
    }
}

/// One visible line-item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    entry: EntryId,
    depth: usize,
    indent: usize,
    width: usize,
    lines: usize,
    expanded: bool,
    anchor: Option<usize>,
    prev: Option<RowId>,
    next: Option<RowId>,
}

impl Row {
    /// Entry shown by this row; also the key of its expand record.
    pub fn entry(&self) -> EntryId {
        self.entry
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Text column width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Wrapped line count.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Whether the children of this row's entry are shown.
    pub fn expanded(&self) -> bool {
        self.expanded
    }

    /// Screen line of the row's first wrapped line, when laid out on screen.
    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn prev(&self) -> Option<RowId> {
        self.prev
    }

    pub fn next(&self) -> Option<RowId> {
        self.next
    }
}

/// Ordered chain of rows for one document.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    rows: HashMap<RowId, Row>,
    head: Option<RowId>,
    next_id: u64,
    geometry: Geometry,
}

impl Projection {
    /// Build the full chain for `doc`.
    pub fn new(doc: &Document, store: &mut ExpandStore, geometry: Geometry) -> Self {
        let mut projection = Self {
            rows: HashMap::new(),
            head: None,
            next_id: 1,
            geometry,
        };
        projection.set_root(doc, store);
        projection
    }

    /// Drop every row and rebuild from the document root.
    pub fn set_root(&mut self, doc: &Document, store: &mut ExpandStore) {
        self.rows.clear();
        self.head = None;
        let head = self.materialize(doc, store, doc.root(), 0);
        self.head = Some(head);
        let mut last = head;
        while let Some((entry, depth)) = self.next_visible(doc, last) {
            let row = self.materialize(doc, store, entry, depth);
            self.link(last, row);
            last = row;
        }
        tracing::debug!(rows = self.rows.len(), "built projection");
    }

    pub fn head(&self) -> Option<RowId> {
        self.head
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: RowId) -> Option<&Row> {
        self.rows.get(&row)
    }

    pub fn next(&self, row: RowId) -> Option<RowId> {
        self.get(row).and_then(Row::next)
    }

    pub fn prev(&self, row: RowId) -> Option<RowId> {
        self.get(row).and_then(Row::prev)
    }

    /// Entry shown by `row`.
    pub fn entry(&self, row: RowId) -> Option<EntryId> {
        self.get(row).map(Row::entry)
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Switch to a new screen geometry and refresh every row's width and line count.
    pub fn set_geometry(&mut self, doc: &Document, geometry: Geometry) {
        self.geometry = geometry;
        let ids: Vec<RowId> = self.iter().map(|(id, _)| id).collect();
        for id in ids {
            // Rows always come from this projection's own chain.
            let _ = self.refresh_row(doc, id);
        }
    }

    /// Rows in chain order.
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &Row)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let id = cursor?;
            let row = self.rows.get(&id)?;
            cursor = row.next;
            Some((id, row))
        })
    }

    /// First row at or after (`Forward`) or at or before (`Backward`) `start` showing `target`.
    pub fn find(
        &self,
        start: RowId,
        target: Option<EntryId>,
        direction: SearchDirection,
    ) -> Option<RowId> {
        let target = target?;
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            let row = self.rows.get(&id)?;
            if row.entry == target {
                return Some(id);
            }
            cursor = match direction {
                SearchDirection::Forward => row.next,
                SearchDirection::Backward => row.prev,
            };
        }
        None
    }

    /// Row showing `entry`, searching from the head.
    pub fn row_of(&self, entry: EntryId) -> Option<RowId> {
        self.find(self.head?, Some(entry), SearchDirection::Forward)
    }

    /// Release rows in `[from, to)` and join their neighbours.
    ///
    /// # Returns
    /// Number of rows released.
    pub fn clear(&mut self, from: RowId, to: Option<RowId>) -> usize {
        if Some(from) == to {
            return 0;
        }
        let Some(before) = self.rows.get(&from).map(|row| row.prev) else {
            return 0;
        };
        let mut released = 0usize;
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            if Some(id) == to {
                break;
            }
            cursor = self.rows.remove(&id).and_then(|row| row.next);
            released += 1;
        }
        let after = cursor;
        match before {
            Some(before) => self.set_next(before, after),
            None => self.head = after,
        }
        if let Some(after) = after {
            self.set_prev(after, before);
        }
        released
    }

    /// Recompute one row's width and wrapped line count from its entry.
    ///
    /// # Returns
    /// The row's new line count.
    ///
    /// # Errors
    /// [`ProjectionError::UnknownRow`] or [`ProjectionError::UnknownEntry`] for stale handles.
    pub fn refresh_row(&mut self, doc: &Document, row: RowId) -> Result<usize, ProjectionError> {
        let geometry = self.geometry;
        let slot = self.rows.get_mut(&row).ok_or(ProjectionError::UnknownRow)?;
        let entry = doc.get(slot.entry).ok_or(ProjectionError::UnknownEntry)?;
        slot.indent = geometry.indent(slot.depth);
        slot.width = geometry.column_width(slot.depth);
        slot.lines = geometry.wrapped_lines(entry.len(), slot.depth);
        Ok(slot.lines)
    }

    /// Regenerate the rows after `from` up to `to`.
    ///
    /// Rows strictly between the two are released, `from` is refreshed in place, and the
    /// expand-aware walk continues from `from`'s entry. When the walk reaches `to`'s entry
    /// the chain is spliced back onto `to`; when it runs off the document first, `to` and
    /// every row after it are released.
    ///
    /// # Returns
    /// The last regenerated row.
    ///
    /// # Errors
    /// [`ProjectionError::UnknownRow`] when `from` or `to` is not in the chain, and
    /// [`ProjectionError::UnknownEntry`] when `from` shows a deleted entry.
    pub fn rebuild(
        &mut self,
        doc: &Document,
        store: &mut ExpandStore,
        from: RowId,
        to: Option<RowId>,
    ) -> Result<RowId, ProjectionError> {
        let start = self.rows.get(&from).ok_or(ProjectionError::UnknownRow)?;
        let (entry, depth, start_next) = (start.entry, start.depth, start.next);
        if !doc.contains(entry) {
            return Err(ProjectionError::UnknownEntry);
        }
        let boundary = match to {
            Some(to) => Some(
                self.rows
                    .get(&to)
                    .map(|row| row.entry)
                    .ok_or(ProjectionError::UnknownRow)?,
            ),
            None => None,
        };

        if let Some(first) = start_next {
            self.clear(first, to);
        }
        let expanded = self.expand_state(doc, store, entry);
        if let Some(slot) = self.rows.get_mut(&from) {
            slot.expanded = expanded;
        }
        self.refresh_row(doc, from)?;

        let mut last = from;
        let mut regenerated = 1usize;
        loop {
            let Some((entry, depth)) = self.next_visible(doc, last) else {
                if let Some(to) = to {
                    let released = self.release_tail(to);
                    tracing::debug!(released, "released orphaned projection tail");
                }
                self.set_next(last, None);
                break;
            };
            if Some(entry) == boundary {
                if let Some(to) = to {
                    self.link(last, to);
                }
                break;
            }
            let row = self.materialize(doc, store, entry, depth);
            self.link(last, row);
            last = row;
            regenerated += 1;
        }
        tracing::debug!(%from, depth, regenerated, rows = self.rows.len(), "rebuilt projection span");
        Ok(last)
    }

    /// Like [`Projection::rebuild`], but `None` restarts the chain at the document root.
    ///
    /// # Errors
    /// Same as [`Projection::rebuild`].
    pub fn rebuild_span(
        &mut self,
        doc: &Document,
        store: &mut ExpandStore,
        anchor: Option<RowId>,
        to: Option<RowId>,
    ) -> Result<RowId, ProjectionError> {
        if let Some(anchor) = anchor {
            return self.rebuild(doc, store, anchor, to);
        }
        if let Some(to) = to {
            if !self.rows.contains_key(&to) {
                return Err(ProjectionError::UnknownRow);
            }
        }
        if let Some(head) = self.head {
            self.clear(head, to);
        }
        if let Some(to) = to {
            if self.entry(to) == Some(doc.root()) {
                self.refresh_row(doc, to)?;
                return Ok(to);
            }
        }
        let head = self.materialize(doc, store, doc.root(), 0);
        if let Some(to) = to {
            self.link(head, to);
        }
        self.head = Some(head);
        self.rebuild(doc, store, head, to)
    }

    fn expand_state(&self, doc: &Document, store: &mut ExpandStore, entry: EntryId) -> bool {
        let expanded = store.get_or_create(entry);
        if expanded && !doc.has_children(entry) {
            store.set(entry, false);
            return false;
        }
        expanded
    }

    fn materialize(
        &mut self,
        doc: &Document,
        store: &mut ExpandStore,
        entry: EntryId,
        depth: usize,
    ) -> RowId {
        let expanded = self.expand_state(doc, store, entry);
        let len = doc.get(entry).map(|e| e.len()).unwrap_or(0);
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.insert(
            id,
            Row {
                entry,
                depth,
                indent: self.geometry.indent(depth),
                width: self.geometry.column_width(depth),
                lines: self.geometry.wrapped_lines(len, depth),
                expanded,
                anchor: None,
                prev: None,
                next: None,
            },
        );
        id
    }

    /// Entry and depth of the row that should follow `row` in the walk.
    fn next_visible(&self, doc: &Document, row: RowId) -> Option<(EntryId, usize)> {
        let row = self.rows.get(&row)?;
        if row.expanded {
            if let Some(child) = doc.child(row.entry) {
                return Some((child, row.depth + 1));
            }
        }
        let mut cursor = row.entry;
        let mut depth = row.depth;
        loop {
            if let Some(next) = doc.next(cursor) {
                return Some((next, depth));
            }
            cursor = doc.parent(cursor)?;
            depth = depth.checked_sub(1)?;
        }
    }

    /// Drop `row` and every row after it without relinking its predecessor.
    fn release_tail(&mut self, row: RowId) -> usize {
        let mut released = 0usize;
        let mut cursor = Some(row);
        while let Some(id) = cursor {
            cursor = self.rows.remove(&id).and_then(|row| row.next);
            released += 1;
        }
        released
    }

    fn link(&mut self, before: RowId, after: RowId) {
        self.set_next(before, Some(after));
        self.set_prev(after, Some(before));
    }

    fn set_next(&mut self, row: RowId, next: Option<RowId>) {
        if let Some(slot) = self.rows.get_mut(&row) {
            slot.next = next;
        }
    }

    fn set_prev(&mut self, row: RowId, prev: Option<RowId>) {
        if let Some(slot) = self.rows.get_mut(&row) {
            slot.prev = prev;
        }
    }

    pub(crate) fn set_anchor(&mut self, row: RowId, anchor: Option<usize>) {
        if let Some(slot) = self.rows.get_mut(&row) {
            slot.anchor = anchor;
        }
    }

    pub(crate) fn clear_anchors(&mut self) {
        for row in self.rows.values_mut() {
            row.anchor = None;
        }
    }
}
