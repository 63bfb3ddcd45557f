//! Editing session: one document with its expand memory, projection and focus.
//!
//! Every browse or edit action is a method on [`Session`] returning the [`Update`] the
//! presentation layer must repaint.

mod browse;
mod edit;

pub use edit::Erase;

use crate::cursor::{Cursor, Wrap};
use crate::error::{OutlineError, ProjectionError};
use crate::expand::ExpandStore;
use crate::format;
use crate::partial::PartialView;
use crate::projection::{Geometry, Projection, Row, RowId, SearchDirection};
use crate::tree::{Document, EntryId};
use crate::viewport::{self, Layout};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Input mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Browse,
    Edit,
}

/// Repaint request produced by an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// Nothing visible changed.
    None,
    /// Only the current row changed.
    Current,
    /// Layout changed; repaint everything.
    All,
}

/// Where a deleted entry is put back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Restore {
    After(EntryId),
    FirstChildOf(EntryId),
    Before(EntryId),
}

/// Most recently deleted entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DeletedEntry {
    text: String,
    crossed: bool,
    bold: bool,
    restore: Restore,
}

/// Explicit editing context.
#[derive(Debug, Clone)]
pub struct Session {
    doc: Document,
    store: ExpandStore,
    projection: Projection,
    current: RowId,
    mode: Mode,
    cursor: Cursor,
    partial: PartialView,
    path: Option<PathBuf>,
    undo: Option<DeletedEntry>,
}

impl Session {
    /// Start a session on `doc` with every entry collapsed.
    pub fn new(doc: Document, geometry: Geometry) -> Self {
        let mut store = ExpandStore::new();
        let projection = Projection::new(&doc, &mut store, geometry);
        let current = head_of(&projection);
        let mut session = Self {
            doc,
            store,
            projection,
            current,
            mode: Mode::Browse,
            cursor: Cursor::default(),
            partial: PartialView::default(),
            path: None,
            undo: None,
        };
        session.sync_partial();
        session
    }

    /// Load `path` into a new session bound to that file.
    ///
    /// # Errors
    /// Returns [`OutlineError::Io`] when the file cannot be opened and
    /// [`OutlineError::Parse`] when its content is malformed.
    pub fn from_file(path: impl AsRef<Path>, geometry: Geometry) -> Result<Self, OutlineError> {
        let path = path.as_ref();
        let doc = read_document(path)?;
        let mut session = Self::new(doc, geometry);
        session.path = Some(path.to_path_buf());
        Ok(session)
    }

    /// Replace the document, forgetting all expand state and projection rows.
    pub fn set_root(&mut self, doc: Document) {
        self.doc = doc;
        self.store.clear();
        self.projection.set_root(&self.doc, &mut self.store);
        self.mode = Mode::Browse;
        self.cursor = Cursor::default();
        self.undo = None;
        self.focus(head_of(&self.projection));
    }

    /// Load `path`, replace the document and bind the session to it.
    ///
    /// The session is left untouched on failure.
    ///
    /// # Errors
    /// Same as [`Session::from_file`].
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<Update, OutlineError> {
        let path = path.as_ref();
        let doc = read_document(path)?;
        self.set_root(doc);
        self.path = Some(path.to_path_buf());
        Ok(Update::All)
    }

    /// Re-read the bound file.
    ///
    /// # Errors
    /// [`OutlineError::NoFile`] when no file is bound, otherwise as [`Session::open`].
    pub fn reload(&mut self) -> Result<Update, OutlineError> {
        let path = self.path.clone().ok_or(OutlineError::NoFile)?;
        self.open(path)
    }

    /// Write the document to the bound file.
    ///
    /// # Returns
    /// Number of lines written.
    ///
    /// # Errors
    /// [`OutlineError::NoFile`] when no file is bound; IO and write failures otherwise.
    pub fn save(&self) -> Result<usize, OutlineError> {
        let path = self.path.as_deref().ok_or(OutlineError::NoFile)?;
        write_document(&self.doc, path)
    }

    /// Write the document to `path` and bind the session to it on success.
    ///
    /// # Errors
    /// IO and write failures; the previous binding is kept.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<usize, OutlineError> {
        let path = path.as_ref();
        let lines = write_document(&self.doc, path)?;
        self.path = Some(path.to_path_buf());
        Ok(lines)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn expand_store(&self) -> &ExpandStore {
        &self.store
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn partial(&self) -> PartialView {
        self.partial
    }

    pub fn geometry(&self) -> Geometry {
        self.projection.geometry()
    }

    pub fn current_row(&self) -> RowId {
        self.current
    }

    /// Entry shown by the current row.
    pub fn current_entry(&self) -> EntryId {
        self.projection
            .entry(self.current)
            .unwrap_or_else(|| self.doc.root())
    }

    /// Whether [`Session::undo_delete`] has something to restore.
    pub fn can_undo(&self) -> bool {
        self.undo.is_some()
    }

    /// Apply a new screen size.
    pub fn set_geometry(&mut self, geometry: Geometry) -> Update {
        if geometry == self.projection.geometry() {
            return Update::None;
        }
        self.projection.set_geometry(&self.doc, geometry);
        self.cursor.refresh(self.wrap());
        self.sync_partial();
        Update::All
    }

    /// Screen layout centred on the current row; records each row's anchor.
    pub fn layout(&mut self) -> Layout {
        viewport::layout(&mut self.projection, self.current, &self.partial)
    }

    /// Screen `(x, y)` of the caret in edit mode, once the current row is laid out.
    pub fn caret_position(&self) -> Option<(usize, usize)> {
        if self.mode != Mode::Edit {
            return None;
        }
        let row = self.current_row_data()?;
        let anchor = row.anchor()?;
        let x = self.geometry().text_column(row.depth()) + self.cursor.col();
        let y = (anchor + self.cursor.line()).checked_sub(self.partial.offset())?;
        Some((x, y))
    }

    fn current_row_data(&self) -> Option<&Row> {
        self.projection.get(self.current)
    }

    fn current_lines(&self) -> usize {
        self.current_row_data().map(Row::lines).unwrap_or(1)
    }

    fn wrap(&self) -> Wrap {
        let len = self
            .doc
            .get(self.current_entry())
            .map(|entry| entry.len())
            .unwrap_or(0);
        match self.current_row_data() {
            Some(row) => Wrap::new(len, row.width(), row.lines()),
            None => Wrap::new(len, 1, 1),
        }
    }

    fn sync_partial(&mut self) {
        let height = self.geometry().screen_height;
        self.partial.sync(self.current_lines(), height);
    }

    /// Make `row` current with a fresh partial window.
    fn focus(&mut self, row: RowId) {
        self.current = row;
        self.partial = PartialView::default();
        self.sync_partial();
    }

    /// Make the row showing `entry` current, searching from `start` in `direction`.
    fn focus_entry(
        &mut self,
        start: RowId,
        entry: EntryId,
        direction: SearchDirection,
    ) -> Result<(), OutlineError> {
        let row = self
            .projection
            .find(start, Some(entry), direction)
            .or_else(|| self.projection.row_of(entry))
            .ok_or(ProjectionError::UnknownRow)?;
        self.focus(row);
        Ok(())
    }

    /// Row showing `entry`, searching forward from the current row and then from the head.
    fn row_after(&self, entry: Option<EntryId>) -> Option<RowId> {
        let entry = entry?;
        self.projection
            .find(self.current, Some(entry), SearchDirection::Forward)
            .or_else(|| self.projection.row_of(entry))
    }

    /// Row showing `entry`, searching backward from the current row and then from the head.
    fn row_before(&self, entry: Option<EntryId>) -> Option<RowId> {
        let entry = entry?;
        self.projection
            .find(self.current, Some(entry), SearchDirection::Backward)
            .or_else(|| self.projection.row_of(entry))
    }
}

fn head_of(projection: &Projection) -> RowId {
    match projection.head() {
        Some(head) => head,
        None => unreachable!("projection of a non-empty document has a head row"),
    }
}

fn read_document(path: &Path) -> Result<Document, OutlineError> {
    let file = File::open(path)?;
    let doc = format::load(BufReader::new(file))?;
    tracing::info!(path = %path.display(), entries = doc.len(), "loaded outline");
    Ok(doc)
}

fn write_document(doc: &Document, path: &Path) -> Result<usize, OutlineError> {
    let file = File::create(path)?;
    let lines = format::dump(doc, BufWriter::new(file))?;
    tracing::info!(path = %path.display(), lines, "saved outline");
    Ok(lines)
}
