//! Outline document tree.
//!
//! Entries live in an id-keyed arena and are linked four ways (parent, previous sibling,
//! next sibling, first child). Every structural operation is a single `&mut self` call that
//! repairs all affected links before returning.

mod entry;

pub use entry::Entry;

use crate::error::TreeError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable handle of an entry. Ids are never reused within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    /// Raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a new entry is spliced relative to its anchor sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// Direction of an indentation change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    /// Promote: become the next sibling of the former parent.
    Outward,
    /// Demote: become the last child of the previous sibling.
    Inward,
}

/// Direction of a sibling swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Flattened view of one entry, used for comparisons and JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub depth: usize,
    pub text: String,
    pub crossed: bool,
    pub bold: bool,
}

/// Document tree owning every entry.
#[derive(Debug, Clone)]
pub struct Document {
    entries: HashMap<EntryId, Entry>,
    root: EntryId,
    next_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding a single empty entry.
    pub fn new() -> Self {
        let mut doc = Self {
            entries: HashMap::new(),
            root: EntryId(1),
            next_id: 1,
        };
        doc.root = doc.allocate(Entry::with_capacity(0));
        doc
    }

    fn allocate(&mut self, entry: Entry) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, entry);
        id
    }

    /// First top-level entry. It never has a parent or a previous sibling.
    pub fn root(&self) -> EntryId {
        self.root
    }

    /// Number of entries in the document.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false` for a well-formed document.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.entries.get_mut(&id)
    }

    pub fn parent(&self, id: EntryId) -> Option<EntryId> {
        self.get(id).and_then(Entry::parent)
    }

    pub fn prev(&self, id: EntryId) -> Option<EntryId> {
        self.get(id).and_then(Entry::prev)
    }

    pub fn next(&self, id: EntryId) -> Option<EntryId> {
        self.get(id).and_then(Entry::next)
    }

    pub fn child(&self, id: EntryId) -> Option<EntryId> {
        self.get(id).and_then(Entry::child)
    }

    pub fn has_children(&self, id: EntryId) -> bool {
        self.child(id).is_some()
    }

    /// Last entry of `id`'s child chain.
    pub fn last_child(&self, id: EntryId) -> Option<EntryId> {
        let mut last = self.child(id)?;
        while let Some(next) = self.next(last) {
            last = next;
        }
        Some(last)
    }

    /// Number of ancestors above `id`.
    pub fn depth(&self, id: EntryId) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.parent(parent);
        }
        depth
    }

    /// First entry after `id`'s subtree in pre-order.
    pub fn following(&self, id: EntryId) -> Option<EntryId> {
        let mut cursor = id;
        loop {
            if let Some(next) = self.next(cursor) {
                return Some(next);
            }
            cursor = self.parent(cursor)?;
        }
    }

    /// Pre-order walk yielding `(id, depth)`.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            doc: self,
            current: Some(self.root),
            depth: 0,
        }
    }

    /// Pre-order `(depth, text, crossed, bold)` tuples of the whole document.
    pub fn snapshot(&self) -> Vec<EntrySnapshot> {
        self.iter()
            .filter_map(|(id, depth)| {
                self.get(id).map(|entry| EntrySnapshot {
                    depth,
                    text: entry.text().to_string(),
                    crossed: entry.crossed(),
                    bold: entry.bold(),
                })
            })
            .collect()
    }

    fn set_parent(&mut self, id: EntryId, parent: Option<EntryId>) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.parent = parent;
        }
    }

    fn set_prev(&mut self, id: EntryId, prev: Option<EntryId>) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.prev = prev;
        }
    }

    fn set_next(&mut self, id: EntryId, next: Option<EntryId>) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.next = next;
        }
    }

    fn set_child(&mut self, id: EntryId, child: Option<EntryId>) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.child = child;
        }
    }

    /// Make `new` the head of `parent`'s child chain, or the document root at top level.
    fn replace_chain_head(&mut self, parent: Option<EntryId>, new: EntryId) {
        match parent {
            Some(parent) => self.set_child(parent, Some(new)),
            None => self.root = new,
        }
    }

    /// Splice a new empty entry next to `anchor` under the same parent.
    ///
    /// # Errors
    /// [`TreeError::UnknownEntry`] when `anchor` is not part of this document.
    pub fn insert(
        &mut self,
        anchor: EntryId,
        placement: Placement,
        capacity: usize,
    ) -> Result<EntryId, TreeError> {
        let (parent, prev, next) = {
            let entry = self.get(anchor).ok_or(TreeError::UnknownEntry)?;
            (entry.parent, entry.prev, entry.next)
        };
        let mut entry = Entry::with_capacity(capacity);
        entry.parent = parent;
        let id = match placement {
            Placement::Before => {
                entry.prev = prev;
                entry.next = Some(anchor);
                let id = self.allocate(entry);
                match prev {
                    Some(prev) => self.set_next(prev, Some(id)),
                    None => self.replace_chain_head(parent, id),
                }
                self.set_prev(anchor, Some(id));
                id
            }
            Placement::After => {
                entry.prev = Some(anchor);
                entry.next = next;
                let id = self.allocate(entry);
                if let Some(next) = next {
                    self.set_prev(next, Some(id));
                }
                self.set_next(anchor, Some(id));
                id
            }
        };
        tracing::debug!(%anchor, %id, ?placement, "inserted entry");
        Ok(id)
    }

    /// Insert a new empty entry at the head of `parent`'s child chain.
    ///
    /// # Errors
    /// [`TreeError::UnknownEntry`] when `parent` is not part of this document.
    pub fn insert_first_child(
        &mut self,
        parent: EntryId,
        capacity: usize,
    ) -> Result<EntryId, TreeError> {
        let old_first = self.get(parent).ok_or(TreeError::UnknownEntry)?.child;
        let mut entry = Entry::with_capacity(capacity);
        entry.parent = Some(parent);
        entry.next = old_first;
        let id = self.allocate(entry);
        if let Some(old_first) = old_first {
            self.set_prev(old_first, Some(id));
        }
        self.set_child(parent, Some(id));
        Ok(id)
    }

    /// Remove a childless entry and return the entry that should receive focus.
    ///
    /// Focus falls back to the parent when `id` was a first child, else to the previous
    /// sibling, else to the next sibling.
    ///
    /// # Errors
    /// - [`TreeError::HasChildren`] when `id` has children.
    /// - [`TreeError::LastNode`] when `id` is the only entry in the document.
    /// - [`TreeError::UnknownEntry`] when `id` is not part of this document.
    pub fn delete(&mut self, id: EntryId) -> Result<EntryId, TreeError> {
        let (parent, prev, next) = {
            let entry = self.get(id).ok_or(TreeError::UnknownEntry)?;
            if entry.child.is_some() {
                return Err(TreeError::HasChildren);
            }
            if entry.parent.is_none() && entry.prev.is_none() && entry.next.is_none() {
                return Err(TreeError::LastNode);
            }
            (entry.parent, entry.prev, entry.next)
        };

        let fallback = match (parent, prev) {
            (Some(parent), None) => Some(parent),
            (_, Some(prev)) => Some(prev),
            (None, None) => next,
        };
        let Some(fallback) = fallback else {
            unreachable!("delete guards left entry {id} without a focus candidate");
        };

        match prev {
            Some(prev) => self.set_next(prev, next),
            None => match parent {
                Some(parent) => self.set_child(parent, next),
                None => {
                    if let Some(next) = next {
                        self.root = next;
                    }
                }
            },
        }
        if let Some(next) = next {
            self.set_prev(next, prev);
        }
        self.entries.remove(&id);
        tracing::debug!(%id, %fallback, "deleted entry");
        Ok(fallback)
    }

    /// Change the nesting level of `id`. Returns `false` without mutating when the
    /// direction's precondition (a parent, or a previous sibling) does not hold.
    pub fn indent(&mut self, id: EntryId, direction: Indent) -> bool {
        let Some(entry) = self.get(id) else {
            return false;
        };
        let (parent, prev, next) = (entry.parent, entry.prev, entry.next);

        match direction {
            Indent::Outward => {
                let Some(parent) = parent else {
                    return false;
                };
                if prev.is_none() {
                    self.set_child(parent, next);
                }
                if let Some(prev) = prev {
                    self.set_next(prev, next);
                }
                if let Some(next) = next {
                    self.set_prev(next, prev);
                }

                let grandparent = self.parent(parent);
                let parent_next = self.next(parent);
                self.set_next(parent, Some(id));
                if let Some(parent_next) = parent_next {
                    self.set_prev(parent_next, Some(id));
                }
                self.set_parent(id, grandparent);
                self.set_prev(id, Some(parent));
                self.set_next(id, parent_next);
            }
            Indent::Inward => {
                let Some(prev) = prev else {
                    return false;
                };
                self.set_next(prev, next);
                if let Some(next) = next {
                    self.set_prev(next, Some(prev));
                }

                match self.last_child(prev) {
                    Some(last) => {
                        self.set_next(last, Some(id));
                        self.set_prev(id, Some(last));
                    }
                    None => {
                        self.set_child(prev, Some(id));
                        self.set_prev(id, None);
                    }
                }
                self.set_next(id, None);
                self.set_parent(id, Some(prev));
            }
        }
        tracing::debug!(%id, ?direction, "indented entry");
        true
    }

    /// Swap `id` with its neighbouring sibling. Children travel with their parents.
    /// Returns `false` without mutating when there is no sibling in that direction.
    pub fn move_entry(&mut self, id: EntryId, direction: MoveDirection) -> bool {
        let Some(entry) = self.get(id) else {
            return false;
        };
        let (parent, prev, next) = (entry.parent, entry.prev, entry.next);

        match direction {
            MoveDirection::Up => {
                let Some(other) = prev else {
                    return false;
                };
                let other_prev = self.prev(other);
                match other_prev {
                    Some(other_prev) => self.set_next(other_prev, Some(id)),
                    None => self.replace_chain_head(parent, id),
                }
                self.set_prev(id, other_prev);
                self.set_next(id, Some(other));
                self.set_prev(other, Some(id));
                self.set_next(other, next);
                if let Some(next) = next {
                    self.set_prev(next, Some(other));
                }
            }
            MoveDirection::Down => {
                let Some(other) = next else {
                    return false;
                };
                let other_next = self.next(other);
                match prev {
                    Some(prev) => self.set_next(prev, Some(other)),
                    None => self.replace_chain_head(parent, other),
                }
                self.set_prev(other, prev);
                self.set_next(other, Some(id));
                self.set_prev(id, Some(other));
                self.set_next(id, other_next);
                if let Some(other_next) = other_next {
                    self.set_prev(other_next, Some(id));
                }
            }
        }
        tracing::debug!(%id, ?direction, "moved entry");
        true
    }

    /// Audit every link in the document.
    ///
    /// # Returns
    /// One human-readable line per broken invariant; empty when the tree is consistent.
    pub fn link_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let Some(root) = self.get(self.root) else {
            problems.push(format!("root {} is missing", self.root));
            return problems;
        };
        if root.parent.is_some() || root.prev.is_some() {
            problems.push(format!("root {} has a parent or previous sibling", self.root));
        }

        let mut seen = 0usize;
        for (id, _) in self.iter() {
            seen += 1;
            if seen > self.entries.len() {
                problems.push("pre-order walk does not terminate".to_string());
                break;
            }
            let Some(entry) = self.get(id) else {
                problems.push(format!("{id} is linked but missing"));
                continue;
            };
            if let Some(child) = entry.child {
                if self.parent(child) != Some(id) {
                    problems.push(format!("first child {child} of {id} has another parent"));
                }
                if self.prev(child).is_some() {
                    problems.push(format!("first child {child} of {id} has a previous sibling"));
                }
            }
            if let Some(next) = entry.next {
                if self.prev(next) != Some(id) {
                    problems.push(format!("{next} does not link back to {id}"));
                }
                if self.parent(next) != entry.parent {
                    problems.push(format!("{next} and {id} disagree on their parent"));
                }
            }
            if let Some(prev) = entry.prev {
                if self.next(prev) != Some(id) {
                    problems.push(format!("{prev} does not link forward to {id}"));
                }
            } else if let Some(parent) = entry.parent {
                if self.child(parent) != Some(id) {
                    problems.push(format!("{id} starts a chain but is not {parent}'s first child"));
                }
            }
        }
        if seen != self.entries.len() {
            problems.push(format!(
                "{} entries stored but {} reachable",
                self.entries.len(),
                seen
            ));
        }
        problems
    }
}

/// Iterative pre-order traversal over a [`Document`].
pub struct PreOrder<'a> {
    doc: &'a Document,
    current: Option<EntryId>,
    depth: usize,
}

impl Iterator for PreOrder<'_> {
    type Item = (EntryId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let item = (id, self.depth);

        if let Some(child) = self.doc.child(id) {
            self.current = Some(child);
            self.depth += 1;
        } else {
            let mut cursor = id;
            self.current = loop {
                if let Some(next) = self.doc.next(cursor) {
                    break Some(next);
                }
                match self.doc.parent(cursor) {
                    Some(parent) => {
                        cursor = parent;
                        self.depth -= 1;
                    }
                    None => break None,
                }
            };
        }
        Some(item)
    }
}
