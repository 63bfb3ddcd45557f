//! Per-entry expand/collapse memory.
//!
//! Records are created lazily the first time the projection asks about an entry and are kept
//! in creation order, so range updates walk them the same way regardless of where the entries
//! have since moved in the tree.

use crate::tree::{Document, EntryId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default)]
struct Record {
    expanded: bool,
    prev: Option<EntryId>,
    next: Option<EntryId>,
}

/// Ordered set of expand records keyed by entry id.
#[derive(Debug, Clone, Default)]
pub struct ExpandStore {
    records: HashMap<EntryId, Record>,
    head: Option<EntryId>,
    tail: Option<EntryId>,
}

impl ExpandStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, entry: EntryId) -> bool {
        self.records.contains_key(&entry)
    }

    fn append(&mut self, entry: EntryId, expanded: bool) {
        let record = Record {
            expanded,
            prev: self.tail,
            next: None,
        };
        match self.tail {
            Some(tail) => {
                if let Some(last) = self.records.get_mut(&tail) {
                    last.next = Some(entry);
                }
            }
            None => self.head = Some(entry),
        }
        self.tail = Some(entry);
        self.records.insert(entry, record);
    }

    /// Current expand flag of `entry`, creating a collapsed record on first reference.
    pub fn get_or_create(&mut self, entry: EntryId) -> bool {
        if let Some(record) = self.records.get(&entry) {
            return record.expanded;
        }
        self.append(entry, false);
        false
    }

    /// Expand flag without creating a record. Unknown entries read as collapsed.
    pub fn is_expanded(&self, entry: EntryId) -> bool {
        self.records
            .get(&entry)
            .map(|record| record.expanded)
            .unwrap_or(false)
    }

    /// Set the flag of `entry`, creating its record if needed.
    pub fn set(&mut self, entry: EntryId, expanded: bool) {
        match self.records.get_mut(&entry) {
            Some(record) => record.expanded = expanded,
            None => self.append(entry, expanded),
        }
    }

    /// Ensure every entry of `doc` that has children owns a record.
    ///
    /// New records are appended collapsed, in pre-order.
    pub fn materialize(&mut self, doc: &Document) {
        for (id, _) in doc.iter() {
            if doc.has_children(id) && !self.records.contains_key(&id) {
                self.append(id, false);
            }
        }
    }

    /// Set `expanded` on a run of records in creation order.
    ///
    /// The walk starts at `from` (inclusive), or at the first record when `from` is `None`,
    /// and stops before `to`. Records whose entry has no children are left alone.
    ///
    /// # Returns
    /// Number of records whose flag was written; zero when `from` has no record.
    pub fn set_range(
        &mut self,
        doc: &Document,
        expanded: bool,
        from: Option<EntryId>,
        to: Option<EntryId>,
    ) -> usize {
        let mut cursor = match from {
            Some(from) if !self.records.contains_key(&from) => {
                tracing::debug!(entry = %from, "expand range starts at an unknown entry");
                return 0;
            }
            Some(from) => Some(from),
            None => self.head,
        };
        let mut written = 0usize;
        while let Some(id) = cursor {
            if Some(id) == to {
                break;
            }
            let Some(record) = self.records.get_mut(&id) else {
                break;
            };
            if doc.has_children(id) {
                record.expanded = expanded;
                written += 1;
            }
            cursor = record.next;
        }
        tracing::debug!(expanded, written, "updated expand range");
        written
    }

    /// Drop the record of a deleted entry.
    ///
    /// # Returns
    /// `true` when a record existed.
    pub fn forget(&mut self, entry: EntryId) -> bool {
        let Some(record) = self.records.remove(&entry) else {
            return false;
        };
        match record.prev {
            Some(prev) => {
                if let Some(prev) = self.records.get_mut(&prev) {
                    prev.next = record.next;
                }
            }
            None => self.head = record.next,
        }
        match record.next {
            Some(next) => {
                if let Some(next) = self.records.get_mut(&next) {
                    next.prev = record.prev;
                }
            }
            None => self.tail = record.prev,
        }
        true
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.head = None;
        self.tail = None;
    }

    /// Records in creation order as `(entry, expanded)`.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, bool)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let id = cursor?;
            let record = self.records.get(&id)?;
            cursor = record.next;
            Some((id, record.expanded))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ExpandStore;
    use crate::test_support::{doc, entry};

    #[test]
    fn records_are_created_collapsed_and_only_once() {
        let doc = doc("- a\n\t- b\n");
        let a = entry(&doc, "a");
        let mut store = ExpandStore::new();
        assert!(!store.is_expanded(a));
        assert!(store.is_empty());

        assert!(!store.get_or_create(a));
        store.set(a, true);
        assert!(store.get_or_create(a));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn set_range_is_inclusive_of_from_and_skips_childless_entries() {
        let doc = doc("- a\n\t- a1\n- b\n\t- b1\n- leaf\n- c\n\t- c1\n");
        let (a, b, leaf, c) = (
            entry(&doc, "a"),
            entry(&doc, "b"),
            entry(&doc, "leaf"),
            entry(&doc, "c"),
        );
        let mut store = ExpandStore::new();
        for id in [a, b, leaf, c] {
            store.get_or_create(id);
        }

        assert_eq!(store.set_range(&doc, true, Some(b), Some(c)), 1);
        let flags: Vec<_> = store.iter().collect();
        assert_eq!(flags, vec![(a, false), (b, true), (leaf, false), (c, false)]);

        assert_eq!(store.set_range(&doc, true, None, None), 3);
        assert!(store.is_expanded(a) && store.is_expanded(c));
        assert!(!store.is_expanded(leaf));
    }

    #[test]
    fn set_range_from_an_unknown_entry_writes_nothing() {
        let doc = doc("- a\n\t- a1\n- b\n\t- b1\n");
        let (a, b) = (entry(&doc, "a"), entry(&doc, "b"));
        let mut store = ExpandStore::new();
        store.get_or_create(a);

        assert_eq!(store.set_range(&doc, true, Some(b), None), 0);
        assert!(!store.is_expanded(a));
        assert!(!store.contains(b));
    }

    #[test]
    fn materialize_covers_every_parent_in_preorder() {
        let doc = doc("- a\n\t- a1\n\t\t- deep\n- leaf\n");
        let mut store = ExpandStore::new();
        store.materialize(&doc);
        let ids: Vec<_> = store.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![entry(&doc, "a"), entry(&doc, "a1")]);
    }

    #[test]
    fn forget_relinks_neighbours_and_clear_empties() {
        let doc = doc("- a\n- b\n- c\n");
        let ids = [entry(&doc, "a"), entry(&doc, "b"), entry(&doc, "c")];
        let mut store = ExpandStore::new();
        for id in ids {
            store.get_or_create(id);
        }

        assert!(store.forget(ids[1]));
        assert!(!store.forget(ids[1]));
        let order: Vec<_> = store.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![ids[0], ids[2]]);

        assert!(store.forget(ids[2]));
        store.get_or_create(ids[1]);
        let order: Vec<_> = store.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![ids[0], ids[1]]);

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.iter().count(), 0);
    }
}
