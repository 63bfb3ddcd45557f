//! Shared test-only helpers for nestlist_core.

use crate::format;
use crate::tree::{Document, Entry, EntryId};

/// Parses an outline literal.
///
/// # Panics
/// Panics when `input` is not a valid outline.
pub(crate) fn doc(input: &str) -> Document {
    format::load_str(input).expect("valid outline literal")
}

/// Finds the first entry whose text equals `text`, in pre-order.
///
/// # Panics
/// Panics when no entry carries that text.
pub(crate) fn entry(doc: &Document, text: &str) -> EntryId {
    doc.iter()
        .map(|(id, _)| id)
        .find(|id| doc.get(*id).is_some_and(|entry| entry.text() == text))
        .unwrap_or_else(|| panic!("no entry with text {text:?}"))
}

/// Full link state of a document: root plus every reachable entry with its links.
///
/// Two equal link tables mean the trees are identical pointer for pointer.
pub(crate) fn link_table(doc: &Document) -> (EntryId, Vec<(EntryId, Entry)>) {
    let mut entries: Vec<(EntryId, Entry)> = doc
        .iter()
        .filter_map(|(id, _)| doc.get(id).map(|entry| (id, entry.clone())))
        .collect();
    entries.sort_by_key(|(id, _)| *id);
    (doc.root(), entries)
}

/// Asserts the document passes the full link audit.
///
/// # Panics
/// Panics with every reported violation.
pub(crate) fn assert_links_ok(doc: &Document) {
    let problems = doc.link_violations();
    assert!(problems.is_empty(), "link violations: {problems:#?}");
}
