use super::*;
use crate::test_support::{doc, entry};
use crate::tree::{MoveDirection, Placement};

fn texts(projection: &Projection, doc: &Document) -> Vec<String> {
    projection
        .iter()
        .map(|(_, row)| {
            let text = doc.get(row.entry()).map(|e| e.text()).unwrap_or("<gone>");
            format!("{}{}", "  ".repeat(row.depth()), text)
        })
        .collect()
}

fn assert_chain_consistent(projection: &Projection) {
    let mut prev = None;
    let mut count = 0usize;
    for (id, row) in projection.iter() {
        assert_eq!(row.prev(), prev, "row {id} has a stale prev link");
        prev = Some(id);
        count += 1;
    }
    assert_eq!(count, projection.len(), "released rows still stored");
}

/// Expand-aware pre-order walk computed straight from the tree.
fn expected_rows(doc: &Document, store: &ExpandStore) -> usize {
    let mut count = 0usize;
    let mut stack = vec![doc.root()];
    while let Some(id) = stack.pop() {
        count += 1;
        if let Some(next) = doc.next(id) {
            stack.push(next);
        }
        if store.is_expanded(id) {
            if let Some(child) = doc.child(id) {
                stack.push(child);
            }
        }
    }
    count
}

fn expanded(doc: &Document, names: &[&str]) -> ExpandStore {
    let mut store = ExpandStore::new();
    for name in names {
        store.set(entry(doc, name), true);
    }
    store
}

#[test]
fn collapsed_entries_hide_their_descendants() {
    let doc = doc("- a\n\t- a1\n\t\t- a11\n- b\n\t- b1\n- c\n");
    let mut store = expanded(&doc, &["a"]);
    let projection = Projection::new(&doc, &mut store, Geometry::default());

    assert_eq!(texts(&projection, &doc), vec!["a", "  a1", "b", "c"]);
    assert_eq!(projection.len(), expected_rows(&doc, &store));
    assert_chain_consistent(&projection);
    assert_eq!(store.len(), 4, "only visible entries get records");
}

#[test]
fn inserting_after_a_trailing_leaf_adds_exactly_one_row() {
    let mut doc = doc("- p\n\t- a\n- q\n");
    let mut store = expanded(&doc, &["p"]);
    let mut projection = Projection::new(&doc, &mut store, Geometry::default());
    let a = entry(&doc, "a");
    let a_row = projection.row_of(a).expect("row for a");
    let q_row = projection.next(a_row).expect("row for q");

    let x = doc.insert(a, Placement::After, 0).expect("insert");
    let last = projection
        .rebuild(&doc, &mut store, a_row, Some(q_row))
        .expect("rebuild");

    assert_eq!(projection.len(), 4);
    assert_eq!(projection.entry(last), Some(x));
    assert_eq!(projection.next(a_row), Some(last));
    assert_eq!(projection.next(last), Some(q_row));
    assert_eq!(projection.entry(q_row), Some(entry(&doc, "q")));
    assert_chain_consistent(&projection);
}

#[test]
fn wrapped_line_counts_follow_depth_and_length() {
    let doc = doc(&format!(
        "- \n- {}\n\t- {}\n",
        "x".repeat(35),
        "y".repeat(14)
    ));
    let mut store = ExpandStore::new();
    store.set(entry(&doc, &"x".repeat(35)), true);
    let projection = Projection::new(&doc, &mut store, Geometry::new(20, 10));

    let rows: Vec<_> = projection
        .iter()
        .map(|(_, row)| (row.depth(), row.width(), row.lines()))
        .collect();
    assert_eq!(rows, vec![(0, 17, 1), (0, 17, 3), (1, 14, 1)]);
}

#[test]
fn column_width_never_drops_below_one() {
    let geometry = Geometry::new(10, 5);
    assert_eq!(geometry.column_width(0), 7);
    assert_eq!(geometry.column_width(2), 1);
    assert_eq!(geometry.column_width(50), 1);
    assert_eq!(geometry.wrapped_lines(4, 50), 4);
    assert_eq!(geometry.text_column(2), 9);
}

#[test]
fn expanded_but_childless_entries_are_forced_closed() {
    let doc = doc("- lonely\n");
    let mut store = expanded(&doc, &["lonely"]);
    let projection = Projection::new(&doc, &mut store, Geometry::default());
    let head = projection.head().expect("head");
    assert_eq!(projection.get(head).map(Row::expanded), Some(false));
    assert!(!store.is_expanded(entry(&doc, "lonely")));
}

#[test]
fn walk_that_misses_the_boundary_releases_the_tail() {
    let mut doc = doc("- a\n- b\n- c\n");
    let mut store = ExpandStore::new();
    let mut projection = Projection::new(&doc, &mut store, Geometry::default());
    let a_row = projection.head().expect("head");
    let b_row = projection.next(a_row).expect("b row");

    doc.delete(entry(&doc, "c")).expect("delete c");
    doc.delete(entry(&doc, "b")).expect("delete b");
    let last = projection
        .rebuild(&doc, &mut store, a_row, Some(b_row))
        .expect("rebuild");

    assert_eq!(last, a_row);
    assert_eq!(projection.len(), 1);
    assert_eq!(projection.next(a_row), None);
    assert_chain_consistent(&projection);
}

#[test]
fn collapsing_releases_only_the_subtree_rows() {
    let doc = doc("- a\n\t- a1\n\t- a2\n- b\n");
    let mut store = expanded(&doc, &["a"]);
    let mut projection = Projection::new(&doc, &mut store, Geometry::default());
    let a_row = projection.head().expect("head");
    let b_row = projection.row_of(entry(&doc, "b")).expect("b row");

    store.set(entry(&doc, "a"), false);
    projection
        .rebuild(&doc, &mut store, a_row, Some(b_row))
        .expect("rebuild");
    assert_eq!(texts(&projection, &doc), vec!["a", "b"]);
    assert_eq!(projection.next(a_row), Some(b_row));

    store.set(entry(&doc, "a"), true);
    projection
        .rebuild(&doc, &mut store, a_row, Some(b_row))
        .expect("rebuild");
    assert_eq!(texts(&projection, &doc), vec!["a", "  a1", "  a2", "b"]);
    assert_eq!(projection.len(), expected_rows(&doc, &store));
    assert_chain_consistent(&projection);
}

#[test]
fn rebuild_span_without_anchor_restarts_at_the_new_root() {
    let mut doc = doc("- a\n- b\n\t- b1\n- c\n");
    let mut store = expanded(&doc, &["b"]);
    let mut projection = Projection::new(&doc, &mut store, Geometry::default());
    let b = entry(&doc, "b");
    let c_row = projection.row_of(entry(&doc, "c")).expect("c row");

    assert!(doc.move_entry(b, MoveDirection::Up));
    projection
        .rebuild_span(&doc, &mut store, None, Some(c_row))
        .expect("rebuild");

    assert_eq!(texts(&projection, &doc), vec!["b", "  b1", "a", "c"]);
    assert_eq!(projection.entry(projection.head().expect("head")), Some(b));
    assert_eq!(projection.row_of(entry(&doc, "c")), Some(c_row));
    assert_chain_consistent(&projection);
}

#[test]
fn rebuild_span_reuses_the_boundary_when_it_becomes_the_root() {
    let mut doc = doc("- a\n- b\n");
    let mut store = ExpandStore::new();
    let mut projection = Projection::new(&doc, &mut store, Geometry::default());
    let b_row = projection.row_of(entry(&doc, "b")).expect("b row");

    doc.delete(entry(&doc, "a")).expect("delete a");
    let last = projection
        .rebuild_span(&doc, &mut store, None, Some(b_row))
        .expect("rebuild");
    assert_eq!(last, b_row);
    assert_eq!(projection.head(), Some(b_row));
    assert_eq!(projection.len(), 1);
    assert_chain_consistent(&projection);
}

#[test]
fn find_walks_in_both_directions() {
    let doc = doc("- a\n- b\n- c\n");
    let mut store = ExpandStore::new();
    let projection = Projection::new(&doc, &mut store, Geometry::default());
    let head = projection.head().expect("head");
    let c_row = projection.row_of(entry(&doc, "c")).expect("c row");

    assert_eq!(
        projection.find(c_row, Some(entry(&doc, "a")), SearchDirection::Backward),
        Some(head)
    );
    assert_eq!(
        projection.find(c_row, Some(entry(&doc, "a")), SearchDirection::Forward),
        None
    );
    assert_eq!(projection.find(head, None, SearchDirection::Forward), None);
}

#[test]
fn clear_releases_a_half_open_range() {
    let doc = doc("- a\n- b\n- c\n- d\n");
    let mut store = ExpandStore::new();
    let mut projection = Projection::new(&doc, &mut store, Geometry::default());
    let b_row = projection.row_of(entry(&doc, "b")).expect("b row");
    let d_row = projection.row_of(entry(&doc, "d")).expect("d row");

    assert_eq!(projection.clear(b_row, Some(b_row)), 0);
    assert_eq!(projection.clear(b_row, Some(d_row)), 2);
    assert_eq!(texts(&projection, &doc), vec!["a", "d"]);
    assert_chain_consistent(&projection);
}

#[test]
fn stale_handles_are_reported() {
    let mut doc = doc("- a\n- b\n");
    let mut store = ExpandStore::new();
    let mut projection = Projection::new(&doc, &mut store, Geometry::default());
    let head = projection.head().expect("head");
    let b_row = projection.row_of(entry(&doc, "b")).expect("b row");

    projection.clear(b_row, None);
    assert_eq!(
        projection.rebuild(&doc, &mut store, b_row, None),
        Err(ProjectionError::UnknownRow)
    );
    assert_eq!(
        projection.rebuild(&doc, &mut store, head, Some(b_row)),
        Err(ProjectionError::UnknownRow)
    );

    doc.delete(entry(&doc, "a")).expect("delete a");
    assert_eq!(
        projection.refresh_row(&doc, head),
        Err(ProjectionError::UnknownEntry)
    );
}

#[test]
fn geometry_change_refreshes_every_row() {
    let doc = doc(&format!("- {}\n", "z".repeat(30)));
    let mut store = ExpandStore::new();
    let mut projection = Projection::new(&doc, &mut store, Geometry::new(80, 24));
    let head = projection.head().expect("head");
    assert_eq!(projection.get(head).map(Row::lines), Some(1));

    projection.set_geometry(&doc, Geometry::new(13, 24));
    assert_eq!(projection.get(head).map(Row::lines), Some(3));
}
