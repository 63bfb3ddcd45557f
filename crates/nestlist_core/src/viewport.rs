//! Screen layout of the projection around the current row.
//!
//! The current row is centred vertically; preceding rows are stacked above it while they fit
//! whole, and the tail of the next one up fills any leftover gap.

use crate::partial::PartialView;
use crate::projection::{Projection, RowId};

/// One row placed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedRow {
    pub row: RowId,
    /// Screen line of the first shown wrapped line.
    pub y: usize,
    /// Wrapped lines hidden above the screen.
    pub skip: usize,
    /// Wrapped lines shown.
    pub shown: usize,
}

/// Rows to paint, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub rows: Vec<PlacedRow>,
    /// The first placed row is cut at the top of the screen.
    pub clipped_above: bool,
    /// Content continues below the last screen line.
    pub more_below: bool,
}

impl Layout {
    /// Placement of `row`, when it is on screen.
    pub fn find(&self, row: RowId) -> Option<&PlacedRow> {
        self.rows.iter().find(|placed| placed.row == row)
    }
}

/// Lay out `projection` around `current` and record each row's screen anchor.
///
/// While `partial` is active only the current row is shown, windowed by the partial offset.
pub fn layout(projection: &mut Projection, current: RowId, partial: &PartialView) -> Layout {
    projection.clear_anchors();
    let height = projection.geometry().screen_height;
    let Some(current_lines) = projection.get(current).map(|row| row.lines()) else {
        return Layout::default();
    };

    if partial.is_active() {
        projection.set_anchor(current, Some(0));
        return Layout {
            rows: vec![PlacedRow {
                row: current,
                y: 0,
                skip: partial.offset(),
                shown: height.min(current_lines - partial.offset().min(current_lines)),
            }],
            clipped_above: partial.less(),
            more_below: partial.more(),
        };
    }

    let mut y = (height / 2).saturating_sub(current_lines / 2);
    let mut top = current;
    let mut rows = Vec::new();
    let mut clipped_above = false;

    if projection.head() != Some(current) {
        while let Some(prev) = projection.prev(top) {
            let lines = projection.get(prev).map(|row| row.lines()).unwrap_or(1);
            if lines > y {
                break;
            }
            top = prev;
            y -= lines;
        }
        if y > 0 {
            if let Some(prev) = projection.prev(top) {
                let lines = projection.get(prev).map(|row| row.lines()).unwrap_or(1);
                rows.push(PlacedRow {
                    row: prev,
                    y: 0,
                    skip: lines - y,
                    shown: y,
                });
                clipped_above = true;
            }
        }
    }

    let mut cursor = Some(top);
    let mut more_below = false;
    while let Some(id) = cursor {
        if y >= height {
            more_below = true;
            break;
        }
        let lines = projection.get(id).map(|row| row.lines()).unwrap_or(1);
        let shown = lines.min(height - y);
        if shown < lines {
            more_below = true;
        }
        projection.set_anchor(id, Some(y));
        rows.push(PlacedRow {
            row: id,
            y,
            skip: 0,
            shown,
        });
        y += lines;
        cursor = projection.next(id);
    }

    Layout {
        rows,
        clipped_above,
        more_below,
    }
}
