//! Headless painting of a session layout into plain screen lines.

use nestlist_core::constants::{bullets, BULLET_WIDTH};
use nestlist_core::viewport::PlacedRow;
use nestlist_core::Session;
use unicode_width::UnicodeWidthChar;

/// Placeholder for the second cell of a wide character.
const WIDE_TAIL: char = '\0';

/// Glyph set chosen by the `ascii` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyphs {
    ascii: bool,
}

impl Glyphs {
    pub fn new(ascii: bool) -> Self {
        Self { ascii }
    }

    fn pick(self, pair: (&'static str, &'static str)) -> &'static str {
        if self.ascii {
            pair.1
        } else {
            pair.0
        }
    }
}

/// Fixed-size character grid.
struct Screen {
    width: usize,
    cells: Vec<Vec<char>>,
}

impl Screen {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            cells: vec![vec![' '; width]; height],
        }
    }

    /// Write `text` at `(x, y)`, dropping whatever falls off the grid.
    ///
    /// Wide characters take two cells and are dropped whole when they do not fit.
    fn put(&mut self, x: usize, y: usize, text: &str) {
        let width = self.width;
        let Some(line) = self.cells.get_mut(y) else {
            return;
        };
        let mut col = x;
        for ch in text.chars() {
            let cells = UnicodeWidthChar::width(ch).unwrap_or(1).max(1);
            if col + cells > width {
                break;
            }
            line[col] = ch;
            for tail in &mut line[col + 1..col + cells] {
                *tail = WIDE_TAIL;
            }
            col += cells;
        }
    }

    fn into_lines(self) -> Vec<String> {
        self.cells
            .into_iter()
            .map(|line| {
                line.into_iter()
                    .filter(|ch| *ch != WIDE_TAIL)
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }
}

/// Paint the session's current layout, one string per screen line.
///
/// Trailing blanks are trimmed; the result always has `screen_height` lines.
pub fn render(session: &mut Session, glyphs: Glyphs) -> Vec<String> {
    let layout = session.layout();
    let geometry = session.geometry();
    let partial = session.partial();
    let current = session.current_row();
    let mut screen = Screen::new(geometry.screen_width, geometry.screen_height);

    for placed in &layout.rows {
        let partial_row = partial.is_active() && placed.row == current;
        paint_row(session, &mut screen, placed, partial_row, glyphs);
        if partial_row && placed.y + 1 < geometry.screen_height {
            let marker = match (partial.more(), partial.less()) {
                (true, true) => bullets::MORE_LESS,
                (true, false) => bullets::MORE,
                _ => bullets::LESS,
            };
            let x = session
                .projection()
                .get(placed.row)
                .map(|row| row.indent())
                .unwrap_or(0);
            screen.put(x, placed.y + 1, glyphs.pick(marker));
        }
    }

    if layout.more_below && !partial.is_active() && geometry.screen_height > 0 {
        screen.put(
            geometry.screen_width.saturating_sub(1),
            geometry.screen_height - 1,
            glyphs.pick(bullets::TEXT_MORE),
        );
    }
    screen.into_lines()
}

fn paint_row(
    session: &Session,
    screen: &mut Screen,
    placed: &PlacedRow,
    partial_row: bool,
    glyphs: Glyphs,
) {
    let Some(row) = session.projection().get(placed.row) else {
        return;
    };
    let doc = session.document();
    let Some(entry) = doc.get(row.entry()) else {
        return;
    };

    if placed.skip > 0 && !partial_row {
        screen.put(
            row.indent() + BULLET_WIDTH / 2,
            placed.y,
            glyphs.pick(bullets::TEXT_MORE),
        );
    } else {
        let bullet = if partial_row {
            bullets::PARTIAL
        } else if row.expanded() {
            bullets::OPENED
        } else if doc.has_children(row.entry()) {
            bullets::CLOSED
        } else if entry.crossed() {
            bullets::CROSSED
        } else {
            bullets::SINGLE
        };
        screen.put(row.indent(), placed.y, glyphs.pick(bullet));
    }

    let chars: Vec<char> = entry.text().chars().collect();
    let width = row.width().max(1);
    let x = row.indent() + BULLET_WIDTH;
    for shown in 0..placed.shown {
        let line = placed.skip + shown;
        let start = (line * width).min(chars.len());
        let end = (start + width).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        screen.put(x, placed.y + shown, &chunk);
    }
}
