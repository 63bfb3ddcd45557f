//! Shared constants used across nestlist crates.

/// Default fixed-column screen width.
pub const DEFAULT_SCREEN_WIDTH: usize = 80;

/// Default screen height in lines.
pub const DEFAULT_SCREEN_HEIGHT: usize = 24;

/// Columns reserved for the bullet glyph in front of every row.
pub const BULLET_WIDTH: usize = 3;

/// Narrowest text column a deeply nested row may be given.
pub const MIN_COLUMN_WIDTH: usize = 1;

/// Initial text capacity for entries created by the browse `insert` action.
pub const DEFAULT_ENTRY_CAPACITY: usize = DEFAULT_SCREEN_WIDTH;

/// Bullet marker that starts every persisted line.
pub const BULLET_MARKER: &str = "- ";

/// Delimiter pair marking struck-through text.
pub const CROSSED_DELIMITER: &str = "~~";

/// Delimiter pair marking emphasized text.
pub const BOLD_DELIMITER: &str = "**";

/// Bullet glyphs used by renderers, in `(unicode, ascii)` pairs.
pub mod bullets {
    pub const CROSSED: (&str, &str) = (" · ", " x ");
    pub const SINGLE: (&str, &str) = (" – ", " - ");
    pub const OPENED: (&str, &str) = (" v ", " v ");
    pub const CLOSED: (&str, &str) = (" > ", " > ");
    pub const PARTIAL: (&str, &str) = (" … ", "...");
    pub const MORE: (&str, &str) = (" ↓ ", " v ");
    pub const LESS: (&str, &str) = (" ↑ ", " ^ ");
    pub const MORE_LESS: (&str, &str) = (" ⇅ ", " | ");
    pub const TEXT_MORE: (&str, &str) = ("…", "+");
}
