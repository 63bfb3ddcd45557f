//! Core engine for nestlist, a terminal outliner (document tree, persisted format,
//! visible projection and editing session).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants (geometry defaults, persisted delimiters, bullet glyphs).
pub mod constants;
/// Caret arithmetic for wrapped text.
pub mod cursor;
/// Scoped environment overrides for tests.
pub mod env;
/// Error types for parsing, structural edits and file IO.
pub mod error;
/// Per-entry expand/collapse memory.
pub mod expand;
/// Persisted outline format.
pub mod format;
/// Windowing over a row taller than the screen.
pub mod partial;
/// Flattened chain of visible rows.
pub mod projection;
/// Editing session and its actions.
pub mod session;
/// Outline document tree.
pub mod tree;
/// Screen layout around the current row.
pub mod viewport;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::{OutlineError, ParseError, TreeError};
pub use projection::{Geometry, Projection, RowId};
pub use session::{Erase, Mode, Session, Update};
pub use tree::{Document, EntryId};
