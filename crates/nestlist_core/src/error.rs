//! Error types for parsing, structural edits, projection upkeep and file IO.
use std::io;
use thiserror::Error;

/// Failure while parsing the persisted outline format.
///
/// Every variant carries the 1-based input line that triggered it.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed input at line {line}: nothing after indentation")]
    MissingContent { line: usize },

    #[error("Malformed input at line {line}: expected \"- \" bullet marker")]
    MissingMarker { line: usize },

    #[error("Ambiguous indentation at line {line}")]
    AmbiguousIndentation { line: usize },

    #[error("Couldn't find parent at line {line}")]
    MissingParent { line: usize },

    #[error("File access error at line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },
}

impl ParseError {
    /// Input line (1-based) the error refers to.
    pub fn line(&self) -> usize {
        match self {
            Self::MissingContent { line }
            | Self::MissingMarker { line }
            | Self::AmbiguousIndentation { line }
            | Self::MissingParent { line }
            | Self::Io { line, .. } => *line,
        }
    }
}

/// Write failure while dumping a document.
#[derive(Error, Debug)]
#[error("Write error after {lines_written} line(s): {source}")]
pub struct DumpError {
    /// Lines fully written before the failure.
    pub lines_written: usize,
    #[source]
    pub source: io::Error,
}

/// Refusal of a structural edit. The tree is never mutated when one is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("Can't delete an entry with children")]
    HasChildren,

    #[error("Can't delete last entry")]
    LastNode,

    #[error("Entry does not exist in this document")]
    UnknownEntry,
}

/// Projection bookkeeping failure (stale row or entry handles).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("Row does not exist in the projection")]
    UnknownRow,

    #[error("Row refers to an entry that no longer exists")]
    UnknownEntry,
}

/// Top-level error type for session and file operations.
#[derive(Error, Debug)]
pub enum OutlineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Dump(#[from] DumpError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("There is no file bound to this session")]
    NoFile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_reports_line_for_every_variant() {
        let cases = [
            ParseError::MissingContent { line: 1 },
            ParseError::MissingMarker { line: 2 },
            ParseError::AmbiguousIndentation { line: 3 },
            ParseError::MissingParent { line: 4 },
            ParseError::Io {
                line: 5,
                source: io::Error::new(io::ErrorKind::Other, "boom"),
            },
        ];
        for (idx, err) in cases.iter().enumerate() {
            assert_eq!(err.line(), idx + 1);
            assert!(err.to_string().contains(&format!("line {}", idx + 1)));
        }
    }

    #[test]
    fn outline_error_wraps_tree_refusals_transparently() {
        let err: OutlineError = TreeError::LastNode.into();
        assert_eq!(err.to_string(), "Can't delete last entry");
    }
}
