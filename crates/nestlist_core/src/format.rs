//! Persisted outline format.
//!
//! One entry per line: `<tabs>- [~~][**]text[**][~~]`. Tabs encode depth relative to the
//! previous entry and may deepen by at most one level per line.

use crate::constants::{BOLD_DELIMITER, BULLET_MARKER, CROSSED_DELIMITER};
use crate::error::{DumpError, ParseError};
use crate::tree::{Document, EntryId, Placement};
use std::io::{BufRead, Write};

fn strip_pair<'a>(text: &'a str, delimiter: &str) -> Option<&'a str> {
    if text.chars().count() < delimiter.chars().count() * 2 {
        return None;
    }
    text.strip_prefix(delimiter)?.strip_suffix(delimiter)
}

fn strip_line_ending(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}

/// Parse a document from `input`.
///
/// Blank lines are skipped. Empty input yields a document with one empty entry.
///
/// # Errors
/// Returns a [`ParseError`] naming the offending 1-based line for malformed
/// indentation, a missing bullet marker, or a read failure (including invalid UTF-8).
pub fn load<R: BufRead>(mut input: R) -> Result<Document, ParseError> {
    let mut doc: Option<Document> = None;
    let mut current: Option<EntryId> = None;
    let mut current_level = 0usize;
    let mut line_nr = 0usize;
    let mut line = String::new();

    loop {
        line.clear();
        line_nr += 1;
        let read = input
            .read_line(&mut line)
            .map_err(|source| ParseError::Io {
                line: line_nr,
                source,
            })?;
        if read == 0 {
            break;
        }
        strip_line_ending(&mut line);
        if line.is_empty() {
            continue;
        }

        let level = line.chars().take_while(|ch| *ch == '\t').count();
        let rest = &line[level..];
        if rest.is_empty() {
            return Err(ParseError::MissingContent { line: line_nr });
        }
        let Some(body) = rest.strip_prefix(BULLET_MARKER) else {
            return Err(ParseError::MissingMarker { line: line_nr });
        };

        let id = match current {
            None => {
                if level != 0 {
                    return Err(ParseError::MissingParent { line: line_nr });
                }
                let fresh = Document::new();
                let root = fresh.root();
                doc = Some(fresh);
                root
            }
            Some(prev) => {
                let Some(doc) = doc.as_mut() else {
                    return Err(ParseError::MissingParent { line: line_nr });
                };
                if level > current_level {
                    if level - current_level != 1 {
                        return Err(ParseError::AmbiguousIndentation { line: line_nr });
                    }
                    current_level = level;
                    doc.insert_first_child(prev, body.len())
                        .map_err(|_| ParseError::MissingParent { line: line_nr })?
                } else {
                    let mut sibling = prev;
                    while current_level != level {
                        match doc.parent(sibling) {
                            Some(parent) => {
                                sibling = parent;
                                current_level -= 1;
                            }
                            None => return Err(ParseError::MissingParent { line: line_nr }),
                        }
                    }
                    doc.insert(sibling, Placement::After, body.len())
                        .map_err(|_| ParseError::MissingParent { line: line_nr })?
                }
            }
        };

        let mut text = body;
        let mut crossed = false;
        let mut bold = false;
        if let Some(inner) = strip_pair(text, CROSSED_DELIMITER) {
            crossed = true;
            text = inner;
        }
        if let Some(inner) = strip_pair(text, BOLD_DELIMITER) {
            bold = true;
            text = inner;
        }
        if let Some(entry) = doc.as_mut().and_then(|doc| doc.get_mut(id)) {
            entry.set_text(text);
            entry.set_crossed(crossed);
            entry.set_bold(bold);
        }
        current = Some(id);
    }

    let doc = doc.unwrap_or_default();
    tracing::debug!(entries = doc.len(), lines = line_nr - 1, "parsed outline");
    Ok(doc)
}

/// Parse a document from an in-memory string.
///
/// # Errors
/// Same as [`load`].
pub fn load_str(input: &str) -> Result<Document, ParseError> {
    load(input.as_bytes())
}

/// Write `doc` to `output` in pre-order.
///
/// # Returns
/// Number of lines written.
///
/// # Errors
/// Aborts on the first write failure, reporting how many lines were completed.
pub fn dump<W: Write>(doc: &Document, mut output: W) -> Result<usize, DumpError> {
    let mut lines_written = 0usize;
    let mut line = String::new();
    for (id, depth) in doc.iter() {
        let Some(entry) = doc.get(id) else {
            continue;
        };
        line.clear();
        line.extend(std::iter::repeat('\t').take(depth));
        line.push_str(BULLET_MARKER);
        if entry.crossed() {
            line.push_str(CROSSED_DELIMITER);
        }
        if entry.bold() {
            line.push_str(BOLD_DELIMITER);
        }
        line.push_str(entry.text());
        if entry.bold() {
            line.push_str(BOLD_DELIMITER);
        }
        if entry.crossed() {
            line.push_str(CROSSED_DELIMITER);
        }
        line.push('\n');
        output
            .write_all(line.as_bytes())
            .map_err(|source| DumpError {
                lines_written,
                source,
            })?;
        lines_written += 1;
    }
    output.flush().map_err(|source| DumpError {
        lines_written,
        source,
    })?;
    Ok(lines_written)
}

/// Render `doc` into a `String`.
pub fn dump_to_string(doc: &Document) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = dump(doc, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn scenario_nested_list_loads_and_dumps_verbatim() {
        let input = "- One\n\t- Two\n\t- Three\n";
        let doc = load_str(input).expect("load");
        let root = doc.root();
        assert_eq!(doc.get(root).map(|e| e.text()), Some("One"));
        let two = doc.child(root).expect("first child");
        let three = doc.next(two).expect("second child");
        assert_eq!(doc.get(two).map(|e| e.text()), Some("Two"));
        assert_eq!(doc.get(three).map(|e| e.text()), Some("Three"));
        assert_eq!(doc.next(three), None);
        assert_eq!(dump_to_string(&doc), input);
    }

    #[test]
    fn two_level_jump_is_ambiguous_at_line_two() {
        let err = load_str("- One\n\t\t- Skip\n").expect_err("must fail");
        assert!(matches!(err, ParseError::AmbiguousIndentation { line: 2 }));
    }

    #[test]
    fn malformed_lines_report_their_line_number() {
        let cases = [
            ("- ok\n\t\t\n", 2usize),
            ("- ok\n\n\tno marker\n", 3),
            ("- ok\n-missing space\n", 2),
        ];
        for (input, expected) in cases {
            let err = load_str(input).expect_err("must fail");
            assert_eq!(err.line(), expected, "input: {:?}", input);
        }
    }

    #[test]
    fn indented_first_line_has_no_parent() {
        let err = load_str("\t- orphan\n").expect_err("must fail");
        assert!(matches!(err, ParseError::MissingParent { line: 1 }));
    }

    #[test]
    fn dedent_walks_up_several_levels() {
        let doc = load_str("- a\n\t- b\n\t\t- c\n- d\n").expect("load");
        let depths: Vec<_> = doc.snapshot().iter().map(|e| e.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 0]);
        assert!(doc.link_violations().is_empty());
    }

    #[test]
    fn delimiters_set_flags_outer_then_inner() {
        let doc = load_str("- ~~**both**~~\n- ~~gone~~\n- **loud**\n- ~~half\n- ~~~~\n").expect("load");
        let snap = doc.snapshot();
        assert_eq!((snap[0].text.as_str(), snap[0].crossed, snap[0].bold), ("both", true, true));
        assert_eq!((snap[1].text.as_str(), snap[1].crossed, snap[1].bold), ("gone", true, false));
        assert_eq!((snap[2].text.as_str(), snap[2].crossed, snap[2].bold), ("loud", false, true));
        assert_eq!((snap[3].text.as_str(), snap[3].crossed), ("~~half", false));
        assert_eq!((snap[4].text.as_str(), snap[4].crossed), ("", true));
    }

    #[test]
    fn plain_text_wrapped_in_delimiters_reloads_as_flagged() {
        let mut doc = Document::new();
        let root = doc.root();
        if let Some(entry) = doc.get_mut(root) {
            entry.set_text("~~x~~");
        }
        let dumped = dump_to_string(&doc);
        assert_eq!(dumped, "- ~~x~~\n");

        let snap = load_str(&dumped).expect("load").snapshot();
        assert_eq!((snap[0].text.as_str(), snap[0].crossed), ("x", true));
    }

    #[test]
    fn blank_lines_and_crlf_are_tolerated() {
        let doc = load_str("- a\r\n\r\n\n\t- b\r\n").expect("load");
        assert_eq!(dump_to_string(&doc), "- a\n\t- b\n");
    }

    #[test]
    fn empty_entries_round_trip() {
        let doc = load_str("- \n\t- \n").expect("load");
        assert_eq!(doc.len(), 2);
        assert_eq!(dump_to_string(&doc), "- \n\t- \n");
    }

    #[test]
    fn empty_input_yields_single_empty_entry() {
        let doc = load_str("").expect("load");
        assert_eq!(doc.len(), 1);
        assert!(doc.get(doc.root()).is_some_and(|e| e.is_empty()));
    }

    #[test]
    fn invalid_utf8_is_an_io_error_with_line() {
        let bytes: &[u8] = b"- ok\n- \xff\xfe\n";
        let err = load(bytes).expect_err("must fail");
        assert!(matches!(err, ParseError::Io { line: 2, .. }));
    }

    struct FailingWriter {
        accept: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.accept == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.accept -= 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn dump_stops_at_first_write_failure() {
        let doc = load_str("- a\n- b\n- c\n").expect("load");
        let err = dump(&doc, FailingWriter { accept: 2 }).expect_err("must fail");
        assert_eq!(err.lines_written, 2);
    }
}
