//! Corpus loader (C2).
//!
//! Reads the configured text file into an immutable, ordered snapshot of
//! lines. A read failure after the file was confirmed to exist yields an
//! *empty* snapshot rather than an error, so a failing reread never leaves
//! the server holding a torn or indeterminate corpus (spec §4.2).

use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, ServerError};

pub const DEFAULT_MAX_LINES: usize = 250_000;

/// Immutable, ordered sequence of corpus lines.
#[derive(Clone, Debug, Default)]
pub struct CorpusSnapshot {
    lines: Vec<String>,
}

impl CorpusSnapshot {
    pub fn empty() -> Self {
        Self { lines: Vec::new() }
    }

    /// Builds a snapshot directly from already-split lines (tests, and
    /// in-process construction that bypasses the filesystem).
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Reads up to `max_lines` lines from `path`.
///
/// Returns `ErrCorpusMissing` only if the file does not exist at call time.
/// Any I/O error encountered after a successful open yields an empty
/// snapshot: whatever lines were read so far are discarded, not returned
/// partially, so callers never observe a half-loaded corpus.
pub fn read(path: &Path, max_lines: usize) -> Result<CorpusSnapshot> {
    if !path.is_file() {
        return Err(ServerError::CorpusMissing(path.to_path_buf()));
    }

    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return Ok(CorpusSnapshot::empty()),
    };

    let mut lines = Vec::new();
    let mut reader = BufReader::new(file);
    let mut buf = String::new();
    loop {
        if lines.len() >= max_lines {
            break;
        }
        buf.clear();
        match reader.read_line(&mut buf) {
            Ok(0) => break, // EOF
            Ok(_) => {
                // read_line keeps the trailing '\n' (if any); normalize it away,
                // a final line with no terminator is preserved as-is.
                if buf.ends_with('\n') {
                    buf.pop();
                    if buf.ends_with('\r') {
                        buf.pop();
                    }
                }
                lines.push(buf.clone());
            }
            Err(_) => return Ok(CorpusSnapshot::empty()),
        }
    }

    Ok(CorpusSnapshot { lines })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn empty_file_has_no_lines() {
        let f = write_tmp("");
        let c = read(f.path(), DEFAULT_MAX_LINES).unwrap();
        assert_eq!(c.len(), 0);
    }

    #[test]
    fn single_newline_is_one_empty_line() {
        let f = write_tmp("\n");
        let c = read(f.path(), DEFAULT_MAX_LINES).unwrap();
        assert_eq!(c.lines(), &["".to_string()]);
    }

    #[test]
    fn lines_split_on_newline_trailing_preserved() {
        let f = write_tmp("alpha\nbeta\ngamma");
        let c = read(f.path(), DEFAULT_MAX_LINES).unwrap();
        assert_eq!(
            c.lines(),
            &["alpha".to_string(), "beta".to_string(), "gamma".to_string()]
        );
    }

    #[test]
    fn respects_max_lines_cap() {
        let f = write_tmp("a\nb\nc\nd\n");
        let c = read(f.path(), 2).unwrap();
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn missing_file_is_corpus_missing() {
        let err = read(Path::new("/nonexistent/corpus.txt"), DEFAULT_MAX_LINES).unwrap_err();
        assert!(matches!(err, ServerError::CorpusMissing(_)));
    }
}
