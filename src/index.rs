//! Random access to the lines of a flat text file.
//!
//! [`LineIndex`] opens a file once and performs a single O(n) scan that
//! records the byte offset at which every line begins. After the build pass
//! any line can be retrieved in O(1) seeks without holding the file's
//! contents in memory; the index keeps one `u64` per line, nothing more.
//!
//! The index is valid only for the file as it existed at construction;
//! external mutation of the file is not tolerated.
//!
//! # Examples
//!
//! ```no_run
//! use bloomgauge::LineIndex;
//!
//! let mut index = LineIndex::open("wordlist.txt").unwrap();
//! println!("{} entries", index.line_count());
//! println!("{}", index.line(27_013).unwrap());
//! ```

use crate::error::{BloomGaugeError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Build-once byte-offset index over the lines of a text file.
///
/// Owns the open file handle for its whole lifetime; the handle is released
/// when the index is dropped. The offset table and line count are fixed at
/// construction and never change afterwards.
#[derive(Debug)]
pub struct LineIndex {
    /// Open handle onto the indexed file.
    reader: BufReader<File>,

    /// Byte position at which each line begins; `offsets[i]` locates the
    /// first character of line `i`.
    offsets: Vec<u64>,

    /// Path the index was built from, kept for diagnostics.
    path: PathBuf,
}

impl LineIndex {
    /// Open `path` and build the offset table with one full scan.
    ///
    /// The stream position is captured immediately *before* each line is
    /// consumed, so `offsets[i]` points exactly at line `i`'s first byte
    /// (line 0 at offset 0). A final line with no trailing terminator still
    /// receives an entry.
    ///
    /// # Errors
    ///
    /// - [`BloomGaugeError::DictionaryUnreadable`] if the file cannot be
    ///   opened (terminal: the caller should abort rather than retry)
    /// - [`BloomGaugeError::DictionaryRead`] if the scan fails mid-file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .map_err(|source| BloomGaugeError::dictionary_unreadable(&path, source))?;
        let mut reader = BufReader::new(file);

        let mut offsets = Vec::new();
        let mut position: u64 = 0;
        let mut line = Vec::new();
        loop {
            line.clear();
            let consumed = reader
                .read_until(b'\n', &mut line)
                .map_err(|source| BloomGaugeError::dictionary_read(&path, source))?;
            if consumed == 0 {
                break;
            }
            offsets.push(position);
            position += consumed as u64;
        }

        Ok(Self {
            reader,
            offsets,
            path,
        })
    }

    /// Total number of lines recorded at construction.
    #[must_use]
    #[inline]
    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }

    /// Path the index was built from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Retrieve the contents of line `line_number`, terminator stripped.
    ///
    /// `line_number` must satisfy `0 <= line_number < line_count()`; the
    /// range is caller-checked (the evaluation loop derives its indices from
    /// a bounded random draw) and out-of-range values panic on the offset
    /// lookup. Seeking resets any end-of-file state left by a previous
    /// retrieval, so reading the last line and then an earlier one works.
    ///
    /// # Errors
    ///
    /// [`BloomGaugeError::DictionaryRead`] if the seek or read fails.
    pub fn line(&mut self, line_number: usize) -> Result<String> {
        debug_assert!(
            line_number < self.offsets.len(),
            "line {} out of range ({} lines)",
            line_number,
            self.offsets.len()
        );
        let offset = self.offsets[line_number];

        self.reader
            .seek(SeekFrom::Start(offset))
            .map_err(|source| BloomGaugeError::dictionary_read(&self.path, source))?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|source| BloomGaugeError::dictionary_read(&self.path, source))?;

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    /// Exact-match existence check by linear scan.
    ///
    /// Walks every line through [`line`] until the first match. O(n) per
    /// call: this is a verification and debugging aid, deliberately kept
    /// off the evaluation hot path.
    ///
    /// [`line`]: LineIndex::line
    ///
    /// # Errors
    ///
    /// [`BloomGaugeError::DictionaryRead`] if any retrieval fails.
    pub fn exists(&mut self, value: &str) -> Result<bool> {
        for line_number in 0..self.line_count() {
            if self.line(line_number)? == value {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Count the lines of `path` with a plain sequential read.
///
/// Used to size the filter's bit array before training; building a full
/// [`LineIndex`] just to learn the count would waste the offset table.
///
/// # Errors
///
/// - [`BloomGaugeError::DictionaryUnreadable`] if the file cannot be opened
/// - [`BloomGaugeError::DictionaryRead`] if reading fails
pub fn count_lines(path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| BloomGaugeError::dictionary_unreadable(path, source))?;
    let mut reader = BufReader::new(file);

    let mut count = 0usize;
    let mut line = Vec::new();
    loop {
        line.clear();
        let consumed = reader
            .read_until(b'\n', &mut line)
            .map_err(|source| BloomGaugeError::dictionary_read(path, source))?;
        if consumed == 0 {
            break;
        }
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write fixture");
        file
    }

    #[test]
    fn test_every_line_round_trips() {
        let file = fixture("alpha\nbeta\ngamma\ndelta\n");
        let mut index = LineIndex::open(file.path()).unwrap();

        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line(0).unwrap(), "alpha");
        assert_eq!(index.line(1).unwrap(), "beta");
        assert_eq!(index.line(2).unwrap(), "gamma");
        assert_eq!(index.line(3).unwrap(), "delta");
    }

    #[test]
    fn test_random_order_access() {
        let file = fixture("zero\none\ntwo\nthree\nfour\n");
        let mut index = LineIndex::open(file.path()).unwrap();

        assert_eq!(index.line(3).unwrap(), "three");
        assert_eq!(index.line(0).unwrap(), "zero");
        assert_eq!(index.line(4).unwrap(), "four");
        assert_eq!(index.line(1).unwrap(), "one");
    }

    #[test]
    fn test_missing_final_terminator() {
        let file = fixture("first\nsecond\nlast-no-newline");
        let mut index = LineIndex::open(file.path()).unwrap();

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line(2).unwrap(), "last-no-newline");
        // Reading past end-of-file above must not poison later retrievals.
        assert_eq!(index.line(0).unwrap(), "first");
    }

    #[test]
    fn test_crlf_terminators_stripped() {
        let file = fixture("one\r\ntwo\r\nthree\r\n");
        let mut index = LineIndex::open(file.path()).unwrap();

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line(0).unwrap(), "one");
        assert_eq!(index.line(1).unwrap(), "two");
    }

    #[test]
    fn test_single_empty_line() {
        let file = fixture("\n");
        let mut index = LineIndex::open(file.path()).unwrap();

        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line(0).unwrap(), "");
    }

    #[test]
    fn test_interior_empty_lines_keep_offsets_aligned() {
        let file = fixture("first\n\nthird\n");
        let mut index = LineIndex::open(file.path()).unwrap();

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line(1).unwrap(), "");
        assert_eq!(index.line(2).unwrap(), "third");
    }

    #[test]
    fn test_zero_length_file() {
        let file = fixture("");
        let index = LineIndex::open(file.path()).unwrap();
        assert_eq!(index.line_count(), 0);
    }

    #[test]
    fn test_missing_file_is_terminal() {
        let err = LineIndex::open("/no/such/dictionary.txt").unwrap_err();
        assert!(matches!(err, BloomGaugeError::DictionaryUnreadable { .. }));
    }

    #[test]
    fn test_exists_linear_fallback() {
        let file = fixture("needle\nhaystack\nstraw\n");
        let mut index = LineIndex::open(file.path()).unwrap();

        assert!(index.exists("straw").unwrap());
        assert!(index.exists("needle").unwrap());
        assert!(!index.exists("nee").unwrap());
        assert!(!index.exists("absent").unwrap());
    }

    #[test]
    fn test_count_lines_matches_index() {
        let contents = "a\nb\nc\nd\ne";
        let file = fixture(contents);

        let counted = count_lines(file.path()).unwrap();
        let index = LineIndex::open(file.path()).unwrap();
        assert_eq!(counted, 5);
        assert_eq!(counted, index.line_count());
    }

    #[test]
    fn test_count_lines_missing_file() {
        let err = count_lines("/no/such/dictionary.txt").unwrap_err();
        assert!(matches!(err, BloomGaugeError::DictionaryUnreadable { .. }));
    }
}
