//! Error types for bloomgauge operations.
//!
//! Every fallible operation in the crate returns [`Result<T>`] with
//! [`BloomGaugeError`] as the error type. Setup failures (unreadable or empty
//! dictionary, degenerate filter parameters) are terminal and reported before
//! any training happens; recoverable adjustments such as clamping an
//! over-large bit-array length are *not* errors and are surfaced through
//! `tracing` warnings instead.
//!
//! # Error Propagation
//!
//! ```no_run
//! use bloomgauge::{LineIndex, Result};
//!
//! fn middle_line(path: &str) -> Result<String> {
//!     let mut index = LineIndex::open(path)?;
//!     index.line(index.line_count() / 2)
//! }
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Result type alias for bloomgauge operations.
///
/// This is the standard Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, BloomGaugeError>;

/// Errors that can occur while building or evaluating a membership filter.
///
/// Dictionary I/O variants keep the offending path and the underlying
/// [`io::Error`] so callers can print a clear diagnostic and abort the run.
/// The configuration variants cover everything the evaluation protocol
/// treats as "invalid configuration": parameters that would produce a
/// degenerate filter or an empty evaluation round.
#[derive(Debug)]
pub enum BloomGaugeError {
    /// The dictionary file could not be opened.
    ///
    /// Terminal: the caller should abort the run, not retry.
    DictionaryUnreadable {
        /// Path that failed to open.
        path: PathBuf,
        /// The underlying I/O failure.
        source: io::Error,
    },

    /// Reading from an already-open dictionary failed mid-scan.
    DictionaryRead {
        /// Path of the file being read.
        path: PathBuf,
        /// The underlying I/O failure.
        source: io::Error,
    },

    /// The dictionary contains no entries.
    ///
    /// A filter trained on zero keys cannot be evaluated; this is a terminal
    /// setup error.
    EmptyDictionary {
        /// Path of the empty file.
        path: PathBuf,
    },

    /// Bit array length of zero was requested.
    ///
    /// A zero-length bit vector cannot represent any set. Over-large lengths
    /// are clamped with a warning rather than rejected.
    InvalidBitLength {
        /// The invalid length that was requested.
        length: usize,
    },

    /// Hash function count outside the usable range.
    ///
    /// Counts above the bank size are clamped with a warning; only a count
    /// of zero reaches this error.
    InvalidHashCount {
        /// The invalid count that was requested.
        count: usize,
        /// Minimum allowed value.
        min: usize,
        /// Maximum allowed value.
        max: usize,
    },

    /// Sample size of zero was requested for an evaluation round.
    InvalidSampleSize {
        /// The invalid size that was requested.
        size: usize,
    },

    /// A sweep axis is empty or contains a degenerate entry.
    InvalidSweep {
        /// Human-readable description of what's invalid.
        message: String,
    },
}

impl fmt::Display for BloomGaugeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DictionaryUnreadable { path, source } => {
                write!(f, "Could not open dictionary file {}: {}.", path.display(), source)
            }
            Self::DictionaryRead { path, source } => {
                write!(f, "Failed reading dictionary file {}: {}.", path.display(), source)
            }
            Self::EmptyDictionary { path } => {
                write!(
                    f,
                    "Dictionary file {} contains no entries. Nothing to train on.",
                    path.display()
                )
            }
            Self::InvalidBitLength { length } => {
                write!(
                    f,
                    "Invalid bit array length: {}. Length must be greater than 0.",
                    length
                )
            }
            Self::InvalidHashCount { count, min, max } => {
                write!(
                    f,
                    "Invalid hash function count: {}. Must be in range [{}, {}].",
                    count, min, max
                )
            }
            Self::InvalidSampleSize { size } => {
                write!(
                    f,
                    "Invalid sample size: {}. Each evaluation round needs at least one sample.",
                    size
                )
            }
            Self::InvalidSweep { message } => {
                write!(f, "Invalid sweep configuration: {}.", message)
            }
        }
    }
}

impl std::error::Error for BloomGaugeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DictionaryUnreadable { source, .. } | Self::DictionaryRead { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

impl BloomGaugeError {
    /// Create a `DictionaryUnreadable` error.
    #[must_use]
    pub fn dictionary_unreadable(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::DictionaryUnreadable {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a `DictionaryRead` error.
    #[must_use]
    pub fn dictionary_read(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::DictionaryRead {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an `EmptyDictionary` error.
    #[must_use]
    pub fn empty_dictionary(path: impl AsRef<Path>) -> Self {
        Self::EmptyDictionary {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create an `InvalidBitLength` error.
    #[must_use]
    pub fn invalid_bit_length(length: usize) -> Self {
        Self::InvalidBitLength { length }
    }

    /// Create an `InvalidHashCount` error.
    #[must_use]
    pub fn invalid_hash_count(count: usize, min: usize, max: usize) -> Self {
        Self::InvalidHashCount { count, min, max }
    }

    /// Create an `InvalidSampleSize` error.
    #[must_use]
    pub fn invalid_sample_size(size: usize) -> Self {
        Self::InvalidSampleSize { size }
    }

    /// Create an `InvalidSweep` error with a formatted message.
    #[must_use]
    pub fn invalid_sweep(message: impl Into<String>) -> Self {
        Self::InvalidSweep {
            message: message.into(),
        }
    }

    /// True if this error is a setup-time configuration problem rather than
    /// an I/O failure.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyDictionary { .. }
                | Self::InvalidBitLength { .. }
                | Self::InvalidHashCount { .. }
                | Self::InvalidSampleSize { .. }
                | Self::InvalidSweep { .. }
        )
    }
}
