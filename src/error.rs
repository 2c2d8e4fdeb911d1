// Error types for tag loading and saving

use std::io;
use thiserror::Error;

/// Result type for id3forge operations
pub type Result<T> = std::result::Result<T, Id3Error>;

/// Errors surfaced at the `load()` / `save()` boundary and by genre lookups.
///
/// Structural problems inside a tag are not represented here: the parser
/// recovers from them by keeping the frames decoded before the anomaly.
#[derive(Debug, Error)]
pub enum Id3Error {
    /// Open/read/write/rename failures from the file system
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Numeric genre code outside the genre table
    #[error("Invalid genre index: {0}")]
    InvalidGenreIndex(i32),

    /// `save()` was called on a tag that is not bound to a file
    #[error("Tag is not bound to a file path")]
    NotBound,

    /// `save()` was called on a tag whose container was never detected
    #[error("Unsupported container format")]
    UnsupportedContainer,

    /// Frame payload does not fit in a 28-bit synchsafe size field
    #[error("Frame {id} is too large: {size} bytes")]
    FrameTooLarge { id: String, size: usize },

    /// Generated region does not fit in the tag header size field
    #[error("Tag is too large: {0} bytes")]
    TagTooLarge(usize),

    /// Metadata snapshot could not be decoded
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),
}
