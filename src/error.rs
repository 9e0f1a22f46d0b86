//! Error type shared by the stream, the framing code and every box decoder.

use crate::boxes::FourCC;

/// Errors raised while parsing an ISOBMFF stream.
///
/// Any of these aborts the whole parse: a caller either gets a complete tree
/// or one of these, never a partial tree.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    /// Empty input, or the first top-level box is not one of the allowed
    /// file signatures.
    #[error("input rejected: {0}")]
    InputRejected(String),

    /// A box whose declared size is inconsistent with its framing or content,
    /// or a container holding trailing bytes too short to frame a box.
    #[error("malformed {context} at offset {offset:#x}: {reason}")]
    MalformedBox {
        context: String,
        offset: u64,
        reason: String,
    },

    /// A read asked for more bytes than the underlying data holds.
    #[error("truncated stream at offset {offset:#x}: requested {requested} bytes, {available} available")]
    TruncatedStream {
        offset: u64,
        requested: u64,
        available: u64,
    },

    /// A read asked for more bytes than remain in the active bounded view,
    /// even though the underlying data holds more.
    #[error("read out of scope at offset {offset:#x}: requested {requested} bytes, {remaining} left in scope")]
    OutOfScope {
        offset: u64,
        requested: u64,
        remaining: u64,
    },

    /// Registry keys must be exactly four bytes long.
    #[error("box type code must be 4 bytes long: {0:?}")]
    InvalidTypeCode(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub(crate) fn malformed(typ: FourCC, offset: u64, reason: impl Into<String>) -> Self {
        ParseError::MalformedBox {
            context: format!("box '{typ}'"),
            offset,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
