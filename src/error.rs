use std::io;

use crate::text::TextEncoding;

#[derive(thiserror::Error, Debug)]
pub enum SerializerError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    /// Stream ended before a fixed-size read could complete.
    #[error("unexpected end of data at offset {offset:#x} (need {need} bytes)")]
    UnexpectedEof { offset: u64, need: usize },

    #[error("bad magic at offset {offset:#x}: expected {expected:02x?}, found {found:02x?}")]
    BadMagic {
        offset: u64,
        expected: Vec<u8>,
        found: Vec<u8>,
    },

    #[error("stream position mismatch: expected {expected:#x}, actual {actual:#x}")]
    PositionMismatch { expected: u64, actual: u64 },

    #[error("{what}: expected {expected}, actual {actual}")]
    ValueMismatch {
        what: &'static str,
        expected: u64,
        actual: u64,
    },

    #[error("string at offset {offset:#x} is not valid {encoding:?}")]
    InvalidString { offset: u64, encoding: TextEncoding },

    /// Stream content violates a format invariant (bad header, truncated block, etc.)
    #[error("format: {0}")]
    Format(String),

    /// Programming error: the requested configuration or type is not supported.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}

impl SerializerError {
    /// True for every variant that describes malformed stream content.
    pub fn is_format_error(&self) -> bool {
        !matches!(self, SerializerError::Io(_) | SerializerError::Unsupported(_))
    }
}

impl From<&'static str> for SerializerError {
    fn from(s: &'static str) -> Self {
        SerializerError::Format(s.to_owned())
    }
}

pub type Result<T> = std::result::Result<T, SerializerError>;
