//! Settings-driven binary serialization and a composable codec pipeline for
//! legacy game file formats.
//!
//! - `Reader`/`Writer`: typed primitive I/O whose byte order, string framing
//!   and boolean width come from an immutable [`SerializerSettings`].
//! - [`BinarySerializable`]: compile-time dispatch so record schemas compose
//!   by recursing into the reader/writer.
//! - [`codec`]: XOR ciphers, segmented composition, block-compressor
//!   adapters and two bespoke save-file codecs.

pub mod codec;
mod config;
mod error;
mod io;
mod reader;
mod serializable;
mod tests;
mod text;
mod writer;

pub use crate::codec::{Codec, CodecSpec};
pub use crate::config::{
    BoolWidth, ByteOrder, SerializerSettings, SerializerSettingsBuilder, StringFraming,
};
pub use crate::error::{Result, SerializerError};
pub use crate::reader::Reader;
pub use crate::serializable::BinarySerializable;
pub use crate::text::TextEncoding;
pub use crate::writer::Writer;
