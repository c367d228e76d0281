//! Compile-time dispatch for typed reads and writes.
//!
//! Primitives read their bytes directly; record types implement the same
//! trait by recursing into the reader/writer, so nested schemas compose
//! without any runtime type inspection.

use std::io::{Read, Seek, Write};

use crate::error::{Result, SerializerError};
use crate::reader::Reader;
use crate::writer::Writer;

/// A value that can be read from and written to a settings-driven stream.
///
/// Implementations may branch on `reader.settings()` / `writer.settings()`
/// for fields that only exist in some layouts, but must read and write the
/// same fields under the same settings.
pub trait BinarySerializable: Sized {
    fn deserialize<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self>;
    fn serialize<W: Write + Seek>(&self, writer: &mut Writer<W>) -> Result<()>;
}

macro_rules! primitive {
    ($($ty:ty => $read:ident, $write:ident;)*) => {
        $(
            impl BinarySerializable for $ty {
                fn deserialize<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self> {
                    reader.$read()
                }
                fn serialize<W: Write + Seek>(&self, writer: &mut Writer<W>) -> Result<()> {
                    writer.$write(*self)
                }
            }
        )*
    };
}

primitive! {
    u8 => read_u8, write_u8;
    i8 => read_i8, write_i8;
    u16 => read_u16, write_u16;
    i16 => read_i16, write_i16;
    u32 => read_u32, write_u32;
    i32 => read_i32, write_i32;
    u64 => read_u64, write_u64;
    i64 => read_i64, write_i64;
    f32 => read_f32, write_f32;
    f64 => read_f64, write_f64;
    bool => read_bool, write_bool;
}

impl BinarySerializable for String {
    fn deserialize<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self> {
        reader.read_string()
    }
    fn serialize<W: Write + Seek>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_string(self)
    }
}

impl<T: BinarySerializable, const N: usize> BinarySerializable for [T; N] {
    fn deserialize<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self> {
        let items = reader.read_array::<T>(N)?;
        let actual = items.len() as u64;
        items
            .try_into()
            .map_err(|_| SerializerError::ValueMismatch {
                what: "fixed array length",
                expected: N as u64,
                actual,
            })
    }
    fn serialize<W: Write + Seek>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_array(self)
    }
}
