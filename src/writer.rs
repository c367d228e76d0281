use std::io::{Seek, SeekFrom, Write};

use crate::config::{BoolWidth, SerializerSettings, StringFraming};
use crate::error::{Result, SerializerError};
use crate::serializable::BinarySerializable;

/// Settings-driven primitive writer; mirrors [`Reader`](crate::Reader) byte for byte.
pub struct Writer<W> {
    stream: W,
    settings: SerializerSettings,
    reverse: bool,
}

macro_rules! write_primitive {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self, v: $ty) -> Result<()> {
                let mut bytes = v.to_ne_bytes();
                if self.reverse {
                    bytes.reverse();
                }
                self.write_bytes(&bytes)
            }
        )*
    };
}

impl<W: Write + Seek> Writer<W> {
    pub fn new(stream: W, settings: SerializerSettings) -> Self {
        let reverse = settings.reverses_bytes();
        Self {
            stream,
            settings,
            reverse,
        }
    }

    pub fn settings(&self) -> &SerializerSettings {
        &self.settings
    }

    /// Flush and hand back the stream.
    pub fn into_inner(mut self) -> Result<W> {
        self.stream.flush()?;
        Ok(self.stream)
    }

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.stream.stream_position()?)
    }

    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.stream.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// Pad with zeros to the next multiple of `alignment`.
    pub fn align(&mut self, alignment: u64) -> Result<()> {
        if alignment == 0 {
            return Err(SerializerError::Unsupported("alignment must be non-zero"));
        }
        let pos = self.position()?;
        let padding = (alignment - pos % alignment) % alignment;
        self.write_bytes(&vec![0u8; padding as usize])
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes)?;
        Ok(())
    }

    pub fn write_magic(&mut self, magic: &[u8]) -> Result<()> {
        self.write_bytes(magic)
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.write_bytes(&[v])
    }

    pub fn write_i8(&mut self, v: i8) -> Result<()> {
        self.write_u8(v as u8)
    }

    write_primitive! {
        write_u16 => u16,
        write_i16 => i16,
        write_u32 => u32,
        write_i32 => i32,
        write_u64 => u64,
        write_i64 => i64,
        write_f32 => f32,
        write_f64 => f64,
    }

    /// Patch a u32 at a specific position (for backpatching sizes), then
    /// return to where the cursor was.
    pub fn patch_u32(&mut self, pos: u64, v: u32) -> Result<()> {
        let here = self.position()?;
        self.seek(pos)?;
        self.write_u32(v)?;
        self.seek(here)
    }

    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        let raw = u8::from(v);
        match self.settings.bool_width() {
            BoolWidth::One => self.write_u8(raw),
            BoolWidth::Two => self.write_u16(raw.into()),
            BoolWidth::Four => self.write_u32(raw.into()),
            BoolWidth::Eight => self.write_u64(raw.into()),
        }
    }

    pub fn write_string(&mut self, s: &str) -> Result<()> {
        let bytes = self.settings.text_encoding().encode(s)?;
        match self.settings.string_framing() {
            StringFraming::Standard => {
                self.write_7bit_len(bytes.len())?;
                self.write_bytes(&bytes)
            }
            StringFraming::NullTerminated => {
                let width = self.settings.char_byte_width();
                // An embedded zero character would end the string early on read.
                if bytes.chunks(width).any(|ch| ch.iter().all(|&b| b == 0)) {
                    return Err("null-terminated string contains a zero character".into());
                }
                self.write_bytes(&bytes)?;
                self.write_bytes(&vec![0u8; width])
            }
            StringFraming::LengthPrefixed => {
                let count = bytes.len() / self.settings.char_byte_width();
                let count = u32::try_from(count).map_err(|_| "string too long for u32 count")?;
                self.write_u32(count)?;
                self.write_bytes(&bytes)
            }
        }
    }

    /// Write any value implementing [`BinarySerializable`].
    pub fn write<T: BinarySerializable>(&mut self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    pub fn write_array<T: BinarySerializable>(&mut self, values: &[T]) -> Result<()> {
        values.iter().try_for_each(|v| self.write(v))
    }

    fn write_7bit_len(&mut self, mut len: usize) -> Result<()> {
        while len >= 0x80 {
            self.write_u8((len as u8 & 0x7F) | 0x80)?;
            len >>= 7;
        }
        self.write_u8(len as u8)
    }
}
