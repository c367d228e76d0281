use std::io::{self, Read, Seek, SeekFrom};

use crate::config::{BoolWidth, SerializerSettings, StringFraming};
use crate::error::{Result, SerializerError};
use crate::serializable::BinarySerializable;

/// Settings-driven primitive reader over a seekable stream.
///
/// The reader owns only the stream cursor; settings are fixed for its
/// lifetime and the byte-reversal flag is derived once at construction.
pub struct Reader<R> {
    stream: R,
    settings: SerializerSettings,
    reverse: bool,
}

macro_rules! read_primitive {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self) -> Result<$ty> {
                let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                self.fill(&mut bytes)?;
                if self.reverse {
                    bytes.reverse();
                }
                Ok(<$ty>::from_ne_bytes(bytes))
            }
        )*
    };
}

impl<R: Read + Seek> Reader<R> {
    pub fn new(stream: R, settings: SerializerSettings) -> Self {
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

    pub fn into_inner(self) -> R {
        self.stream
    }

    /// Current byte position.
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.stream.stream_position()?)
    }

    /// Seek to an absolute position.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.stream.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// Total length of the underlying stream.
    pub fn len(&mut self) -> Result<u64> {
        let pos = self.stream.stream_position()?;
        let end = self.stream.seek(SeekFrom::End(0))?;
        self.stream.seek(SeekFrom::Start(pos))?;
        Ok(end)
    }

    /// Bytes between the cursor and the end of the stream.
    pub fn remaining(&mut self) -> Result<u64> {
        let pos = self.position()?;
        Ok(self.len()?.saturating_sub(pos))
    }

    pub fn is_at_end(&mut self) -> Result<bool> {
        Ok(self.remaining()? == 0)
    }

    /// Fail with `PositionMismatch` unless the cursor sits at `expected`.
    pub fn assert_position(&mut self, expected: u64) -> Result<()> {
        let actual = self.position()?;
        if actual != expected {
            return Err(SerializerError::PositionMismatch { expected, actual });
        }
        Ok(())
    }

    /// Skip forward to the next multiple of `alignment`.
    pub fn align(&mut self, alignment: u64) -> Result<()> {
        if alignment == 0 {
            return Err(SerializerError::Unsupported("alignment must be non-zero"));
        }
        let pos = self.position()?;
        let padding = (alignment - pos % alignment) % alignment;
        if padding > 0 {
            self.read_bytes(padding as usize)?;
        }
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        (&mut self.stream).take(n as u64).read_to_end(&mut out)?;
        if out.len() != n {
            let end = self.position()?;
            return Err(SerializerError::UnexpectedEof {
                offset: end - out.len() as u64,
                need: n,
            });
        }
        Ok(out)
    }

    pub fn read_remaining_bytes(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.stream.read_to_end(&mut out)?;
        Ok(out)
    }

    /// Read a fixed tag and fail with `BadMagic` if it differs from `expected`.
    pub fn read_magic(&mut self, expected: &[u8]) -> Result<()> {
        let offset = self.position()?;
        let found = self.read_bytes(expected.len())?;
        if found != expected {
            return Err(SerializerError::BadMagic {
                offset,
                expected: expected.to_vec(),
                found,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.fill(&mut byte)?;
        Ok(byte[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    read_primitive! {
        read_u16 => u16,
        read_i16 => i16,
        read_u32 => u32,
        read_i32 => i32,
        read_u64 => u64,
        read_i64 => i64,
        read_f32 => f32,
        read_f64 => f64,
    }

    /// True only when the stored integer is exactly 1; other non-zero
    /// sentinels decode as false.
    pub fn read_bool(&mut self) -> Result<bool> {
        let value = match self.settings.bool_width() {
            BoolWidth::One => u64::from(self.read_u8()?),
            BoolWidth::Two => u64::from(self.read_u16()?),
            BoolWidth::Four => u64::from(self.read_u32()?),
            BoolWidth::Eight => self.read_u64()?,
        };
        Ok(value == 1)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let offset = self.position()?;
        let bytes = match self.settings.string_framing() {
            StringFraming::Standard => {
                let len = self.read_7bit_len()?;
                self.read_bytes(len)?
            }
            StringFraming::NullTerminated => self.read_null_terminated()?,
            StringFraming::LengthPrefixed => {
                let count = self.read_u32()? as usize;
                if count == 0 {
                    return Ok(String::new());
                }
                let len = count
                    .checked_mul(self.settings.char_byte_width())
                    .ok_or("string length overflows")?;
                self.read_bytes(len)?
            }
        };
        let encoding = self.settings.text_encoding();
        encoding
            .decode(&bytes)
            .ok_or(SerializerError::InvalidString { offset, encoding })
    }

    /// Read any value implementing [`BinarySerializable`].
    pub fn read<T: BinarySerializable>(&mut self) -> Result<T> {
        T::deserialize(self)
    }

    /// Read `count` consecutive values.
    pub fn read_array<T: BinarySerializable>(&mut self, count: usize) -> Result<Vec<T>> {
        // Cap the preallocation; `count` comes from untrusted headers.
        let mut out = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            out.push(self.read()?);
        }
        Ok(out)
    }

    /// Fill `buf` completely. The stream position is only queried on a
    /// short read, to report where the read began.
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut got = 0;
        while got < buf.len() {
            match self.stream.read(&mut buf[got..]) {
                Ok(0) => {
                    let end = self.stream.stream_position()?;
                    return Err(SerializerError::UnexpectedEof {
                        offset: end - got as u64,
                        need: buf.len(),
                    });
                }
                Ok(n) => got += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn read_7bit_len(&mut self) -> Result<usize> {
        let mut value = 0usize;
        for shift in (0..35).step_by(7) {
            let b = self.read_u8()?;
            value |= usize::from(b & 0x7F) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err("bad 7-bit encoded string length".into())
    }

    fn read_null_terminated(&mut self) -> Result<Vec<u8>> {
        let width = self.settings.char_byte_width();
        let mut out = Vec::new();
        let mut ch = vec![0u8; width];
        loop {
            self.fill(&mut ch)?;
            if ch.iter().all(|&b| b == 0) {
                return Ok(out);
            }
            out.extend_from_slice(&ch);
        }
    }
}
