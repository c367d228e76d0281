//! Adapters putting off-the-shelf block compressors behind [`Codec`].
//! No framing is added: decode inflates the whole stream, encode deflates it.

use std::io::{self, Read, Write};

use tracing::debug;

use super::Codec;
use crate::error::{Result, SerializerError};

/// Map a decompressor's io error: malformed payloads become format errors.
fn corrupt(codec: &'static str) -> impl Fn(io::Error) -> SerializerError {
    move |e| match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof => {
            SerializerError::Format(format!("{codec}: {e}"))
        }
        _ => SerializerError::Io(e),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeflateFlavor {
    /// Bare DEFLATE blocks.
    Raw,
    #[default]
    Zlib,
    Gzip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeflateCodec {
    flavor: DeflateFlavor,
    level: u32,
}

impl DeflateCodec {
    /// `level` is clamped to 0..=9.
    pub fn new(flavor: DeflateFlavor, level: u32) -> Self {
        Self {
            flavor,
            level: level.min(9),
        }
    }

    pub fn zlib() -> Self {
        Self::new(DeflateFlavor::Zlib, 6)
    }
}

impl Codec for DeflateCodec {
    fn name(&self) -> &'static str {
        "deflate"
    }

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        let n = match self.flavor {
            DeflateFlavor::Raw => io::copy(&mut flate2::read::DeflateDecoder::new(input), output),
            DeflateFlavor::Zlib => io::copy(&mut flate2::read::ZlibDecoder::new(input), output),
            DeflateFlavor::Gzip => io::copy(&mut flate2::read::GzDecoder::new(input), output),
        }
        .map_err(corrupt("deflate"))?;
        debug!(flavor = ?self.flavor, out = n, "inflated");
        Ok(())
    }

    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        let level = flate2::Compression::new(self.level);
        match self.flavor {
            DeflateFlavor::Raw => {
                let mut enc = flate2::write::DeflateEncoder::new(output, level);
                io::copy(input, &mut enc)?;
                enc.finish()?;
            }
            DeflateFlavor::Zlib => {
                let mut enc = flate2::write::ZlibEncoder::new(output, level);
                io::copy(input, &mut enc)?;
                enc.finish()?;
            }
            DeflateFlavor::Gzip => {
                let mut enc = flate2::write::GzEncoder::new(output, level);
                io::copy(input, &mut enc)?;
                enc.finish()?;
            }
        }
        Ok(())
    }
}

const LZMA_PROPS_LEN: usize = 5;
const LZMA_ALONE_HEADER_LEN: usize = LZMA_PROPS_LEN + 8;

/// LZMA-alone ("`.lzma`") adapter.
///
/// With a size hint, the stream is the archive variant that stores only the
/// 5 property bytes and keeps the decompressed size elsewhere: the size is
/// spliced back in before decoding and stripped again after encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LzmaCodec {
    uncompressed_size: Option<u64>,
    preset: u32,
}

impl LzmaCodec {
    pub fn new() -> Self {
        Self {
            uncompressed_size: None,
            preset: 6,
        }
    }

    pub fn with_size_hint(uncompressed_size: u64) -> Self {
        Self {
            uncompressed_size: Some(uncompressed_size),
            preset: 6,
        }
    }

    pub fn preset(mut self, preset: u32) -> Self {
        self.preset = preset.min(9);
        self
    }

    fn decoder_stream() -> Result<xz2::stream::Stream> {
        xz2::stream::Stream::new_lzma_decoder(u64::MAX)
            .map_err(|e| SerializerError::Io(io::Error::other(e)))
    }
}

impl Codec for LzmaCodec {
    fn name(&self) -> &'static str {
        "lzma"
    }

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        let n = match self.uncompressed_size {
            None => {
                let mut dec = xz2::read::XzDecoder::new_stream(&mut *input, Self::decoder_stream()?);
                io::copy(&mut dec, output).map_err(corrupt("lzma"))?
            }
            Some(size) => {
                let mut header = [0u8; LZMA_ALONE_HEADER_LEN];
                input
                    .read_exact(&mut header[..LZMA_PROPS_LEN])
                    .map_err(corrupt("lzma"))?;
                header[LZMA_PROPS_LEN..].copy_from_slice(&size.to_le_bytes());
                let mut chained = io::Cursor::new(header).chain(&mut *input);
                let mut dec = xz2::read::XzDecoder::new_stream(&mut chained, Self::decoder_stream()?);
                let n = io::copy(&mut dec, output).map_err(corrupt("lzma"))?;
                if n != size {
                    return Err(SerializerError::ValueMismatch {
                        what: "lzma decompressed size",
                        expected: size,
                        actual: n,
                    });
                }
                n
            }
        };
        // The decoder may stop at the declared size before an end marker.
        io::copy(input, &mut io::sink())?;
        debug!(out = n, "lzma decoded");
        Ok(())
    }

    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        let options = xz2::stream::LzmaOptions::new_preset(self.preset)
            .map_err(|e| SerializerError::Io(io::Error::other(e)))?;
        let stream = xz2::stream::Stream::new_lzma_encoder(&options)
            .map_err(|e| SerializerError::Io(io::Error::other(e)))?;
        match self.uncompressed_size {
            None => {
                let mut enc = xz2::write::XzEncoder::new_stream(output, stream);
                io::copy(input, &mut enc)?;
                enc.finish()?;
            }
            Some(_) => {
                let mut enc = xz2::write::XzEncoder::new_stream(Vec::new(), stream);
                io::copy(input, &mut enc)?;
                let encoded = enc.finish()?;
                if encoded.len() < LZMA_ALONE_HEADER_LEN {
                    return Err("lzma encoder produced a truncated header".into());
                }
                output.write_all(&encoded[..LZMA_PROPS_LEN])?;
                output.write_all(&encoded[LZMA_ALONE_HEADER_LEN..])?;
            }
        }
        Ok(())
    }
}

impl Default for LzmaCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Zstandard adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Codec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        let mut dec = zstd::stream::read::Decoder::new(input).map_err(corrupt("zstd"))?;
        let n = io::copy(&mut dec, output).map_err(corrupt("zstd"))?;
        debug!(out = n, "zstd decoded");
        Ok(())
    }

    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        let mut enc = zstd::stream::write::Encoder::new(output, self.level)?;
        io::copy(input, &mut enc)?;
        enc.finish()?;
        Ok(())
    }
}
