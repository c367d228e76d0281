//! Pluggable byte-stream transforms: ciphers, compressors, and compositions of them.

use std::io::{Read, Write};

use crate::error::Result;

pub mod compress;
pub mod rolling_key;
pub mod segmented;
pub mod sliding_window;
pub mod xor;

pub use compress::{DeflateCodec, DeflateFlavor, LzmaCodec, ZstdCodec};
pub use rolling_key::RollingKeyCodec;
pub use segmented::SegmentedCodec;
pub use sliding_window::{DecodeReport, SlidingWindowCodec};
pub use xor::{MultiXorCodec, XorCodec};

/// A paired encode/decode transform over byte streams.
///
/// Both directions drain `input` completely and write the result to
/// `output`. Any state a codec keeps lives inside a single call; the same
/// codec value can serve concurrent calls on independent streams.
pub trait Codec: Send + Sync {
    /// Short name used in log events.
    fn name(&self) -> &'static str;

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()>;

    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()>;

    /// Decode an in-memory buffer.
    fn decode_bytes(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut src = input;
        let mut out = Vec::with_capacity(input.len());
        self.decode(&mut src, &mut out)?;
        Ok(out)
    }

    /// Encode an in-memory buffer.
    fn encode_bytes(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut src = input;
        let mut out = Vec::with_capacity(input.len());
        self.encode(&mut src, &mut out)?;
        Ok(out)
    }
}

impl<C: Codec + ?Sized> Codec for Box<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }
    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        (**self).decode(input, output)
    }
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        (**self).encode(input, output)
    }
}

/// Declarative codec selection, e.g. from a per-game preset.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CodecSpec {
    Xor {
        key: u8,
    },
    MultiXor {
        key: Vec<u8>,
        skip_incomplete_sequences: bool,
    },
    Segmented(Vec<(CodecSpec, u64)>),
    Deflate {
        flavor: DeflateFlavor,
        level: u32,
    },
    Lzma {
        uncompressed_size: Option<u64>,
    },
    Zstd {
        level: i32,
    },
    SlidingWindow,
    RollingKey,
}

impl CodecSpec {
    pub fn build(&self) -> Box<dyn Codec> {
        match self {
            CodecSpec::Xor { key } => Box::new(XorCodec::new(*key)),
            CodecSpec::MultiXor {
                key,
                skip_incomplete_sequences,
            } => Box::new(MultiXorCodec::new(key.clone(), *skip_incomplete_sequences)),
            CodecSpec::Segmented(segments) => Box::new(SegmentedCodec::new(
                segments
                    .iter()
                    .map(|(spec, len)| (spec.build(), *len))
                    .collect(),
            )),
            CodecSpec::Deflate { flavor, level } => Box::new(DeflateCodec::new(*flavor, *level)),
            CodecSpec::Lzma { uncompressed_size } => Box::new(match uncompressed_size {
                Some(size) => LzmaCodec::with_size_hint(*size),
                None => LzmaCodec::new(),
            }),
            CodecSpec::Zstd { level } => Box::new(ZstdCodec::new(*level)),
            CodecSpec::SlidingWindow => Box::new(SlidingWindowCodec::new()),
            CodecSpec::RollingKey => Box::new(RollingKeyCodec::new()),
        }
    }
}

/// Materialize the whole input; for codecs whose transform depends on total length.
pub(crate) fn read_all(input: &mut dyn Read) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;
    Ok(buf)
}
