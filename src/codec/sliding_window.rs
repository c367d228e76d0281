//! Dictionary compressor used by one family of PC save files.
//!
//! Layout of an encoded stream:
//!
//! ```text
//! [window size ^ 0x53] [decompressed size LE ^ 0x54574F53]   outer header, 5 bytes
//! obfuscated {
//!     [checksum] [decompressed size LE]                      inner header, 5 bytes
//!     body: repeated [slot][mask][literal per set mask bit]
//!           optionally terminated by a lone [tail length]
//! }
//! ```
//!
//! The dictionary holds 256 slots of 8 bytes, slot `i` starting as eight
//! copies of `i`. Each body group names a slot, overwrites the bytes whose
//! mask bit is set (LSB first), and emits the resulting 8 bytes. A lone
//! trailing byte instead gives the length of a short final group.
//! Obfuscated bytes are XORed with `reverse_bits(key) ^ 0xB9`, where `key`
//! starts at 0x57 and wraps after 0xFF.
//!
//! Checksum and size mismatches on decode are logged, not fatal: shipped
//! saves are known to carry stale checksums.

use std::io::{Cursor, Read, Write};

use tracing::{debug, warn};

use super::{Codec, read_all};
use crate::config::SerializerSettings;
use crate::error::{Result, SerializerError};
use crate::io::byte_source::ByteSource;
use crate::writer::Writer;

pub const WINDOW_SIZE: usize = 8;
const SLOT_COUNT: usize = 256;

const WINDOW_SIZE_KEY: u8 = 0x53;
const SIZE_KEY: u32 = 0x5457_4F53;
const BODY_KEY_START: u8 = 0x57;
const BODY_XOR: u8 = 0xB9;

type Dictionary = [[u8; WINDOW_SIZE]; SLOT_COUNT];

fn initial_dictionary() -> Dictionary {
    std::array::from_fn(|i| [i as u8; WINDOW_SIZE])
}

/// Rolling obfuscation keystream; identical for both directions.
struct Obfuscation {
    key: u8,
}

impl Obfuscation {
    fn new() -> Self {
        Self { key: BODY_KEY_START }
    }

    #[inline]
    fn apply(&mut self, b: u8) -> u8 {
        let out = b ^ self.key.reverse_bits() ^ BODY_XOR;
        self.key = self.key.wrapping_add(1);
        out
    }
}

/// De-obfuscating byte pull that also sums every body byte.
struct BodySource<'a> {
    src: ByteSource<'a>,
    mask: Obfuscation,
    checksum: u8,
}

impl BodySource<'_> {
    fn next(&mut self) -> Result<Option<u8>> {
        Ok(self.src.next_byte()?.map(|b| {
            let b = self.mask.apply(b);
            self.checksum = self.checksum.wrapping_add(b);
            b
        }))
    }

    fn require(&mut self) -> Result<u8> {
        let offset = self.src.consumed();
        self.next()?
            .ok_or(SerializerError::UnexpectedEof { offset, need: 1 })
    }
}

/// What a decode saw versus what the headers declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeReport {
    /// Size from the outer (plain) header.
    pub outer_declared_size: u32,
    /// Size from the inner (obfuscated) header.
    pub declared_size: u32,
    pub actual_size: u64,
    pub stored_checksum: u8,
    pub computed_checksum: u8,
}

impl DecodeReport {
    pub fn checksum_matches(&self) -> bool {
        self.stored_checksum == self.computed_checksum
    }

    pub fn size_matches(&self) -> bool {
        u64::from(self.declared_size) == self.actual_size
            && self.outer_declared_size == self.declared_size
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlidingWindowCodec;

impl SlidingWindowCodec {
    pub fn new() -> Self {
        Self
    }

    /// Decode and return the header/checksum comparison.
    pub fn decode_with_report(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
    ) -> Result<DecodeReport> {
        let mut src = ByteSource::new(input);

        let mut outer = [0u8; 5];
        src.require_exact(&mut outer)?;
        let window_size = outer[0] ^ WINDOW_SIZE_KEY;
        if usize::from(window_size) != WINDOW_SIZE {
            return Err(SerializerError::ValueMismatch {
                what: "sliding window size",
                expected: WINDOW_SIZE as u64,
                actual: u64::from(window_size),
            });
        }
        let outer_declared_size =
            u32::from_le_bytes([outer[1], outer[2], outer[3], outer[4]]) ^ SIZE_KEY;

        let mut body = BodySource {
            src,
            mask: Obfuscation::new(),
            checksum: 0,
        };
        let stored_checksum = body.require()?;
        let mut size = [0u8; 4];
        for b in &mut size {
            *b = body.require()?;
        }
        let declared_size = u32::from_le_bytes(size);
        // Only bytes after the inner header count toward the checksum.
        body.checksum = 0;

        let actual_size = decompress_body(&mut body, output)?;
        let report = DecodeReport {
            outer_declared_size,
            declared_size,
            actual_size,
            stored_checksum,
            computed_checksum: body.checksum,
        };

        if !report.checksum_matches() {
            warn!(
                stored = report.stored_checksum,
                computed = report.computed_checksum,
                "sliding-window checksum mismatch"
            );
        }
        if !report.size_matches() {
            warn!(
                outer = report.outer_declared_size,
                declared = report.declared_size,
                actual = report.actual_size,
                "sliding-window decompressed size mismatch"
            );
        }
        debug!(out = actual_size, "sliding-window decoded");
        Ok(report)
    }
}

fn decompress_body(body: &mut BodySource<'_>, output: &mut dyn Write) -> Result<u64> {
    let mut dict = initial_dictionary();
    let mut window = [0u8; WINDOW_SIZE];
    let mut pending = false;
    let mut written = 0u64;

    loop {
        let Some(control) = body.next()? else {
            if pending {
                output.write_all(&window)?;
                written += WINDOW_SIZE as u64;
            }
            return Ok(written);
        };

        let Some(mask) = body.next()? else {
            // A lone final byte is the length of the short last group.
            let len = usize::from(control);
            if !pending {
                return Err("tail length without a preceding group".into());
            }
            if len > WINDOW_SIZE {
                return Err(SerializerError::Format(format!(
                    "tail length {len} exceeds window size {WINDOW_SIZE}"
                )));
            }
            output.write_all(&window[..len])?;
            return Ok(written + len as u64);
        };

        if pending {
            output.write_all(&window)?;
            written += WINDOW_SIZE as u64;
        }

        let slot = &mut dict[usize::from(control)];
        for (bit, byte) in slot.iter_mut().enumerate() {
            if mask & (1 << bit) != 0 {
                *byte = body.require()?;
            }
        }
        window = *slot;
        pending = true;
    }
}

/// Lowest-indexed slot sharing the most bytes with `chunk`.
fn best_slot(dict: &Dictionary, chunk: &[u8]) -> usize {
    let mut best = 0;
    let mut best_score = 0;
    for (i, slot) in dict.iter().enumerate() {
        let score = slot.iter().zip(chunk).filter(|(a, b)| a == b).count();
        if score > best_score {
            best = i;
            best_score = score;
            if score == chunk.len() {
                break;
            }
        }
    }
    best
}

/// Returns the compressed body and its additive checksum.
fn compress_body(data: &[u8]) -> (Vec<u8>, u8) {
    let mut dict = initial_dictionary();
    let mut out = Vec::with_capacity(data.len() + data.len() / 4 + 2);

    for chunk in data.chunks(WINDOW_SIZE) {
        let index = best_slot(&dict, chunk);
        let slot = &mut dict[index];

        let mut mask = 0u8;
        let mut literals = [0u8; WINDOW_SIZE];
        let mut n = 0;
        for (bit, (&want, &have)) in chunk.iter().zip(slot.iter()).enumerate() {
            if want != have {
                mask |= 1 << bit;
                literals[n] = want;
                n += 1;
            }
        }
        out.push(index as u8);
        out.push(mask);
        out.extend_from_slice(&literals[..n]);

        if chunk.len() == WINDOW_SIZE {
            slot.copy_from_slice(chunk);
        } else {
            out.push(chunk.len() as u8);
        }
    }

    let checksum = out.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    (out, checksum)
}

impl Codec for SlidingWindowCodec {
    fn name(&self) -> &'static str {
        "sliding-window"
    }

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        self.decode_with_report(input, output).map(|_| ())
    }

    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        let data = read_all(input)?;
        let size = u32::try_from(data.len()).map_err(|_| "input too large for a 32-bit size field")?;
        let (body, checksum) = compress_body(&data);

        // Header placeholders first, patched once the body is known.
        let mut inner = Writer::new(
            Cursor::new(Vec::with_capacity(body.len() + 5)),
            SerializerSettings::little_endian(),
        );
        inner.write_u8(0)?;
        inner.write_u32(0)?;
        inner.write_bytes(&body)?;
        inner.seek(0)?;
        inner.write_u8(checksum)?;
        inner.write_u32(size)?;
        let mut inner = inner.into_inner()?.into_inner();

        let mut mask = Obfuscation::new();
        for b in &mut inner {
            *b = mask.apply(*b);
        }

        output.write_all(&[WINDOW_SIZE as u8 ^ WINDOW_SIZE_KEY])?;
        output.write_all(&(size ^ SIZE_KEY).to_le_bytes())?;
        output.write_all(&inner)?;
        debug!(input = data.len(), out = inner.len() + 5, checksum, "sliding-window encoded");
        Ok(())
    }
}
