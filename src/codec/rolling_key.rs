//! Rotating-key XOR cipher with zero-run / reversed-literal framing, used by
//! another family of PC save files.
//!
//! The first four bytes are a little-endian seed; the key is
//! `seed ^ 0xA55AA55A`. Every byte after that is XORed with the low byte of
//! the key, which is rotated right by 3 bits before each use. Decrypted
//! control bytes with the high bit clear emit `n` zeros; with the high bit
//! set they are followed by `n` bytes stored in reverse order.
//!
//! Encoding writes the seed `0xA55AA55A`, which makes the key zero so the
//! XOR is a no-op. Re-encoded files therefore round-trip through this codec
//! but are not byte-identical to originally encrypted ones.

use std::io::{Read, Write};

use tracing::debug;

use super::{Codec, read_all};
use crate::error::{Result, SerializerError};
use crate::io::byte_source::ByteSource;

const SEED_KEY: u32 = 0xA55A_A55A;
const LITERAL_FLAG: u8 = 0x80;
const COUNT_MASK: u8 = 0x7F;
const MAX_BLOCK: usize = COUNT_MASK as usize;

struct Decryptor<'a> {
    src: ByteSource<'a>,
    key: u32,
}

impl Decryptor<'_> {
    #[inline]
    fn decrypt_byte(&mut self) -> Result<u8> {
        self.key = self.key.rotate_right(3);
        Ok(self.src.require_byte()? ^ self.key as u8)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RollingKeyCodec;

impl RollingKeyCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for RollingKeyCodec {
    fn name(&self) -> &'static str {
        "rolling-key"
    }

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        let mut src = ByteSource::new(input);
        let mut seed = [0u8; 4];
        src.require_exact(&mut seed)?;
        let mut dec = Decryptor {
            src,
            key: u32::from_le_bytes(seed) ^ SEED_KEY,
        };

        let mut block = Vec::with_capacity(MAX_BLOCK);
        let mut written = 0u64;
        while !dec.src.is_at_end()? {
            let control = dec.decrypt_byte()?;
            let count = usize::from(control & COUNT_MASK);
            block.clear();
            if control & LITERAL_FLAG == 0 {
                block.resize(count, 0);
            } else {
                let offset = dec.src.consumed();
                for _ in 0..count {
                    let b = dec.decrypt_byte().map_err(|e| match e {
                        SerializerError::UnexpectedEof { .. } => SerializerError::UnexpectedEof {
                            offset,
                            need: count,
                        },
                        other => other,
                    })?;
                    block.push(b);
                }
                block.reverse();
            }
            output.write_all(&block)?;
            written += block.len() as u64;
        }
        debug!(out = written, "rolling-key decoded");
        Ok(())
    }

    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        let data = read_all(input)?;
        output.write_all(&SEED_KEY.to_le_bytes())?;
        let mut block = [0u8; MAX_BLOCK];
        for chunk in data.chunks(MAX_BLOCK) {
            let block = &mut block[..chunk.len()];
            block.copy_from_slice(chunk);
            block.reverse();
            output.write_all(&[chunk.len() as u8 | LITERAL_FLAG])?;
            output.write_all(block)?;
        }
        debug!(input = data.len(), "rolling-key encoded");
        Ok(())
    }
}
