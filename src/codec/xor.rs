//! Stateless XOR ciphers.

use std::io::{self, Read, Write};

use super::{Codec, read_all};
use crate::error::{Result, SerializerError};

/// `out[i] = in[i] ^ key`. Self-inverse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XorCodec {
    key: u8,
}

impl XorCodec {
    pub fn new(key: u8) -> Self {
        Self { key }
    }

    fn apply(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        let mut buf = [0u8; 8192];
        loop {
            let n = match input.read(&mut buf) {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for b in &mut buf[..n] {
                *b ^= self.key;
            }
            output.write_all(&buf[..n])?;
        }
    }
}

impl Codec for XorCodec {
    fn name(&self) -> &'static str {
        "xor"
    }
    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        self.apply(input, output)
    }
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        self.apply(input, output)
    }
}

/// `out[i] = in[i] ^ key[i % key.len()]`.
///
/// With `skip_incomplete_sequences`, the trailing `len % key.len()` bytes
/// are copied through untouched. The whole input is buffered because the
/// tail depends on the total length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiXorCodec {
    key: Vec<u8>,
    skip_incomplete_sequences: bool,
}

impl MultiXorCodec {
    pub fn new(key: impl Into<Vec<u8>>, skip_incomplete_sequences: bool) -> Self {
        Self {
            key: key.into(),
            skip_incomplete_sequences,
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    fn apply(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        if self.key.is_empty() {
            return Err(SerializerError::Unsupported("multi-byte XOR key must not be empty"));
        }
        let mut data = read_all(input)?;
        let len = data.len();
        let tail = len % self.key.len();
        for (i, b) in data.iter_mut().enumerate() {
            if self.skip_incomplete_sequences && tail + i >= len {
                continue;
            }
            *b ^= self.key[i % self.key.len()];
        }
        output.write_all(&data)?;
        Ok(())
    }
}

impl Codec for MultiXorCodec {
    fn name(&self) -> &'static str {
        "multi-xor"
    }
    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        self.apply(input, output)
    }
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        self.apply(input, output)
    }
}
