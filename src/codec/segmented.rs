//! Applies a different codec to each fixed-length slice of a stream.

use std::io::{Read, Write};

use tracing::{debug, trace};

use super::Codec;
use crate::error::{Result, SerializerError};

type Transform = fn(&dyn Codec, &mut dyn Read, &mut dyn Write) -> Result<()>;

/// Ordered `(codec, length)` segments. Lengths always refer to the *input*
/// side of the call, and the input must be exactly their sum.
pub struct SegmentedCodec {
    segments: Vec<(Box<dyn Codec>, u64)>,
}

impl SegmentedCodec {
    pub fn new(segments: Vec<(Box<dyn Codec>, u64)>) -> Self {
        Self { segments }
    }

    pub fn total_len(&self) -> u64 {
        self.segments.iter().map(|(_, len)| len).sum()
    }

    fn run(&self, input: &mut dyn Read, output: &mut dyn Write, transform: Transform) -> Result<()> {
        let mut consumed = 0u64;
        for (index, (codec, len)) in self.segments.iter().enumerate() {
            let mut buf = Vec::new();
            (&mut *input).take(*len).read_to_end(&mut buf)?;
            if buf.len() as u64 != *len {
                return Err(SerializerError::UnexpectedEof {
                    offset: consumed + buf.len() as u64,
                    need: (*len - buf.len() as u64) as usize,
                });
            }
            trace!(segment = index, codec = codec.name(), len, "segment");
            transform(&**codec, &mut buf.as_slice(), output)?;
            consumed += len;
        }

        let mut probe = [0u8; 1];
        if input.read(&mut probe)? != 0 {
            return Err(SerializerError::Format(format!(
                "input continues past the {consumed} bytes covered by segments"
            )));
        }
        debug!(segments = self.segments.len(), consumed, "segmented codec done");
        Ok(())
    }
}

impl Codec for SegmentedCodec {
    fn name(&self) -> &'static str {
        "segmented"
    }
    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        self.run(input, output, |c, i, o| c.decode(i, o))
    }
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        self.run(input, output, |c, i, o| c.encode(i, o))
    }
}
