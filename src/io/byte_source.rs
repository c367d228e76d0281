use std::io::{self, Read};

use crate::error::{Result, SerializerError};

/// Pulls single bytes from a reader through a fixed buffer, so codecs can
/// ask "is there more input?" without materializing the whole stream.
pub(crate) struct ByteSource<'a> {
    inner: &'a mut dyn Read,
    buf: Box<[u8]>,
    pos: usize,
    filled: usize,
    consumed: u64,
}

impl<'a> ByteSource<'a> {
    pub(crate) fn new(inner: &'a mut dyn Read) -> Self {
        Self::with_capacity(8192, inner)
    }

    pub(crate) fn with_capacity(capacity: usize, inner: &'a mut dyn Read) -> Self {
        Self {
            inner,
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            pos: 0,
            filled: 0,
            consumed: 0,
        }
    }

    /// Bytes handed out so far.
    pub(crate) fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Next byte, or `None` at end of input.
    pub(crate) fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if !self.refill()? {
            return Ok(None);
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        self.consumed += 1;
        Ok(Some(b))
    }

    /// Next byte; end of input is a format error.
    pub(crate) fn require_byte(&mut self) -> Result<u8> {
        let offset = self.consumed;
        self.next_byte()?
            .ok_or(SerializerError::UnexpectedEof { offset, need: 1 })
    }

    pub(crate) fn require_exact(&mut self, out: &mut [u8]) -> Result<()> {
        let offset = self.consumed;
        let need = out.len();
        for slot in out.iter_mut() {
            *slot = self
                .next_byte()?
                .ok_or(SerializerError::UnexpectedEof { offset, need })?;
        }
        Ok(())
    }

    pub(crate) fn is_at_end(&mut self) -> io::Result<bool> {
        Ok(!self.refill()?)
    }

    #[inline]
    fn refill(&mut self) -> io::Result<bool> {
        if self.pos < self.filled {
            return Ok(true);
        }
        loop {
            match self.inner.read(&mut self.buf) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.pos = 0;
                    self.filled = n;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
