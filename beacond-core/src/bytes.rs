//! Binary buffer reader/writer for the beacon wire format.
//!
//! The wire format is big-endian throughout. This is a fixed format
//! constant, not a per-call choice: the message bus consumers decode the
//! payload with a `DataInputStream`-compatible reader, so both sides must
//! agree on network byte order.
//!
//! Text fields are length-prefixed: a 4-byte length followed by that many
//! UTF-8 bytes. The reader validates every length against the remaining
//! buffer before consuming it, so a truncated message fails with
//! [`CodecError::TruncatedInput`] instead of returning partial state.

use crate::error::CodecError;

// =============================================================================
// Writer
// =============================================================================

/// Accumulates values into a growable byte sequence in a fixed order.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Write a length-prefixed UTF-8 string (i32 length + bytes).
    pub fn write_text(&mut self, s: &str) {
        self.write_i32(s.len() as i32);
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

// =============================================================================
// Reader
// =============================================================================

/// Consumes values from a byte sequence in the same order they were written.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::TruncatedInput {
                expected: n,
                actual: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        let bytes = self.take(8)?;
        Ok(i64::from_be_bytes(bytes.try_into().unwrap()))
    }

    /// Read a length-prefixed UTF-8 string.
    ///
    /// The declared length must not exceed the remaining buffer size.
    pub fn read_text(&mut self) -> Result<String, CodecError> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(CodecError::InvalidString);
        }
        let bytes = self.take(len as usize)?;
        std::str::from_utf8(bytes)
            .map(|s| s.to_string())
            .map_err(|_| CodecError::InvalidString)
    }
}

// =============================================================================
// Tests
// =============================================================================
