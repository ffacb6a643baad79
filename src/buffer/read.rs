//! Read buffer for decoding frames
//!
//! Provides methods for reading the primitive types used by bind snapshot
//! and result frames.

use bytes::Bytes;

use crate::constants::length;
use crate::error::{Error, Result};

/// A buffer for reading frame data
#[derive(Debug)]
pub struct ReadBuffer {
    /// The underlying byte data
    data: Bytes,
    /// Current read position
    pos: usize,
}

impl ReadBuffer {
    /// Create a new ReadBuffer from bytes
    pub fn new(data: Bytes) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a new ReadBuffer from a byte slice
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            data: Bytes::copy_from_slice(data),
            pos: 0,
        }
    }

    /// Get the current position in the buffer
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get the number of bytes remaining to be read
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Check if all data has been consumed
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    fn ensure_remaining(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            Err(Error::BufferUnderflow {
                needed: n,
                available: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    // =========================================================================
    // Raw byte reads
    // =========================================================================

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure_remaining(1)?;
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    /// Read raw bytes and return as a new Bytes (zero-copy)
    pub fn read_bytes_owned(&mut self, n: usize) -> Result<Bytes> {
        self.ensure_remaining(n)?;
        let bytes = self.data.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(bytes)
    }

    /// Read a 16-bit unsigned integer in big-endian format
    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.ensure_remaining(2)?;
        let value = u16::from_be_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(value)
    }

    /// Read a 32-bit unsigned integer in big-endian format
    pub fn read_u32_be(&mut self) -> Result<u32> {
        self.ensure_remaining(4)?;
        let value = u32::from_be_bytes([
            self.data[self.pos],
            self.data[self.pos + 1],
            self.data[self.pos + 2],
            self.data[self.pos + 3],
        ]);
        self.pos += 4;
        Ok(value)
    }

    // =========================================================================
    // Variable-length integer reads
    // =========================================================================

    /// Read a UB2 (unsigned 2-byte, variable length encoded)
    ///
    /// - First byte is the length (0, 1, or 2)
    /// - If length is 0: value is 0
    /// - Otherwise read that many bytes big-endian
    pub fn read_ub2(&mut self) -> Result<u16> {
        let len = self.read_u8()?;
        match len {
            0 => Ok(0),
            1 => Ok(self.read_u8()? as u16),
            2 => self.read_u16_be(),
            _ => Err(Error::InvalidLengthIndicator(len)),
        }
    }

    /// Read a UB4 (unsigned 4-byte, variable length encoded)
    ///
    /// - First byte is the length (0, 1, 2, or 4)
    /// - If length is 0: value is 0
    /// - Otherwise read that many bytes big-endian
    pub fn read_ub4(&mut self) -> Result<u32> {
        let len = self.read_u8()?;
        match len {
            0 => Ok(0),
            1 => Ok(self.read_u8()? as u32),
            2 => Ok(self.read_u16_be()? as u32),
            4 => self.read_u32_be(),
            _ => Err(Error::InvalidLengthIndicator(len)),
        }
    }

    // =========================================================================
    // Length-prefixed payloads
    // =========================================================================

    /// Read a length-prefixed byte sequence
    ///
    /// Returns None if the length indicator is NULL_INDICATOR (255).
    /// LONG_INDICATOR (254) introduces UB4-length chunks ended by a zero chunk.
    pub fn read_bytes_with_length(&mut self) -> Result<Option<Bytes>> {
        let len = self.read_u8()?;

        if len == length::NULL_INDICATOR {
            return Ok(None);
        }

        if len == length::LONG_INDICATOR {
            let mut result = Vec::new();
            loop {
                let chunk_len = self.read_ub4()? as usize;
                if chunk_len == 0 {
                    break;
                }
                let chunk = self.read_bytes_owned(chunk_len)?;
                result.extend_from_slice(&chunk);
            }
            return Ok(Some(Bytes::from(result)));
        }

        if len > length::MAX_SHORT {
            return Err(Error::InvalidLengthIndicator(len));
        }

        self.read_bytes_owned(len as usize).map(Some)
    }
}
