//! Write buffer for encoding frames
//!
//! Provides methods for writing the primitive types used by bind snapshot
//! and result frames.

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::length;
use crate::error::{Error, Result};

/// A buffer for writing frame data
#[derive(Debug)]
pub struct WriteBuffer {
    /// The underlying byte buffer
    data: BytesMut,
    /// Maximum capacity (for frame size limits)
    max_capacity: Option<usize>,
}

impl WriteBuffer {
    /// Create a new WriteBuffer with default capacity
    pub fn new() -> Self {
        Self {
            data: BytesMut::with_capacity(1024),
            max_capacity: None,
        }
    }

    /// Create a new WriteBuffer with a maximum capacity limit
    pub fn with_max_capacity(capacity: usize, max_capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity.min(max_capacity)),
            max_capacity: Some(max_capacity),
        }
    }

    /// Get the current length of data in the buffer
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the buffer contents as a byte slice
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Freeze the buffer into immutable Bytes
    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }

    #[inline]
    fn ensure_capacity(&self, n: usize) -> Result<()> {
        if let Some(max) = self.max_capacity {
            if self.data.len() + n > max {
                return Err(Error::BufferOverflow {
                    needed: n,
                    available: max.saturating_sub(self.data.len()),
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Raw byte writes
    // =========================================================================

    /// Write a single byte
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.ensure_capacity(1)?;
        self.data.put_u8(value);
        Ok(())
    }

    /// Write raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_capacity(bytes.len())?;
        self.data.put_slice(bytes);
        Ok(())
    }

    /// Write a 16-bit unsigned integer in big-endian format
    pub fn write_u16_be(&mut self, value: u16) -> Result<()> {
        self.ensure_capacity(2)?;
        self.data.put_u16(value);
        Ok(())
    }

    /// Write a 32-bit unsigned integer in big-endian format
    pub fn write_u32_be(&mut self, value: u32) -> Result<()> {
        self.ensure_capacity(4)?;
        self.data.put_u32(value);
        Ok(())
    }

    // =========================================================================
    // Variable-length integer writes
    // =========================================================================

    /// Write a UB2 (unsigned 2-byte, variable length encoded)
    ///
    /// - 0: write 0x00
    /// - 1-255: write 0x01 + 1 byte
    /// - 256-65535: write 0x02 + 2 bytes (big-endian)
    pub fn write_ub2(&mut self, value: u16) -> Result<()> {
        match value {
            0 => self.write_u8(0),
            1..=255 => {
                self.write_u8(1)?;
                self.write_u8(value as u8)
            }
            _ => {
                self.write_u8(2)?;
                self.write_u16_be(value)
            }
        }
    }

    /// Write a UB4 (unsigned 4-byte, variable length encoded)
    ///
    /// - 0: write 0x00
    /// - 1-255: write 0x01 + 1 byte
    /// - 256-65535: write 0x02 + 2 bytes (big-endian)
    /// - > 65535: write 0x04 + 4 bytes (big-endian)
    pub fn write_ub4(&mut self, value: u32) -> Result<()> {
        match value {
            0 => self.write_u8(0),
            1..=255 => {
                self.write_u8(1)?;
                self.write_u8(value as u8)
            }
            256..=65535 => {
                self.write_u8(2)?;
                self.write_u16_be(value as u16)
            }
            _ => {
                self.write_u8(4)?;
                self.write_u32_be(value)
            }
        }
    }

    // =========================================================================
    // Length-prefixed payloads
    // =========================================================================

    /// Write a length-prefixed byte sequence
    ///
    /// If bytes is None, writes NULL_INDICATOR (255).
    /// Data longer than 252 bytes uses chunked encoding:
    /// - Write LONG_INDICATOR (254)
    /// - For each chunk up to 32767 bytes: write ub4(chunk_len) + raw bytes
    /// - Write ub4(0) to terminate
    pub fn write_bytes_with_length(&mut self, bytes: Option<&[u8]>) -> Result<()> {
        match bytes {
            None => self.write_u8(length::NULL_INDICATOR),
            Some(data) => {
                let len = data.len();
                if len <= length::MAX_SHORT as usize {
                    self.write_u8(len as u8)?;
                    self.write_bytes(data)
                } else {
                    self.write_u8(length::LONG_INDICATOR)?;
                    for chunk in data.chunks(length::CHUNK_SIZE) {
                        self.write_ub4(chunk.len() as u32)?;
                        self.write_bytes(chunk)?;
                    }
                    self.write_ub4(0)
                }
            }
        }
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new()
    }
}
