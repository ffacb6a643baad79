//! Wire values and cell frames
//!
//! A [`WireValue`] is an encoded payload tagged with the remote type it was
//! encoded for. NULL keeps the tag and has no payload.
//!
//! Cell frame layout:
//!
//! ```text
//! +-----+-----------+-------+---------------------------+
//! | tag | precision | scale | length-prefixed payload   |
//! | u8  | u8        | u8    | 255 = NULL, 254 = chunked |
//! +-----+-----------+-------+---------------------------+
//! ```

use bytes::Bytes;

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::constants::RemoteType;
use crate::error::Result;

/// An encoded value tagged with its remote type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireValue {
    remote_type: RemoteType,
    payload: Option<Bytes>,
}

impl WireValue {
    /// Create a non-NULL wire value
    pub fn new(remote_type: RemoteType, payload: impl Into<Bytes>) -> Self {
        Self {
            remote_type,
            payload: Some(payload.into()),
        }
    }

    /// Create a typed NULL marker
    pub fn null(remote_type: RemoteType) -> Self {
        Self {
            remote_type,
            payload: None,
        }
    }

    /// Check if this is a NULL marker
    pub fn is_null(&self) -> bool {
        self.payload.is_none()
    }

    /// Remote type this value was encoded for
    pub fn remote_type(&self) -> RemoteType {
        self.remote_type
    }

    /// Encoded bytes, `None` for NULL
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Write this value as a cell frame
    pub fn write_to(&self, buf: &mut WriteBuffer) -> Result<()> {
        buf.write_u8(self.remote_type.tag())?;
        buf.write_u8(self.remote_type.precision())?;
        buf.write_u8(self.remote_type.scale())?;
        buf.write_bytes_with_length(self.payload())
    }

    /// Read one cell frame
    pub fn read_from(buf: &mut ReadBuffer) -> Result<Self> {
        let tag = buf.read_u8()?;
        let precision = buf.read_u8()?;
        let scale = buf.read_u8()?;
        let remote_type = RemoteType::from_tag(tag, precision, scale)?;
        let payload = buf.read_bytes_with_length()?;
        Ok(Self {
            remote_type,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{length, type_tag};
    use crate::error::Error;

    #[test]
    fn test_null_keeps_type() {
        let v = WireValue::null(RemoteType::TIME);
        assert!(v.is_null());
        assert_eq!(v.remote_type(), RemoteType::TIME);
        assert!(v.payload().is_none());
    }

    #[test]
    fn test_cell_frame_layout() {
        let v = WireValue::new(RemoteType::Fixed { precision: 10, scale: 2 }, vec![0xC1, 0x02]);
        let mut buf = WriteBuffer::new();
        v.write_to(&mut buf).unwrap();
        assert_eq!(buf.as_slice(), &[type_tag::FIXED, 10, 2, 2, 0xC1, 0x02]);
    }

    #[test]
    fn test_null_cell_frame() {
        let mut buf = WriteBuffer::new();
        WireValue::null(RemoteType::NUMBER).write_to(&mut buf).unwrap();
        assert_eq!(buf.as_slice(), &[type_tag::FIXED, 38, 0, length::NULL_INDICATOR]);

        let mut read = ReadBuffer::new(buf.freeze());
        let back = WireValue::read_from(&mut read).unwrap();
        assert_eq!(back, WireValue::null(RemoteType::NUMBER));
    }

    #[test]
    fn test_read_rejects_unknown_tag() {
        let mut read = ReadBuffer::from_slice(&[0x33, 0, 0, 0]);
        assert!(matches!(
            WireValue::read_from(&mut read),
            Err(Error::InvalidTypeTag(0x33))
        ));
    }
}
