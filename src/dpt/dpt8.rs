//! DPT 8.xxx - 2-byte Signed Value (2 bytes)
//!
//! ## Format
//!
//! - 16 bits: signed value (-32768 to 32767), big-endian two's complement
//!
//! ## Common Subtypes
//!
//! - **8.001** - Counter Pulses (signed)
//! - **8.010** - Percent (signed, 0.01%)
//! - **8.011** - Angle (signed degrees)

use crate::error::{KnxError, Result};
use crate::dpt::{DptDecode, DptEncode};

/// DPT 8.xxx 16-bit signed types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dpt8 {
    /// DPT 8.001 - Counter Pulses (signed)
    Counter,
    /// DPT 8.010 - Percent (signed)
    Percent,
    /// DPT 8.011 - Angle (signed degrees)
    Angle,
}

impl Dpt8 {
    /// Get the DPT identifier string (e.g., "8.001")
    pub const fn identifier(&self) -> &'static str {
        match self {
            Dpt8::Counter => "8.001",
            Dpt8::Percent => "8.010",
            Dpt8::Angle => "8.011",
        }
    }
}

impl DptEncode<i16> for Dpt8 {
    fn encode(&self, value: i16, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < 2 {
            return Err(KnxError::buffer_too_small());
        }
        buf[..2].copy_from_slice(&value.to_be_bytes());
        Ok(2)
    }
}

impl DptDecode<i16> for Dpt8 {
    fn decode(&self, data: &[u8]) -> Result<i16> {
        if data.len() < 2 {
            return Err(KnxError::invalid_dpt_data());
        }
        Ok(i16::from_be_bytes([data[0], data[1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut buf = [0u8; 2];
        for value in [i16::MIN, -1000, -1, 0, 1, 1000, i16::MAX] {
            let len = Dpt8::Counter.encode(value, &mut buf).unwrap();
            assert_eq!(len, 2);
            assert_eq!(Dpt8::Counter.decode(&buf[..len]).unwrap(), value);
        }
    }

    #[test]
    fn test_big_endian() {
        let mut buf = [0u8; 2];
        Dpt8::Angle.encode(0x1234, &mut buf).unwrap();
        assert_eq!(buf, [0x12, 0x34]);
    }

    #[test]
    fn test_decode_too_short() {
        assert!(matches!(Dpt8::Percent.decode(&[0x00]).unwrap_err(), KnxError::Dpt(_)));
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut buf = [0u8; 1];
        assert!(Dpt8::Percent.encode(1, &mut buf).is_err());
    }

    #[test]
    fn test_identifier() {
        assert_eq!(Dpt8::Counter.identifier(), "8.001");
        assert_eq!(Dpt8::Angle.identifier(), "8.011");
    }
}
