//! DPT 6.xxx - 8-bit Signed Value (1 byte)
//!
//! ## Format
//!
//! - 8 bits: signed value (-128 to 127), two's complement
//!
//! DPT 6.020 is a structured exception: five status bits plus a 3-bit mode
//! field (`a,b,c,d,e,f`) rather than a plain signed number, so it gets its
//! own type ([`Dpt6_020`]) instead of a `Dpt6` variant.
//!
//! ## Common Subtypes
//!
//! - **6.001** - Percent (-128..127 %)
//! - **6.010** - Counter Pulses (signed)

use crate::error::{KnxError, Result};
use crate::dpt::{DptDecode, DptEncode};

/// DPT 6.xxx 8-bit signed types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dpt6 {
    /// DPT 6.001 - Percent (-128..127 %)
    Percent,
    /// DPT 6.010 - Counter Pulses (signed)
    Counter,
}

impl Dpt6 {
    /// Get the DPT identifier string (e.g., "6.001")
    pub const fn identifier(&self) -> &'static str {
        match self {
            Dpt6::Percent => "6.001",
            Dpt6::Counter => "6.010",
        }
    }
}

impl DptEncode<i8> for Dpt6 {
    fn encode(&self, value: i8, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Err(KnxError::buffer_too_small());
        }
        buf[0] = value as u8;
        Ok(1)
    }
}

impl DptDecode<i8> for Dpt6 {
    fn decode(&self, data: &[u8]) -> Result<i8> {
        if data.is_empty() {
            return Err(KnxError::invalid_dpt_data());
        }
        Ok(data[0] as i8)
    }
}

/// DPT 6.020 - status and mode byte.
///
/// Bits 7..3 are independent status flags; bits 2..0 are a one-hot mode
/// selector where only one of `f` in `{0, 2, 4}` is valid at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dpt6020 {
    /// Bit 7
    pub a: bool,
    /// Bit 6
    pub b: bool,
    /// Bit 5
    pub c: bool,
    /// Bit 4
    pub d: bool,
    /// Bit 3
    pub e: bool,
    /// Mode, one of 0, 2, 4 (bits 2..0)
    pub f: u8,
}

impl Dpt6020 {
    /// Encode to a single status/mode byte.
    pub fn encode_to_byte(&self) -> Result<u8> {
        if ![0u8, 2, 4].contains(&self.f) {
            return Err(KnxError::dpt_value_out_of_range());
        }
        Ok((u8::from(self.a) << 7)
            | (u8::from(self.b) << 6)
            | (u8::from(self.c) << 5)
            | (u8::from(self.d) << 4)
            | (u8::from(self.e) << 3)
            | self.f)
    }

    /// Decode a single status/mode byte.
    pub fn decode_from_byte(byte: u8) -> Self {
        Self {
            a: byte & 0x80 != 0,
            b: byte & 0x40 != 0,
            c: byte & 0x20 != 0,
            d: byte & 0x10 != 0,
            e: byte & 0x08 != 0,
            f: byte & 0x07,
        }
    }
}

impl DptEncode<Dpt6020> for Dpt6 {
    fn encode(&self, value: Dpt6020, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Err(KnxError::buffer_too_small());
        }
        buf[0] = value.encode_to_byte()?;
        Ok(1)
    }
}

impl DptDecode<Dpt6020> for Dpt6 {
    fn decode(&self, data: &[u8]) -> Result<Dpt6020> {
        if data.is_empty() {
            return Err(KnxError::invalid_dpt_data());
        }
        Ok(Dpt6020::decode_from_byte(data[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_round_trip() {
        let mut buf = [0u8; 1];
        for value in [-128i8, -1, 0, 1, 127] {
            let len = Dpt6::Percent.encode(value, &mut buf).unwrap();
            assert_eq!(Dpt6::Percent.decode(&buf[..len]).unwrap(), value);
        }
    }

    #[test]
    fn test_twos_complement_bytes() {
        let mut buf = [0u8; 1];
        Dpt6::Counter.encode(-1, &mut buf).unwrap();
        assert_eq!(buf, [0xFF]);
        Dpt6::Counter.encode(-128, &mut buf).unwrap();
        assert_eq!(buf, [0x80]);
    }

    #[test]
    fn test_decode_empty_data() {
        assert!(matches!(Dpt6::Percent.decode(&[]).unwrap_err(), KnxError::Dpt(_)));
    }

    #[test]
    fn test_6020_round_trip() {
        let status = Dpt6020 { a: true, b: false, c: true, d: false, e: true, f: 2 };
        let byte = status.encode_to_byte().unwrap();
        assert_eq!(Dpt6020::decode_from_byte(byte), status);
    }

    #[test]
    fn test_6020_rejects_invalid_mode() {
        let status = Dpt6020 { a: false, b: false, c: false, d: false, e: false, f: 3 };
        assert!(status.encode_to_byte().is_err());
    }

    #[test]
    fn test_6020_via_trait() {
        let mut buf = [0u8; 1];
        let status = Dpt6020 { a: true, b: true, c: false, d: false, e: false, f: 4 };
        let len = Dpt6::Percent.encode(status, &mut buf).unwrap();
        assert_eq!(Dpt6::Percent.decode(&buf[..len]).unwrap(), status);
    }

    #[test]
    fn test_identifier() {
        assert_eq!(Dpt6::Percent.identifier(), "6.001");
        assert_eq!(Dpt6::Counter.identifier(), "6.010");
    }
}
