//! DPT 12.xxx - 4-byte Unsigned Value (4 bytes)
//!
//! ## Format
//!
//! - 32 bits: unsigned value (0 to 2^32-1), big-endian
//!
//! ## Common Subtypes
//!
//! - **12.001** - Counter Pulses (unsigned)

use crate::error::{KnxError, Result};
use crate::dpt::{DptDecode, DptEncode};

/// DPT 12.xxx 32-bit unsigned types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dpt12 {
    /// DPT 12.001 - Counter Pulses (unsigned)
    Counter,
}

impl Dpt12 {
    /// Get the DPT identifier string (e.g., "12.001")
    pub const fn identifier(&self) -> &'static str {
        match self {
            Dpt12::Counter => "12.001",
        }
    }
}

impl DptEncode<u32> for Dpt12 {
    fn encode(&self, value: u32, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < 4 {
            return Err(KnxError::buffer_too_small());
        }
        buf[..4].copy_from_slice(&value.to_be_bytes());
        Ok(4)
    }
}

impl DptDecode<u32> for Dpt12 {
    fn decode(&self, data: &[u8]) -> Result<u32> {
        if data.len() < 4 {
            return Err(KnxError::invalid_dpt_data());
        }
        Ok(u32::from_be_bytes([data[0], data[1], data[2], data[3]]))
    }
}
