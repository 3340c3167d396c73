//! DPT 16.xxx - Character String (14 bytes)
//!
//! ## Common Subtypes
//!
//! - **16.000** - ASCII string, up to 14 characters, zero-padded on the right
//! - **16.001** - Latin-1 (ISO 8859-1) string, surfaced as UTF-8 on the Rust
//!   side, up to 14 encoded bytes

use crate::error::{KnxError, Result};
use crate::dpt::{DptDecode, DptEncode};

const DPT16_LEN: usize = 14;

/// DPT 16.xxx string types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dpt16 {
    /// DPT 16.000 - ASCII string
    Ascii,
    /// DPT 16.001 - Latin-1 string
    Latin1,
}

impl Dpt16 {
    /// Get the DPT identifier string (e.g., "16.000")
    pub const fn identifier(&self) -> &'static str {
        match self {
            Dpt16::Ascii => "16.000",
            Dpt16::Latin1 => "16.001",
        }
    }
}

impl DptEncode<&str> for Dpt16 {
    fn encode(&self, value: &str, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < DPT16_LEN {
            return Err(KnxError::buffer_too_small());
        }
        buf[..DPT16_LEN].fill(0);
        match self {
            Dpt16::Ascii => {
                if !value.is_ascii() || value.len() > DPT16_LEN {
                    return Err(KnxError::dpt_value_out_of_range());
                }
                buf[..value.len()].copy_from_slice(value.as_bytes());
            }
            Dpt16::Latin1 => {
                let mut i = 0;
                for c in value.chars() {
                    let code = c as u32;
                    if code > 0xFF || i >= DPT16_LEN {
                        return Err(KnxError::dpt_value_out_of_range());
                    }
                    buf[i] = code as u8;
                    i += 1;
                }
            }
        }
        Ok(DPT16_LEN)
    }
}

impl DptDecode<String> for Dpt16 {
    fn decode(&self, data: &[u8]) -> Result<String> {
        if data.len() < DPT16_LEN {
            return Err(KnxError::invalid_dpt_data());
        }
        let trimmed = data[..DPT16_LEN]
            .iter()
            .position(|&b| b == 0)
            .map_or(&data[..DPT16_LEN], |end| &data[..end]);

        match self {
            Dpt16::Ascii => {
                if !trimmed.is_ascii() {
                    return Err(KnxError::invalid_dpt_data());
                }
                Ok(String::from_utf8_lossy(trimmed).into_owned())
            }
            Dpt16::Latin1 => Ok(trimmed.iter().map(|&b| b as char).collect()),
        }
    }
}
