//! DPT 10.xxx - Time of Day (3 bytes)
//!
//! ## Format
//!
//! ```text
//! Byte 0: DDD HHHHH  (day 0..7, hour 0..23)
//! Byte 1: 00 MMMMMM  (minute 0..59)
//! Byte 2: 00 SSSSSS  (second 0..59)
//! ```
//!
//! Day 0 means "no day", 1..7 are Monday..Sunday.
//!
//! ## Common Subtypes
//!
//! - **10.001** - Time of Day

use crate::error::{KnxError, Result};
use crate::dpt::{DptDecode, DptEncode};

/// DPT 10.xxx time-of-day types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dpt10 {
    /// DPT 10.001 - Time of Day
    TimeOfDay,
}

impl Dpt10 {
    /// Get the DPT identifier string (e.g., "10.001")
    pub const fn identifier(&self) -> &'static str {
        match self {
            Dpt10::TimeOfDay => "10.001",
        }
    }
}

/// A KNX time-of-day value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnxTime {
    /// Weekday: 0 = no day, 1 = Monday .. 7 = Sunday
    pub day: u8,
    /// 0..23
    pub hour: u8,
    /// 0..59
    pub minute: u8,
    /// 0..59
    pub second: u8,
}

impl DptEncode<KnxTime> for Dpt10 {
    fn encode(&self, value: KnxTime, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < 3 {
            return Err(KnxError::buffer_too_small());
        }
        if value.day > 7 || value.hour > 23 || value.minute > 59 || value.second > 59 {
            return Err(KnxError::dpt_value_out_of_range());
        }
        buf[0] = (value.day << 5) | value.hour;
        buf[1] = value.minute;
        buf[2] = value.second;
        Ok(3)
    }
}

impl DptDecode<KnxTime> for Dpt10 {
    fn decode(&self, data: &[u8]) -> Result<KnxTime> {
        if data.len() < 3 {
            return Err(KnxError::invalid_dpt_data());
        }
        Ok(KnxTime {
            day: (data[0] >> 5) & 0x07,
            hour: data[0] & 0x1F,
            minute: data[1] & 0x3F,
            second: data[2] & 0x3F,
        })
    }
}
