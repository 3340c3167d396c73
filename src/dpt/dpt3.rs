//! DPT 3.xxx - 3-bit controlled (dimming and blinds)
//!
//! Control datapoint types for stepwise dimming and blind positioning.
//!
//! ## Format
//!
//! 4 bits total:
//! - Bit 3 (MSB): Control bit (direction)
//! - Bits 0-2 (LSB): Stepcode (0-7)
//!
//! ```text
//! ┌─────────┬─────────────┐
//! │ Control │  Stepcode   │
//! │  (1b)   │    (3b)     │
//! └─────────┴─────────────┘
//!    Bit 3     Bits 0-2
//! ```
//!
//! ## Stepcode Values
//!
//! - **0**: Break/Stop - halts current operation
//! - **1-7**: Intervals (1, 2, 4, 8, 16, 32, 64 intervals respectively)
//!
//! ## Common Subtypes
//!
//! - **3.007** - Dimming control (decrease/increase light intensity)
//! - **3.008** - Blind control (up/down blind positioning)
//!
//! ## Example
//!
//! ```rust,no_run
//! use knx_rs::dpt::{Dpt3, StepCode, DptEncode};
//!
//! let mut buf = [0u8; 1];
//!
//! // Increase dimming by 4 intervals
//! let len = Dpt3::Dimming.encode((true, StepCode::Intervals4), &mut buf)?;
//!
//! // Stop dimming
//! let len = Dpt3::Dimming.encode((false, StepCode::Break), &mut buf)?;
//!
//! // Move blind down by 1 interval
//! let len = Dpt3::Blind.encode((true, StepCode::Intervals1), &mut buf)?;
//! ```

use crate::error::{KnxError, Result};
use crate::dpt::DptEncode;

/// DPT 3.xxx 3-bit controlled types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dpt3 {
    /// DPT 3.007 - Dimming control (decrease/increase)
    Dimming,
    /// DPT 3.008 - Blind control (up/down)
    Blind,
}

/// Stepcode values for 3-bit controlled types
///
/// Represents the number of intervals for the control operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StepCode {
    /// Break/Stop - halts the current operation
    Break = 0,
    /// 1 interval
    Intervals1 = 1,
    /// 2 intervals
    Intervals2 = 2,
    /// 4 intervals
    Intervals4 = 3,
    /// 8 intervals
    Intervals8 = 4,
    /// 16 intervals
    Intervals16 = 5,
    /// 32 intervals
    Intervals32 = 6,
    /// 64 intervals (maximum)
    Intervals64 = 7,
}

/// Control direction for DPT 3 operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlCommand {
    /// Control bit: false = decrease/up, true = increase/down
    pub control: bool,
    /// Stepcode (0-7)
    pub stepcode: StepCode,
}

impl Dpt3 {
    /// Decode a byte to a control command
    ///
    /// # Arguments
    ///
    /// * `data` - Byte slice containing the command (at least 1 byte)
    ///
    /// # Returns
    ///
    /// A `ControlCommand` with the decoded control and stepcode
    ///
    /// # Errors
    ///
    /// Returns `KnxError::InvalidDptData` if data is empty or stepcode is invalid
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use knx_rs::dpt::{Dpt3, StepCode};
    ///
    /// let cmd = Dpt3::Dimming.decode(&[0x0B])?;
    /// assert_eq!(cmd.control, true);
    /// assert_eq!(cmd.stepcode, StepCode::Intervals4);
    /// # Ok::<(), knx_rs::KnxError>(())
    /// ```
    pub fn decode(&self, data: &[u8]) -> Result<ControlCommand> {
        if data.is_empty() {
            return Err(KnxError::invalid_dpt_data());
        }

        let byte = data[0];
        let control = (byte & 0x08) != 0;
        let stepcode_value = byte & 0x07;

        let stepcode = StepCode::from_u8(stepcode_value)?;

        Ok(ControlCommand { control, stepcode })
    }

    /// Get the DPT identifier string (e.g., "3.007")
    pub const fn identifier(&self) -> &'static str {
        match self {
            Dpt3::Dimming => "3.007",
            Dpt3::Blind => "3.008",
        }
    }

    /// Get semantic labels for control directions
    ///
    /// Returns a tuple (`control_false_label`, `control_true_label`)
    pub const fn control_labels(&self) -> (&'static str, &'static str) {
        match self {
            Dpt3::Dimming => ("decrease", "increase"),
            Dpt3::Blind => ("up", "down"),
        }
    }
}

impl StepCode {
    /// Convert a u8 value to a StepCode
    ///
    /// # Errors
    ///
    /// Returns `KnxError::InvalidDptData` if value is not in range 0-7
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(StepCode::Break),
            1 => Ok(StepCode::Intervals1),
            2 => Ok(StepCode::Intervals2),
            3 => Ok(StepCode::Intervals4),
            4 => Ok(StepCode::Intervals8),
            5 => Ok(StepCode::Intervals16),
            6 => Ok(StepCode::Intervals32),
            7 => Ok(StepCode::Intervals64),
            _ => Err(KnxError::invalid_dpt_data()),
        }
    }

    /// Get the number of intervals this stepcode represents
    ///
    /// Returns 0 for Break, otherwise 1, 2, 4, 8, 16, 32, or 64
    pub const fn intervals(&self) -> u8 {
        match self {
            StepCode::Break => 0,
            StepCode::Intervals1 => 1,
            StepCode::Intervals2 => 2,
            StepCode::Intervals4 => 4,
            StepCode::Intervals8 => 8,
            StepCode::Intervals16 => 16,
            StepCode::Intervals32 => 32,
            StepCode::Intervals64 => 64,
        }
    }
}

impl DptEncode<(bool, StepCode)> for Dpt3 {
    fn encode(&self, value: (bool, StepCode), buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Err(KnxError::buffer_too_small());
        }

        let control_bit = if value.0 { 0x08 } else { 0x00 };
        let step_bits = value.1 as u8 & 0x07;
        buf[0] = control_bit | step_bits;
        Ok(1)
    }
}
