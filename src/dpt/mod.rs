//! KNX Datapoint Types (DPT)
//!
//! This module provides encoding and decoding for KNX Datapoint Types.
//! DPTs define how to interpret the data payload in KNX telegrams.
//!
//! ## Supported DPT Families
//!
//! - **DPT 1.xxx** - Boolean (1 bit): switches, buttons, binary sensors
//! - **DPT 2.xxx** - Controlled 1-bit: control + value pair
//! - **DPT 3.xxx** - 3-bit controlled: dimming, blind control
//! - **DPT 4.xxx** - Character: ASCII or Latin-1
//! - **DPT 5.xxx** - 8-bit unsigned: percentages, angles, counters
//! - **DPT 6.xxx** - 8-bit signed, including the 6.020 status/mode byte
//! - **DPT 7.xxx** - 16-bit unsigned: pulses, brightness, color temperature
//! - **DPT 8.xxx** - 16-bit signed: counters, signed percent, angle
//! - **DPT 9.xxx** - 2-byte float: temperature, illuminance, pressure
//! - **DPT 10.xxx** - Time of day
//! - **DPT 11.xxx** - Date
//! - **DPT 12.xxx** - 32-bit unsigned counters
//! - **DPT 13.xxx** - 32-bit signed: energy, flow rate, long counters
//! - **DPT 14.xxx** - IEEE 754 32-bit float
//! - **DPT 15.xxx** - Access data
//! - **DPT 16.xxx** - Character string (ASCII or Latin-1, ≤14 bytes)
//! - **DPT 18.xxx** - Scene control
//! - **DPT 20.xxx** - 8-bit enumeration
//!
//! ## Usage
//!
//! ```rust,no_run
//! use knx_rs::dpt::{Dpt1, Dpt3, Dpt5, Dpt7, Dpt9, Dpt13, StepCode, DptEncode, DptDecode};
//!
//! // All DPT types now use the same pattern: encode to buffer, decode from slice
//! let mut buf = [0u8; 4];
//!
//! // Boolean value (1 byte)
//! let len = Dpt1::Switch.encode(true, &mut buf)?;
//! let value = Dpt1::Switch.decode(&buf[..len])?;
//!
//! // 3-bit controlled dimming/blind (1 byte)
//! let len = Dpt3::Dimming.encode((true, StepCode::Intervals4), &mut buf)?;
//! let cmd = Dpt3::Dimming.decode(&buf[..len])?;
//!
//! // Percentage 0-100% (1 byte)
//! let len = Dpt5::Percentage.encode(75, &mut buf)?;
//! let value = Dpt5::Percentage.decode(&buf[..len])?;
//!
//! // Brightness in lux (2 bytes)
//! let len = Dpt7::Brightness.encode(5000, &mut buf)?;
//! let lux = Dpt7::Brightness.decode(&buf[..len])?;
//!
//! // Temperature in Â°C (2 bytes)
//! let len = Dpt9::Temperature.encode(21.5, &mut buf)?;
//! let temp = Dpt9::Temperature.decode(&buf[..len])?;
//!
//! // Active energy in Wh (4 bytes)
//! let len = Dpt13::ActiveEnergy.encode(500000, &mut buf)?;
//! let wh = Dpt13::ActiveEnergy.decode(&buf[..len])?;
//! ```
//!
//! ## Design Note
//!
//! The `DptEncode` trait accepts an output buffer and returns the number of bytes written.
//! This design allows all DPT types to implement the trait consistently without requiring
//! static allocations for every possible value, solving the Liskov Substitution Principle
//! violation that existed in the previous `&'static [u8]` design.

use crate::error::{KnxError, Result};

pub mod dpt1;
pub mod dpt2;
pub mod dpt3;
pub mod dpt4;
pub mod dpt5;
pub mod dpt6;
pub mod dpt7;
pub mod dpt8;
pub mod dpt9;
pub mod dpt10;
pub mod dpt11;
pub mod dpt12;
pub mod dpt13;
pub mod dpt14;
pub mod dpt15;
pub mod dpt16;
pub mod dpt18;
pub mod dpt20;

// Re-export common types
#[doc(inline)]
pub use dpt1::Dpt1;
#[doc(inline)]
pub use dpt2::{Dpt2, ControlledBit};
#[doc(inline)]
pub use dpt3::{Dpt3, StepCode, ControlCommand};
#[doc(inline)]
pub use dpt4::Dpt4;
#[doc(inline)]
pub use dpt5::Dpt5;
#[doc(inline)]
pub use dpt6::{Dpt6, Dpt6020};
#[doc(inline)]
pub use dpt7::Dpt7;
#[doc(inline)]
pub use dpt8::Dpt8;
#[doc(inline)]
pub use dpt9::Dpt9;
#[doc(inline)]
pub use dpt10::{Dpt10, KnxTime};
#[doc(inline)]
pub use dpt11::{Dpt11, KnxDate};
#[doc(inline)]
pub use dpt12::Dpt12;
#[doc(inline)]
pub use dpt13::Dpt13;
#[doc(inline)]
pub use dpt14::Dpt14;
#[doc(inline)]
pub use dpt15::{Dpt15, AccessData};
#[doc(inline)]
pub use dpt16::Dpt16;
#[doc(inline)]
pub use dpt18::{Dpt18, SceneCommand};
#[doc(inline)]
pub use dpt20::Dpt20;

/// Trait for encoding values to KNX data format
///
/// This trait accepts an output buffer and returns the number of bytes written.
/// This design allows all DPT types to implement the trait consistently without
/// requiring static allocations for all possible values.
pub trait DptEncode<T> {
    /// Encode a value to KNX byte representation
    ///
    /// # Arguments
    /// * `value` - The value to encode
    /// * `buf` - Output buffer to write the encoded bytes
    ///
    /// # Returns
    /// The number of bytes written to the buffer
    ///
    /// # Errors
    /// Returns `BufferTooSmall` if the buffer is not large enough for the encoded data
    /// Returns `DptValueOutOfRange` if the value is outside the valid range
    fn encode(&self, value: T, buf: &mut [u8]) -> Result<usize>;
}

/// Trait for decoding KNX data to values
pub trait DptDecode<T> {
    /// Decode KNX byte representation to a value
    ///
    /// # Arguments
    /// * `data` - The byte slice to decode
    ///
    /// # Returns
    /// The decoded value
    fn decode(&self, data: &[u8]) -> Result<T>;
}

/// A decoded datapoint value of any supported main group.
///
/// Every per-group module keeps its own natural Rust type
/// (`bool`, `f32`, `KnxTime`, ...); `DptValue` wraps whichever one matches
/// the descriptor passed to [`encode`]/[`decode`] so callers that only know
/// the descriptor string at runtime have a single type to hold.
#[derive(Debug, Clone, PartialEq)]
pub enum DptValue {
    /// Main group 1 - boolean
    Bool(bool),
    /// Main group 2 - (control, value) bit pair
    Controlled(bool, bool),
    /// Main group 3 - (control, stepcode)
    Control(bool, StepCode),
    /// Main group 4 - character
    Char(char),
    /// Main group 5 - unsigned byte, scaled per subtype (e.g. 0..100 for
    /// percentage, 0..360 for angle)
    Scaled(u16),
    /// Main group 20 - unsigned enumeration byte
    U8(u8),
    /// Main group 6 - signed byte
    I8(i8),
    /// Main group 6.020 - status/mode byte
    Status6020(Dpt6020),
    /// Main group 7 - unsigned 16-bit
    U16(u16),
    /// Main group 8 - signed 16-bit
    I16(i16),
    /// Main group 9 or 14 - float
    Float(f32),
    /// Main group 10 - time of day
    Time(KnxTime),
    /// Main group 11 - date
    Date(KnxDate),
    /// Main group 12 - unsigned 32-bit
    U32(u32),
    /// Main group 13 - signed 32-bit
    I32(i32),
    /// Main group 15 - access data
    AccessData(AccessData),
    /// Main group 16 - character string
    Text(String),
    /// Main group 18 - scene command
    Scene(bool, u8),
}

/// Parsed `"<main>[.<sub>]"` datapoint descriptor.
struct Descriptor<'a> {
    main: u16,
    sub: &'a str,
}

fn parse_descriptor(descriptor: &str) -> Result<Descriptor<'_>> {
    let mut parts = descriptor.splitn(2, '.');
    let main = parts
        .next()
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(KnxError::unsupported_dpt)?;
    let sub = parts.next().unwrap_or("*");
    Ok(Descriptor { main, sub })
}

fn dpt5_variant(sub: &str) -> Dpt5 {
    match sub {
        "001" => Dpt5::Percentage,
        "003" => Dpt5::Angle,
        "005" => Dpt5::Ratio,
        "006" => Dpt5::Tariff,
        "010" => Dpt5::Counter,
        _ => Dpt5::PercentU8,
    }
}

fn dpt6_variant(sub: &str) -> Dpt6 {
    match sub {
        "010" => Dpt6::Counter,
        _ => Dpt6::Percent,
    }
}

fn dpt7_variant(sub: &str) -> Dpt7 {
    match sub {
        "002" => Dpt7::TimePeriodMs,
        "003" => Dpt7::TimePeriod10Ms,
        "004" => Dpt7::TimePeriod100Ms,
        "005" => Dpt7::TimePeriodSec,
        "006" => Dpt7::TimePeriodMin,
        "007" => Dpt7::TimePeriodHr,
        "010" => Dpt7::PropDataType,
        "011" => Dpt7::LengthMm,
        "012" => Dpt7::CurrentMa,
        "013" => Dpt7::Brightness,
        "600" => Dpt7::ColorTemperature,
        _ => Dpt7::Pulses,
    }
}

fn dpt8_variant(sub: &str) -> Dpt8 {
    match sub {
        "010" => Dpt8::Percent,
        "011" => Dpt8::Angle,
        _ => Dpt8::Counter,
    }
}

fn dpt9_variant(sub: &str) -> Dpt9 {
    match sub {
        "002" => Dpt9::TemperatureDifference,
        "003" => Dpt9::KelvinPerHour,
        "004" => Dpt9::Illuminance,
        "005" => Dpt9::WindSpeed,
        "006" => Dpt9::Pressure,
        "007" => Dpt9::Humidity,
        "008" => Dpt9::AirQuality,
        "010" => Dpt9::TimeDifference,
        "011" => Dpt9::TimeDifferenceMs,
        "020" => Dpt9::Voltage,
        "021" => Dpt9::Current,
        "022" => Dpt9::PowerDensity,
        "023" => Dpt9::KelvinPerPercent,
        "024" => Dpt9::Power,
        _ => Dpt9::Temperature,
    }
}

fn dpt13_variant(sub: &str) -> Dpt13 {
    match sub {
        "002" => Dpt13::FlowRate,
        "011" => Dpt13::ApparentEnergy,
        "012" => Dpt13::ReactiveEnergy,
        "013" => Dpt13::ActiveEnergyKwh,
        "014" => Dpt13::ApparentEnergyKvah,
        "015" => Dpt13::ReactiveEnergyKvarh,
        "100" => Dpt13::LongDeltaTimeSec,
        "010" => Dpt13::ActiveEnergy,
        _ => Dpt13::Counter,
    }
}

fn dpt14_variant(sub: &str) -> Dpt14 {
    match sub {
        "019" => Dpt14::Current,
        "068" => Dpt14::Temperature,
        _ => Dpt14::Power,
    }
}

fn dpt20_variant(sub: &str) -> Dpt20 {
    match sub {
        "105" => Dpt20::HvacControlMode,
        _ => Dpt20::HvacMode,
    }
}

/// Encode a [`DptValue`] to its wire bytes for the given `"<main>[.<sub>]"`
/// descriptor.
///
/// # Errors
/// Returns an unsupported-dpt error if `descriptor` names a main group this
/// crate does not implement, or a dpt error if `value`'s variant does not
/// match the main group's expected shape.
pub fn encode(value: &DptValue, descriptor: &str) -> Result<Vec<u8>> {
    let Descriptor { main, sub } = parse_descriptor(descriptor)?;

    macro_rules! encode_with {
        ($dpt:expr, $val:expr, $len:expr) => {{
            let mut buf = [0u8; $len];
            let n = DptEncode::encode(&$dpt, $val, &mut buf)?;
            Ok(buf[..n].to_vec())
        }};
    }

    match (main, value) {
        (1, DptValue::Bool(v)) => encode_with!(Dpt1::Switch, *v, 1),
        (2, DptValue::Controlled(c, v)) => encode_with!(Dpt2::SwitchControl, (*c, *v), 1),
        (3, DptValue::Control(c, s)) => encode_with!(Dpt3::Dimming, (*c, *s), 1),
        (4, DptValue::Char(c)) => {
            let dpt = if sub == "002" { Dpt4::Latin1 } else { Dpt4::Ascii };
            encode_with!(dpt, *c, 1)
        }
        (5, DptValue::Scaled(v)) => encode_with!(dpt5_variant(sub), *v, 1),
        (6, DptValue::I8(v)) => encode_with!(dpt6_variant(sub), *v, 1),
        (6, DptValue::Status6020(s)) => encode_with!(Dpt6::Percent, *s, 1),
        (7, DptValue::U16(v)) => encode_with!(dpt7_variant(sub), *v, 2),
        (8, DptValue::I16(v)) => encode_with!(dpt8_variant(sub), *v, 2),
        (9, DptValue::Float(v)) => encode_with!(dpt9_variant(sub), *v, 2),
        (10, DptValue::Time(t)) => encode_with!(Dpt10::TimeOfDay, *t, 3),
        (11, DptValue::Date(d)) => encode_with!(Dpt11::Date, *d, 3),
        (12, DptValue::U32(v)) => encode_with!(Dpt12::Counter, *v, 4),
        (13, DptValue::I32(v)) => encode_with!(dpt13_variant(sub), *v, 4),
        (14, DptValue::Float(v)) => encode_with!(dpt14_variant(sub), *v, 4),
        (15, DptValue::AccessData(a)) => encode_with!(Dpt15::AccessData, *a, 4),
        (16, DptValue::Text(s)) => {
            let dpt = if sub == "001" { Dpt16::Latin1 } else { Dpt16::Ascii };
            encode_with!(dpt, s.as_str(), 14)
        }
        (18, DptValue::Scene(c, s)) => encode_with!(Dpt18::SceneControl, (*c, *s), 1),
        (20, DptValue::U8(v)) => encode_with!(dpt20_variant(sub), *v, 1),
        _ => Err(KnxError::unsupported_dpt()),
    }
}

/// Decode wire bytes to a [`DptValue`] for the given `"<main>[.<sub>]"`
/// descriptor.
///
/// Per the numeric-group zero-length convention, an empty `bytes` slice for
/// main groups 5, 8, 9, 12, 13, 14 or 20 decodes to that group's zero value
/// rather than an error; for main group 16 it decodes to an empty string.
///
/// # Errors
/// Returns an unsupported-dpt error if `descriptor` names a main group this
/// crate does not implement, or propagates the underlying decode error.
pub fn decode(bytes: &[u8], descriptor: &str) -> Result<DptValue> {
    let Descriptor { main, sub } = parse_descriptor(descriptor)?;

    if bytes.is_empty() {
        match main {
            5 => return Ok(DptValue::Scaled(0)),
            20 => return Ok(DptValue::U8(0)),
            8 => return Ok(DptValue::I16(0)),
            9 | 14 => return Ok(DptValue::Float(0.0)),
            12 => return Ok(DptValue::U32(0)),
            13 => return Ok(DptValue::I32(0)),
            16 => return Ok(DptValue::Text(String::new())),
            _ => {}
        }
    }

    match main {
        1 => Ok(DptValue::Bool(Dpt1::Switch.decode(bytes)?)),
        2 => {
            let (c, v) = Dpt2::SwitchControl.decode(bytes)?;
            Ok(DptValue::Controlled(c, v))
        }
        3 => {
            let cmd = Dpt3::Dimming.decode(bytes)?;
            Ok(DptValue::Control(cmd.control, cmd.stepcode))
        }
        4 => {
            let dpt = if sub == "002" { Dpt4::Latin1 } else { Dpt4::Ascii };
            Ok(DptValue::Char(dpt.decode(bytes)?))
        }
        5 => Ok(DptValue::Scaled(dpt5_variant(sub).decode(bytes)?)),
        6 if sub == "020" => Ok(DptValue::Status6020(Dpt6::Percent.decode(bytes)?)),
        6 => Ok(DptValue::I8(dpt6_variant(sub).decode(bytes)?)),
        7 => Ok(DptValue::U16(dpt7_variant(sub).decode(bytes)?)),
        8 => Ok(DptValue::I16(dpt8_variant(sub).decode(bytes)?)),
        9 => Ok(DptValue::Float(dpt9_variant(sub).decode(bytes)?)),
        10 => Ok(DptValue::Time(Dpt10::TimeOfDay.decode(bytes)?)),
        11 => Ok(DptValue::Date(Dpt11::Date.decode(bytes)?)),
        12 => Ok(DptValue::U32(Dpt12::Counter.decode(bytes)?)),
        13 => Ok(DptValue::I32(dpt13_variant(sub).decode(bytes)?)),
        14 => Ok(DptValue::Float(dpt14_variant(sub).decode(bytes)?)),
        15 => Ok(DptValue::AccessData(Dpt15::AccessData.decode(bytes)?)),
        16 => {
            let dpt = if sub == "001" { Dpt16::Latin1 } else { Dpt16::Ascii };
            Ok(DptValue::Text(dpt.decode(bytes)?))
        }
        18 => {
            let (c, s) = Dpt18::SceneControl.decode(bytes)?;
            Ok(DptValue::Scene(c, s))
        }
        20 => Ok(DptValue::U8(dpt20_variant(sub).decode(bytes)?)),
        _ => Err(KnxError::unsupported_dpt()),
    }
}

#[cfg(test)]
mod dispatch_tests {
    use super::*;

    #[test]
    fn test_bool_round_trip() {
        let bytes = encode(&DptValue::Bool(true), "1.001").unwrap();
        assert_eq!(decode(&bytes, "1.001").unwrap(), DptValue::Bool(true));
    }

    #[test]
    fn test_float_round_trip_dpt9() {
        let bytes = encode(&DptValue::Float(21.5), "9.001").unwrap();
        assert_eq!(bytes.len(), 2);
        match decode(&bytes, "9.001").unwrap() {
            DptValue::Float(v) => assert!((v - 21.5).abs() < 0.1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_text_round_trip() {
        let bytes = encode(&DptValue::Text("hi".to_string()), "16.000").unwrap();
        assert_eq!(decode(&bytes, "16.000").unwrap(), DptValue::Text("hi".to_string()));
    }

    #[test]
    fn test_zero_length_numeric_decodes_to_zero() {
        assert_eq!(decode(&[], "5.001").unwrap(), DptValue::Scaled(0));
        assert_eq!(decode(&[], "13.010").unwrap(), DptValue::I32(0));
        assert_eq!(decode(&[], "16.000").unwrap(), DptValue::Text(String::new()));
    }

    #[test]
    fn test_unknown_main_group() {
        assert!(encode(&DptValue::Bool(true), "99").is_err());
        assert!(decode(&[0x00], "99").is_err());
    }

    #[test]
    fn test_value_variant_mismatch() {
        // DPT 1 expects Bool, not U8
        assert!(encode(&DptValue::U8(1), "1.001").is_err());
    }

    #[test]
    fn test_date_round_trip() {
        let date = KnxDate { day: 12, month: 5, year: 1999 };
        let bytes = encode(&DptValue::Date(date), "11.001").unwrap();
        assert_eq!(bytes, [0x0C, 0x05, 0x63]);
        assert_eq!(decode(&bytes, "11.001").unwrap(), DptValue::Date(date));
    }
}
