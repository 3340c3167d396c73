//! Convenience macros for working with KNX addresses and types.
//!
//! This module provides declarative macros that simplify common KNX operations
//! and make code more readable and concise.

/// Creates a [`GroupAddress`](crate::addressing::GroupAddress) from 3-level notation.
///
/// The `ga!` macro provides a clean, intuitive syntax for creating group addresses
/// using the familiar KNX 3-level notation (main/middle/sub).
///
/// # Syntax
///
/// ```text
/// ga!(main/middle/sub)
/// ```
///
/// Where:
/// - `main`: Main group (0-31, typically 0-31)
/// - `middle`: Middle group (0-7)
/// - `sub`: Sub group (0-255)
///
/// # Examples
///
/// ```no_run
/// use knx_rs::ga;
///
/// // Create group address 1/2/3
/// let addr = ga!(1/2/3);
///
/// // Multiple addresses
/// let temp_sensor = ga!(1/2/10);
/// let humidity_sensor = ga!(1/2/11);
/// let light_switch = ga!(2/1/5);
/// ```
///
/// # Compile-Time Validation
///
/// The macro validates address components at compile time:
///
/// ```compile_fail
/// // This will fail to compile: main group > 31
/// let addr = ga!(32/0/0);
/// ```
///
/// ```compile_fail
/// // This will fail to compile: middle group > 7
/// let addr = ga!(1/8/0);
/// ```
///
/// # Equivalent Code
///
/// ```rust
/// use knx_rs::addressing::GroupAddress;
///
/// // Using macro
/// let addr1 = ga!(1/2/3);
///
/// // Without macro (equivalent)
/// let addr2 = GroupAddress::from(
///     ((1u16 & 0x1F) << 11) | ((2u16 & 0x07) << 8) | (3u16 & 0xFF)
/// );
/// ```
#[macro_export]
macro_rules! ga {
    ($main:literal / $middle:literal / $sub:literal) => {{
        // Compile-time validation
        const _: () = {
            if $main > 31 {
                panic!("Main group must be 0-31");
            }
            if $middle > 7 {
                panic!("Middle group must be 0-7");
            }
            if $sub > 255 {
                panic!("Sub group must be 0-255");
            }
        };

        // Calculate raw address: MMMMMMMM MMMMSSSSSSSSS (5 bits main, 3 bits middle, 8 bits sub)
        const RAW: u16 = (($main & 0x1F) << 11) | (($middle & 0x07) << 8) | ($sub & 0xFF);
        $crate::addressing::GroupAddress::from(RAW)
    }};
}

#[cfg(test)]
mod tests {
    use crate::addressing::GroupAddress;

    #[test]
    fn test_ga_macro_basic() {
        let addr = ga!(1 / 2 / 3);
        let expected = GroupAddress::from(0x0A03);
        assert_eq!(addr, expected);
    }

    #[test]
    fn test_ga_macro_boundaries() {
        // Test boundary values
        let addr_max = ga!(31 / 7 / 255);
        let addr_min = ga!(0 / 0 / 0);

        // Verify they compile and create valid addresses
        let _: GroupAddress = addr_max;
        let _: GroupAddress = addr_min;
    }

    #[test]
    fn test_ga_macro_various_addresses() {
        // Test common address patterns
        assert_eq!(ga!(0 / 0 / 1), GroupAddress::from(0x0001));
        assert_eq!(ga!(1 / 0 / 0), GroupAddress::from(0x0800));
        assert_eq!(ga!(5 / 3 / 100), GroupAddress::from(0x2B64));
    }
}
