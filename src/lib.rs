#![allow(dead_code)]
#![doc = include_str!("../README.md")]

//! # knx-rs
//!
//! A KNXnet/IP Tunnelling client: establishes a tunnel connection to a KNX
//! gateway, maintains it with heartbeats, and transports group-address
//! telegrams in both directions.
//!
//! ## Features
//!
//! - KNXnet/IP Tunnelling connection lifecycle, with heartbeat and
//!   reconnect-with-backoff
//! - Datapoint Type (DPT) encode/decode for the common KNX main groups
//! - Individual and Group addressing
//! - Zero-copy frame parsing
//!
//! ## Example
//!
//! ```rust,no_run
//! use knx_rs::addressing::GroupAddress;
//! use knx_rs::configuration::Configuration;
//!
//! let addr: GroupAddress = "1/2/3".parse().unwrap();
//! let config = Configuration::default();
//! ```

pub mod addressing;
pub mod configuration;
pub mod dpt;
pub mod error;
pub mod net;
pub mod protocol;

// Macro module (must be declared before use)
#[macro_use]
pub mod logging;
#[macro_use]
pub mod macros;

// Re-export commonly used types
pub use addressing::{GroupAddress, IndividualAddress};
pub use configuration::Configuration;
pub use dpt::{Dpt1, Dpt5, Dpt9, DptDecode, DptEncode};
pub use error::{KnxError, Result};
