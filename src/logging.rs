//! Logging macro for KNX-RS
//!
//! The embedded lineage this crate grew from dispatched between `log::` and
//! `defmt::` depending on which logger feature was active. This build is
//! std-only, so the macro always resolves to `log::`; kept as a thin wrapper
//! so call sites across the crate read uniformly.
//!
//! # Usage
//!
//! ```rust
//! use knx_rs::knx_log;
//!
//! knx_log!(info, "Connection established");
//! knx_log!(debug, "Received {} bytes", 4);
//! knx_log!(warn, "Timeout occurred");
//! knx_log!(error, "Failed to connect");
//! knx_log!(trace, "Entering function");
//! ```
#[macro_export]
macro_rules! knx_log {
    (info, $($arg:tt)*) => { log::info!($($arg)*) };
    (debug, $($arg:tt)*) => { log::debug!($($arg)*) };
    (warn, $($arg:tt)*) => { log::warn!($($arg)*) };
    (error, $($arg:tt)*) => { log::error!($($arg)*) };
    (trace, $($arg:tt)*) => { log::trace!($($arg)*) };
}
