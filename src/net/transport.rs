//! Network transport abstraction for KNXnet/IP communication.
//!
//! This module provides the `AsyncTransport` trait that abstracts the underlying
//! network transport mechanism, enabling:
//! - Testability through mock implementations
//! - Flexibility to support different transport types (UDP, serial, USB, etc.)
//! - Dependency Inversion Principle compliance
//!
//! ## Design Pattern
//!
//! This follows the **Dependency Inversion Principle (DIP)**:
//! - High-level modules (`TunnelState`'s actor loop) depend on abstractions (`AsyncTransport`)
//! - Low-level modules (UDP socket implementations) also depend on the same abstraction
//! - Both can vary independently
//!
//! ## Example
//!
//! ```rust,no_run
//! use knx_rs::net::transport::AsyncTransport;
//! use knx_rs::net::udp_transport::UdpTransport;
//! use std::time::Duration;
//!
//! // Production: use a real UDP socket
//! let mut transport = UdpTransport::new(Duration::from_secs(1));
//! transport.bind(0)?;
//! # Ok::<(), knx_rs::KnxError>(())
//! ```

use std::future::Future;
use std::pin::pin;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use crate::error::Result;
use crate::net::IpEndpoint;

/// Drives a future to completion on the calling thread without a runtime.
///
/// `AsyncTransport` methods are `async fn`s only so the trait stays usable
/// from a future runtime-backed implementation; every implementation this
/// crate ships (`UdpTransport`, `MockTransport`) resolves on its first poll
/// because the underlying I/O is blocking, so a no-op waker is sufficient --
/// there is never a second poll to wake up for.
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    const VTABLE: RawWakerVTable = RawWakerVTable::new(
        |_| RawWaker::new(std::ptr::null(), &VTABLE),
        |_| {},
        |_| {},
        |_| {},
    );
    // SAFETY: the vtable's clone/wake/drop fns are all no-ops, so the raw
    // waker has no invariants to uphold.
    let waker = unsafe { Waker::from_raw(RawWaker::new(std::ptr::null(), &VTABLE)) };
    let mut cx = Context::from_waker(&waker);
    let mut future = pin!(future);
    loop {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
    }
}

/// Asynchronous network transport abstraction.
///
/// This trait defines the interface for any network transport mechanism
/// that can send and receive UDP-like datagrams. Implementations can be
/// real network sockets, mock objects for testing, or alternative transports.
///
/// # Design Notes
///
/// The trait stays minimal so alternative transports -- a mock for tests,
/// a real UDP socket, a future serial/USB bridge -- can all implement it
/// without depending on a specific async runtime.
#[allow(async_fn_in_trait)]
pub trait AsyncTransport {
    /// Bind the transport to a local port.
    ///
    /// # Arguments
    ///
    /// * `port` - Local port to bind to (0 = any available port)
    ///
    /// # Errors
    ///
    /// Returns error if the port is already in use or binding fails.
    ///
    /// # Default Implementation
    ///
    /// Default implementation does nothing (no-op). Override if your transport
    /// requires explicit binding before sending/receiving.
    fn bind(&mut self, _port: u16) -> Result<()> {
        Ok(())
    }

    /// Send data to a specific network endpoint.
    ///
    /// # Arguments
    ///
    /// * `data` - The data to send (typically a KNXnet/IP frame)
    /// * `addr` - The destination endpoint (IP + port)
    ///
    /// # Returns
    ///
    /// `Ok(())` if data was sent successfully
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network is unavailable
    /// - Send buffer is full
    /// - Transport is closed
    async fn send_to(&mut self, data: &[u8], addr: IpEndpoint) -> Result<()>;

    /// Receive data from the network.
    ///
    /// This method blocks until data is available or an error occurs.
    ///
    /// # Arguments
    ///
    /// * `buf` - Buffer to store received data
    ///
    /// # Returns
    ///
    /// A tuple of:
    /// - Number of bytes received
    /// - Source endpoint (IP + port)
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Receive operation fails
    /// - Buffer is too small
    /// - Transport is closed
    async fn recv_from(&mut self, buf: &mut [u8]) -> Result<(usize, IpEndpoint)>;

    /// Check if the transport is currently connected/ready.
    ///
    /// Default implementation returns `true`. Override if your transport
    /// has connection state to track.
    fn is_ready(&self) -> bool {
        true
    }

    /// Close the transport and release resources.
    ///
    /// Default implementation does nothing. Override if your transport
    /// needs cleanup.
    fn close(&mut self) {
        // Default: no-op
    }
}
