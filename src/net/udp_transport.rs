//! Standard library UDP transport for KNXnet/IP communication.
//!
//! Implements [`AsyncTransport`] over `std::net::UdpSocket`. The tunnel's
//! actor loop runs on a dedicated OS thread, so this transport uses
//! blocking I/O with a read timeout rather than a true async runtime --
//! there is no executor driving these futures, only the `async fn`s
//! required to satisfy the trait.

use std::net::{SocketAddrV4, UdpSocket};
use std::time::Duration;

use crate::error::{KnxError, Result};
use crate::net::transport::AsyncTransport;
use crate::net::IpEndpoint;

/// `AsyncTransport` backed by a real `std::net::UdpSocket`.
#[derive(Debug)]
pub struct UdpTransport {
    socket: Option<UdpSocket>,
    read_timeout: Duration,
}

impl UdpTransport {
    /// Create a transport that is not yet bound to a socket.
    ///
    /// Call [`AsyncTransport::bind`] before sending or receiving.
    #[must_use]
    pub fn new(read_timeout: Duration) -> Self {
        Self {
            socket: None,
            read_timeout,
        }
    }

    fn socket(&self) -> Result<&UdpSocket> {
        self.socket.as_ref().ok_or_else(KnxError::not_bound)
    }

    /// The port actually bound, useful after binding to port 0.
    ///
    /// # Errors
    ///
    /// Returns an error if [`AsyncTransport::bind`] hasn't been called yet.
    pub fn local_port(&self) -> Result<u16> {
        self.socket()?
            .local_addr()
            .map(|addr| addr.port())
            .map_err(|_| KnxError::socket_error())
    }
}

impl AsyncTransport for UdpTransport {
    fn bind(&mut self, port: u16) -> Result<()> {
        let socket =
            UdpSocket::bind(("0.0.0.0", port)).map_err(|_| KnxError::socket_error())?;
        socket
            .set_read_timeout(Some(self.read_timeout))
            .map_err(|_| KnxError::socket_error())?;
        self.socket = Some(socket);
        Ok(())
    }

    async fn send_to(&mut self, data: &[u8], addr: IpEndpoint) -> Result<()> {
        let dest = SocketAddrV4::new(addr.addr.octets().into(), addr.port);
        self.socket()?
            .send_to(data, dest)
            .map_err(|_| KnxError::send_failed())?;
        Ok(())
    }

    async fn recv_from(&mut self, buf: &mut [u8]) -> Result<(usize, IpEndpoint)> {
        let (len, from) = self
            .socket()?
            .recv_from(buf)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                    KnxError::connection_timeout()
                }
                _ => KnxError::receive_failed(),
            })?;

        let endpoint = match from {
            std::net::SocketAddr::V4(v4) => {
                IpEndpoint::new((*v4.ip()).octets().into(), v4.port())
            }
            std::net::SocketAddr::V6(_) => return Err(KnxError::receive_failed()),
        };

        Ok((len, endpoint))
    }

    fn is_ready(&self) -> bool {
        self.socket.is_some()
    }

    fn close(&mut self) {
        self.socket = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_bound_before_bind() {
        let transport = UdpTransport::new(Duration::from_millis(100));
        assert!(!transport.is_ready());
    }

    #[test]
    fn bind_makes_ready() {
        let mut transport = UdpTransport::new(Duration::from_millis(100));
        transport.bind(0).unwrap();
        assert!(transport.is_ready());
    }

    #[tokio::test]
    async fn send_without_bind_fails() {
        let mut transport = UdpTransport::new(Duration::from_millis(100));
        let dest = IpEndpoint::new([127, 0, 0, 1].into(), 3671);
        assert!(transport.send_to(&[0x00], dest).await.is_err());
    }

    #[tokio::test]
    async fn loopback_round_trip() {
        let mut a = UdpTransport::new(Duration::from_millis(500));
        let mut b = UdpTransport::new(Duration::from_millis(500));
        a.bind(0).unwrap();
        b.bind(0).unwrap();

        let b_addr = IpEndpoint::new([127, 0, 0, 1].into(), b.socket().unwrap().local_addr().unwrap().port());
        a.send_to(&[1, 2, 3], b_addr).await.unwrap();

        let mut buf = [0u8; 16];
        let (n, _from) = b.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], &[1, 2, 3]);
    }
}
