//! Tunnel configuration.
//!
//! Holds every option the tunnel state machine recognizes (see
//! `protocol::tunnel`'s module doc for the options table this mirrors) plus
//! their defaults. The two values CONNECT_RESPONSE assigns at runtime --
//! the gateway channel id and the learned data-endpoint port -- are not
//! here; they live on `TunnelState` because they're connection-scoped, not
//! user-supplied.

use std::time::Duration;

use crate::net::Ipv4Addr;

/// Tunnel configuration options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Configuration {
    local_ip: Ipv4Addr,
    control_port: u16,
    data_port: u16,
    server_ip: Ipv4Addr,
    server_control_port: u16,
    heartbeat_interval: Duration,
    connect_response_timeout: Duration,
    connectionstate_response_timeout: Duration,
    disconnect_response_timeout: Duration,
    tunnelling_ack_timeout: Duration,
}

impl Configuration {
    /// Local address advertised in HPAIs.
    #[must_use]
    pub const fn local_ip(&self) -> Ipv4Addr {
        self.local_ip
    }

    /// Local control-socket bind port (0 = ephemeral).
    #[must_use]
    pub const fn control_port(&self) -> u16 {
        self.control_port
    }

    /// Local data-socket bind port (0 = ephemeral).
    #[must_use]
    pub const fn data_port(&self) -> u16 {
        self.data_port
    }

    /// KNXnet/IP server address.
    #[must_use]
    pub const fn server_ip(&self) -> Ipv4Addr {
        self.server_ip
    }

    /// KNXnet/IP server control port.
    #[must_use]
    pub const fn server_control_port(&self) -> u16 {
        self.server_control_port
    }

    /// Idle time before a CONNECTIONSTATE_REQUEST is sent.
    #[must_use]
    pub const fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    /// Time to wait for CONNECT_RESPONSE.
    #[must_use]
    pub const fn connect_response_timeout(&self) -> Duration {
        self.connect_response_timeout
    }

    /// Time to wait for CONNECTIONSTATE_RESPONSE.
    #[must_use]
    pub const fn connectionstate_response_timeout(&self) -> Duration {
        self.connectionstate_response_timeout
    }

    /// Time to wait for DISCONNECT_RESPONSE.
    #[must_use]
    pub const fn disconnect_response_timeout(&self) -> Duration {
        self.disconnect_response_timeout
    }

    /// Time to wait for TUNNELLING_ACK.
    #[must_use]
    pub const fn tunnelling_ack_timeout(&self) -> Duration {
        self.tunnelling_ack_timeout
    }

    /// Set the local address advertised in HPAIs.
    #[must_use]
    pub const fn with_local_ip(mut self, local_ip: Ipv4Addr) -> Self {
        self.local_ip = local_ip;
        self
    }

    /// Set the local control-socket bind port.
    #[must_use]
    pub const fn with_control_port(mut self, control_port: u16) -> Self {
        self.control_port = control_port;
        self
    }

    /// Set the local data-socket bind port.
    #[must_use]
    pub const fn with_data_port(mut self, data_port: u16) -> Self {
        self.data_port = data_port;
        self
    }

    /// Set the KNXnet/IP server address.
    #[must_use]
    pub const fn with_server_ip(mut self, server_ip: Ipv4Addr) -> Self {
        self.server_ip = server_ip;
        self
    }

    /// Set the KNXnet/IP server control port.
    #[must_use]
    pub const fn with_server_control_port(mut self, server_control_port: u16) -> Self {
        self.server_control_port = server_control_port;
        self
    }

    /// Set the heartbeat interval.
    #[must_use]
    pub const fn with_heartbeat_interval(mut self, heartbeat_interval: Duration) -> Self {
        self.heartbeat_interval = heartbeat_interval;
        self
    }

    /// Set the CONNECT_RESPONSE timeout.
    #[must_use]
    pub const fn with_connect_response_timeout(mut self, timeout: Duration) -> Self {
        self.connect_response_timeout = timeout;
        self
    }

    /// Set the CONNECTIONSTATE_RESPONSE timeout.
    #[must_use]
    pub const fn with_connectionstate_response_timeout(mut self, timeout: Duration) -> Self {
        self.connectionstate_response_timeout = timeout;
        self
    }

    /// Set the DISCONNECT_RESPONSE timeout.
    #[must_use]
    pub const fn with_disconnect_response_timeout(mut self, timeout: Duration) -> Self {
        self.disconnect_response_timeout = timeout;
        self
    }

    /// Set the TUNNELLING_ACK timeout.
    #[must_use]
    pub const fn with_tunnelling_ack_timeout(mut self, timeout: Duration) -> Self {
        self.tunnelling_ack_timeout = timeout;
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            local_ip: Ipv4Addr::LOCALHOST,
            control_port: 0,
            data_port: 0,
            server_ip: Ipv4Addr::LOCALHOST,
            server_control_port: 3671,
            heartbeat_interval: Duration::from_secs(60),
            connect_response_timeout: Duration::from_secs(10),
            connectionstate_response_timeout: Duration::from_secs(10),
            disconnect_response_timeout: Duration::from_secs(5),
            tunnelling_ack_timeout: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_options_table() {
        let config = Configuration::default();
        assert_eq!(config.local_ip(), Ipv4Addr::LOCALHOST);
        assert_eq!(config.control_port(), 0);
        assert_eq!(config.data_port(), 0);
        assert_eq!(config.server_ip(), Ipv4Addr::LOCALHOST);
        assert_eq!(config.server_control_port(), 3671);
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(60));
        assert_eq!(config.connect_response_timeout(), Duration::from_secs(10));
        assert_eq!(config.connectionstate_response_timeout(), Duration::from_secs(10));
        assert_eq!(config.disconnect_response_timeout(), Duration::from_secs(5));
        assert_eq!(config.tunnelling_ack_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_builder_overrides() {
        let config = Configuration::default()
            .with_server_ip(Ipv4Addr::new(192, 168, 1, 10))
            .with_server_control_port(3672)
            .with_heartbeat_interval(Duration::from_secs(30));

        assert_eq!(config.server_ip(), Ipv4Addr::new(192, 168, 1, 10));
        assert_eq!(config.server_control_port(), 3672);
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(30));
        // Unrelated fields keep their defaults.
        assert_eq!(config.tunnelling_ack_timeout(), Duration::from_secs(1));
    }
}
