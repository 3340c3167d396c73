//! KNXnet/IP Tunnelling connection state machine.
//!
//! [`TunnelState`] is the pure decision core: given a configuration, an
//! incoming datagram, or a clock tick, it returns the datagrams that need to
//! go out and drives a [`TunnelCallbacks`] implementation, but it never
//! touches a socket itself. That's left to the driver that owns the actual
//! transports (see `knx_rs::net::udp_transport`); keeping the two separate
//! means the state machine can be exercised in tests with nothing but byte
//! arrays and an [`Instant`].
//!
//! ## State machine
//!
//! ```text
//! INIT -> CONNECTING -> CONNECTED <-> HEARTBEAT_WAIT
//!            ^               \            /
//!            |                DISCONNECTING
//!            +----------------/
//! ```
//!
//! - **INIT**: before `start()` is called.
//! - **CONNECTING**: `CONNECT_REQUEST` sent, waiting for `CONNECT_RESPONSE`.
//! - **CONNECTED**: tunnel usable; telegrams flow in both directions.
//! - **HEARTBEAT_WAIT**: `CONNECTIONSTATE_REQUEST` sent, waiting for
//!   `CONNECTIONSTATE_RESPONSE`; telegrams still flow normally.
//! - **DISCONNECTING**: `DISCONNECT_REQUEST` sent after a protocol error,
//!   waiting for `DISCONNECT_RESPONSE` (or its timeout) before reporting the
//!   disconnect to the user and reconnecting.
//!
//! Every transition that ends a connection attempt -- CONNECT_RESPONSE
//! error/timeout, exhausted heartbeat retries, exhausted tunnelling-ack
//! retries, or a server-initiated DISCONNECT_REQUEST -- is reported through
//! [`TunnelCallbacks::on_disconnect`], whose return value decides whether to
//! back off and reconnect or stop for good.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crate::configuration::Configuration;
use crate::error::{KnxError, Result};
use crate::net::transport::{block_on, AsyncTransport};
use crate::net::udp_transport::UdpTransport;
use crate::net::{IpEndpoint, Ipv4Addr};
use crate::protocol::constants::ServiceType;
use crate::protocol::frame::{FrameBuilder, Hpai, KnxnetIpFrame};
use crate::protocol::services::{
    ConnectRequest, ConnectResponse, ConnectionHeader, ConnectionStateRequest,
    ConnectionStateResponse, DisconnectRequest, DisconnectResponse, TunnelingAck, TunnelingRequest,
};

/// Why the tunnel dropped its connection.
///
/// Carried into [`TunnelCallbacks::on_disconnect`] so the application can log
/// or make backoff decisions based on *why*, not just *that*, the tunnel
/// disconnected. Distinct from [`KnxError`]: that type describes a single
/// wire-level failure, this one names the tunnel-level condition that ended
/// a connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectReason {
    /// `CONNECT_RESPONSE` carried a non-zero status.
    ConnectResponseError(u8),
    /// No `CONNECT_RESPONSE` within `connect_response_timeout`.
    ConnectResponseTimeout,
    /// `CONNECTIONSTATE_RESPONSE` kept erroring past the retry budget.
    ConnectionStateResponseError(u8),
    /// `CONNECTIONSTATE_RESPONSE` kept timing out past the retry budget.
    ConnectionStateResponseTimeout,
    /// `TUNNELLING_ACK` carried a non-zero status.
    TunnellingAckError(u8),
    /// `TUNNELLING_ACK` kept timing out past the retry budget.
    TunnellingAckTimeout,
    /// The gateway sent `DISCONNECT_REQUEST`.
    DisconnectRequested,
}

/// What the application wants to happen next, returned from every
/// [`TunnelCallbacks`] method.
#[derive(Debug, Clone)]
pub enum CallbackAction {
    /// Nothing to do; keep running.
    Continue,
    /// Send this already-encoded cEMI telegram over the tunnel.
    ///
    /// Ignored (and logged) if a telegram is already in flight -- only one
    /// `TUNNELLING_REQUEST` may be outstanding at a time.
    SendTelegram(Vec<u8>),
    /// Stop the tunnel for good. No further reconnect is attempted.
    Stop,
    /// Wait this long, then reconnect. Only meaningful as the return value of
    /// `on_disconnect`; elsewhere it's treated the same as `Continue`.
    Backoff(Duration),
}

/// Application hooks driven by the tunnel's actor loop.
///
/// All methods have a default that keeps the tunnel running, so an
/// implementation only needs to override the ones it cares about.
pub trait TunnelCallbacks {
    /// Called once, after the sockets are bound and before `CONNECT_REQUEST`
    /// is sent.
    fn init(&mut self) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called after a `CONNECT_RESPONSE` establishes the tunnel.
    fn on_connect(&mut self) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called once a connection attempt has ended, for any reason.
    ///
    /// Return [`CallbackAction::Backoff`] to reconnect after a delay, or
    /// [`CallbackAction::Stop`] to end the tunnel permanently. Any other
    /// action is treated as an immediate reconnect.
    fn on_disconnect(&mut self, reason: ReconnectReason) -> CallbackAction {
        CallbackAction::Backoff(Duration::from_secs(5))
    }

    /// Called with the cEMI payload of an in-order `TUNNELLING_REQUEST` from
    /// the gateway.
    fn on_telegram(&mut self, cemi_data: &[u8]) -> CallbackAction {
        let _ = cemi_data;
        CallbackAction::Continue
    }

    /// Called once a telegram this side sent has been acknowledged.
    fn on_telegram_ack(&mut self) -> CallbackAction {
        CallbackAction::Continue
    }
}

/// Which local socket an [`Outbound`] datagram must be sent from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundChannel {
    /// The control socket (`CONNECT`/`CONNECTIONSTATE`/`DISCONNECT`).
    Control,
    /// The data socket (`TUNNELLING_REQUEST`/`TUNNELLING_ACK`).
    Data,
}

/// A datagram [`TunnelState`] wants sent, and where to send it from/to.
#[derive(Debug, Clone)]
pub struct Outbound {
    /// Local socket to send from.
    pub channel: OutboundChannel,
    /// Remote endpoint to send to.
    pub target: IpEndpoint,
    /// Encoded KNXnet/IP frame.
    pub bytes: Vec<u8>,
}

/// Tunnel connection phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `start()` has not been called yet.
    Init,
    /// `CONNECT_REQUEST` sent, awaiting `CONNECT_RESPONSE`.
    Connecting,
    /// Tunnel established and usable.
    Connected,
    /// `CONNECTIONSTATE_REQUEST` sent, awaiting `CONNECTIONSTATE_RESPONSE`.
    HeartbeatWait,
    /// `DISCONNECT_REQUEST` sent, awaiting `DISCONNECT_RESPONSE`.
    Disconnecting,
}

/// A single armed (or disarmed) deadline.
///
/// `token` is bumped on every arm/cancel. The actor loop checks timers by
/// comparing the current time against `deadline` directly rather than by
/// dequeuing a separately-scheduled "fire" event, so a stale fire can't
/// actually reach `TunnelState` here -- the token is kept anyway so a future
/// event-queue-based driver has something to compare against, and so the
/// bookkeeping matches how this crate's embedded-actor lineage named it.
#[derive(Debug, Clone, Copy, Default)]
struct TimerSlot {
    token: u64,
    deadline: Option<Instant>,
}

impl TimerSlot {
    fn arm(&mut self, now: Instant, duration: Duration) {
        self.token = self.token.wrapping_add(1);
        self.deadline = Some(now + duration);
    }

    fn cancel(&mut self) {
        self.token = self.token.wrapping_add(1);
        self.deadline = None;
    }

    fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Timers {
    connect_response: TimerSlot,
    heartbeat: TimerSlot,
    connectionstate_response: TimerSlot,
    disconnect_response: TimerSlot,
    tunnelling_ack: TimerSlot,
}

impl Timers {
    fn earliest_deadline(&self) -> Option<Instant> {
        [
            self.connect_response.deadline,
            self.heartbeat.deadline,
            self.connectionstate_response.deadline,
            self.disconnect_response.deadline,
            self.tunnelling_ack.deadline,
        ]
        .into_iter()
        .flatten()
        .min()
    }
}

/// Maximum heartbeat retries before giving up and disconnecting.
const HEARTBEAT_RETRY_LIMIT: u8 = 3;
/// Maximum tunnelling-ack timeout retries before giving up and disconnecting.
const ACK_RETRY_LIMIT: u8 = 2;

/// The Tunnelling connection state machine.
///
/// Pure with respect to I/O: every method takes already-parsed input (or a
/// clock reading) and returns the [`Outbound`] datagrams the caller must
/// send. See the module doc for the driving loop this is meant to sit
/// inside.
pub struct TunnelState {
    config: Configuration,
    phase: Phase,
    channel_id: u8,
    local_seq: u8,
    remote_seq: u8,
    heartbeat_fail_count: u8,
    ack_fail_count: u8,
    pending_wire: Option<Vec<u8>>,
    pending_disconnect_reason: Option<ReconnectReason>,
    control_hpai: Hpai,
    data_hpai: Hpai,
    server_control: IpEndpoint,
    server_data: IpEndpoint,
    timers: Timers,
    stopped: bool,
    pending_backoff: Option<Duration>,
}

impl TunnelState {
    /// Create a new, not-yet-started tunnel state.
    #[must_use]
    pub fn new(config: Configuration) -> Self {
        let server_control = IpEndpoint::new(config.server_ip(), config.server_control_port());
        Self {
            config,
            phase: Phase::Init,
            channel_id: 0,
            local_seq: 0,
            remote_seq: 0,
            heartbeat_fail_count: 0,
            ack_fail_count: 0,
            pending_wire: None,
            pending_disconnect_reason: None,
            control_hpai: Hpai::new([0, 0, 0, 0], 0),
            data_hpai: Hpai::new([0, 0, 0, 0], 0),
            server_control,
            server_data: server_control,
            timers: Timers::default(),
            stopped: false,
            pending_backoff: None,
        }
    }

    /// Current connection phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Gateway-assigned channel id, or 0 before `CONNECT_RESPONSE`.
    #[must_use]
    pub const fn channel_id(&self) -> u8 {
        self.channel_id
    }

    /// Whether the tunnel has been told to stop permanently.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Socket read timeout to use for the next poll: the time until the
    /// earliest armed timer fires, clamped to a sane floor/ceiling.
    #[must_use]
    pub fn next_poll_timeout(&self, now: Instant) -> Duration {
        const FLOOR: Duration = Duration::from_millis(10);
        const CEILING: Duration = Duration::from_secs(1);

        match self.timers.earliest_deadline() {
            Some(deadline) if deadline > now => (deadline - now).clamp(FLOOR, CEILING),
            Some(_) => FLOOR,
            None => CEILING,
        }
    }

    /// Whether CONNECTED-phase behaviors (telegram send/receive) apply.
    ///
    /// `HEARTBEAT_WAIT` is treated as connected-for-traffic-purposes: the
    /// heartbeat round-trip doesn't preclude telegrams flowing, it just means
    /// a `CONNECTIONSTATE_REQUEST` is also outstanding.
    const fn accepts_tunnelling_traffic(&self) -> bool {
        matches!(self.phase, Phase::Connected | Phase::HeartbeatWait)
    }

    /// Start the tunnel: bind info for both local sockets must already be
    /// known (the driver binds them before calling this), invokes
    /// `callbacks.init()`, then sends `CONNECT_REQUEST`.
    pub fn start(
        &mut self,
        control_local_port: u16,
        data_local_port: u16,
        callbacks: &mut impl TunnelCallbacks,
    ) -> Vec<Outbound> {
        let local_octets: [u8; 4] = self.config.local_ip().into();
        self.control_hpai = Hpai::new(local_octets, control_local_port);
        self.data_hpai = Hpai::new(local_octets, data_local_port);

        let mut out = Vec::new();
        let action = callbacks.init();
        self.apply_callback_action(action, &mut out);
        if self.stopped {
            return out;
        }

        out.extend(self.begin_connect(Instant::now()));
        out
    }

    fn begin_connect(&mut self, now: Instant) -> Vec<Outbound> {
        self.phase = Phase::Connecting;
        self.timers.connect_response.arm(now, self.config.connect_response_timeout());

        let request = ConnectRequest::new(self.control_hpai, self.data_hpai);
        let mut buf = [0u8; 64];
        match request.build(&mut buf) {
            Ok(len) => vec![self.to_control(buf[..len].to_vec())],
            Err(_) => Vec::new(),
        }
    }

    fn to_control(&self, bytes: Vec<u8>) -> Outbound {
        Outbound {
            channel: OutboundChannel::Control,
            target: self.server_control,
            bytes,
        }
    }

    fn to_data(&self, bytes: Vec<u8>) -> Outbound {
        Outbound {
            channel: OutboundChannel::Data,
            target: self.server_data,
            bytes,
        }
    }

    fn initiate_disconnecting(&mut self, now: Instant, reason: ReconnectReason) -> Vec<Outbound> {
        knx_log!(warn, "tunnel disconnecting: {:?}", reason);
        self.phase = Phase::Disconnecting;
        self.pending_disconnect_reason = Some(reason);
        self.pending_wire = None;
        self.timers.heartbeat.cancel();
        self.timers.connectionstate_response.cancel();
        self.timers.tunnelling_ack.cancel();
        self.timers.disconnect_response.arm(now, self.config.disconnect_response_timeout());

        let request = DisconnectRequest::new(self.channel_id, self.control_hpai);
        let mut buf = [0u8; 32];
        match request.build(&mut buf) {
            Ok(len) => vec![self.to_control(buf[..len].to_vec())],
            Err(_) => Vec::new(),
        }
    }

    fn complete_disconnect(&mut self, now: Instant, callbacks: &mut impl TunnelCallbacks, out: &mut Vec<Outbound>) {
        self.timers.disconnect_response.cancel();
        self.channel_id = 0;
        let reason = self.pending_disconnect_reason.take().unwrap_or(ReconnectReason::DisconnectRequested);
        let action = callbacks.on_disconnect(reason);
        match action {
            CallbackAction::Stop => {
                self.stopped = true;
                self.phase = Phase::Init;
            }
            CallbackAction::Backoff(delay) => {
                self.pending_backoff = Some(delay);
            }
            _ => {
                out.extend(self.begin_connect(now));
            }
        }
    }

    /// Apply the reconnect delay set by the most recent `on_disconnect`
    /// call, if any. The driver calls this after sleeping the returned
    /// duration, to actually resend `CONNECT_REQUEST`.
    pub fn reconnect_after_backoff(&mut self, now: Instant) -> Vec<Outbound> {
        if self.pending_backoff.take().is_some() && !self.stopped {
            self.begin_connect(now)
        } else {
            Vec::new()
        }
    }

    /// Backoff duration set by the last `on_disconnect`, if the driver
    /// hasn't consumed it yet via [`Self::reconnect_after_backoff`].
    #[must_use]
    pub const fn pending_backoff(&self) -> Option<Duration> {
        self.pending_backoff
    }

    fn apply_callback_action(&mut self, action: CallbackAction, out: &mut Vec<Outbound>) {
        match action {
            CallbackAction::Continue | CallbackAction::Backoff(_) => {}
            CallbackAction::Stop => self.stopped = true,
            CallbackAction::SendTelegram(cemi) => out.extend(self.try_send_telegram(&cemi)),
        }
    }

    fn try_send_telegram(&mut self, cemi_data: &[u8]) -> Option<Outbound> {
        if !self.accepts_tunnelling_traffic() {
            knx_log!(debug, "dropping outbound telegram: tunnel not connected");
            return None;
        }
        if self.pending_wire.is_some() {
            knx_log!(debug, "dropping outbound telegram: one already in flight");
            return None;
        }

        let header = ConnectionHeader::new(self.channel_id, self.local_seq);
        let request = TunnelingRequest::new(header, cemi_data);
        let mut buf = vec![0u8; 16 + cemi_data.len()];
        let len = request.build(&mut buf).ok()?;
        buf.truncate(len);

        self.pending_wire = Some(buf.clone());
        self.timers.tunnelling_ack.arm(Instant::now(), self.config.tunnelling_ack_timeout());
        self.ack_fail_count = 0;
        Some(self.to_data(buf))
    }

    /// Process one received datagram (already read off either local socket).
    ///
    /// # Errors
    ///
    /// Returns an error only if the datagram isn't a well-formed KNXnet/IP
    /// frame; malformed or out-of-phase frames that the protocol says to
    /// silently ignore are not errors.
    pub fn on_datagram(
        &mut self,
        data: &[u8],
        callbacks: &mut impl TunnelCallbacks,
    ) -> Result<Vec<Outbound>> {
        let frame = KnxnetIpFrame::parse(data)?;
        let body = frame.body();
        let now = Instant::now();
        let mut out = Vec::new();

        match frame.service_type() {
            ServiceType::ConnectResponse => self.on_connect_response(now, body, callbacks, &mut out),
            ServiceType::ConnectionstateResponse => {
                self.on_connectionstate_response(now, body, callbacks, &mut out);
            }
            ServiceType::DisconnectRequest => self.on_disconnect_request(now, body, callbacks, &mut out),
            ServiceType::DisconnectResponse => self.on_disconnect_response(now, body, callbacks, &mut out),
            ServiceType::TunnellingRequest => self.on_tunnelling_request(body, callbacks, &mut out),
            ServiceType::TunnellingAck => self.on_tunnelling_ack(now, body, callbacks, &mut out),
            _ => {}
        }

        Ok(out)
    }

    fn on_connect_response(
        &mut self,
        now: Instant,
        body: &[u8],
        callbacks: &mut impl TunnelCallbacks,
        out: &mut Vec<Outbound>,
    ) {
        if self.phase != Phase::Connecting {
            return;
        }
        let Ok(response) = ConnectResponse::parse(body) else { return };

        self.timers.connect_response.cancel();

        if !response.is_ok() {
            let action = callbacks.on_disconnect(ReconnectReason::ConnectResponseError(response.status));
            self.phase = Phase::Init;
            self.apply_reconnect_decision(now, action, out);
            return;
        }

        self.channel_id = response.channel_id;
        self.local_seq = 0;
        self.remote_seq = 0;
        self.server_data = IpEndpoint::new(
            Ipv4Addr::from(response.data_endpoint.ip_address),
            response.data_endpoint.port,
        );
        self.phase = Phase::Connected;
        knx_log!(debug, "tunnel connected, channel {}", self.channel_id);
        self.timers.heartbeat.arm(now, self.config.heartbeat_interval());

        let action = callbacks.on_connect();
        self.apply_callback_action(action, out);
    }

    /// Shared tail for the two "connection attempt ended while in
    /// CONNECTING" paths (error status and timeout): neither goes through
    /// DISCONNECTING since no channel was ever assigned.
    fn apply_reconnect_decision(&mut self, now: Instant, action: CallbackAction, out: &mut Vec<Outbound>) {
        match action {
            CallbackAction::Stop => self.stopped = true,
            CallbackAction::Backoff(delay) => self.pending_backoff = Some(delay),
            _ => out.extend(self.begin_connect(now)),
        }
    }

    fn on_connectionstate_response(
        &mut self,
        now: Instant,
        body: &[u8],
        callbacks: &mut impl TunnelCallbacks,
        out: &mut Vec<Outbound>,
    ) {
        if self.phase != Phase::HeartbeatWait {
            return;
        }
        let Ok(response) = ConnectionStateResponse::parse(body) else { return };
        if response.channel_id != self.channel_id {
            return;
        }

        if response.is_ok() {
            self.timers.connectionstate_response.cancel();
            self.heartbeat_fail_count = 0;
            self.phase = Phase::Connected;
            knx_log!(debug, "tunnel heartbeat ok, channel {}", self.channel_id);
            self.timers.heartbeat.arm(now, self.config.heartbeat_interval());
        } else {
            self.retry_or_disconnect_heartbeat(now, ReconnectReason::ConnectionStateResponseError(response.status), out);
            let _ = callbacks;
        }
    }

    fn retry_or_disconnect_heartbeat(&mut self, now: Instant, reason: ReconnectReason, out: &mut Vec<Outbound>) {
        if self.heartbeat_fail_count < HEARTBEAT_RETRY_LIMIT {
            self.heartbeat_fail_count += 1;
            let request = ConnectionStateRequest::new(self.channel_id, self.control_hpai);
            let mut buf = [0u8; 24];
            if let Ok(len) = request.build(&mut buf) {
                out.push(self.to_control(buf[..len].to_vec()));
            }
            self.timers.connectionstate_response.arm(now, self.config.connectionstate_response_timeout());
        } else {
            out.extend(self.initiate_disconnecting(now, reason));
        }
    }

    fn on_disconnect_request(
        &mut self,
        now: Instant,
        body: &[u8],
        callbacks: &mut impl TunnelCallbacks,
        out: &mut Vec<Outbound>,
    ) {
        if body.is_empty() {
            return;
        }
        let request_channel_id = body[0];
        if self.phase == Phase::Init || request_channel_id != self.channel_id {
            return;
        }

        self.timers.connect_response.cancel();
        self.timers.heartbeat.cancel();
        self.timers.connectionstate_response.cancel();
        self.timers.disconnect_response.cancel();
        self.timers.tunnelling_ack.cancel();
        self.pending_wire = None;
        self.channel_id = 0;

        let mut body_buf = [0u8; 2];
        body_buf[0] = request_channel_id;
        body_buf[1] = 0;
        let mut frame_buf = [0u8; 16];
        if let Ok(len) = FrameBuilder::new(ServiceType::DisconnectResponse, &body_buf).build(&mut frame_buf) {
            out.push(self.to_control(frame_buf[..len].to_vec()));
        }

        self.phase = Phase::Init;
        let action = callbacks.on_disconnect(ReconnectReason::DisconnectRequested);
        self.apply_reconnect_decision(now, action, out);
    }

    fn on_disconnect_response(
        &mut self,
        now: Instant,
        body: &[u8],
        callbacks: &mut impl TunnelCallbacks,
        out: &mut Vec<Outbound>,
    ) {
        if self.phase != Phase::Disconnecting {
            return;
        }
        if DisconnectResponse::parse(body).is_err() {
            return;
        }
        self.complete_disconnect(now, callbacks, out);
    }

    fn on_tunnelling_request(&mut self, body: &[u8], callbacks: &mut impl TunnelCallbacks, out: &mut Vec<Outbound>) {
        if !self.accepts_tunnelling_traffic() {
            return;
        }
        let Ok(request) = TunnelingRequest::parse(body) else { return };
        if request.connection_header.channel_id != self.channel_id {
            return;
        }

        let seq = request.connection_header.sequence_counter;
        if seq == self.remote_seq {
            let action = callbacks.on_telegram(request.cemi_data);
            self.remote_seq = self.remote_seq.wrapping_add(1);
            out.push(self.ack_for(seq));
            self.apply_callback_action(action, out);
        } else if seq == self.remote_seq.wrapping_sub(1) {
            knx_log!(debug, "duplicate tunnelling request, seq {seq}");
            out.push(self.ack_for(seq));
        } else {
            knx_log!(debug, "dropping out-of-order tunnelling request, seq {seq} expected {}", self.remote_seq);
        }
    }

    fn ack_for(&self, seq: u8) -> Outbound {
        let header = ConnectionHeader::new(self.channel_id, seq);
        let ack = TunnelingAck::new(header, 0);
        let mut buf = [0u8; 16];
        let len = ack.build(&mut buf).unwrap_or(0);
        self.to_data(buf[..len].to_vec())
    }

    fn on_tunnelling_ack(&mut self, now: Instant, body: &[u8], callbacks: &mut impl TunnelCallbacks, out: &mut Vec<Outbound>) {
        if !self.accepts_tunnelling_traffic() {
            return;
        }
        let Ok(ack) = TunnelingAck::parse(body) else { return };
        if ack.connection_header.channel_id != self.channel_id || self.pending_wire.is_none() {
            return;
        }
        if ack.connection_header.sequence_counter != self.local_seq {
            knx_log!(debug, "stale tunnelling ack, seq {}", ack.connection_header.sequence_counter);
            return;
        }

        if ack.is_ok() {
            self.timers.tunnelling_ack.cancel();
            self.local_seq = self.local_seq.wrapping_add(1);
            self.pending_wire = None;
            self.ack_fail_count = 0;
            let action = callbacks.on_telegram_ack();
            self.apply_callback_action(action, out);
        } else {
            if let Some(wire) = self.pending_wire.clone() {
                out.push(self.to_data(wire));
            }
            out.extend(self.initiate_disconnecting(now, ReconnectReason::TunnellingAckError(ack.status)));
        }
    }

    /// Check every armed timer against `now`, firing whichever is due.
    pub fn on_tick(&mut self, now: Instant, callbacks: &mut impl TunnelCallbacks) -> Vec<Outbound> {
        let mut out = Vec::new();

        if self.timers.connect_response.is_due(now) && self.phase == Phase::Connecting {
            self.timers.connect_response.cancel();
            let action = callbacks.on_disconnect(ReconnectReason::ConnectResponseTimeout);
            self.phase = Phase::Init;
            self.apply_reconnect_decision(now, action, &mut out);
        }

        if self.timers.heartbeat.is_due(now) && self.phase == Phase::Connected {
            self.timers.heartbeat.cancel();
            self.phase = Phase::HeartbeatWait;
            knx_log!(debug, "tunnel heartbeat due, channel {}", self.channel_id);
            self.heartbeat_fail_count = 0;
            self.retry_or_disconnect_heartbeat(now, ReconnectReason::ConnectionStateResponseTimeout, &mut out);
        }

        if self.timers.connectionstate_response.is_due(now) && self.phase == Phase::HeartbeatWait {
            self.timers.connectionstate_response.cancel();
            self.retry_or_disconnect_heartbeat(now, ReconnectReason::ConnectionStateResponseTimeout, &mut out);
        }

        if self.timers.disconnect_response.is_due(now) && self.phase == Phase::Disconnecting {
            self.complete_disconnect(now, callbacks, &mut out);
        }

        if self.timers.tunnelling_ack.is_due(now) {
            self.timers.tunnelling_ack.cancel();
            if self.ack_fail_count < ACK_RETRY_LIMIT {
                self.ack_fail_count += 1;
                if let Some(wire) = self.pending_wire.clone() {
                    out.push(self.to_data(wire));
                }
                self.timers.tunnelling_ack.arm(now, self.config.tunnelling_ack_timeout());
            } else {
                out.extend(self.initiate_disconnecting(now, ReconnectReason::TunnellingAckTimeout));
            }
        }

        out
    }

    /// Route a [`CallbackAction`] obtained from outside the regular event
    /// dispatch (for example, a `SendTelegram` issued in response to
    /// something that isn't itself a tunnel event).
    pub fn submit(&mut self, action: CallbackAction) -> Vec<Outbound> {
        let mut out = Vec::new();
        self.apply_callback_action(action, &mut out);
        out
    }

    /// Begin a graceful, client-initiated disconnect: sends
    /// `DISCONNECT_REQUEST` and waits for the server's response (or the
    /// response timeout) before `on_disconnect` fires.
    ///
    /// No-op if the tunnel is already disconnecting or was never connected.
    pub fn disconnect(&mut self, now: Instant) -> Vec<Outbound> {
        if matches!(self.phase, Phase::Init | Phase::Disconnecting) {
            return Vec::new();
        }
        self.initiate_disconnecting(now, ReconnectReason::DisconnectRequested)
    }
}

/// A message sent from [`TunnelHandle`] into the actor thread.
enum ActorEvent {
    SendTelegram(Vec<u8>),
    Stop,
}

/// A running tunnel, owned by its caller, doing its actual work on a
/// dedicated OS thread.
///
/// The thread owns both UDP sockets and drives [`TunnelState`] with
/// whichever comes first: an incoming datagram on either socket, a fired
/// timer, or a message sent through this handle. Dropping the handle stops
/// the tunnel and joins the thread.
pub struct TunnelHandle {
    events: mpsc::Sender<ActorEvent>,
    join: Option<thread::JoinHandle<()>>,
}

impl TunnelHandle {
    /// Spawn the actor thread and start connecting.
    ///
    /// # Errors
    ///
    /// Returns an error if either local UDP socket fails to bind.
    pub fn spawn<C>(config: Configuration, callbacks: C) -> Result<Self>
    where
        C: TunnelCallbacks + Send + 'static,
    {
        let mut control = UdpTransport::new(Duration::from_millis(50));
        let mut data = UdpTransport::new(Duration::from_millis(50));
        control.bind(config.control_port())?;
        data.bind(config.data_port())?;

        let (tx, rx) = mpsc::channel();
        let join = thread::Builder::new()
            .name("knx-tunnel".to_owned())
            .spawn(move || run_actor(config, control, data, callbacks, rx))
            .map_err(|_| KnxError::socket_error())?;

        Ok(Self {
            events: tx,
            join: Some(join),
        })
    }

    /// Ask the tunnel to send a telegram.
    ///
    /// Dropped silently (by the actor) if one is already in flight or the
    /// tunnel isn't connected; see [`TunnelState::on_datagram`]'s send path.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor thread has already stopped.
    pub fn send_telegram(&self, cemi_data: Vec<u8>) -> Result<()> {
        self.events
            .send(ActorEvent::SendTelegram(cemi_data))
            .map_err(|_| KnxError::InvalidState)
    }

    /// Ask the tunnel to disconnect and stop. Does not block; call
    /// [`TunnelHandle::join`] (or drop the handle) to wait for shutdown.
    pub fn stop(&self) {
        let _ = self.events.send(ActorEvent::Stop);
    }

    /// Block until the actor thread has exited.
    pub fn join(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for TunnelHandle {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

fn run_actor(
    config: Configuration,
    mut control: UdpTransport,
    mut data: UdpTransport,
    mut callbacks: impl TunnelCallbacks,
    events: mpsc::Receiver<ActorEvent>,
) {
    let control_port = match control.local_port() {
        Ok(port) => port,
        Err(err) => {
            knx_log!(error, "tunnel actor: couldn't read control port: {:?}", err);
            return;
        }
    };
    let data_port = match data.local_port() {
        Ok(port) => port,
        Err(err) => {
            knx_log!(error, "tunnel actor: couldn't read data port: {:?}", err);
            return;
        }
    };

    let mut state = TunnelState::new(config);
    let mut outbound = state.start(control_port, data_port, &mut callbacks);
    let mut recv_buf = [0u8; crate::protocol::constants::MAX_FRAME_SIZE];

    loop {
        for msg in flush_outbound(&mut outbound, &mut control, &mut data) {
            knx_log!(warn, "tunnel actor: failed to send datagram: {:?}", msg);
        }

        if state.is_stopped() {
            control.close();
            data.close();
            return;
        }

        match events.try_recv() {
            Ok(ActorEvent::SendTelegram(cemi)) => {
                outbound = state.submit(CallbackAction::SendTelegram(cemi));
                continue;
            }
            Ok(ActorEvent::Stop) => {
                outbound = state.disconnect(Instant::now());
                continue;
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                outbound = state.submit(CallbackAction::Stop);
                continue;
            }
        }

        if let Some(backoff) = state.pending_backoff() {
            thread::sleep(backoff);
            outbound = state.reconnect_after_backoff(Instant::now());
            continue;
        }

        outbound = poll_sockets(&mut control, &mut data, &mut recv_buf, &mut state, &mut callbacks);
    }
}

fn flush_outbound(outbound: &mut Vec<Outbound>, control: &mut UdpTransport, data: &mut UdpTransport) -> Vec<KnxError> {
    let mut errors = Vec::new();
    for item in outbound.drain(..) {
        let transport = match item.channel {
            OutboundChannel::Control => &mut *control,
            OutboundChannel::Data => &mut *data,
        };
        if let Err(err) = block_on(transport.send_to(&item.bytes, item.target)) {
            errors.push(err);
        }
    }
    errors
}

fn poll_sockets(
    control: &mut UdpTransport,
    data: &mut UdpTransport,
    buf: &mut [u8],
    state: &mut TunnelState,
    callbacks: &mut impl TunnelCallbacks,
) -> Vec<Outbound> {
    let now = Instant::now();
    let deadline = now + state.next_poll_timeout(now);

    match block_on(control.recv_from(buf)) {
        Ok((len, _from)) => {
            return state.on_datagram(&buf[..len], callbacks).unwrap_or_else(|err| {
                knx_log!(warn, "tunnel actor: dropping malformed control datagram: {:?}", err);
                Vec::new()
            });
        }
        Err(err) if !is_no_data(&err) => {
            knx_log!(warn, "tunnel actor: control recv error: {:?}", err);
        }
        Err(_) => {}
    }

    match block_on(data.recv_from(buf)) {
        Ok((len, _from)) => {
            return state.on_datagram(&buf[..len], callbacks).unwrap_or_else(|err| {
                knx_log!(warn, "tunnel actor: dropping malformed data datagram: {:?}", err);
                Vec::new()
            });
        }
        Err(err) if !is_no_data(&err) => {
            knx_log!(warn, "tunnel actor: data recv error: {:?}", err);
        }
        Err(_) => {}
    }

    if Instant::now() >= deadline {
        return state.on_tick(Instant::now(), callbacks);
    }
    Vec::new()
}

/// Whether an error from `AsyncTransport::recv_from` just means "nothing to
/// read yet" rather than a real transport failure.
///
/// `UdpTransport` signals this with `KnxError::connection_timeout()`;
/// `MockTransport` (used in tests elsewhere in this crate) signals it with
/// the bare `KnxError::Timeout` variant instead. Both mean the same thing
/// here.
fn is_no_data(err: &KnxError) -> bool {
    match err {
        KnxError::Timeout => true,
        KnxError::Connection(inner) => inner.is_timeout(),
        _ => false,
    }
}
