//! End-to-end tests for the tunnel state machine against a tiny in-process
//! fake gateway: a UDP socket that answers CONNECT/TUNNELLING/DISCONNECT
//! like a real KNXnet/IP server would, without needing the real simulator.

use std::net::UdpSocket;
use std::time::{Duration, Instant};

use knx_rs::addressing::{GroupAddress, IndividualAddress};
use knx_rs::configuration::Configuration;
use knx_rs::net::Ipv4Addr;
use knx_rs::protocol::cemi::{CEMIMessageCode, ControlField1, ControlField2};
use knx_rs::protocol::constants::{ServiceType, E_NO_ERROR};
use knx_rs::protocol::frame::{FrameBuilder, Hpai, KnxnetIpFrame};
use knx_rs::protocol::services::{ConnectionHeader, TunnelingAck, TunnelingRequest};
use knx_rs::protocol::tunnel::{CallbackAction, Phase, ReconnectReason, TunnelCallbacks, TunnelState};

struct FakeGateway {
    socket: UdpSocket,
}

impl FakeGateway {
    fn bind() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        Self { socket }
    }

    fn port(&self) -> u16 {
        self.socket.local_addr().unwrap().port()
    }

    fn answer_connect(&self, channel_id: u8) {
        let mut buf = [0u8; 64];
        let (len, from) = self.socket.recv_from(&mut buf).unwrap();
        let frame = KnxnetIpFrame::parse(&buf[..len]).unwrap();
        assert_eq!(frame.service_type(), ServiceType::ConnectRequest);

        let data_hpai = Hpai::new([127, 0, 0, 1], self.port());
        let mut body = [0u8; 14];
        body[0] = channel_id;
        body[1] = E_NO_ERROR;
        data_hpai.encode(&mut body[2..10]).unwrap();
        let mut response = [0u8; 32];
        let len = FrameBuilder::new(ServiceType::ConnectResponse, &body)
            .build(&mut response)
            .unwrap();
        self.socket.send_to(&response[..len], from).unwrap();
    }

    fn answer_tunnelling_request(&self, channel_id: u8, expected_seq: u8) -> Vec<u8> {
        let mut buf = [0u8; 256];
        let (len, from) = self.socket.recv_from(&mut buf).unwrap();
        let frame = KnxnetIpFrame::parse(&buf[..len]).unwrap();
        assert_eq!(frame.service_type(), ServiceType::TunnellingRequest);

        let request = TunnelingRequest::parse(frame.body()).unwrap();
        assert_eq!(request.connection_header.channel_id, channel_id);
        assert_eq!(request.connection_header.sequence_counter, expected_seq);
        let cemi = request.cemi_data.to_vec();

        let header = ConnectionHeader::new(channel_id, expected_seq);
        let ack = TunnelingAck::new(header, E_NO_ERROR);
        let mut ack_buf = [0u8; 16];
        let ack_len = ack.build(&mut ack_buf).unwrap();
        self.socket.send_to(&ack_buf[..ack_len], from).unwrap();

        cemi
    }

    fn answer_disconnect(&self, channel_id: u8) {
        let mut buf = [0u8; 64];
        let (len, from) = self.socket.recv_from(&mut buf).unwrap();
        let frame = KnxnetIpFrame::parse(&buf[..len]).unwrap();
        assert_eq!(frame.service_type(), ServiceType::DisconnectRequest);

        let body = [channel_id, E_NO_ERROR];
        let mut response = [0u8; 16];
        let len = FrameBuilder::new(ServiceType::DisconnectResponse, &body)
            .build(&mut response)
            .unwrap();
        self.socket.send_to(&response[..len], from).unwrap();
    }
}

#[derive(Default)]
struct TestCallbacks {
    connected: bool,
    disconnected: Vec<ReconnectReason>,
    received: Vec<Vec<u8>>,
}

impl TunnelCallbacks for TestCallbacks {
    fn on_connect(&mut self) -> CallbackAction {
        self.connected = true;
        CallbackAction::Continue
    }

    fn on_disconnect(&mut self, reason: ReconnectReason) -> CallbackAction {
        self.disconnected.push(reason);
        CallbackAction::Stop
    }

    fn on_telegram(&mut self, cemi_data: &[u8]) -> CallbackAction {
        self.received.push(cemi_data.to_vec());
        CallbackAction::Continue
    }
}

fn build_group_write_cemi(source: IndividualAddress, dest: GroupAddress, on: bool) -> Vec<u8> {
    let source: u16 = source.into();
    let dest: u16 = dest.into();
    vec![
        CEMIMessageCode::LDataReq.to_u8(),
        0x00,
        ControlField1::default().raw(),
        ControlField2::default().raw(),
        (source >> 8) as u8,
        (source & 0xFF) as u8,
        (dest >> 8) as u8,
        (dest & 0xFF) as u8,
        0x01,
        0x00,
        if on { 0x81 } else { 0x80 },
    ]
}

#[test]
fn tunnel_connects_exchanges_a_telegram_then_disconnects() {
    let gateway = FakeGateway::bind();
    let config = Configuration::default()
        .with_server_ip(Ipv4Addr::LOCALHOST)
        .with_server_control_port(gateway.port());

    let mut state = TunnelState::new(config);
    let mut callbacks = TestCallbacks::default();
    let client_socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    client_socket.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    let local_port = client_socket.local_addr().unwrap().port();

    let out = state.start(local_port, local_port, &mut callbacks);
    for item in &out {
        client_socket.send_to(&item.bytes, (gateway.socket.local_addr().unwrap().ip(), gateway.port())).unwrap();
    }

    gateway.answer_connect(9);

    let mut buf = [0u8; 256];
    let (len, _) = client_socket.recv_from(&mut buf).unwrap();
    state.on_datagram(&buf[..len], &mut callbacks).unwrap();

    assert_eq!(state.phase(), Phase::Connected);
    assert_eq!(state.channel_id(), 9);
    assert!(callbacks.connected);

    let source = IndividualAddress::new(1, 1, 250).unwrap();
    let dest = GroupAddress::new(1, 2, 3).unwrap();
    let cemi = build_group_write_cemi(source, dest, true);

    let out = state.submit(CallbackAction::SendTelegram(cemi.clone()));
    for item in &out {
        client_socket.send_to(&item.bytes, (gateway.socket.local_addr().unwrap().ip(), gateway.port())).unwrap();
    }

    let received_cemi = gateway.answer_tunnelling_request(9, 0);
    assert_eq!(received_cemi, cemi);

    let (len, _) = client_socket.recv_from(&mut buf).unwrap();
    state.on_datagram(&buf[..len], &mut callbacks).unwrap();

    let out = state.disconnect(Instant::now());
    for item in &out {
        client_socket.send_to(&item.bytes, (gateway.socket.local_addr().unwrap().ip(), gateway.port())).unwrap();
    }

    gateway.answer_disconnect(9);

    let (len, _) = client_socket.recv_from(&mut buf).unwrap();
    state.on_datagram(&buf[..len], &mut callbacks).unwrap();

    assert_eq!(callbacks.disconnected, vec![ReconnectReason::DisconnectRequested]);
}

#[test]
fn server_initiated_disconnect_is_acknowledged() {
    let gateway = FakeGateway::bind();
    let config = Configuration::default()
        .with_server_ip(Ipv4Addr::LOCALHOST)
        .with_server_control_port(gateway.port());

    let mut state = TunnelState::new(config);
    let mut callbacks = TestCallbacks::default();
    let client_socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    client_socket.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    let local_port = client_socket.local_addr().unwrap().port();

    let out = state.start(local_port, local_port, &mut callbacks);
    for item in &out {
        client_socket.send_to(&item.bytes, (gateway.socket.local_addr().unwrap().ip(), gateway.port())).unwrap();
    }
    gateway.answer_connect(3);
    let mut buf = [0u8; 256];
    let (len, _) = client_socket.recv_from(&mut buf).unwrap();
    state.on_datagram(&buf[..len], &mut callbacks).unwrap();
    assert_eq!(state.phase(), Phase::Connected);

    let body = [3u8, 0x00];
    let mut request = [0u8; 16];
    let request_len = FrameBuilder::new(ServiceType::DisconnectRequest, &body)
        .build(&mut request)
        .unwrap();
    gateway
        .socket
        .send_to(&request[..request_len], client_socket.local_addr().unwrap())
        .unwrap();

    let (len, _) = client_socket.recv_from(&mut buf).unwrap();
    let out = state.on_datagram(&buf[..len], &mut callbacks).unwrap();
    assert_eq!(callbacks.disconnected, vec![ReconnectReason::DisconnectRequested]);
    assert!(state.is_stopped());
    assert_eq!(out.len(), 1);
}

#[test]
fn group_and_individual_address_round_trip() {
    let addr = GroupAddress::new(1, 2, 3).expect("valid group address");
    assert_eq!(u16::from(addr), 0x0A03);

    let addr = IndividualAddress::new(1, 1, 250).expect("valid individual address");
    assert_eq!(u16::from(addr), 0x11FA);
}
