use std::net::TcpListener;
use std::time::{Duration, Instant};

use pendula_net::WsTransport;
use pendula_platform::{AngleState, ClientEvent, ServerEvent, Transport, TransportConfig, TransportStatus};
use tungstenite::Message;

fn wait_for<T>(deadline: Duration, mut poll: impl FnMut() -> Option<T>) -> Option<T> {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if let Some(value) = poll() {
            return Some(value);
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    None
}

#[test]
fn events_round_trip_in_order() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    // Minimal simulator: record the first two frames, answer with one update,
    // then hold the connection until the client leaves.
    let server = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut socket = tungstenite::accept(stream).unwrap();
        let mut received = Vec::new();
        while received.len() < 2 {
            if let Message::Text(text) = socket.read().unwrap() {
                received.push(ClientEvent::from_frame(&text).unwrap());
            }
        }
        let reply = ServerEvent::Update(AngleState {
            theta_1: vec![0.1, 1.67],
            theta_2: vec![0.0, 0.2],
            index: Some(3),
        });
        socket.send(Message::Text(reply.to_frame().unwrap())).unwrap();
        while socket.read().is_ok() {}
        received
    });

    let config = TransportConfig {
        url: format!("ws://127.0.0.1:{port}/ws"),
        ..TransportConfig::default()
    };
    let mut transport = WsTransport::connect(config);
    let initial = AngleState::new(vec![0.0, 1.0], vec![0.5, 0.5]);
    transport.emit(ClientEvent::Play(initial.clone())).unwrap();
    transport.emit(ClientEvent::Pause).unwrap();

    let events = wait_for(Duration::from_secs(5), || {
        let events = transport.drain();
        (!events.is_empty()).then_some(events)
    })
    .expect("no update received");
    assert_eq!(transport.status(), TransportStatus::Live);
    match events.as_slice() {
        [ServerEvent::Update(state)] => {
            assert_eq!(state.theta_1, vec![0.1, 1.67]);
            assert_eq!(state.index, Some(3));
        }
        other => panic!("unexpected events {other:?}"),
    }

    drop(transport);
    let received = server.join().unwrap();
    assert_eq!(received, vec![ClientEvent::Play(initial), ClientEvent::Pause]);
}

#[test]
fn unreachable_server_reports_reconnecting() {
    // Bind then drop to get a port nothing listens on.
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let config = TransportConfig {
        url: format!("ws://127.0.0.1:{port}/ws"),
        reconnect_delay_ms: 50,
        ..TransportConfig::default()
    };
    let mut transport = WsTransport::connect(config);

    let status = wait_for(Duration::from_secs(5), || match transport.status() {
        status @ TransportStatus::Reconnecting { .. } => Some(status),
        _ => None,
    });
    assert!(status.is_some());
    assert!(transport.emit(ClientEvent::Pause).is_ok());
    assert!(transport.drain().is_empty());
}

#[test]
fn silent_peer_times_out_and_drop_returns() {
    // Accepts TCP but never answers the upgrade request.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            held.push(stream);
        }
    });

    let config = TransportConfig {
        url: format!("ws://127.0.0.1:{port}/ws"),
        ping_timeout_ms: 200,
        reconnect_delay_ms: 50,
        ..TransportConfig::default()
    };
    let mut transport = WsTransport::connect(config);
    transport.emit(ClientEvent::Pause).unwrap();

    let status = wait_for(Duration::from_secs(5), || match transport.status() {
        status @ TransportStatus::Reconnecting { .. } => Some(status),
        _ => None,
    });
    assert!(status.is_some(), "still {:?}", transport.status());

    let start = Instant::now();
    drop(transport);
    assert!(start.elapsed() < Duration::from_secs(3));
}
