use std::collections::VecDeque;
use std::io::ErrorKind;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use pendula_platform::{ClientEvent, ServerEvent, TransportConfig, TransportStatus};
use tracing::{debug, error, info, warn};
use tungstenite::client::IntoClientRequest;
use tungstenite::error::UrlError;
use tungstenite::handshake::HandshakeError;
use tungstenite::{Message, WebSocket};

use crate::set_status;

/// Socket read timeout; bounds how long outbound events and shutdown wait.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

type Socket = WebSocket<TcpStream>;

enum SessionEnd {
    Shutdown,
    Lost(String),
}

pub(crate) fn run(
    config: &TransportConfig,
    outbound: &Receiver<ClientEvent>,
    inbound: &Sender<ServerEvent>,
    status: &Mutex<TransportStatus>,
    shutdown: &AtomicBool,
) {
    // Frames survive reconnects so nothing emitted is silently lost.
    let mut backlog: VecDeque<String> = VecDeque::new();
    let mut attempt = 0u32;

    while !shutdown.load(Ordering::Relaxed) {
        match open(config) {
            Ok(mut socket) => {
                info!("transport: connected to {}", config.url);
                attempt = 0;
                set_status(status, TransportStatus::Live);
                match session(&mut socket, config, outbound, inbound, &mut backlog, shutdown) {
                    SessionEnd::Shutdown => {
                        let _ = socket.close(None);
                        let _ = socket.flush();
                        break;
                    }
                    SessionEnd::Lost(reason) => warn!("transport: connection lost: {reason}"),
                }
            }
            Err(e) => warn!("transport: connect to {} failed: {e}", config.url),
        }

        attempt += 1;
        set_status(status, TransportStatus::Reconnecting { attempt });
        if !sleep_unless_shutdown(config.reconnect_delay(), shutdown) {
            break;
        }
    }

    set_status(status, TransportStatus::Closed);
    info!("transport: worker stopped");
}

/// TCP connect and the upgrade handshake are each bounded by the ping
/// timeout, so a peer that accepts but never answers counts as a failed
/// attempt.
fn open(config: &TransportConfig) -> tungstenite::Result<Socket> {
    let request = config.url.as_str().into_client_request()?;
    let uri = request.uri();
    if uri.scheme_str() != Some("ws") {
        return Err(tungstenite::Error::Url(UrlError::UnsupportedUrlScheme));
    }
    let host = uri
        .host()
        .ok_or(tungstenite::Error::Url(UrlError::NoHostName))?
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_owned();
    let port = uri.port_u16().unwrap_or(80);

    let bound = config.ping_timeout();
    let stream = connect_tcp(&host, port, bound)?;
    stream.set_read_timeout(Some(bound))?;
    stream.set_write_timeout(Some(bound))?;
    stream.set_nodelay(true)?;

    let (socket, _response) = tungstenite::client(request, stream).map_err(|e| match e {
        HandshakeError::Failure(e) => e,
        HandshakeError::Interrupted(_) => {
            tungstenite::Error::Io(std::io::Error::new(ErrorKind::TimedOut, "no handshake response"))
        }
    })?;
    socket.get_ref().set_read_timeout(Some(POLL_INTERVAL))?;
    Ok(socket)
}

fn connect_tcp(host: &str, port: u16, timeout: Duration) -> tungstenite::Result<TcpStream> {
    let mut last_error = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }
    Err(match last_error {
        Some(e) => tungstenite::Error::Io(e),
        None => tungstenite::Error::Url(UrlError::UnableToConnect(format!("{host}:{port}"))),
    })
}

fn session(
    socket: &mut Socket,
    config: &TransportConfig,
    outbound: &Receiver<ClientEvent>,
    inbound: &Sender<ServerEvent>,
    backlog: &mut VecDeque<String>,
    shutdown: &AtomicBool,
) -> SessionEnd {
    let mut last_ping = Instant::now();
    let mut last_heard = Instant::now();
    let silence_limit = config.ping_interval() + config.ping_timeout();

    loop {
        if shutdown.load(Ordering::Relaxed) {
            return SessionEnd::Shutdown;
        }

        loop {
            match outbound.try_recv() {
                Ok(event) => match event.to_frame() {
                    Ok(frame) => backlog.push_back(frame),
                    Err(e) => error!("transport: {e}"),
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return SessionEnd::Shutdown,
            }
        }
        while let Some(frame) = backlog.front() {
            if let Err(e) = socket.send(Message::Text(frame.clone())) {
                return SessionEnd::Lost(e.to_string());
            }
            backlog.pop_front();
        }

        if last_ping.elapsed() >= config.ping_interval() {
            if let Err(e) = socket.send(Message::Ping(Vec::new())) {
                return SessionEnd::Lost(e.to_string());
            }
            last_ping = Instant::now();
        }
        if last_heard.elapsed() >= silence_limit {
            return SessionEnd::Lost(format!("no traffic for {silence_limit:?}"));
        }

        match socket.read() {
            Ok(Message::Text(text)) => {
                last_heard = Instant::now();
                // Undecodable frames are logged by the decoder and dropped.
                if let Ok(event) = ServerEvent::from_frame(&text) {
                    debug!("transport: received {}", event.name());
                    if inbound.send(event).is_err() {
                        return SessionEnd::Shutdown;
                    }
                }
            }
            Ok(Message::Close(_)) => return SessionEnd::Lost("closed by server".into()),
            Ok(_) => last_heard = Instant::now(),
            Err(tungstenite::Error::Io(e)) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) => return SessionEnd::Lost(e.to_string()),
        }
    }
}

/// Returns false if shutdown was requested while waiting.
fn sleep_unless_shutdown(delay: Duration, shutdown: &AtomicBool) -> bool {
    let deadline = Instant::now() + delay;
    while Instant::now() < deadline {
        if shutdown.load(Ordering::Relaxed) {
            return false;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    !shutdown.load(Ordering::Relaxed)
}
