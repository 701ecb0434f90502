//! WebSocket transport: a worker thread owns the socket, the client side
//! talks to it over channels.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use pendula_platform::{ClientEvent, PlatformError, Result, ServerEvent, Transport, TransportConfig, TransportStatus};
use tracing::{info, warn};

mod worker;

/// How long drop waits for the worker to close the socket before detaching it.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

pub struct WsTransport {
    outbound: Sender<ClientEvent>,
    inbound: Receiver<ServerEvent>,
    status: Arc<Mutex<TransportStatus>>,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl WsTransport {
    /// Start connecting in the background. Events emitted before the socket
    /// is up are queued and sent in order once it is.
    pub fn connect(config: TransportConfig) -> Self {
        let (outbound, outbound_receiver) = crossbeam_channel::unbounded::<ClientEvent>();
        let (inbound_sender, inbound) = crossbeam_channel::unbounded::<ServerEvent>();
        let status = Arc::new(Mutex::new(TransportStatus::Connecting));
        let shutdown = Arc::new(AtomicBool::new(false));

        info!("transport: connecting to {}", config.url);
        let worker = {
            let status = Arc::clone(&status);
            let shutdown = Arc::clone(&shutdown);
            std::thread::Builder::new()
                .name("pendula-ws".into())
                .spawn(move || worker::run(&config, &outbound_receiver, &inbound_sender, &status, &shutdown))
        };
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("transport: failed to spawn worker thread: {e}");
                set_status(&status, TransportStatus::Closed);
                None
            }
        };

        Self {
            outbound,
            inbound,
            status,
            shutdown,
            worker,
        }
    }
}

impl Transport for WsTransport {
    fn emit(&mut self, event: ClientEvent) -> Result<()> {
        self.outbound.send(event).map_err(|_| PlatformError::Closed)
    }

    fn drain(&mut self) -> Vec<ServerEvent> {
        self.inbound.try_iter().collect()
    }

    fn status(&self) -> TransportStatus {
        self.status
            .lock()
            .map(|status| *status)
            .unwrap_or(TransportStatus::Closed)
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        let Some(worker) = self.worker.take() else {
            return;
        };
        let deadline = Instant::now() + SHUTDOWN_GRACE;
        while !worker.is_finished() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        if !worker.is_finished() {
            warn!("transport: worker still busy after {SHUTDOWN_GRACE:?}, detaching");
            return;
        }
        if worker.join().is_err() {
            warn!("transport: worker thread panicked");
        }
    }
}

pub(crate) fn set_status(cell: &Mutex<TransportStatus>, status: TransportStatus) {
    match cell.lock() {
        Ok(mut current) => *current = status,
        Err(_) => warn!("transport: status lock poisoned"),
    }
}
