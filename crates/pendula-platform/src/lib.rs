//! Transport abstraction so `pendula-core` stays network-agnostic.

mod event;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use event::{AngleState, ClientEvent, MandelbrotRequest, RenderedImage, ServerEvent};

pub type Result<T> = std::result::Result<T, PlatformError>;

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("failed to encode {event} event: {source}")]
    Encode {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode inbound frame: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("transport is closed")]
    Closed,
}

/// Connection state surfaced to the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    Connecting,
    Live,
    Reconnecting { attempt: u32 },
    Closed,
}

impl TransportStatus {
    pub fn label(self) -> &'static str {
        match self {
            TransportStatus::Connecting => "connecting\u{2026}",
            TransportStatus::Live => "live",
            TransportStatus::Reconnecting { .. } => "reconnecting\u{2026}",
            TransportStatus::Closed => "closed",
        }
    }
}

/// Connection-level tuning. Not business logic; the core never reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub url: String,
    pub ping_interval_ms: u64,
    pub ping_timeout_ms: u64,
    pub reconnect_delay_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:5000/ws".into(),
            ping_interval_ms: 10_000,
            ping_timeout_ms: 10_000,
            reconnect_delay_ms: 2_000,
        }
    }
}

impl TransportConfig {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

/// Bidirectional named-event channel to the simulator.
///
/// Events are delivered in send order per direction. `emit` never blocks;
/// `drain` returns everything received since the previous call.
pub trait Transport: Send {
    fn emit(&mut self, event: ClientEvent) -> Result<()>;
    fn drain(&mut self) -> Vec<ServerEvent>;
    fn status(&self) -> TransportStatus {
        TransportStatus::Live
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn emit(&mut self, event: ClientEvent) -> Result<()> {
        (**self).emit(event)
    }

    fn drain(&mut self) -> Vec<ServerEvent> {
        (**self).drain()
    }

    fn status(&self) -> TransportStatus {
        (**self).status()
    }
}
