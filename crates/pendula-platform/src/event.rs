use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{PlatformError, Result};

/// Joint angles for every chain, one entry per chain index, in radians.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AngleState {
    pub theta_1: Vec<f64>,
    pub theta_2: Vec<f64>,
    /// Frame counter stamped by the simulator on streamed updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
}

impl AngleState {
    pub fn new(theta_1: Vec<f64>, theta_2: Vec<f64>) -> Self {
        Self {
            theta_1,
            theta_2,
            index: None,
        }
    }

    /// Number of chains fully described by both arrays.
    pub fn len(&self) -> usize {
        self.theta_1.len().min(self.theta_2.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, chain: usize) -> Option<(f64, f64)> {
        Some((*self.theta_1.get(chain)?, *self.theta_2.get(chain)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MandelbrotRequest {
    pub real_lower: f64,
    pub real_upper: f64,
    pub imag_lower: f64,
    pub imag_upper: f64,
    pub x_res: u32,
    pub y_res: u32,
    pub n_iter: u32,
}

impl Default for MandelbrotRequest {
    fn default() -> Self {
        Self {
            real_lower: -2.0,
            real_upper: 1.0,
            imag_lower: -1.5,
            imag_upper: 1.5,
            x_res: 500,
            y_res: 500,
            n_iter: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedImage {
    /// `data:` URI carrying the encoded image.
    pub image: String,
}

/// Client to server messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    Play(AngleState),
    Pause,
    Update(AngleState),
    RenderMandelbrot(MandelbrotRequest),
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Play(_) => "play",
            ClientEvent::Pause => "pause",
            ClientEvent::Update(_) => "update",
            ClientEvent::RenderMandelbrot(_) => "render_mandelbrot",
        }
    }

    pub fn to_frame(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|source| PlatformError::Encode {
            event: self.name(),
            source,
        })
    }

    pub fn from_frame(frame: &str) -> Result<Self> {
        serde_json::from_str(frame).map_err(PlatformError::Decode)
    }
}

/// Server to client messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Update(AngleState),
    RenderedMandelbrot(RenderedImage),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Update(_) => "update",
            ServerEvent::RenderedMandelbrot(_) => "rendered_mandelbrot",
        }
    }

    pub fn to_frame(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|source| PlatformError::Encode {
            event: self.name(),
            source,
        })
    }

    pub fn from_frame(frame: &str) -> Result<Self> {
        serde_json::from_str(frame).map_err(|e| {
            warn!("dropping inbound frame: {e}");
            PlatformError::Decode(e)
        })
    }
}
