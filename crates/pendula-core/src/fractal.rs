//! Request/response client for off-line Mandelbrot renders.

use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use pendula_platform::{ClientEvent, MandelbrotRequest, RenderedImage, Transport};
use tracing::{info, warn};

use crate::config::FractalConfig;
use crate::error::FractalError;

/// Decoded `data:` URI payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Split a `data:<mime>;base64,<payload>` URI into its MIME type and bytes.
pub fn decode_data_uri(uri: &str) -> Result<DataImage, FractalError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or(FractalError::BadDataUri("missing data: scheme"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or(FractalError::BadDataUri("missing payload separator"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(FractalError::BadDataUri("payload is not base64"))?;

    Ok(DataImage {
        mime: mime.to_owned(),
        bytes: STANDARD.decode(payload.trim())?,
    })
}

pub fn validate(request: &MandelbrotRequest) -> Result<(), FractalError> {
    let bounds = [
        request.real_lower,
        request.real_upper,
        request.imag_lower,
        request.imag_upper,
    ];
    if bounds.iter().any(|b| !b.is_finite()) {
        return Err(FractalError::InvalidRequest("bounds must be finite"));
    }
    if request.real_lower >= request.real_upper {
        return Err(FractalError::InvalidRequest("real_lower must be below real_upper"));
    }
    if request.imag_lower >= request.imag_upper {
        return Err(FractalError::InvalidRequest("imag_lower must be below imag_upper"));
    }
    if request.x_res == 0 || request.y_res == 0 {
        return Err(FractalError::InvalidRequest("resolution must be positive"));
    }
    if request.n_iter == 0 {
        return Err(FractalError::InvalidRequest("iteration count must be positive"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderState {
    Idle,
    Pending { since: Instant },
    Ready(DataImage),
    Failed(String),
}

/// Spinner and image are never shown together: the spinner belongs to
/// `Pending`, the image to `Ready`.
#[derive(Debug)]
pub struct FractalClient {
    pub request: MandelbrotRequest,
    state: RenderState,
    timeout: Duration,
    generation: u64,
}

impl FractalClient {
    pub fn new(config: &FractalConfig) -> Self {
        Self {
            request: MandelbrotRequest::default(),
            state: RenderState::Idle,
            timeout: Duration::from_secs(config.timeout_secs),
            generation: 0,
        }
    }

    pub fn submit<T: Transport + ?Sized>(&mut self, transport: &mut T, now: Instant) -> Result<(), FractalError> {
        validate(&self.request)?;
        transport.emit(ClientEvent::RenderMandelbrot(self.request))?;
        info!(
            "requested {}x{} mandelbrot render, {} iterations",
            self.request.x_res, self.request.y_res, self.request.n_iter
        );
        self.state = RenderState::Pending { since: now };
        Ok(())
    }

    /// Show a delivered image, whether or not a request is outstanding.
    pub fn complete(&mut self, rendered: RenderedImage) {
        self.generation += 1;
        self.state = match decode_data_uri(&rendered.image) {
            Ok(image) => RenderState::Ready(image),
            Err(e) => {
                warn!("discarding rendered image: {e}");
                RenderState::Failed(e.to_string())
            }
        };
    }

    /// Give up on a request that has been pending longer than the timeout.
    pub fn tick(&mut self, now: Instant) {
        if let RenderState::Pending { since } = self.state {
            if now.saturating_duration_since(since) >= self.timeout {
                warn!("mandelbrot render timed out after {:?}", self.timeout);
                self.state = RenderState::Failed("render timed out".into());
            }
        }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn spinner_visible(&self) -> bool {
        matches!(self.state, RenderState::Pending { .. })
    }

    pub fn image(&self) -> Option<&DataImage> {
        match &self.state {
            RenderState::Ready(image) => Some(image),
            _ => None,
        }
    }

    /// Bumped on every delivered image so callers can cache decoded textures.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
