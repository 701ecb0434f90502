//! Pendula core engine: platform-agnostic geometry, trails, chain sets, and
//! the control/sync state machine.

pub mod chain;
pub mod chain_set;
pub mod config;
pub mod control;
pub mod error;
pub mod fractal;
pub mod geometry;
pub mod palette;
pub mod stage;
pub mod trail;

pub use chain::Chain;
pub use chain_set::{cascade, clamp_chain_count, ChainSet, MAX_CHAINS, MIN_CHAINS};
pub use config::{ChainConfig, ClientConfig, FractalConfig, SyncConfig};
pub use control::{normalize_degrees, plan, ControlInput, ControlSnapshot, Joint, SyncLayer};
pub use error::{ConfigError, FractalError, SyncError};
pub use fractal::{decode_data_uri, DataImage, FractalClient, RenderState};
pub use geometry::{endpoints, Endpoints, Viewport};
pub use palette::{chain_color, Rgb, PALETTE};
pub use stage::{Primitive, PrimitiveId, Stage};
pub use trail::{TrailBuffer, MAX_TRAIL};

pub use glam;
pub use pendula_platform::{AngleState, ClientEvent, MandelbrotRequest, ServerEvent, Transport};
