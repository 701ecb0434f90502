use std::path::PathBuf;

use pendula_platform::PlatformError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Inbound state describes fewer chains than are live.
    #[error("state update covers {theta_1} / {theta_2} angles but {chains} chains are live")]
    ShortState {
        chains: usize,
        theta_1: usize,
        theta_2: usize,
    },
    #[error(transparent)]
    Transport(#[from] PlatformError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum FractalError {
    #[error("invalid render request: {0}")]
    InvalidRequest(&'static str),
    #[error("malformed image data URI: {0}")]
    BadDataUri(&'static str),
    #[error("image payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Transport(#[from] PlatformError),
}
