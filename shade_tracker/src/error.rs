use thiserror::Error;

/// Rejected configuration values. The per-frame pipeline itself cannot fail; these
/// are raised once, while the run is being set up.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("codec must be exactly four ASCII characters, got {0:?}")]
    InvalidCodec(String),
    #[error("output name must be a plain file name, got {0:?}")]
    InvalidOutputName(String),
    #[error("frame dimensions must be non-zero, got {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },
}
