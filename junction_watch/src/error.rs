use thiserror::Error;

/// Errors surfaced by the junction_watch engine.
#[derive(Debug, Error)]
pub enum JunctionWatchError {
    #[error("unknown junction `{0}`")]
    UnknownJunction(String),

    #[error("signal optimization is already running")]
    OptimizationInProgress,

    #[error("invalid configuration for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("frame encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, JunctionWatchError>;
