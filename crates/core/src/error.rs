use thiserror::Error;

/// Errors surfaced by training and artifact I/O.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad artifact magic: {0:#010x}")]
    BadMagic(u32),

    #[error("artifact version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u32, actual: u32 },

    #[error("truncated artifact: {0}")]
    TruncatedArtifact(String),

    #[error("invalid street code in artifact: {0}")]
    InvalidStreet(u8),

    #[error("configuration error: {0}")]
    Config(String),
}
