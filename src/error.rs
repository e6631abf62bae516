use std::path::PathBuf;
use thiserror::Error;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Errors that can occur while starting or running the emulator
#[derive(Error, Debug)]
pub enum EmulatorError {
    /// I/O error (sockets, token file, certificate files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TLS acceptor could not be built from the configured material
    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    /// Encrypted transport was requested but credential files are missing
    #[error("TLS requested but {} not found (generate with: openssl req -x509 -newkey rsa:2048 -nodes -keyout key.pem -out cert.pem -days 365)", .0.display())]
    MissingTlsMaterial(PathBuf),

    /// Configuration value could not be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
