//! Error types for payments-core

use std::net::SocketAddr;
use thiserror::Error;

/// Result type alias for payments-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the payments HTTP server
#[derive(Debug, Error)]
pub enum Error {
    /// Hostname/port pair does not form a socket address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Listener could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Status code outside 100-999
    #[error("Invalid status code: {0}")]
    InvalidStatus(u16),

    /// Handler ID registered twice
    #[error("Duplicate handler ID: {0}")]
    DuplicateHandler(u32),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
