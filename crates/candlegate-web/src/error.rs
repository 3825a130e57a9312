use std::net::AddrParseError;

use thiserror::Error;

/// Startup and serving failures of the `candlegate` binary.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddress {
        value: String,
        #[source]
        source: AddrParseError,
    },

    #[error("invalid log filter '{value}': {message}")]
    InvalidLogFilter { value: String, message: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl ServerError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidBindAddress { .. } | Self::InvalidLogFilter { .. } => 2,
            Self::Bind { .. } => 10,
            Self::Serve(_) => 1,
        }
    }
}
