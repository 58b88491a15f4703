//! Error types
//!
//! `ServerError` covers startup and process-level failures; only these can
//! terminate the process. `ResolveError` is per-request and always ends up
//! as an HTTP status on the wire.

use hyper::StatusCode;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Process-level failures
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration could not be assembled from defaults and environment
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// `host:port` did not form a valid socket address
    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },

    /// Serving root missing, unreadable, or not a directory
    #[error("serving root '{}' is not usable: {source}", path.display())]
    Root {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Listening socket could not be bound (e.g. port already in use)
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Default browser could not be opened; never fatal
    #[error("could not open browser at {url}: {source}")]
    BrowserLaunch {
        url: String,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for process-level operations
pub type ServerResult<T> = Result<T, ServerError>;

/// Reasons a request path could not be turned into something servable
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Request target is not an origin-form path or does not decode
    #[error("malformed request target: {0}")]
    BadRequest(String),

    /// Path would leave the serving root
    #[error("path escapes serving root: {0}")]
    PathEscape(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Any other filesystem failure (permissions, read errors)
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ResolveError {
    /// HTTP status this error is reported with
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PathEscape(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
