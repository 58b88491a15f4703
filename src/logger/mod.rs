//! Logger module
//!
//! Logging utilities for the server:
//! - Startup banner (stdout)
//! - Access logging in several formats
//! - Error and warning logging through `tracing`

mod format;

pub use format::AccessLogEntry;

use crate::config::LoggingConfig;
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Should be called
/// once at application startup.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}

/// Print where the server can be reached
pub fn log_server_start(addr: &SocketAddr, index_url: &str, root: &Path) {
    println!("Server started at http://localhost:{}", addr.port());
    println!("Open {index_url} in your browser");
    println!("Serving files from {}", root.display());
    println!("Press Ctrl+C to stop the server");
    tracing::info!(%addr, root = %root.display(), "listening");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    tracing::debug!("Failed to serve connection: {err}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_browser_opened(url: &str) {
    tracing::info!("Opened {url} in the default browser");
}

pub fn log_shutdown_started() {
    tracing::info!("Shutdown signal received, no longer accepting connections");
}

pub fn log_shutdown_complete() {
    tracing::info!("All connections closed, server stopped");
}
