//! Server module
//!
//! Binding, the accept loop, connection handling, signals and the browser
//! launch.

pub mod browser;
pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is named server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_listener;
pub use server_loop::start_server_loop;

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{AppState, Config};
use crate::error::{ServerError, ServerResult};

/// A bound, not yet running, static file server
///
/// Binding is separate from running so callers can read the real port
/// (useful with port 0) before the accept loop starts.
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Resolve the serving root and bind the listening socket
    ///
    /// Fails with [`ServerError::Root`] when the root is not a readable
    /// directory and [`ServerError::Bind`] when the port is taken.
    pub fn bind(config: Config) -> ServerResult<Self> {
        let state = AppState::new(config)?;
        let addr = state.config.get_socket_addr()?;
        let listener =
            create_listener(addr).map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self {
            listener,
            state: Arc::new(state),
        })
    }

    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Canonical directory files are served from
    pub fn root(&self) -> &Path {
        self.state.root()
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Serve until `shutdown` resolves, then drain open connections
    pub async fn run_until<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()>,
    {
        start_server_loop(self.listener, self.state, shutdown).await;
        Ok(())
    }
}
