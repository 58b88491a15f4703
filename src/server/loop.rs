// Server loop module
// Accepts connections until the shutdown future resolves, then drains

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use super::connection::handle_connection;
use crate::config::AppState;
use crate::logger;

/// Accept loop
///
/// Runs until `shutdown` resolves. The listener is then closed so no new
/// connections are taken, and in-flight connections are asked to finish.
/// Whatever is still open after `performance.shutdown_timeout` is dropped.
pub async fn start_server_loop<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        tracing::trace!(%peer_addr, "accepted connection");
                        handle_connection(stream, peer_addr, &state, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => {
                logger::log_shutdown_started();
                break;
            }
        }
    }

    drop(listener);

    let timeout = Duration::from_secs(state.config.performance.shutdown_timeout);
    tokio::select! {
        () = graceful.shutdown() => logger::log_shutdown_complete(),
        () = tokio::time::sleep(timeout) => {
            logger::log_warning(&format!(
                "Connections still open after {}s, closing them",
                timeout.as_secs()
            ));
        }
    }
}
