// Startup sequence
// bind -> announce -> open browser -> serve until a shutdown signal

use std::time::Duration;

use crate::config::Config;
use crate::error::ServerResult;
use crate::logger;
use crate::server::{browser, signal, Server};

/// How long leftover blocking tasks may delay process exit
pub const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Run the server until SIGINT or SIGTERM
///
/// Bind and root errors are returned before anything is printed, so a busy
/// port never produces a misleading "Server started" banner.
pub async fn run(config: Config) -> ServerResult<()> {
    let open_browser = config.server.open_browser;
    let server = Server::bind(config)?;

    let addr = server.local_addr()?;
    let url = server.state().config.index_url(addr.port());
    logger::log_server_start(&addr, &url, server.root());

    if open_browser {
        browser::open_in_browser(url);
    }

    server.run_until(signal::shutdown_signal()).await
}

/// Tear down the runtime once serving has stopped
///
/// A plain drop waits for every blocking task without limit; this bounds
/// the wait so an interrupt always ends the process.
pub fn shutdown_runtime(runtime: tokio::runtime::Runtime) {
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
}
