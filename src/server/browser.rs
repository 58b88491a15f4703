// Browser launch module
// Best-effort: failures are logged and never stop the server

use crate::error::ServerError;
use crate::logger;

/// Open `url` in the default browser
///
/// The launcher is spawned detached, so a terminal browser (`w3m`, `lynx`)
/// or a foreground `xdg-open` does not hold a blocking thread for as long as
/// the browser stays open.
pub fn open_in_browser(url: String) {
    launch_with(url, |url: &str| open::that_detached(url));
}

/// Run `launcher` for `url` off the runtime's worker threads and log the outcome
fn launch_with<F>(url: String, launcher: F) -> tokio::task::JoinHandle<()>
where
    F: FnOnce(&str) -> std::io::Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(move || match launcher(&url) {
        Ok(()) => logger::log_browser_opened(&url),
        Err(source) => {
            let err = ServerError::BrowserLaunch { url, source };
            logger::log_warning(&format!("{err}. Please navigate to the URL manually."));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_launch_failure_is_not_fatal() {
        let handle = launch_with("http://localhost:1/".to_string(), |_| {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no browser",
            ))
        });
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn test_launcher_receives_url() {
        let called = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&called);
        launch_with("http://localhost:8000/index.html".to_string(), move |url| {
            assert_eq!(url, "http://localhost:8000/index.html");
            seen.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap();
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_slow_launcher_does_not_block_exit() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            launch_with("http://localhost:8000/".to_string(), |_| {
                std::thread::sleep(Duration::from_secs(30));
                Ok(())
            });
        });

        let started = Instant::now();
        bootstrap::shutdown_runtime(runtime);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
