// Configuration module entry point
// Loads configuration from defaults and environment, resolves the serving root

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{ServerError, ServerResult};

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Prefix for environment overrides, e.g. `STATIC_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "STATIC";

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> ServerResult<Self> {
        Self::load_with(Self::environment())
    }

    /// Environment source used by [`Config::load`]
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Load configuration from defaults overlaid with the given environment source
    pub fn load_with(env: config::Environment) -> ServerResult<Self> {
        let settings = config::Config::builder()
            .add_source(env)
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.default_document", "index.html")?
            .set_default("server.open_browser", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .set_default("performance.shutdown_timeout", 5)?
            .set_default(
                "http.server_name",
                concat!("cors-static-server/", env!("CARGO_PKG_VERSION")),
            )?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> ServerResult<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| ServerError::InvalidAddress { addr, source })
    }

    /// Directory files are served from, before canonicalization
    ///
    /// An explicit `server.root` wins; otherwise the directory containing the
    /// running executable, so assets shipped next to the binary are found
    /// regardless of the caller's working directory.
    pub fn serving_root(&self) -> ServerResult<PathBuf> {
        if let Some(root) = &self.server.root {
            return Ok(PathBuf::from(root));
        }

        let exe = std::env::current_exe()?;
        exe.parent()
            .map(PathBuf::from)
            .ok_or_else(|| ServerError::Root {
                path: exe.clone(),
                source: std::io::Error::other("executable has no parent directory"),
            })
    }

    /// URL opened in the browser and printed at startup
    pub fn index_url(&self, port: u16) -> String {
        format!(
            "http://localhost:{port}/{}",
            self.server.default_document.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::environment().source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::load_with(env(&[])).unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.server.default_document, "index.html");
        assert!(cfg.server.open_browser);
        assert!(cfg.server.root.is_none());
        assert!(cfg.server.workers.is_none());
        assert_eq!(cfg.logging.access_log_format, "common");
        assert!(cfg.performance.keep_alive);
        assert!(cfg.http.server_name.starts_with("cors-static-server/"));
    }

    #[test]
    fn test_environment_overrides() {
        let cfg = Config::load_with(env(&[
            ("STATIC_SERVER__PORT", "9123"),
            ("STATIC_SERVER__ROOT", "/srv/www"),
            ("STATIC_SERVER__OPEN_BROWSER", "false"),
            ("STATIC_LOGGING__ACCESS_LOG_FORMAT", "json"),
            ("STATIC_PERFORMANCE__SHUTDOWN_TIMEOUT", "1"),
        ]))
        .unwrap();
        assert_eq!(cfg.server.port, 9123);
        assert_eq!(cfg.server.root.as_deref(), Some("/srv/www"));
        assert!(!cfg.server.open_browser);
        assert_eq!(cfg.logging.access_log_format, "json");
        assert_eq!(cfg.performance.shutdown_timeout, 1);
    }

    #[test]
    fn test_workers() {
        let cfg = Config::load_with(env(&[("STATIC_SERVER__WORKERS", "4")])).unwrap();
        assert_eq!(cfg.server.workers.map(std::num::NonZeroUsize::get), Some(4));

        let zero = Config::load_with(env(&[("STATIC_SERVER__WORKERS", "0")]));
        assert!(matches!(zero, Err(ServerError::Config(_))));
    }

    #[test]
    fn test_unrelated_variables_ignored() {
        let cfg = Config::load_with(env(&[("OTHER_SERVER__PORT", "1")])).unwrap();
        assert_eq!(cfg.server.port, 8000);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::load_with(env(&[("STATIC_SERVER__PORT", "8081")])).unwrap();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8081".parse().unwrap()
        );

        let bad = Config::load_with(env(&[("STATIC_SERVER__HOST", "not a host")])).unwrap();
        assert!(matches!(
            bad.get_socket_addr(),
            Err(ServerError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_serving_root() {
        let explicit = Config::load_with(env(&[("STATIC_SERVER__ROOT", "/srv/www")])).unwrap();
        assert_eq!(explicit.serving_root().unwrap(), PathBuf::from("/srv/www"));

        let implicit = Config::load_with(env(&[])).unwrap();
        let exe_dir = std::env::current_exe().unwrap();
        assert_eq!(implicit.serving_root().unwrap(), exe_dir.parent().unwrap());
    }

    #[test]
    fn test_index_url() {
        let cfg = Config::load_with(env(&[])).unwrap();
        assert_eq!(cfg.index_url(8000), "http://localhost:8000/index.html");
    }
}
