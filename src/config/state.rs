// Application state module
// Read-only state shared by every connection after bootstrap

use std::path::{Path, PathBuf};

use super::types::Config;
use crate::error::{ServerError, ServerResult};

/// Application state
pub struct AppState {
    pub config: Config,
    /// Canonical serving root; every served path must stay under it
    root: PathBuf,
}

impl AppState {
    /// Create `AppState`, fixing the serving root for the process lifetime
    pub fn new(config: Config) -> ServerResult<Self> {
        let root = config.serving_root()?;
        let root = std::fs::canonicalize(&root).map_err(|source| ServerError::Root {
            path: root.clone(),
            source,
        })?;

        if !root.is_dir() {
            return Err(ServerError::Root {
                path: root,
                source: std::io::Error::other("not a directory"),
            });
        }

        Ok(Self { config, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// State over `root` with defaults otherwise, for handler tests
    #[cfg(test)]
    pub fn for_root(root: &Path) -> Self {
        Self::new(tests::config_with_root(root)).unwrap()
    }
}
