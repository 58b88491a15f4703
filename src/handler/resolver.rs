//! File resolution
//!
//! Maps a request target to a location under the serving root in two steps:
//! a lexical pass over the URL path (`resolve_request_path`), then a
//! filesystem pass that canonicalizes and checks containment (`locate`).

use percent_encoding::percent_decode_str;
use std::fs::Metadata;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::error::ResolveError;

/// Normalized request path, relative to the serving root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeTarget {
    pub relative: PathBuf,
    /// Request path ended in `/`
    pub trailing_slash: bool,
}

/// What a target resolved to on disk
#[derive(Debug)]
pub enum Located {
    File { path: PathBuf, metadata: Metadata },
    Directory { path: PathBuf },
}

/// Drop query string and fragment from a request target
pub fn strip_query(target: &str) -> &str {
    let end = target
        .find(|c| c == '?' || c == '#')
        .unwrap_or(target.len());
    &target[..end]
}

/// Normalize a request target into a path relative to the serving root
///
/// `/` is rewritten to the default document. Empty and `.` segments are
/// dropped; `..`, or any segment the platform would treat as more than a
/// plain file name, is rejected as an escape attempt.
pub fn resolve_request_path(
    target: &str,
    default_document: &str,
) -> Result<RelativeTarget, ResolveError> {
    let path = strip_query(target);
    if !path.starts_with('/') {
        return Err(ResolveError::BadRequest(target.to_string()));
    }

    let rewritten;
    let path = if path == "/" {
        rewritten = format!("/{}", default_document.trim_start_matches('/'));
        rewritten.as_str()
    } else {
        path
    };

    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| ResolveError::BadRequest(target.to_string()))?;

    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(ResolveError::PathEscape(path.to_string())),
            s if s.contains('\0') => return Err(ResolveError::BadRequest(target.to_string())),
            s => {
                let mut components = Path::new(s).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => relative.push(s),
                    _ => return Err(ResolveError::PathEscape(path.to_string())),
                }
            }
        }
    }

    Ok(RelativeTarget {
        relative,
        trailing_slash: decoded.ends_with('/'),
    })
}

/// Find a normalized target under `root`
///
/// `root` must already be canonical. The candidate is canonicalized so
/// symlinks pointing outside the root are caught.
pub async fn locate(root: &Path, target: &RelativeTarget) -> Result<Located, ResolveError> {
    let candidate = root.join(&target.relative);

    let canonical = match fs::canonicalize(&candidate).await {
        Ok(p) => p,
        Err(e) if is_missing(&e) => {
            return Err(ResolveError::NotFound(
                target.relative.display().to_string(),
            ))
        }
        Err(source) => {
            return Err(ResolveError::Io {
                path: candidate,
                source,
            })
        }
    };

    if !canonical.starts_with(root) {
        return Err(ResolveError::PathEscape(format!(
            "{} -> {}",
            target.relative.display(),
            canonical.display()
        )));
    }

    let metadata = fs::metadata(&canonical)
        .await
        .map_err(|source| ResolveError::Io {
            path: canonical.clone(),
            source,
        })?;

    if metadata.is_dir() {
        Ok(Located::Directory { path: canonical })
    } else {
        Ok(Located::File {
            path: canonical,
            metadata,
        })
    }
}

fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
