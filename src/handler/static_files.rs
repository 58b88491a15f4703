//! Static file serving module
//!
//! Resolves the request path under the serving root, then answers with the
//! file, a directory index/listing, a redirect, or an error status.

use crate::config::AppState;
use crate::error::ResolveError;
use crate::handler::listing;
use crate::handler::resolver::{self, Located, RelativeTarget};
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::fs::Metadata;
use std::path::Path;
use tokio::fs;

/// Fallback index name tried after the default document in directories
const SECONDARY_INDEX: &str = "index.htm";

/// Serve a GET/HEAD request from the serving root
pub async fn serve(ctx: &RequestContext, state: &AppState) -> Response<Full<Bytes>> {
    let target =
        match resolver::resolve_request_path(&ctx.path, &state.config.server.default_document) {
            Ok(t) => t,
            Err(e) => return error_response(&e),
        };

    match resolver::locate(state.root(), &target).await {
        Ok(Located::File { path, metadata }) => {
            // A file cannot be addressed as a directory
            if target.trailing_slash {
                return http::build_404_response();
            }
            serve_file(ctx, &path, &metadata).await
        }
        Ok(Located::Directory { path }) => serve_directory(ctx, state, &target, &path).await,
        Err(e) => error_response(&e),
    }
}

/// Serve a directory: redirect to the slash form, then index document, then listing
async fn serve_directory(
    ctx: &RequestContext,
    state: &AppState,
    target: &RelativeTarget,
    dir: &Path,
) -> Response<Full<Bytes>> {
    if !ctx.path.ends_with('/') {
        return http::build_redirect_response(&slash_redirect_location(ctx));
    }

    for index in [state.config.server.default_document.as_str(), SECONDARY_INDEX] {
        let candidate = RelativeTarget {
            relative: target.relative.join(index),
            trailing_slash: false,
        };
        match resolver::locate(state.root(), &candidate).await {
            Ok(Located::File { path, metadata }) => {
                return serve_file(ctx, &path, &metadata).await;
            }
            Ok(Located::Directory { .. }) | Err(ResolveError::NotFound(_)) => {}
            Err(e) => return error_response(&e),
        }
    }

    let display_path = percent_decode_str(&ctx.path).decode_utf8_lossy();
    match listing::render_listing(dir, &display_path).await {
        Ok(html) => http::build_html_response(html, ctx.is_head()),
        Err(source) => error_response(&ResolveError::Io {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// `Location` for the trailing-slash redirect of a directory
///
/// Leading slashes collapse to one: `//host/dir` must stay a local path and
/// never become a protocol-relative URL pointing at another host.
fn slash_redirect_location(ctx: &RequestContext) -> String {
    let path = ctx.path.trim_start_matches('/');
    match &ctx.query {
        Some(q) => format!("/{path}/?{q}"),
        None => format!("/{path}/"),
    }
}

/// Serve a single file with `Last-Modified` validation
async fn serve_file(ctx: &RequestContext, path: &Path, metadata: &Metadata) -> Response<Full<Bytes>> {
    let modified = metadata.modified().ok();
    let last_modified = modified.map(cache::format_http_date);

    if let (Some(modified), Some(last_modified)) = (modified, last_modified.as_deref()) {
        if cache::is_not_modified(ctx.if_modified_since.as_deref(), modified) {
            return http::build_304_response(last_modified);
        }
    }

    let content_type = mime::content_type_for(path);

    if ctx.is_head() {
        return http::build_file_response(
            Bytes::new(),
            metadata.len(),
            content_type,
            last_modified.as_deref(),
        );
    }

    match fs::read(path).await {
        Ok(content) => {
            let length = content.len() as u64;
            http::build_file_response(
                Bytes::from(content),
                length,
                content_type,
                last_modified.as_deref(),
            )
        }
        Err(source) => error_response(&ResolveError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Map a resolution failure to its status response, logging the ones worth noting
fn error_response(err: &ResolveError) -> Response<Full<Bytes>> {
    match err {
        // File not found is common (404), no need to log
        ResolveError::NotFound(_) => {}
        ResolveError::PathEscape(path) => {
            logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
        }
        ResolveError::BadRequest(_) => logger::log_warning(&err.to_string()),
        ResolveError::Io { .. } => logger::log_error(&err.to_string()),
    }
    http::build_error_response(err.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED, LOCATION};
    use hyper::{Method, Request, StatusCode};

    fn site() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("index.html"), "<h1>Hi</h1>").unwrap();
        std::fs::create_dir_all(root.join("docs")).unwrap();
        std::fs::write(root.join("docs/index.htm"), "docs home").unwrap();
        std::fs::create_dir_all(root.join("assets/css")).unwrap();
        std::fs::write(root.join("assets/app.js"), "console.log(1)").unwrap();
        let state = AppState::for_root(root);
        (dir, state)
    }

    fn ctx(method: Method, uri: &str) -> RequestContext {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        RequestContext::from_request(&req)
    }

    async fn body(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_file_with_query() {
        let (_dir, state) = site();
        let resp = serve(&ctx(Method::GET, "/assets/app.js?v=3"), &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/javascript; charset=utf-8");
        assert_eq!(resp.headers()[CONTENT_LENGTH], "14");
        assert!(resp.headers().contains_key(LAST_MODIFIED));
        assert_eq!(body(resp).await, "console.log(1)");
    }

    #[tokio::test]
    async fn test_directory_redirect_keeps_query() {
        let (_dir, state) = site();
        let resp = serve(&ctx(Method::GET, "/docs?tab=2"), &state).await;
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()[LOCATION], "/docs/?tab=2");
    }

    #[tokio::test]
    async fn test_directory_redirect_stays_on_host() {
        let (dir, state) = site();
        std::fs::create_dir(dir.path().join("evil.example")).unwrap();

        for (uri, expected) in [
            ("//evil.example", "/evil.example/"),
            ("///evil.example?x=1", "/evil.example/?x=1"),
            ("//docs", "/docs/"),
        ] {
            let resp = serve(&ctx(Method::GET, uri), &state).await;
            assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY, "{uri}");
            assert_eq!(resp.headers()[LOCATION], expected, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_directory_index_fallback() {
        let (_dir, state) = site();
        let resp = serve(&ctx(Method::GET, "/docs/"), &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body(resp).await, "docs home");
    }

    #[tokio::test]
    async fn test_directory_listing() {
        let (_dir, state) = site();
        let resp = serve(&ctx(Method::GET, "/assets/"), &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        let html = body(resp).await;
        let html = std::str::from_utf8(&html).unwrap();
        assert!(html.contains("Directory listing for /assets/"));
        assert!(html.contains("href=\"app.js\""));
        assert!(html.contains("href=\"css/\""));
    }

    #[tokio::test]
    async fn test_file_with_trailing_slash_is_not_found() {
        let (_dir, state) = site();
        let resp = serve(&ctx(Method::GET, "/index.html/"), &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_if_modified_since() {
        let (_dir, state) = site();
        let first = serve(&ctx(Method::GET, "/index.html"), &state).await;
        let last_modified = first.headers()[LAST_MODIFIED].to_str().unwrap().to_string();

        let req = Request::builder()
            .uri("/index.html")
            .header("if-modified-since", &last_modified)
            .body(())
            .unwrap();
        let resp = serve(&RequestContext::from_request(&req), &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(resp.headers()[LAST_MODIFIED], last_modified.as_str());

        let req = Request::builder()
            .uri("/index.html")
            .header("if-modified-since", "Sat, 01 Jan 2000 00:00:00 GMT")
            .body(())
            .unwrap();
        let resp = serve(&RequestContext::from_request(&req), &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let (_dir, state) = site();
        for (uri, expected) in [
            ("/missing.txt", StatusCode::NOT_FOUND),
            ("/../server_config", StatusCode::FORBIDDEN),
            ("/%2e%2e/server_config", StatusCode::FORBIDDEN),
            ("/bad%ff", StatusCode::BAD_REQUEST),
        ] {
            let resp = serve(&ctx(Method::GET, uri), &state).await;
            assert_eq!(resp.status(), expected, "{uri}");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_server_error() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, state) = site();
        let locked = dir.path().join("locked.txt");
        std::fs::write(&locked, "secret").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits; nothing to assert there
        if std::fs::read(&locked).is_ok() {
            return;
        }

        let resp = serve(&ctx(Method::GET, "/locked.txt"), &state).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
