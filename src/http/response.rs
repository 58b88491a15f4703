//! HTTP response building module
//!
//! Builders for every response the server produces. CORS headers are not
//! added here; the dispatcher applies them to whatever comes back.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED, LOCATION};
use hyper::{Response, StatusCode};

/// Methods this server actually implements
pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Build 200 response for a file
///
/// `content_length` is the size of the full representation; for HEAD the
/// caller passes an empty body with the real length.
pub fn build_file_response(
    body: Bytes,
    content_length: u64,
    content_type: &str,
    last_modified: Option<&str>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length);

    if let Some(last_modified) = last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len() as u64;
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };
    build_file_response(body, content_length, "text/html; charset=utf-8", None)
}

/// Build 304 Not Modified response
pub fn build_304_response(last_modified: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(LAST_MODIFIED, last_modified)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 301 redirect response (directory without trailing slash)
pub fn build_redirect_response(location: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, location)
        .header(CONTENT_LENGTH, 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build a plain-text error response, e.g. `404 Not Found`
pub fn build_error_response(status: StatusCode) -> Response<Full<Bytes>> {
    let text = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, text.len());

    if status == StatusCode::NOT_IMPLEMENTED || status == StatusCode::METHOD_NOT_ALLOWED {
        builder = builder.header(ALLOW, ALLOWED_METHODS);
    }

    builder.body(Full::new(Bytes::from(text))).unwrap_or_else(|e| {
        log_build_error(status.as_str(), &e);
        let mut fallback = Response::new(Full::new(Bytes::new()));
        *fallback.status_mut() = status;
        fallback
    })
}

pub fn build_404_response() -> Response<Full<Bytes>> {
    build_error_response(StatusCode::NOT_FOUND)
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_file_response() {
        let resp = build_file_response(
            Bytes::from_static(b"<h1>Hi</h1>"),
            11,
            "text/html; charset=utf-8",
            Some("Sun, 06 Nov 1994 08:49:37 GMT"),
        );
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "11");
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(
            resp.headers()[LAST_MODIFIED],
            "Sun, 06 Nov 1994 08:49:37 GMT"
        );
        assert_eq!(body_bytes(resp).await, "<h1>Hi</h1>");
    }

    #[tokio::test]
    async fn test_head_html_keeps_length_drops_body() {
        let resp = build_html_response("<p>12345</p>".to_string(), true);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "12");
        assert!(resp.headers().get(LAST_MODIFIED).is_none());
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_error_responses() {
        let resp = build_404_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_bytes(resp).await, "404 Not Found");

        let resp = build_error_response(StatusCode::FORBIDDEN);
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(resp.headers().get(ALLOW).is_none());

        let resp = build_error_response(StatusCode::NOT_IMPLEMENTED);
        assert_eq!(resp.headers()[ALLOW], ALLOWED_METHODS);
        assert_eq!(body_bytes(resp).await, "501 Not Implemented");
    }

    #[tokio::test]
    async fn test_options_response() {
        let resp = build_options_response();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()[ALLOW], ALLOWED_METHODS);
        assert!(body_bytes(resp).await.is_empty());
    }

    #[test]
    fn test_redirect_response() {
        let resp = build_redirect_response("/docs/?page=2");
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()[LOCATION], "/docs/?page=2");
    }
}
