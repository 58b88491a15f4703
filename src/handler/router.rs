//! Request dispatch module
//!
//! Entry point for HTTP request processing: method dispatch, the outgoing
//! header hook, and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderName, HeaderValue, CONTENT_LENGTH, IF_MODIFIED_SINCE, REFERER, SERVER, USER_AGENT,
};
use hyper::{Method, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request data needed after dispatch, detached from the request body
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Raw (still percent-encoded) URI path
    pub path: String,
    pub query: Option<String>,
    pub version: Version,
    pub if_modified_since: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(ToString::to_string),
            version: req.version(),
            if_modified_since: header(IF_MODIFIED_SINCE),
            referer: header(REFERER),
            user_agent: header(USER_AGENT),
        }
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }
}

/// Main entry point for HTTP request handling
///
/// Never fails: every outcome, including errors, is a response, and every
/// response leaves through [`http::apply_cors_headers`].
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req);

    let mut response = dispatch(&ctx, &state).await;

    http::apply_cors_headers(response.headers_mut());
    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if state.config.logging.access_log {
        log_access(&ctx, &response, peer_addr, started, &state);
    }

    Ok(response)
}

/// Method dispatch
async fn dispatch(ctx: &RequestContext, state: &AppState) -> Response<Full<Bytes>> {
    match ctx.method {
        Method::GET | Method::HEAD => static_files::serve(ctx, state).await,
        Method::OPTIONS => http::build_options_response(),
        _ => {
            logger::log_warning(&format!("Unsupported method: {}", ctx.method));
            http::build_error_response(StatusCode::NOT_IMPLEMENTED)
        }
    }
}

fn log_access(
    ctx: &RequestContext,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        ctx.method.to_string(),
        ctx.path.clone(),
    );
    entry.query.clone_from(&ctx.query);
    entry.http_version = version_label(ctx.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    entry.referer.clone_from(&ctx.referer);
    entry.user_agent.clone_from(&ctx.user_agent);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
