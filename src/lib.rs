//! Local static file server with permissive CORS headers
//!
//! Serves a directory over HTTP/1.1, maps `/` to the default document,
//! tags every response with `Access-Control-Allow-*` headers and opens the
//! index page in the default browser on startup.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::Config;
pub use error::{ResolveError, ServerError, ServerResult};
pub use server::Server;
