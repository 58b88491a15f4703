//! HTTP protocol layer module
//!
//! Protocol-level helpers shared by the request handlers: response builders,
//! MIME guessing, date validation and the CORS header hook.

pub mod cache;
pub mod cors;
pub mod mime;
pub mod response;

// Re-export commonly used items
pub use cors::apply_cors_headers;
pub use response::{
    build_304_response, build_404_response, build_error_response, build_file_response,
    build_html_response, build_options_response, build_redirect_response,
};
