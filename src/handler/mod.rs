//! Request handler module
//!
//! Request dispatch, path resolution under the serving root, and static
//! file responses.

pub mod listing;
pub mod resolver;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
