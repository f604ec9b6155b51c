//! Screening HTTP API.
//!
//! `api_router()` returns a `Router` that can be mounted on any axum
//! server; `serve()` binds it and runs until Ctrl-C.

pub mod error;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::api_router;
pub use server::serve;
