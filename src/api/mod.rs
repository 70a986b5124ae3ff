//! HTTP API
//!
//! `/health`, `/version`, `/chat` and `/model/info` over axum.

pub mod error;
pub mod handlers;
pub mod server;
