//! gguf-chat-server library
//!
//! HTTP chat service around a single locally loaded GGUF model.

pub mod api;
pub mod app;
pub mod inference;
pub mod storage;
pub mod types;
