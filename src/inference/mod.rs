//! LLM inference
//!
//! Backend detection, one-shot model loading, the chat template, and the llama.cpp
//! implementation of the generation seam.

pub mod engine;
#[cfg(feature = "llama")]
pub mod llama;
pub mod loader;
pub mod prompt;
