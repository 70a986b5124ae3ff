//! Inference seams
//!
//! [`ModelBackend`] turns a model file into a handle; [`TextGenerator`] is the handle.
//! The llama.cpp implementation lives in `inference::llama`; tests plug in stubs.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Inference errors
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Inference backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("Failed to load model: {0}")]
    ModelLoad(String),
    #[error("Failed to create context: {0}")]
    Context(String),
    #[error("Tokenization failed: {0}")]
    Tokenize(String),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("{0}")]
    Generation(String),
}

/// Fixed parameters used when constructing a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadParams {
    pub context_size: u32,
    pub threads: u32,
}

/// Per-request sampling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Output is cut at the first occurrence of any of these
    pub stop: Vec<String>,
}

/// Why generation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    /// End-of-generation token or stop sequence
    Stop,
    /// Token budget or context window exhausted
    Length,
}

/// One generated completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub finish_reason: FinishReason,
}

/// A loaded model that can complete a prompt.
///
/// `generate` blocks until completion; call it from a blocking context.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Vec<Choice>, InferenceError>;

    fn context_size(&self) -> u32;
}

/// Constructs handles from model files
pub trait ModelBackend: Send + Sync {
    fn name(&self) -> &str;

    fn load(
        &self,
        path: &Path,
        params: &LoadParams,
    ) -> Result<Arc<dyn TextGenerator>, InferenceError>;
}

/// Byte offset of the earliest stop sequence in `text`, if any
pub fn find_stop(text: &str, stop: &[String]) -> Option<usize> {
    stop.iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s.as_str()))
        .min()
}

/// Tokens that may be generated after a prompt of `prompt_tokens`.
///
/// A `max_tokens` of 0 means "until the context window is full".
pub fn token_budget(max_tokens: u32, prompt_tokens: usize, context_size: u32) -> u32 {
    let room = (context_size as usize).saturating_sub(prompt_tokens);
    let room = u32::try_from(room).unwrap_or(u32::MAX);
    if max_tokens == 0 {
        room
    } else {
        max_tokens.min(room)
    }
}
