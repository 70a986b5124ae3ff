//! Model types
//!
//! Model metadata and the status payloads reported by the inspection endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Information about a loaded model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Display name of the model (file stem)
    pub name: String,
    /// Path to the GGUF file
    pub path: String,
    /// Model size in bytes
    pub size_bytes: u64,
    /// Context window the model was loaded with
    pub context_size: u32,
    /// When the handle was constructed
    pub loaded_at: DateTime<Utc>,
}

/// Availability of the model, from the point of view of a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    /// The inference backend could not be initialised
    BackendUnavailable,
    /// The backend works but the model file is not on disk
    ModelMissing,
    /// The file exists but no handle was constructed
    NotLoaded,
    Loaded,
}

impl ModelStatus {
    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            ModelStatus::BackendUnavailable => Some("Inference backend not available yet"),
            ModelStatus::ModelMissing => Some("Model file not found"),
            ModelStatus::NotLoaded => Some("Model not loaded"),
            ModelStatus::Loaded => None,
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub model_loaded: bool,
    pub model_available: bool,
    pub model_path: String,
    pub llama_available: bool,
}

/// Body of `GET /model/info`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    pub loaded: bool,
    pub status: ModelStatus,
    pub model_path: String,
    pub model_available: bool,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Model name (file stem), when loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}
