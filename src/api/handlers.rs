//! Endpoint handlers
//!
//! Inspection endpoints never fail; chat degrades according to the model status.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::Instrument;

use crate::api::error::ApiError;
use crate::app::AppState;
use crate::inference::engine::GenerationParams;
use crate::inference::prompt;
use crate::storage::version::{read_version, read_version_or_unknown};
use crate::types::message::{ChatRequest, ChatResponse};
use crate::types::model::{HealthResponse, ModelInfoResponse};

fn placeholder_reply(message: &str) -> String {
    format!(
        "The inference backend is still being installed. Please wait a few minutes and try again. Your question was: '{}'",
        message
    )
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        model_loaded: state.model_loaded(),
        model_available: state.model_file_exists(),
        model_path: state.config.model_file().display().to_string(),
        llama_available: state.backend_available,
    })
}

pub async fn version(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    read_version(&state.config.version_file()).map_err(|e| {
        tracing::error!("Failed to read version file: {}", e);
        ApiError::Internal(e.to_string())
    })
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!("Rejected chat body: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);
    generate_reply(state, request).instrument(span).await.map(Json)
}

async fn generate_reply(
    state: Arc<AppState>,
    request: ChatRequest,
) -> Result<ChatResponse, ApiError> {
    tracing::debug!(
        "Chat request: {} chars, max_tokens {}, temperature {}",
        request.message.len(),
        request.max_tokens,
        request.temperature
    );

    let version_file = state.config.version_file();

    if !state.backend_available {
        tracing::info!("Backend unavailable, answering with placeholder");
        return Ok(ChatResponse {
            response: placeholder_reply(&request.message),
            model_version: read_version_or_unknown(&version_file),
        });
    }

    let Some(model) = state.model.as_ref() else {
        tracing::warn!("Chat requested but no model is loaded");
        return Err(ApiError::ModelNotLoaded);
    };

    let prompt = prompt::build_chat_prompt(&request.message);
    let params = GenerationParams {
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        stop: prompt::stop_sequences(),
    };

    let generator = Arc::clone(&model.generator);
    let choices = tokio::task::spawn_blocking(move || generator.generate(&prompt, &params))
        .await
        .map_err(|e| {
            tracing::error!("Generation task failed: {}", e);
            ApiError::Generation(e.to_string())
        })?
        .map_err(|e| {
            tracing::error!("Generation failed: {}", e);
            ApiError::Generation(e.to_string())
        })?;

    let Some(first) = choices.into_iter().next() else {
        tracing::error!("Generation returned no choices");
        return Err(ApiError::Generation("no choices returned".to_string()));
    };

    Ok(ChatResponse {
        response: first.text.trim().to_string(),
        model_version: read_version_or_unknown(&version_file),
    })
}

pub async fn model_info(State(state): State<Arc<AppState>>) -> Json<ModelInfoResponse> {
    let status = state.status();
    let loaded = state.model.as_ref().map(|m| &m.info);

    Json(ModelInfoResponse {
        loaded: state.model_loaded(),
        status,
        model_path: state.config.model_file().display().to_string(),
        model_available: state.model_file_exists(),
        version: read_version_or_unknown(&state.config.version_file()),
        error: status.error_message().map(str::to_string),
        name: loaded.map(|info| info.name.clone()),
        context_size: loaded.map(|info| info.context_size),
        size_bytes: loaded.map(|info| info.size_bytes),
        loaded_at: loaded.map(|info| info.loaded_at),
    })
}
