use gguf_chat_server::api::server;
use gguf_chat_server::app::AppState;
use gguf_chat_server::types::config::ServiceConfig;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServiceConfig::from_env();
    let addr = config.socket_addr()?;
    tracing::info!("Model file: {}", config.model_file().display());

    // Loading blocks for as long as llama.cpp needs to map the weights
    let state = tokio::task::spawn_blocking(move || AppState::initialize(config)).await?;

    server::serve(addr, Arc::new(state)).await?;
    Ok(())
}
