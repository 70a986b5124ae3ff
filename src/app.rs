//! Shared application state
//!
//! Built once at startup and handed to every handler behind an `Arc`. Nothing in it
//! changes after construction.

use crate::inference::loader::{self, LoadedModel};
use crate::types::config::ServiceConfig;
use crate::types::model::ModelStatus;

/// State shared across request handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    /// Whether an inference backend could be initialised
    pub backend_available: bool,
    /// The model handle, if loading succeeded
    pub model: Option<LoadedModel>,
}

impl AppState {
    pub fn new(config: ServiceConfig, backend_available: bool, model: Option<LoadedModel>) -> Self {
        Self {
            config,
            backend_available,
            model,
        }
    }

    /// Probe the backend and load the model once
    pub fn initialize(config: ServiceConfig) -> Self {
        let backend = loader::detect_backend();
        let model = loader::load_model(&config, backend.as_deref());
        tracing::info!(
            "AppState initialized (backend: {}, model loaded: {})",
            backend.is_some(),
            model.is_some()
        );
        Self::new(config, backend.is_some(), model)
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Whether the model file exists right now
    pub fn model_file_exists(&self) -> bool {
        self.config.model_file().exists()
    }

    pub fn status(&self) -> ModelStatus {
        if self.model.is_some() {
            ModelStatus::Loaded
        } else if !self.backend_available {
            ModelStatus::BackendUnavailable
        } else if !self.model_file_exists() {
            ModelStatus::ModelMissing
        } else {
            ModelStatus::NotLoaded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_in(dir: &std::path::Path) -> ServiceConfig {
        ServiceConfig {
            model_root: dir.to_path_buf(),
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn test_status_transitions() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let unavailable = AppState::new(config.clone(), false, None);
        assert_eq!(unavailable.status(), ModelStatus::BackendUnavailable);

        let state = AppState::new(config.clone(), true, None);
        assert_eq!(state.status(), ModelStatus::ModelMissing);

        fs::create_dir_all(config.model_dir()).unwrap();
        fs::write(config.model_file(), b"gguf").unwrap();
        assert_eq!(state.status(), ModelStatus::NotLoaded);
        assert!(!state.model_loaded());
    }
}
