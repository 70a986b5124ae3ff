//! Startup model loading
//!
//! Runs once before the router is served. Every failure leaves the handle unset;
//! none of them stop the service.

use crate::inference::engine::{LoadParams, ModelBackend, TextGenerator};
use crate::types::config::ServiceConfig;
use crate::types::model::ModelInfo;
use std::fs;
use std::sync::Arc;

/// A constructed handle together with its metadata
#[derive(Clone)]
pub struct LoadedModel {
    pub generator: Arc<dyn TextGenerator>,
    pub info: ModelInfo,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel").field("info", &self.info).finish()
    }
}

/// Probe the inference backend compiled into this binary
#[cfg(feature = "llama")]
pub fn detect_backend() -> Option<Arc<dyn ModelBackend>> {
    match crate::inference::llama::LlamaCppBackend::init() {
        Ok(backend) => {
            tracing::info!("llama.cpp backend initialised");
            Some(Arc::new(backend))
        }
        Err(e) => {
            tracing::warn!("{}; chat will answer with a placeholder", e);
            None
        }
    }
}

/// Probe the inference backend compiled into this binary
#[cfg(not(feature = "llama"))]
pub fn detect_backend() -> Option<Arc<dyn ModelBackend>> {
    tracing::warn!("Built without the `llama` feature; chat will answer with a placeholder");
    None
}

/// Attempt to load the configured model exactly once
pub fn load_model(
    config: &ServiceConfig,
    backend: Option<&dyn ModelBackend>,
) -> Option<LoadedModel> {
    let Some(backend) = backend else {
        tracing::warn!("Inference backend not available, skipping model load");
        return None;
    };

    let path = config.model_file();
    let metadata = match fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!("Model file {} not available: {}", path.display(), e);
            return None;
        }
    };

    let params = LoadParams {
        context_size: config.context_size,
        threads: config.threads,
    };

    match backend.load(&path, &params) {
        Ok(generator) => {
            let info = ModelInfo {
                name: path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: path.display().to_string(),
                size_bytes: metadata.len(),
                context_size: generator.context_size(),
                loaded_at: chrono::Utc::now(),
            };
            tracing::info!(
                "Model loaded successfully from {} via {} ({} bytes, n_ctx {})",
                info.path,
                backend.name(),
                info.size_bytes,
                info.context_size
            );
            Some(LoadedModel { generator, info })
        }
        Err(e) => {
            tracing::error!("Error loading model: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::engine::{Choice, GenerationParams, InferenceError};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    struct FixedGenerator(u32);

    impl TextGenerator for FixedGenerator {
        fn generate(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<Vec<Choice>, InferenceError> {
            Ok(Vec::new())
        }

        fn context_size(&self) -> u32 {
            self.0
        }
    }

    /// Records every load call; fails when `fail` is set
    #[derive(Default)]
    struct RecordingBackend {
        fail: bool,
        calls: Mutex<Vec<(PathBuf, LoadParams)>>,
    }

    impl ModelBackend for RecordingBackend {
        fn name(&self) -> &str {
            "recording"
        }

        fn load(
            &self,
            path: &Path,
            params: &LoadParams,
        ) -> Result<Arc<dyn TextGenerator>, InferenceError> {
            self.calls.lock().unwrap().push((path.to_path_buf(), *params));
            if self.fail {
                return Err(InferenceError::ModelLoad("corrupt header".to_string()));
            }
            Ok(Arc::new(FixedGenerator(params.context_size)))
        }
    }

    fn config_in(dir: &Path) -> ServiceConfig {
        ServiceConfig {
            model_root: dir.to_path_buf(),
            ..ServiceConfig::default()
        }
    }

    fn write_model(config: &ServiceConfig, bytes: &[u8]) {
        fs::create_dir_all(config.model_dir()).unwrap();
        fs::write(config.model_file(), bytes).unwrap();
    }

    #[test]
    fn test_no_backend_leaves_handle_unset() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_model(&config, b"gguf");

        assert!(load_model(&config, None).is_none());
    }

    #[test]
    fn test_missing_file_skips_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let backend = RecordingBackend::default();

        assert!(load_model(&config, Some(&backend)).is_none());
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_load_error_leaves_handle_unset() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_model(&config, b"gguf");
        let backend = RecordingBackend {
            fail: true,
            ..Default::default()
        };

        assert!(load_model(&config, Some(&backend)).is_none());
        assert_eq!(backend.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_successful_load_records_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_model(&config, b"0123456789");
        let backend = RecordingBackend::default();

        let loaded = load_model(&config, Some(&backend)).expect("model should load");
        assert_eq!(loaded.info.size_bytes, 10);
        assert_eq!(loaded.info.context_size, 2048);
        assert_eq!(loaded.info.name, "qwen2-0_5b-instruct-q4_k_m");
        assert_eq!(loaded.info.path, config.model_file().display().to_string());

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, config.model_file());
        assert_eq!(
            calls[0].1,
            LoadParams {
                context_size: 2048,
                threads: 4
            }
        );
    }
}
