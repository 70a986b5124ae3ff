//! Configuration types
//!
//! Service configuration, resolved from the environment at startup.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// GGUF file expected under `<model_root>/model/`
pub const MODEL_FILE_NAME: &str = "qwen2-0_5b-instruct-q4_k_m.gguf";
/// Version marker expected next to the model file
pub const VERSION_FILE_NAME: &str = "version.txt";

const DEFAULT_MODEL_ROOT: &str = "/model";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid bind address '{0}': {1}")]
    InvalidBindAddr(String, std::net::AddrParseError),
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base directory (`MODEL_PATH`); the model lives in its `model/` subdirectory
    pub model_root: PathBuf,
    /// Listen address (`BIND_ADDR`)
    pub bind_addr: String,
    /// Context window used when loading the model
    pub context_size: u32,
    /// CPU threads used for prompt processing and generation
    pub threads: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_root: PathBuf::from(DEFAULT_MODEL_ROOT),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            context_size: 2048,
            threads: 4,
        }
    }
}

impl ServiceConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(root) = get("MODEL_PATH") {
            config.model_root = PathBuf::from(root);
        }
        if let Some(addr) = get("BIND_ADDR") {
            config.bind_addr = addr.trim().to_string();
        }

        config
    }

    pub fn model_dir(&self) -> PathBuf {
        self.model_root.join("model")
    }

    /// Full path of the GGUF model file
    pub fn model_file(&self) -> PathBuf {
        self.model_dir().join(MODEL_FILE_NAME)
    }

    /// Full path of the version marker file
    pub fn version_file(&self) -> PathBuf {
        self.model_dir().join(VERSION_FILE_NAME)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|e| ConfigError::InvalidBindAddr(self.bind_addr.clone(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.model_root, PathBuf::from("/model"));
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.context_size, 2048);
        assert_eq!(config.threads, 4);
    }

    #[test]
    fn test_derived_paths() {
        let config = ServiceConfig::default();
        assert_eq!(
            config.model_file(),
            PathBuf::from("/model/model/qwen2-0_5b-instruct-q4_k_m.gguf")
        );
        assert_eq!(
            config.version_file(),
            PathBuf::from("/model/model/version.txt")
        );
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("MODEL_PATH", "/srv/kit"),
            ("BIND_ADDR", "127.0.0.1:9000"),
        ]));
        assert_eq!(
            config.model_file(),
            PathBuf::from("/srv/kit/model/qwen2-0_5b-instruct-q4_k_m.gguf")
        );
        assert_eq!(config.socket_addr().unwrap().port(), 9000);
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = ServiceConfig::from_lookup(lookup_from(&[("MODEL_PATH", "  ")]));
        assert_eq!(config.model_root, PathBuf::from("/model"));
    }

    #[test]
    fn test_invalid_bind_addr() {
        let config = ServiceConfig::from_lookup(lookup_from(&[("BIND_ADDR", "not-an-addr")]));
        assert!(matches!(
            config.socket_addr(),
            Err(ConfigError::InvalidBindAddr(_, _))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = ServiceConfig::default();
        let json = serde_json::to_string(&config).expect("Failed to serialize");
        let deserialized: ServiceConfig = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(config.context_size, deserialized.context_size);
        assert_eq!(config.model_root, deserialized.model_root);
    }
}
