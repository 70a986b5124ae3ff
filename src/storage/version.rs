//! Model version marker
//!
//! The version file is read on every call so a model swap on disk is picked up
//! without restarting the service.

use crate::storage::StorageError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Reported when the version file does not exist
pub const UNKNOWN_VERSION: &str = "UNKNOWN";

/// Read the trimmed version string.
///
/// A missing file yields [`UNKNOWN_VERSION`]; any other I/O error is returned.
pub fn read_version(path: &Path) -> Result<String, StorageError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents.trim().to_string()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(UNKNOWN_VERSION.to_string()),
        Err(e) => Err(e.into()),
    }
}

/// Like [`read_version`], but folds every error into [`UNKNOWN_VERSION`]
pub fn read_version_or_unknown(path: &Path) -> String {
    match read_version(path) {
        Ok(version) => version,
        Err(e) => {
            tracing::warn!("Failed to read version file {}: {}", path.display(), e);
            UNKNOWN_VERSION.to_string()
        }
    }
}
