//! On-disk state
//!
//! Read-only access to the files shipped alongside the model.

pub mod version;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
