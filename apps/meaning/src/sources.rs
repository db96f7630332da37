//! # Filesystem Sources
//!
//! Bounded file reads for world documents and the catalog resolvers the
//! core's loader is given. The core never opens files itself; these do.

use crate::error::AppError;
use meaning_core::{AsyncCatalogSource, CatalogSource, LoadError};
use serde_json::Value;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a world document or registry description (100 MB).
pub const MAX_DOCUMENT_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum size of a single catalog file (100 MB).
pub const MAX_CATALOG_SIZE: u64 = 100 * 1024 * 1024;

fn check_size(path: &Path, size: u64, limit: u64) -> Result<(), AppError> {
    if size > limit {
        return Err(AppError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit,
        });
    }
    Ok(())
}

fn io_error(path: &Path, err: &std::io::Error) -> AppError {
    AppError::Io {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

// =============================================================================
// BLOCKING READS
// =============================================================================

/// Read a text file no larger than `limit` bytes.
pub fn read_text(path: &Path, limit: u64) -> Result<String, AppError> {
    let metadata = std::fs::metadata(path).map_err(|e| io_error(path, &e))?;
    check_size(path, metadata.len(), limit)?;
    std::fs::read_to_string(path).map_err(|e| io_error(path, &e))
}

/// Read and parse a JSON file no larger than `limit` bytes.
pub fn read_json(path: &Path, limit: u64) -> Result<Value, AppError> {
    let text = read_text(path, limit)?;
    serde_json::from_str(&text).map_err(|e| AppError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Convert a host read failure into the loader's per-catalog error.
fn to_load_error(path: &str, err: AppError, not_found: bool) -> LoadError {
    if not_found {
        return LoadError::NotFound(path.to_string());
    }
    match err {
        AppError::Parse { reason, .. } => LoadError::Parse {
            path: path.to_string(),
            reason,
        },
        AppError::Io { reason, .. } => LoadError::Io {
            path: path.to_string(),
            reason,
        },
        other => LoadError::Other(other.to_string()),
    }
}

/// Resolves catalog paths from the local filesystem, blocking.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl CatalogSource for FileSource {
    fn load(&self, path: &str) -> Result<Value, LoadError> {
        let file = PathBuf::from(path);
        read_json(&file, MAX_CATALOG_SIZE).map_err(|err| to_load_error(path, err, !file.exists()))
    }
}

// =============================================================================
// ASYNC READS
// =============================================================================

/// Resolves catalog paths from the local filesystem with `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncFileSource;

impl AsyncFileSource {
    async fn read(path: String) -> Result<Value, LoadError> {
        let file = PathBuf::from(&path);
        let metadata = match tokio::fs::metadata(&file).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(LoadError::NotFound(path)),
            Err(err) => return Err(to_load_error(&path, io_error(&file, &err), false)),
        };
        check_size(&file, metadata.len(), MAX_CATALOG_SIZE)
            .map_err(|err| to_load_error(&path, err, false))?;

        let text = tokio::fs::read_to_string(&file)
            .await
            .map_err(|err| to_load_error(&path, io_error(&file, &err), false))?;
        serde_json::from_str(&text).map_err(|err| LoadError::Parse {
            path,
            reason: err.to_string(),
        })
    }
}

impl AsyncCatalogSource for AsyncFileSource {
    fn fetch(&self, path: String) -> impl Future<Output = Result<Value, LoadError>> + Send {
        Self::read(path)
    }
}
