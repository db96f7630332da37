//! # World Files
//!
//! Reads a world document from disk and resolves its catalogs.
//!
//! A world document is JSON shaped `{ schema, seed?, config?, catalogs? }`.
//! `catalogs` is either a registry description object or a path to a JSON
//! file holding one. Relative catalog paths inside a description are
//! resolved against, in order: the configured `base_path`, the directory of
//! the description file, the directory of the world file.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::sources::{AsyncFileSource, FileSource, MAX_DOCUMENT_SIZE, read_json};
use meaning_core::{CatalogLoader, CatalogSet, WorldAdapter};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A registry description and the directory its relative paths default to.
struct Description {
    value: Value,
    dir: PathBuf,
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Locate the registry description a world document points at, if any.
fn description_of(document: &Value, world_path: &Path) -> Result<Option<Description>, AppError> {
    let world_dir = parent_dir(world_path);
    match document.get("catalogs") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(relative)) => {
            let path = world_dir.join(relative);
            let value = read_json(&path, MAX_DOCUMENT_SIZE)?;
            Ok(Some(Description {
                value,
                dir: parent_dir(&path),
            }))
        }
        Some(value @ Value::Object(_)) => Ok(Some(Description {
            value: value.clone(),
            dir: world_dir,
        })),
        Some(_) => Err(AppError::Parse {
            path: world_path.to_path_buf(),
            reason: "catalogs must be a registry description or a path to one".to_string(),
        }),
    }
}

/// Resolve a registry description into a validated catalog set.
pub async fn load_catalogs(
    description: &Value,
    base_path: &Path,
    concurrent: bool,
) -> Result<CatalogSet, AppError> {
    let loader = CatalogLoader::with_base_path(base_path.to_string_lossy());
    let catalogs = if concurrent {
        loader
            .load_and_validate_async(description, Arc::new(AsyncFileSource))
            .await?
    } else {
        loader.load_and_validate(description, &FileSource)?
    };
    tracing::info!(catalogs = catalogs.len(), concurrent, "catalogs loaded");
    Ok(catalogs)
}

/// Read a world document and assemble it, catalogs included.
pub async fn load_world(path: &Path, config: &AppConfig) -> Result<WorldAdapter, AppError> {
    let mut document = read_json(path, MAX_DOCUMENT_SIZE)?;

    if let Some(description) = description_of(&document, path)? {
        let base = config
            .catalogs
            .base_path
            .clone()
            .unwrap_or(description.dir);
        let catalogs = load_catalogs(&description.value, &base, config.catalogs.concurrent).await?;
        if let Some(fields) = document.as_object_mut() {
            fields.insert("catalogs".to_string(), serde_json::to_value(catalogs)?);
        }
    }

    let world = WorldAdapter::from_json(&document)?;
    tracing::info!(path = %path.display(), "world loaded");
    Ok(world)
}
